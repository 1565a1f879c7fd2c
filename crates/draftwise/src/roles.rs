use banpick_model::hero::{HeroDb, Role};
use banpick_model::HeroId;

/// Resolves the largest set of distinct roles a group of drafted heroes can
/// cover, assigning at most one role per hero. Team strength downstream is
/// read as "how many of the 5 standard roles are filled", so this is a
/// maximum-assignment search, not a frequency count.
///
/// Deterministic: heroes are tried most-constrained-first and the first
/// maximal assignment found wins, so equal inputs always produce equal
/// outputs.
pub fn resolve_roles(heroes: &[HeroId], db: &HeroDb) -> Vec<Role> {
    let mut pools: Vec<&[Role]> = heroes
        .iter()
        .map(|id| db.roles_of(id))
        .map(|roles| {
            if roles.is_empty() {
                // no recognized role defaults to Dark Slayer
                DARK_SLAYER_ONLY
            } else {
                roles
            }
        })
        .collect();
    pools.sort_by_key(|roles| roles.len());

    let mut best: u8 = 0;
    search(&pools, 0, 0, &mut best);
    Role::ALL
        .into_iter()
        .filter(|role| best & role.bit() != 0)
        .collect()
}

const DARK_SLAYER_ONLY: &[Role] = &[Role::DarkSlayer];

/// Exhaustive backtracking over a role bitmask. With at most 5 roles the
/// state space is 2^5, so no memoization is needed beyond the running best.
fn search(pools: &[&[Role]], idx: usize, covered: u8, best: &mut u8) {
    if covered.count_ones() > best.count_ones() {
        *best = covered;
    }
    if idx == pools.len() || covered.count_ones() == Role::ALL.len() as u32 {
        return;
    }
    for role in pools[idx] {
        if covered & role.bit() == 0 {
            search(pools, idx + 1, covered | role.bit(), best);
        }
    }
    // a hero may also go unassigned when all its roles are taken
    search(pools, idx + 1, covered, best);
}

pub fn missing_roles(heroes: &[HeroId], db: &HeroDb) -> Vec<Role> {
    let filled = resolve_roles(heroes, db);
    Role::ALL
        .into_iter()
        .filter(|role| !filled.contains(role))
        .collect()
}

#[cfg(test)]
mod tests {
    use banpick_model::hero::{DamageType, Hero, PowerSpike};

    use super::*;

    fn hero(id: &str, roles: &[Role]) -> Hero {
        Hero {
            id: HeroId::from(id),
            name: String::from(id),
            main_position: roles.to_vec(),
            damage_type: DamageType::Physical,
            power_spike: PowerSpike::Mid,
            stats: Default::default(),
        }
    }

    fn ids(names: &[&str]) -> Vec<HeroId> {
        names.iter().copied().map(HeroId::from).collect()
    }

    #[test]
    fn empty_set_covers_nothing() {
        let db = HeroDb::new(vec![]);
        assert!(resolve_roles(&[], &db).is_empty());
        assert_eq!(missing_roles(&[], &db).len(), 5);
    }

    #[test]
    fn assignment_maximizes_distinct_roles() {
        // Greedy per-hero choice would cover 2 roles here; the optimal
        // assignment covers 3: A->Jungle, B->Mid, C->DarkSlayer.
        let db = HeroDb::new(vec![
            hero("A", &[Role::Jungle, Role::Mid]),
            hero("B", &[Role::Mid]),
            hero("C", &[Role::DarkSlayer, Role::Jungle]),
        ]);
        let covered = resolve_roles(&ids(&["A", "B", "C"]), &db);
        assert_eq!(covered, vec![Role::DarkSlayer, Role::Jungle, Role::Mid]);
    }

    #[test]
    fn overlapping_single_role_heroes_count_once() {
        let db = HeroDb::new(vec![
            hero("M1", &[Role::Mid]),
            hero("M2", &[Role::Mid]),
            hero("M3", &[Role::Mid]),
        ]);
        assert_eq!(resolve_roles(&ids(&["M1", "M2", "M3"]), &db), vec![Role::Mid]);
    }

    #[test]
    fn unknown_hero_defaults_to_dark_slayer() {
        let db = HeroDb::new(vec![]);
        assert_eq!(
            resolve_roles(&ids(&["ghost"]), &db),
            vec![Role::DarkSlayer]
        );
    }

    #[test]
    fn coverage_is_monotone_and_bounded() {
        let db = HeroDb::new(vec![
            hero("A", &[Role::Jungle]),
            hero("B", &[Role::Jungle, Role::Mid]),
            hero("C", &[Role::Abyssal]),
            hero("D", &[Role::Roam, Role::Abyssal]),
            hero("E", &[Role::DarkSlayer]),
            hero("F", &[Role::Mid]),
        ]);
        let all = ids(&["A", "B", "C", "D", "E", "F"]);
        let mut prev = 0;
        for n in 0..=all.len() {
            let covered = resolve_roles(&all[..n], &db).len();
            assert!(covered >= prev);
            assert!(covered <= n.min(5));
            prev = covered;
        }
        assert_eq!(prev, 5);
    }

    #[test]
    fn result_is_deterministic() {
        let db = HeroDb::new(vec![
            hero("A", &[Role::Jungle, Role::Mid, Role::DarkSlayer]),
            hero("B", &[Role::Mid, Role::Jungle]),
            hero("C", &[Role::DarkSlayer, Role::Mid]),
        ]);
        let set = ids(&["A", "B", "C"]);
        let first = resolve_roles(&set, &db);
        for _ in 0..10 {
            assert_eq!(resolve_roles(&set, &db), first);
        }
    }
}
