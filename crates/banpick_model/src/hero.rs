use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{GameVersion, HeroId};

/// The fixed positional vocabulary. Raw position tags coming from the data
/// layer are normalized into these five; anything unrecognized maps to the
/// Dark Slayer lane.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    DarkSlayer,
    Jungle,
    Mid,
    Abyssal,
    Roam,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::DarkSlayer,
        Role::Jungle,
        Role::Mid,
        Role::Abyssal,
        Role::Roam,
    ];

    pub fn bit(self) -> u8 {
        match self {
            Role::DarkSlayer => 1 << 0,
            Role::Jungle => 1 << 1,
            Role::Mid => 1 << 2,
            Role::Abyssal => 1 << 3,
            Role::Roam => 1 << 4,
        }
    }

    pub fn normalize(raw: &str) -> Role {
        match raw.to_lowercase().replace([' ', '_', '-'], "").as_str() {
            "darkslayer" | "dsl" | "top" | "slayer" => Role::DarkSlayer,
            "jungle" | "jungler" | "jg" => Role::Jungle,
            "mid" | "middle" | "midlaner" => Role::Mid,
            "abyssal" | "abyssaldragon" | "adc" | "farm" | "marksman" => Role::Abyssal,
            "roam" | "roamer" | "support" | "sup" => Role::Roam,
            _ => Role::DarkSlayer,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::DarkSlayer => "Dark Slayer",
            Role::Jungle => "Jungle",
            Role::Mid => "Mid",
            Role::Abyssal => "Abyssal",
            Role::Roam => "Roam",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DamageType {
    Physical,
    Magical,
    Mixed,
}

/// When a hero comes online during a match.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PowerSpike {
    Early,
    Mid,
    Late,
}

/// Per-patch aggregate rates, percent scale (0.0..=100.0).
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroStats {
    pub win_rate: f64,
    pub pick_rate: f64,
    pub ban_rate: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    pub id: HeroId,
    pub name: String,
    /// Eligible positions, normalized. Never empty: heroes with no
    /// recognized position default to Dark Slayer.
    pub main_position: Vec<Role>,
    pub damage_type: DamageType,
    pub power_spike: PowerSpike,
    #[serde(default)]
    pub stats: BTreeMap<GameVersion, HeroStats>,
}

impl Hero {
    pub fn stats_for(&self, version: &GameVersion) -> Option<&HeroStats> {
        self.stats.get(version)
    }

    /// Stats for the given patch, or from the most recent earlier patch.
    pub fn stats_at_or_before(&self, version: &GameVersion) -> Option<(&GameVersion, &HeroStats)> {
        self.stats.range(..=version).next_back()
    }

    pub fn plays(&self, role: Role) -> bool {
        self.main_position.contains(&role)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeroDb {
    heroes: HashMap<HeroId, Hero>,
    order: Vec<HeroId>,
}

impl HeroDb {
    pub fn new(heroes: impl IntoIterator<Item = Hero>) -> Self {
        let mut db = HeroDb::default();
        for hero in heroes {
            let id = hero.id.clone();
            if db.heroes.insert(id.clone(), hero).is_some() {
                warn!("Duplicate hero id in catalogue: {id}");
            } else {
                db.order.push(id);
            }
        }
        db
    }

    pub fn get(&self, id: &HeroId) -> Option<&Hero> {
        self.heroes.get(id)
    }

    /// Iteration preserves catalogue order so that score ties resolve the
    /// same way on every call.
    pub fn all(&self) -> impl Iterator<Item = &Hero> {
        self.order.iter().filter_map(|id| self.heroes.get(id))
    }

    pub fn roles_of(&self, id: &HeroId) -> &[Role] {
        self.get(id).map(|h| h.main_position.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
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

    #[test]
    fn normalize_role_tags() {
        assert_eq!(Role::normalize("Dark Slayer"), Role::DarkSlayer);
        assert_eq!(Role::normalize("jungler"), Role::Jungle);
        assert_eq!(Role::normalize("MIDDLE"), Role::Mid);
        assert_eq!(Role::normalize("abyssal dragon"), Role::Abyssal);
        assert_eq!(Role::normalize("support"), Role::Roam);
        // unrecognized tags land in the Dark Slayer lane
        assert_eq!(Role::normalize("???"), Role::DarkSlayer);
    }

    #[test]
    fn stats_fallback_to_earlier_patch() {
        let mut h = hero("Violet", &[Role::Abyssal]);
        h.stats.insert(
            GameVersion::from("1.50"),
            HeroStats {
                win_rate: 51.0,
                ..Default::default()
            },
        );
        h.stats.insert(
            GameVersion::from("1.52"),
            HeroStats {
                win_rate: 53.0,
                ..Default::default()
            },
        );

        let (v, s) = h.stats_at_or_before(&GameVersion::from("1.51")).unwrap();
        assert_eq!(v.as_str(), "1.50");
        assert_eq!(s.win_rate, 51.0);

        let (v, _) = h.stats_at_or_before(&GameVersion::from("1.52")).unwrap();
        assert_eq!(v.as_str(), "1.52");

        assert!(h.stats_at_or_before(&GameVersion::from("1.49")).is_none());
    }

    #[test]
    fn db_iteration_preserves_insertion_order() {
        let db = HeroDb::new(vec![
            hero("Zephys", &[Role::Jungle]),
            hero("Alice", &[Role::Roam]),
            hero("Raz", &[Role::Mid]),
        ]);
        let ids: Vec<&str> = db.all().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["Zephys", "Alice", "Raz"]);
    }
}
