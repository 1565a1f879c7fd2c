use std::collections::HashMap;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::hero::Role;
use crate::{HeroId, TeamName};

fn rate(wins: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        wins as f64 / total as f64 * 100.0
    }
}

/// Pick-side usage of one hero by one team.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroUsage {
    pub picks: u32,
    pub wins: u32,
    pub first_picks: u32,
    pub first_pick_wins: u32,
    /// Rolling recent window (the data layer decides its width).
    pub recent_picks: u32,
    pub recent_wins: u32,
}

impl HeroUsage {
    pub fn win_rate(&self) -> f64 {
        rate(self.wins, self.picks)
    }

    pub fn first_pick_win_rate(&self) -> f64 {
        rate(self.first_pick_wins, self.first_picks)
    }

    pub fn recent_win_rate(&self) -> f64 {
        rate(self.recent_wins, self.recent_picks)
    }
}

/// Ban-side usage of one hero by one team, split by ban sub-phase.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanUsage {
    /// Bans placed in the opening phase (sequence slots 0..=3).
    pub opening: u32,
    /// Bans placed in the closing phase (sequence slots 10..=13).
    pub closing: u32,
    /// Counts keyed by the exact sequence slot the ban was placed at.
    #[serde(default)]
    pub by_slot: HashMap<usize, u32>,
}

impl BanUsage {
    pub fn at_slot(&self, slot: usize) -> u32 {
        self.by_slot.get(&slot).copied().unwrap_or(0)
    }
}

/// A player on the emulated team's roster with a pronounced role identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSpecialist {
    pub player: String,
    pub role: Role,
    pub signature_heroes: Vec<HeroId>,
    pub games: u32,
    pub role_win_rate: f64,
}

/// Aggregated historical evidence for one team. Externally supplied and
/// read-only per scoring call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    pub team: TeamName,
    pub games: u32,
    #[serde(default)]
    pub heroes: HashMap<HeroId, HeroUsage>,
    #[serde(default)]
    pub bans: HashMap<HeroId, BanUsage>,
    /// Role frequency per side-pick slot (index 0 = the team's first pick).
    /// Always 5 entries when populated.
    #[serde(default)]
    pub pick_slot_roles: Vec<HashMap<Role, u32>>,
    #[serde(default)]
    pub roster: Vec<RosterSpecialist>,
    /// The hero behind the team's standout player performances, if the
    /// data layer identified one.
    #[serde(default)]
    pub mvp_hero: Option<HeroId>,
    #[serde(default)]
    pub fetched_at: Option<DateTime<Local>>,
}

impl TeamStats {
    pub fn hero_usage(&self, hero: &HeroId) -> HeroUsage {
        self.heroes.get(hero).copied().unwrap_or_default()
    }

    pub fn ban_usage(&self, hero: &HeroId) -> Option<&BanUsage> {
        self.bans.get(hero)
    }

    pub fn specialist_for(&self, role: Role) -> Option<&RosterSpecialist> {
        self.roster.iter().find(|s| s.role == role)
    }

    /// The historically dominant role for the team's n-th pick (1-based)
    /// and its share of that slot's recorded picks.
    pub fn dominant_role(&self, order_within_side: usize) -> Option<(Role, f64)> {
        let slot = self.pick_slot_roles.get(order_within_side.checked_sub(1)?)?;
        let total: u32 = slot.values().sum();
        if total == 0 {
            return None;
        }
        // HashMap iteration order is arbitrary; break count ties by role
        // order so repeated calls agree.
        let (role, count) = slot
            .iter()
            .max_by_key(|(role, count)| (**count, std::cmp::Reverse(**role)))?;
        Some((*role, *count as f64 / total as f64))
    }
}

/// One hero of a team's historical hero pool.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolUsage {
    pub picks: u32,
    pub wins: u32,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl PoolUsage {
    pub fn win_rate(&self) -> f64 {
        rate(self.wins, self.picks)
    }
}

/// Which heroes a team reaches for across its recorded games.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroPoolStats {
    pub team: TeamName,
    pub games: u32,
    #[serde(default)]
    pub heroes: HashMap<HeroId, PoolUsage>,
}

impl HeroPoolStats {
    pub fn usage(&self, hero: &HeroId) -> Option<&PoolUsage> {
        self.heroes.get(hero)
    }

    /// Heroes the team has played in two or more distinct roles.
    pub fn flex_heroes(&self) -> Vec<(&HeroId, &PoolUsage)> {
        let mut flex: Vec<_> = self
            .heroes
            .iter()
            .filter(|(_, usage)| usage.roles.len() >= 2)
            .collect();
        flex.sort_by_key(|(id, usage)| (std::cmp::Reverse(usage.picks), (*id).clone()));
        flex
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchupEntry {
    pub hero: HeroId,
    pub opponent: HeroId,
    /// P(hero beats opponent), percent scale.
    pub win_rate: f64,
}

/// Directional matchup win rates. Entries are sparse: the data layer only
/// records pairs with enough games behind them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<MatchupEntry>", into = "Vec<MatchupEntry>")]
pub struct MatchupTable {
    index: HashMap<(HeroId, HeroId), f64>,
}

impl MatchupTable {
    pub fn win_rate(&self, hero: &HeroId, opponent: &HeroId) -> Option<f64> {
        self.index.get(&(hero.clone(), opponent.clone())).copied()
    }

    /// Matchup edge over the 50% baseline; negative when losing.
    pub fn advantage(&self, hero: &HeroId, opponent: &HeroId) -> Option<f64> {
        self.win_rate(hero, opponent).map(|wr| wr - 50.0)
    }

    /// All recorded attackers into `opponent` with their win rates.
    pub fn threats_against<'a>(
        &'a self,
        opponent: &'a HeroId,
    ) -> impl Iterator<Item = (&'a HeroId, f64)> + 'a {
        self.index
            .iter()
            .filter(move |((_, o), _)| o == opponent)
            .map(|((h, _), wr)| (h, *wr))
    }
}

impl From<Vec<MatchupEntry>> for MatchupTable {
    fn from(entries: Vec<MatchupEntry>) -> Self {
        MatchupTable {
            index: entries
                .into_iter()
                .map(|e| ((e.hero, e.opponent), e.win_rate))
                .collect(),
        }
    }
}

impl From<MatchupTable> for Vec<MatchupEntry> {
    fn from(table: MatchupTable) -> Self {
        table
            .index
            .into_iter()
            .map(|((hero, opponent), win_rate)| MatchupEntry {
                hero,
                opponent,
                win_rate,
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynergyEntry {
    pub first: HeroId,
    pub second: HeroId,
    pub win_rate: f64,
}

/// Known strong ally combos; unordered pairs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<SynergyEntry>", into = "Vec<SynergyEntry>")]
pub struct SynergyTable {
    index: HashMap<(HeroId, HeroId), f64>,
}

fn ordered(a: HeroId, b: HeroId) -> (HeroId, HeroId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl SynergyTable {
    pub fn win_rate(&self, a: &HeroId, b: &HeroId) -> Option<f64> {
        self.index.get(&ordered(a.clone(), b.clone())).copied()
    }

    pub fn lists(&self, a: &HeroId, b: &HeroId) -> bool {
        self.win_rate(a, b).is_some()
    }
}

impl From<Vec<SynergyEntry>> for SynergyTable {
    fn from(entries: Vec<SynergyEntry>) -> Self {
        SynergyTable {
            index: entries
                .into_iter()
                .map(|e| (ordered(e.first, e.second), e.win_rate))
                .collect(),
        }
    }
}

impl From<SynergyTable> for Vec<SynergyEntry> {
    fn from(table: SynergyTable) -> Self {
        table
            .index
            .into_iter()
            .map(|((first, second), win_rate)| SynergyEntry {
                first,
                second,
                win_rate,
            })
            .collect()
    }
}

/// One earlier game of the match series, used to derive cross-game
/// exclusions (a team does not replay heroes it already used).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesGame {
    pub blue_team: TeamName,
    pub red_team: TeamName,
    pub blue_picks: Vec<HeroId>,
    pub red_picks: Vec<HeroId>,
}

pub fn global_bans_for(team: &TeamName, prior_games: &[SeriesGame]) -> Vec<HeroId> {
    let mut bans = Vec::new();
    for game in prior_games {
        let picks = if &game.blue_team == team {
            &game.blue_picks
        } else if &game.red_team == team {
            &game.red_picks
        } else {
            continue;
        };
        for hero in picks {
            if !bans.contains(hero) {
                bans.push(hero.clone());
            }
        }
    }
    bans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_rates_handle_empty_denominators() {
        let usage = HeroUsage::default();
        assert_eq!(usage.win_rate(), 0.0);
        let usage = HeroUsage {
            picks: 4,
            wins: 3,
            ..Default::default()
        };
        assert_eq!(usage.win_rate(), 75.0);
    }

    #[test]
    fn dominant_role_share() {
        let stats = TeamStats {
            pick_slot_roles: vec![
                HashMap::from([(Role::Jungle, 6), (Role::Mid, 2)]),
                HashMap::new(),
            ],
            ..Default::default()
        };
        let (role, share) = stats.dominant_role(1).unwrap();
        assert_eq!(role, Role::Jungle);
        assert_eq!(share, 0.75);
        assert!(stats.dominant_role(2).is_none());
        assert!(stats.dominant_role(5).is_none());
    }

    #[test]
    fn matchup_lookup_is_directional() {
        let table = MatchupTable::from(vec![MatchupEntry {
            hero: HeroId::from("Airi"),
            opponent: HeroId::from("Thane"),
            win_rate: 58.0,
        }]);
        assert_eq!(
            table.advantage(&HeroId::from("Airi"), &HeroId::from("Thane")),
            Some(8.0)
        );
        assert_eq!(
            table.advantage(&HeroId::from("Thane"), &HeroId::from("Airi")),
            None
        );
    }

    #[test]
    fn synergy_lookup_is_symmetric() {
        let table = SynergyTable::from(vec![SynergyEntry {
            first: HeroId::from("Tulen"),
            second: HeroId::from("Alice"),
            win_rate: 56.0,
        }]);
        assert!(table.lists(&HeroId::from("Alice"), &HeroId::from("Tulen")));
        assert!(table.lists(&HeroId::from("Tulen"), &HeroId::from("Alice")));
        assert!(!table.lists(&HeroId::from("Tulen"), &HeroId::from("Thane")));
    }

    #[test]
    fn global_bans_collect_only_own_prior_picks() {
        let team = TeamName::from("Saigon Phantom");
        let games = vec![SeriesGame {
            blue_team: team.clone(),
            red_team: TeamName::from("V Gaming"),
            blue_picks: vec![HeroId::from("Florentino"), HeroId::from("Krixi")],
            red_picks: vec![HeroId::from("Violet")],
        }];
        assert_eq!(
            global_bans_for(&team, &games),
            vec![HeroId::from("Florentino"), HeroId::from("Krixi")]
        );
        assert!(global_bans_for(&TeamName::from("Unknown"), &games).is_empty());
    }
}
