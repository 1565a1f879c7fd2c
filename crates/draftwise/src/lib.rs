use banpick_model::analysis::AnalysisMode;
use banpick_model::draft::DRAFT_SEQUENCE;
use banpick_model::hero::{Hero, HeroDb, HeroStats, Role};
use banpick_model::stats::{HeroPoolStats, MatchupTable, SynergyTable, TeamStats};
use banpick_model::suggestion::{ScoreReason, Suggestion, SuggestionKind, SuggestionSet};
use banpick_model::{ActionType, DraftPhase, GameVersion, HeroId, Side, TeamName};
use itertools::Itertools as _;
use log::debug;

mod ban;
mod pick;
pub mod roles;
pub mod tuning;

pub use roles::{missing_roles, resolve_roles};

/// Where in the draft the scored action sits.
#[derive(Clone, Debug)]
pub struct ScoreContext {
    pub side: Side,
    pub action: ActionType,
    /// 1-based count of this side's picks (or bans) including the one
    /// being scored.
    pub order_within_side: usize,
    /// Absolute slot in the 18-step sequence.
    pub sequence_slot: usize,
    pub team: TeamName,
}

impl ScoreContext {
    pub fn phase(&self) -> DraftPhase {
        DRAFT_SEQUENCE
            .get(self.sequence_slot)
            .map(|s| s.phase)
            .unwrap_or(DraftPhase::Phase2)
    }
}

/// Everything one scoring call reads. All references; the engine owns no
/// state between calls and the weight profile arrives as a parameter.
pub struct ScoreInput<'a> {
    pub version: &'a GameVersion,
    pub heroes: &'a HeroDb,
    pub ally_picks: &'a [HeroId],
    pub enemy_picks: &'a [HeroId],
    pub banned: &'a [HeroId],
    /// Heroes the ally side already played earlier in the series.
    pub ally_global_bans: &'a [HeroId],
    pub ctx: ScoreContext,
    pub mode: &'a AnalysisMode,
    pub ally_stats: Option<&'a TeamStats>,
    pub enemy_stats: Option<&'a TeamStats>,
    pub enemy_pool: Option<&'a HeroPoolStats>,
    pub matchups: &'a MatchupTable,
    pub synergies: &'a SynergyTable,
}

/// Precomputed per-call facts shared by all contribution categories.
pub(crate) struct ScoreEnv<'a> {
    pub missing_ally: Vec<Role>,
    pub missing_enemy: Vec<Role>,
    /// Heroes not yet committed to either side's picks or bans.
    pub available: Vec<&'a Hero>,
    pub warning: Option<String>,
    stats_version: Option<GameVersion>,
}

impl ScoreEnv<'_> {
    /// Patch stats for a hero under the resolved fallback version; zeroes
    /// when the hero has no usable patch data at all.
    pub fn patch_stats(&self, hero: &Hero) -> HeroStats {
        self.stats_version
            .as_ref()
            .and_then(|v| hero.stats_at_or_before(v))
            .map(|(_, s)| *s)
            .unwrap_or_default()
    }
}

pub(crate) fn build_env<'a>(input: &ScoreInput<'a>) -> ScoreEnv<'a> {
    let used = input
        .ally_picks
        .iter()
        .chain(input.enemy_picks)
        .chain(input.banned)
        .collect_vec();
    let available = input
        .heroes
        .all()
        .filter(|h| !used.contains(&&h.id))
        .collect_vec();

    // Tiered stats fallback: the requested patch, else the most recent
    // earlier patch any hero has data for, else zeroes plus a warning.
    let newest_known = input
        .heroes
        .all()
        .filter_map(|h| h.stats_at_or_before(input.version))
        .map(|(v, _)| v.clone())
        .max();
    let warning = match &newest_known {
        Some(v) if v == input.version => None,
        Some(v) => Some(format!(
            "No stats for patch {}; using patch {}",
            input.version, v
        )),
        None => Some(format!(
            "No stats for patch {} or earlier; scoring without patch data",
            input.version
        )),
    };
    if let Some(w) = &warning {
        debug!("{w}");
    }

    ScoreEnv {
        missing_ally: missing_roles(input.ally_picks, input.heroes),
        missing_enemy: missing_roles(input.enemy_picks, input.heroes),
        available,
        warning,
        stats_version: newest_known,
    }
}

/// Ranks candidates for the upcoming pick and ban of `input.ctx.side`.
///
/// Scoring is additive: every applicable contribution appends a
/// human-readable reason and the suggestion's score is their sum. A layer
/// that is inactive or weighted zero in the mode contributes exactly zero.
/// The result is never empty unless the hero catalogue itself is.
pub fn score(input: &ScoreInput) -> SuggestionSet {
    let env = build_env(input);
    let phase = input.ctx.phase();
    let step_index = Some(input.ctx.sequence_slot);

    let suggestion = |hero: &Hero, kind, (total, reasons): (f64, Vec<ScoreReason>)| Suggestion {
        hero: hero.id.clone(),
        score: total,
        reasons,
        kind,
        phase,
        step_index,
    };

    let pick_candidates = env
        .available
        .iter()
        .copied()
        .filter(|h| !input.ally_global_bans.contains(&h.id));

    let mut hybrid: Vec<Suggestion> = pick_candidates
        .clone()
        .map(|h| suggestion(h, SuggestionKind::Hybrid, pick::contributions(input, &env, h)))
        .collect();
    rank(&mut hybrid);

    let mut smart_ban: Vec<Suggestion> = env
        .available
        .iter()
        .copied()
        .map(|h| suggestion(h, SuggestionKind::Ban, ban::contributions(input, &env, h)))
        .collect();
    rank(&mut smart_ban);

    // Single-signal category lists surfaced next to the primary rankings.
    let mut meta: Vec<Suggestion> = pick_candidates
        .clone()
        .map(|h| {
            let wr = env.patch_stats(h).win_rate;
            let reasons = vec![ScoreReason::new(format!("patch win rate {wr:.1}%"), wr)];
            suggestion(h, SuggestionKind::Meta, (wr, reasons))
        })
        .collect();
    rank(&mut meta);

    let mut counters: Vec<Suggestion> = pick_candidates
        .clone()
        .filter_map(|h| {
            let (total, reasons) = pick::counter_edge(input, h)?;
            Some(suggestion(h, SuggestionKind::Counter, (total, reasons)))
        })
        .collect();
    rank(&mut counters);

    let mut synergies: Vec<Suggestion> = pick_candidates
        .filter_map(|h| {
            let (total, reasons) = pick::synergy_edge(input, h)?;
            Some(suggestion(h, SuggestionKind::Comfort, (total, reasons)))
        })
        .collect();
    rank(&mut synergies);

    SuggestionSet {
        hybrid,
        smart_ban,
        meta,
        counters,
        synergies,
        warning: env.warning,
    }
}

/// Descending by score; the sort is stable so ties keep catalogue order.
fn rank(list: &mut Vec<Suggestion>) {
    list.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    list.truncate(tuning::RANKING_LIMIT);
}

#[cfg(test)]
mod tests {
    use banpick_model::analysis::{AnalysisLayer, AnalysisLayerConfig};
    use banpick_model::hero::{DamageType, PowerSpike};
    use banpick_model::stats::{HeroUsage, MatchupEntry};

    use super::*;

    pub(crate) fn hero(id: &str, roles: &[Role], win_rate: f64) -> Hero {
        let mut stats = std::collections::BTreeMap::new();
        stats.insert(
            GameVersion::from("1.52"),
            HeroStats {
                win_rate,
                pick_rate: 10.0,
                ban_rate: 5.0,
            },
        );
        Hero {
            id: HeroId::from(id),
            name: String::from(id),
            main_position: roles.to_vec(),
            damage_type: DamageType::Physical,
            power_spike: PowerSpike::Mid,
            stats,
        }
    }

    fn meta_only() -> AnalysisMode {
        AnalysisMode {
            name: "Meta Only".into(),
            layers: vec![AnalysisLayerConfig::new(AnalysisLayer::Meta, 1.0, 0)],
        }
    }

    fn pick_ctx(side: Side, order: usize, slot: usize) -> ScoreContext {
        ScoreContext {
            side,
            action: ActionType::Pick,
            order_within_side: order,
            sequence_slot: slot,
            team: TeamName::from("Saigon Phantom"),
        }
    }

    struct Fixture {
        db: HeroDb,
        version: GameVersion,
        matchups: MatchupTable,
        synergies: SynergyTable,
    }

    impl Fixture {
        fn new(heroes: Vec<Hero>) -> Self {
            Fixture {
                db: HeroDb::new(heroes),
                version: GameVersion::from("1.52"),
                matchups: MatchupTable::default(),
                synergies: SynergyTable::default(),
            }
        }

        fn input<'a>(
            &'a self,
            mode: &'a AnalysisMode,
            ctx: ScoreContext,
            ally: &'a [HeroId],
            enemy: &'a [HeroId],
            banned: &'a [HeroId],
        ) -> ScoreInput<'a> {
            ScoreInput {
                version: &self.version,
                heroes: &self.db,
                ally_picks: ally,
                enemy_picks: enemy,
                banned,
                ally_global_bans: &[],
                ctx,
                mode,
                ally_stats: None,
                enemy_stats: None,
                enemy_pool: None,
                matchups: &self.matchups,
                synergies: &self.synergies,
            }
        }
    }

    #[test]
    fn meta_only_mode_orders_by_win_rate() {
        let fixture = Fixture::new(vec![
            hero("A", &[Role::Mid], 48.0),
            hero("B", &[Role::Mid], 55.0),
            hero("C", &[Role::Mid], 51.0),
            hero("D", &[Role::Mid], 51.0), // tie with C, later in catalogue
        ]);
        let mode = meta_only();
        let out = score(&fixture.input(&mode, pick_ctx(Side::Blue, 1, 4), &[], &[], &[]));
        let order: Vec<&str> = out.hybrid.iter().map(|s| s.hero.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "D", "A"]);
    }

    #[test]
    fn used_heroes_never_appear() {
        let fixture = Fixture::new(vec![
            hero("A", &[Role::Mid], 50.0),
            hero("B", &[Role::Jungle], 50.0),
            hero("C", &[Role::Roam], 50.0),
        ]);
        let mode = AnalysisMode::standard();
        let ally = [HeroId::from("A")];
        let banned = [HeroId::from("B")];
        let out = score(&fixture.input(&mode, pick_ctx(Side::Blue, 2, 7), &ally, &[], &banned));
        for list in [&out.hybrid, &out.smart_ban, &out.meta] {
            assert!(list.iter().all(|s| s.hero.as_str() == "C"));
        }
    }

    #[test]
    fn global_bans_excluded_from_picks_but_not_bans() {
        let fixture = Fixture::new(vec![
            hero("A", &[Role::Mid], 50.0),
            hero("B", &[Role::Jungle], 50.0),
        ]);
        let mode = AnalysisMode::standard();
        let global = [HeroId::from("A")];
        let mut input = fixture.input(&mode, pick_ctx(Side::Blue, 1, 4), &[], &[], &[]);
        input.ally_global_bans = &global;
        let out = score(&input);
        assert!(out.hybrid.iter().all(|s| s.hero.as_str() != "A"));
        assert!(out.smart_ban.iter().any(|s| s.hero.as_str() == "A"));
    }

    #[test]
    fn role_overlap_candidate_is_penalized_not_rewarded() {
        // Ally covers Jungle and Mid; a candidate eligible only for those
        // two roles takes the overlap penalty.
        let fixture = Fixture::new(vec![
            hero("J", &[Role::Jungle], 50.0),
            hero("M", &[Role::Mid], 50.0),
            hero("Overlap", &[Role::Jungle, Role::Mid], 50.0),
            hero("Fresh", &[Role::Roam], 50.0),
        ]);
        let mode = AnalysisMode::standard();
        let ally = [HeroId::from("J"), HeroId::from("M")];
        let out = score(&fixture.input(&mode, pick_ctx(Side::Blue, 3, 8), &ally, &[], &[]));

        let find = |id: &str| out.hybrid.iter().find(|s| s.hero.as_str() == id).unwrap();
        let overlap = find("Overlap");
        let fresh = find("Fresh");
        assert!(overlap.score < fresh.score);
        // base 8.0 plus 2.0 per pick already made
        let penalty = overlap
            .reasons
            .iter()
            .find(|r| r.delta < 0.0)
            .expect("overlap penalty");
        assert_eq!(penalty.delta, -(8.0 + 2.0 * 2.0));
    }

    #[test]
    fn stats_fall_back_to_earlier_patch_with_warning() {
        let fixture = Fixture::new(vec![hero("A", &[Role::Mid], 52.0)]);
        let requested = GameVersion::from("1.53");
        let mode = meta_only();
        let mut input = fixture.input(&mode, pick_ctx(Side::Blue, 1, 4), &[], &[], &[]);
        input.version = &requested;
        let out = score(&input);
        assert_eq!(out.hybrid.len(), 1);
        assert!(out.hybrid[0].score > 0.0);
        assert_eq!(
            out.warning.as_deref(),
            Some("No stats for patch 1.53; using patch 1.52")
        );
    }

    #[test]
    fn no_stats_anywhere_still_ranks_with_warning() {
        let mut h = hero("A", &[Role::Mid], 52.0);
        h.stats.clear();
        let fixture = Fixture::new(vec![h]);
        let mode = AnalysisMode::standard();
        let out = score(&fixture.input(&mode, pick_ctx(Side::Blue, 1, 4), &[], &[], &[]));
        assert_eq!(out.hybrid.len(), 1);
        assert!(out.warning.unwrap().contains("without patch data"));
    }

    #[test]
    fn empty_catalogue_yields_empty_lists() {
        let fixture = Fixture::new(vec![]);
        let mode = AnalysisMode::standard();
        let out = score(&fixture.input(&mode, pick_ctx(Side::Blue, 1, 4), &[], &[], &[]));
        assert!(out.hybrid.is_empty());
        assert!(out.smart_ban.is_empty());
    }

    #[test]
    fn counter_layer_rewards_matchup_edges() {
        let mut fixture = Fixture::new(vec![
            hero("Strong", &[Role::Mid], 50.0),
            hero("Neutral", &[Role::Jungle], 50.0),
            hero("Enemy", &[Role::Roam], 50.0),
        ]);
        fixture.matchups = MatchupTable::from(vec![MatchupEntry {
            hero: HeroId::from("Strong"),
            opponent: HeroId::from("Enemy"),
            win_rate: 60.0,
        }]);
        let mode = AnalysisMode::standard();
        let enemy = [HeroId::from("Enemy")];
        let out = score(&fixture.input(&mode, pick_ctx(Side::Blue, 1, 4), &[], &enemy, &[]));
        let strong = out
            .hybrid
            .iter()
            .find(|s| s.hero.as_str() == "Strong")
            .unwrap();
        assert!(strong
            .reasons
            .iter()
            .any(|r| r.label.contains("counters Enemy")));
        assert_eq!(out.counters[0].hero.as_str(), "Strong");
    }

    #[test]
    fn phase2_ban_bonuses_require_an_open_enemy_role() {
        // Enemy already covers Mid; a phase-2 ban candidate that only
        // plays Mid gets no protect/deny bonus even with a comfort record.
        let fixture = Fixture::new(vec![
            hero("EnemyMid", &[Role::Mid], 50.0),
            hero("MidOnly", &[Role::Mid], 50.0),
            hero("Opens", &[Role::Jungle], 50.0),
        ]);
        let mut enemy_stats = TeamStats {
            team: TeamName::from("V Gaming"),
            games: 20,
            ..Default::default()
        };
        enemy_stats.heroes.insert(
            HeroId::from("MidOnly"),
            HeroUsage {
                picks: 10,
                wins: 8,
                ..Default::default()
            },
        );
        enemy_stats.heroes.insert(
            HeroId::from("Opens"),
            HeroUsage {
                picks: 10,
                wins: 8,
                ..Default::default()
            },
        );
        let mode = AnalysisMode::standard();
        let enemy = [HeroId::from("EnemyMid")];
        let ctx = ScoreContext {
            side: Side::Blue,
            action: ActionType::Ban,
            order_within_side: 3,
            sequence_slot: 11,
            team: TeamName::from("Saigon Phantom"),
        };
        let mut input = fixture.input(&mode, ctx, &[], &enemy, &[]);
        input.enemy_stats = Some(&enemy_stats);
        let out = score(&input);

        let find = |id: &str| out.smart_ban.iter().find(|s| s.hero.as_str() == id).unwrap();
        assert!(!find("MidOnly")
            .reasons
            .iter()
            .any(|r| r.label.contains("deny")));
        assert!(find("Opens").reasons.iter().any(|r| r.label.contains("deny")));
    }

    #[test]
    fn ranking_caps_hold() {
        let heroes: Vec<Hero> = (0..40)
            .map(|i| hero(&format!("H{i}"), &[Role::Mid], 50.0 + i as f64 * 0.1))
            .collect();
        let fixture = Fixture::new(heroes);
        let mode = AnalysisMode::standard();
        let out = score(&fixture.input(&mode, pick_ctx(Side::Blue, 1, 4), &[], &[], &[]));
        assert_eq!(out.hybrid.len(), tuning::RANKING_LIMIT);
        assert_eq!(out.smart_ban.len(), tuning::RANKING_LIMIT);
        assert_eq!(out.truncated(tuning::SURFACED_LIMIT).hybrid.len(), 8);
    }

    #[test]
    fn suggestions_carry_the_scored_step() {
        let fixture = Fixture::new(vec![hero("A", &[Role::Mid], 50.0)]);
        let mode = AnalysisMode::standard();
        let out = score(&fixture.input(&mode, pick_ctx(Side::Blue, 1, 4), &[], &[], &[]));
        assert_eq!(out.hybrid[0].step_index, Some(4));
        assert_eq!(out.hybrid[0].phase, DraftPhase::Phase1);
    }
}
