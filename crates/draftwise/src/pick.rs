use banpick_model::analysis::AnalysisLayer;
use banpick_model::hero::{Hero, Role};
use banpick_model::suggestion::ScoreReason;
use banpick_model::ActionType;

use crate::tuning::*;
use crate::{ScoreEnv, ScoreInput};

/// The additive pick-phase contribution catalogue for one candidate.
pub(crate) fn contributions(
    input: &ScoreInput,
    env: &ScoreEnv,
    hero: &Hero,
) -> (f64, Vec<ScoreReason>) {
    let mut reasons: Vec<ScoreReason> = Vec::new();
    let mut add = |label: String, delta: f64| {
        if delta != 0.0 {
            reasons.push(ScoreReason::new(label, delta));
        }
    };
    let w = |layer| input.mode.weight(layer);
    let stats = env.patch_stats(hero);

    // base meta term
    let meta_w = w(AnalysisLayer::Meta);
    if meta_w > 0.0 && stats.win_rate > 0.0 {
        add(
            format!("patch win rate {:.1}%", stats.win_rate),
            stats.win_rate * META_BASE_SCALE * meta_w,
        );
    }

    role_fit(input, env, hero, &mut add);
    risk_exposure(input, env, hero, &mut add);

    // matchup edges against every present enemy hero
    let counter_w = w(AnalysisLayer::Counter);
    if counter_w > 0.0 {
        for enemy in input.enemy_picks {
            if let Some(adv) = input.matchups.advantage(&hero.id, enemy) {
                add(
                    format!("counters {enemy} ({:+.1})", adv),
                    adv * COUNTER_SCALE * counter_w,
                );
            }
            if let Some(adv) = input.matchups.advantage(enemy, &hero.id) {
                if adv > 0.0 {
                    add(
                        format!("{enemy} counters this pick"),
                        -adv * COUNTER_SCALE * counter_w,
                    );
                }
            }
        }
    }

    let synergy_w = w(AnalysisLayer::Synergy);
    if synergy_w > 0.0 {
        for ally in input.ally_picks {
            if input.synergies.lists(&hero.id, ally) {
                add(format!("combo with {ally}"), SYNERGY_BONUS * synergy_w);
            }
        }
    }

    comfort(input, hero, &mut add);
    draft_order_pattern(input, hero, &mut add);

    if input.ctx.action == ActionType::Pick && input.ctx.sequence_slot <= 5 {
        first_pick_logic(input, hero, &mut add);
    }

    let total = reasons.iter().map(|r| r.delta).sum();
    (total, reasons)
}

/// Role-completeness term: while the ally side has open roles, a candidate
/// that cannot fill any of them takes an escalating penalty; one that does
/// may compound a roster-specialist bonus on top of the fit bonus.
fn role_fit(
    input: &ScoreInput,
    env: &ScoreEnv,
    hero: &Hero,
    add: &mut impl FnMut(String, f64),
) {
    if env.missing_ally.is_empty() {
        return;
    }
    let comp_w = input.mode.weight(AnalysisLayer::Composition);
    let fills: Vec<Role> = hero
        .main_position
        .iter()
        .copied()
        .filter(|r| env.missing_ally.contains(r))
        .collect();

    let Some(&fill_role) = fills.first() else {
        if comp_w > 0.0 {
            let penalty = ROLE_OVERLAP_BASE + ROLE_OVERLAP_PER_PICK * input.ally_picks.len() as f64;
            add(
                "no open role for this hero".to_string(),
                -penalty * comp_w,
            );
        }
        return;
    };

    if comp_w > 0.0 {
        add(format!("fills {fill_role}"), ROLE_FIT_BONUS * comp_w);
    }

    let roster_w = input.mode.weight(AnalysisLayer::Roster);
    let Some(ally_stats) = input.ally_stats else {
        return;
    };
    if roster_w > 0.0 {
        let specialist = fills.iter().find_map(|r| {
            ally_stats
                .specialist_for(*r)
                .filter(|s| s.signature_heroes.contains(&hero.id))
        });
        if let Some(specialist) = specialist {
            let usage = ally_stats.hero_usage(&hero.id);
            let experience = match usage.picks {
                20.. => 2.0,
                10..=19 => 1.5,
                5..=9 => 1.0,
                _ => 0.5,
            };
            let aggregate = match usage.win_rate() {
                wr if wr >= 55.0 => 2.0,
                wr if wr >= 52.0 => 1.0,
                wr if wr >= 50.0 => 0.5,
                _ => 0.0,
            };
            let bonus = SPECIALIST_BASE
                + experience
                + (specialist.role_win_rate - 50.0) * SPECIALIST_ROLE_WR_SCALE
                + aggregate;
            add(
                format!("signature {} pick for {}", specialist.role, specialist.player),
                bonus * roster_w,
            );
        }
    }
}

/// While the enemy still has an open role, picking into a hard counter
/// that could fill it is a liability.
fn risk_exposure(
    input: &ScoreInput,
    env: &ScoreEnv,
    hero: &Hero,
    add: &mut impl FnMut(String, f64),
) {
    let counter_w = input.mode.weight(AnalysisLayer::Counter);
    if counter_w == 0.0 || env.missing_enemy.is_empty() {
        return;
    }
    let mut worst: Option<(Role, f64)> = None;
    for &open_role in &env.missing_enemy {
        for filler in env.available.iter().filter(|h| h.plays(open_role)) {
            if let Some(wr) = input.matchups.win_rate(&hero.id, &filler.id) {
                if wr < HARD_COUNTER_WR && worst.map(|(_, w)| wr < w).unwrap_or(true) {
                    worst = Some((open_role, wr));
                }
            }
        }
    }
    if let Some((role, wr)) = worst {
        add(
            format!("hard counter can still fill enemy {role} ({wr:.0}%)"),
            -(HARD_COUNTER_WR - wr) * RISK_SCALE * counter_w,
        );
    }
}

fn comfort(input: &ScoreInput, hero: &Hero, add: &mut impl FnMut(String, f64)) {
    let Some(ally_stats) = input.ally_stats else {
        return;
    };
    let usage = ally_stats.hero_usage(&hero.id);

    let comfort_w = input.mode.weight(AnalysisLayer::Comfort);
    if comfort_w > 0.0 && usage.picks > 0 {
        let volume = match usage.picks {
            10.. => 2.0,
            5..=9 => 1.0,
            2..=4 => 0.5,
            _ => 0.2,
        };
        let delta = volume + (usage.win_rate() - 50.0) * COMFORT_WR_SCALE;
        add(
            format!(
                "team comfort: {} picks at {:.0}%",
                usage.picks,
                usage.win_rate()
            ),
            delta * comfort_w,
        );
    }

    let recent_w = input.mode.weight(AnalysisLayer::Recent);
    if recent_w > 0.0 && usage.recent_picks > 0 {
        add(
            format!("recent form {:.0}%", usage.recent_win_rate()),
            (usage.recent_win_rate() - 50.0) * RECENT_WR_SCALE * recent_w,
        );
    }
}

/// Bonus when the candidate's role matches what the team historically
/// drafts at this slot; penalty when the slot strongly belongs to a
/// different role.
fn draft_order_pattern(input: &ScoreInput, hero: &Hero, add: &mut impl FnMut(String, f64)) {
    let roster_w = input.mode.weight(AnalysisLayer::Roster);
    if roster_w == 0.0 {
        return;
    }
    let Some(ally_stats) = input.ally_stats else {
        return;
    };
    let Some((role, share)) = ally_stats.dominant_role(input.ctx.order_within_side) else {
        return;
    };
    if hero.plays(role) {
        add(
            format!("usual {role} slot ({:.0}% of drafts)", share * 100.0),
            (share * PATTERN_SCALE).max(PATTERN_FLOOR) * roster_w,
        );
    } else if share > PATTERN_MISMATCH_MIN_SHARE {
        add(
            format!("slot usually goes to {role}"),
            -share * PATTERN_SCALE * roster_w,
        );
    }
}

/// Extra signals that only matter on the draft's opening picks
/// (sequence slots 4 and 5).
fn first_pick_logic(input: &ScoreInput, hero: &Hero, add: &mut impl FnMut(String, f64)) {
    let comfort_w = input.mode.weight(AnalysisLayer::Comfort);
    if comfort_w > 0.0 {
        if let Some(ally_stats) = input.ally_stats {
            let usage = ally_stats.hero_usage(&hero.id);
            if usage.first_picks > 0 {
                let delta = (usage.first_pick_win_rate() - 50.0) * FIRST_PICK_WR_SCALE
                    + usage.first_picks.min(FIRST_PICK_VOLUME_CAP) as f64
                        * FIRST_PICK_VOLUME_SCALE;
                add(
                    format!("first-pick comfort ({} games)", usage.first_picks),
                    delta * comfort_w,
                );
            }
        }
    }

    let counter_w = input.mode.weight(AnalysisLayer::Counter);
    if counter_w == 0.0 {
        return;
    }

    // denying the opponent a proven high-volume hero
    if let Some(enemy_stats) = input.enemy_stats {
        let usage = enemy_stats.hero_usage(&hero.id);
        if usage.picks >= FP_DENY_MIN_PICKS && usage.win_rate() >= FP_DENY_MIN_WR {
            let delta = (usage.win_rate() - 50.0) * FP_DENY_WR_SCALE
                + usage.picks.min(FP_DENY_VOLUME_CAP) as f64 * FP_DENY_VOLUME_SCALE;
            add(
                format!("denies {} comfort pick", enemy_stats.team),
                delta * counter_w,
            );
        }
    }

    // how much of the opponent's pool this candidate individually beats
    if let Some(pool) = input.enemy_pool {
        let countered = pool
            .heroes
            .keys()
            .filter(|pool_hero| {
                input
                    .matchups
                    .advantage(&hero.id, pool_hero)
                    .map(|adv| adv >= FP_POOL_COUNTER_EDGE)
                    .unwrap_or(false)
            })
            .count();
        if countered > 0 {
            add(
                format!("counters {countered} enemy pool heroes"),
                countered as f64 * FP_POOL_COUNTER_BONUS * counter_w,
            );
        }
    }
}

/// Raw matchup edge vs the present enemy picks, for the counters category
/// list. Unweighted by layers: the category lists are single-signal views.
pub(crate) fn counter_edge(input: &ScoreInput, hero: &Hero) -> Option<(f64, Vec<ScoreReason>)> {
    let mut total = 0.0;
    let mut reasons = Vec::new();
    for enemy in input.enemy_picks {
        if let Some(adv) = input.matchups.advantage(&hero.id, enemy) {
            if adv > 0.0 {
                total += adv;
                reasons.push(ScoreReason::new(format!("counters {enemy} ({adv:+.1})"), adv));
            }
        }
    }
    (total > 0.0).then_some((total, reasons))
}

/// Known combos with already-picked allies, for the synergies category list.
pub(crate) fn synergy_edge(input: &ScoreInput, hero: &Hero) -> Option<(f64, Vec<ScoreReason>)> {
    let mut total = 0.0;
    let mut reasons = Vec::new();
    for ally in input.ally_picks {
        if let Some(wr) = input.synergies.win_rate(&hero.id, ally) {
            let edge = wr - 50.0;
            total += edge;
            reasons.push(ScoreReason::new(
                format!("combo with {ally} ({wr:.0}%)"),
                edge,
            ));
        }
    }
    (total > 0.0).then_some((total, reasons))
}

#[cfg(test)]
mod tests {
    use banpick_model::analysis::AnalysisMode;
    use banpick_model::hero::HeroDb;
    use banpick_model::stats::{HeroUsage, MatchupEntry, MatchupTable, RosterSpecialist, SynergyTable, TeamStats};
    use banpick_model::{ActionType, GameVersion, HeroId, Side, TeamName};

    use crate::tests::hero;
    use crate::{build_env, ScoreContext};

    use super::*;

    fn ctx(slot: usize, order: usize) -> ScoreContext {
        ScoreContext {
            side: Side::Blue,
            action: ActionType::Pick,
            order_within_side: order,
            sequence_slot: slot,
            team: TeamName::from("Saigon Phantom"),
        }
    }

    #[test]
    fn specialist_bonus_compounds_on_top_of_role_fit() {
        let db = HeroDb::new(vec![
            hero("Florentino", &[Role::DarkSlayer], 52.0),
            hero("Krixi", &[Role::Mid], 50.0),
        ]);
        let mut ally_stats = TeamStats {
            team: TeamName::from("Saigon Phantom"),
            games: 30,
            ..Default::default()
        };
        ally_stats.roster.push(RosterSpecialist {
            player: "Lai Bang".into(),
            role: Role::DarkSlayer,
            signature_heroes: vec![HeroId::from("Florentino")],
            games: 30,
            role_win_rate: 60.0,
        });
        ally_stats.heroes.insert(
            HeroId::from("Florentino"),
            HeroUsage {
                picks: 22,
                wins: 14,
                ..Default::default()
            },
        );

        let version = GameVersion::from("1.52");
        let mode = AnalysisMode::standard();
        let matchups = MatchupTable::default();
        let synergies = SynergyTable::default();
        let input = ScoreInput {
            version: &version,
            heroes: &db,
            ally_picks: &[],
            enemy_picks: &[],
            banned: &[],
            ally_global_bans: &[],
            ctx: ctx(4, 1),
            mode: &mode,
            ally_stats: Some(&ally_stats),
            enemy_stats: None,
            enemy_pool: None,
            matchups: &matchups,
            synergies: &synergies,
        };
        let env = build_env(&input);
        let flo = db.get(&HeroId::from("Florentino")).unwrap();
        let (_, reasons) = contributions(&input, &env, flo);
        assert!(reasons.iter().any(|r| r.label.starts_with("fills")));
        let bonus = reasons
            .iter()
            .find(|r| r.label.contains("signature"))
            .expect("specialist reason");
        // 2.0 base + 2.0 experience (22 picks) + 0.8 role wr edge
        // + 2.0 aggregate tier (63.6%)
        assert!((bonus.delta - 6.8).abs() < 1e-9);
    }

    #[test]
    fn risk_exposure_fires_only_below_hard_counter_threshold() {
        let db = HeroDb::new(vec![
            hero("Pick", &[Role::Mid], 50.0),
            hero("Lurker", &[Role::Jungle], 50.0),
        ]);
        let matchups = MatchupTable::from(vec![MatchupEntry {
            hero: HeroId::from("Pick"),
            opponent: HeroId::from("Lurker"),
            win_rate: 30.0,
        }]);
        let version = GameVersion::from("1.52");
        let mode = AnalysisMode::standard();
        let synergies = SynergyTable::default();
        let input = ScoreInput {
            version: &version,
            heroes: &db,
            ally_picks: &[],
            enemy_picks: &[],
            banned: &[],
            ally_global_bans: &[],
            ctx: ctx(4, 1),
            mode: &mode,
            ally_stats: None,
            enemy_stats: None,
            enemy_pool: None,
            matchups: &matchups,
            synergies: &synergies,
        };
        let env = build_env(&input);
        let pick = db.get(&HeroId::from("Pick")).unwrap();
        let (_, reasons) = contributions(&input, &env, pick);
        let risk = reasons
            .iter()
            .find(|r| r.label.contains("hard counter"))
            .expect("risk reason");
        assert!((risk.delta - (-(35.0 - 30.0) * 0.3)).abs() < 1e-9);
    }

    #[test]
    fn first_pick_logic_is_silent_after_the_opening() {
        let db = HeroDb::new(vec![hero("A", &[Role::Mid], 50.0)]);
        let mut enemy_stats = TeamStats::default();
        enemy_stats.heroes.insert(
            HeroId::from("A"),
            HeroUsage {
                picks: 10,
                wins: 7,
                ..Default::default()
            },
        );
        let version = GameVersion::from("1.52");
        let mode = AnalysisMode::standard();
        let matchups = MatchupTable::default();
        let synergies = SynergyTable::default();
        let mut input = ScoreInput {
            version: &version,
            heroes: &db,
            ally_picks: &[],
            enemy_picks: &[],
            banned: &[],
            ally_global_bans: &[],
            ctx: ctx(4, 1),
            mode: &mode,
            ally_stats: None,
            enemy_stats: Some(&enemy_stats),
            enemy_pool: None,
            matchups: &matchups,
            synergies: &synergies,
        };
        let env = build_env(&input);
        let a = db.get(&HeroId::from("A")).unwrap();
        let (_, reasons) = contributions(&input, &env, a);
        assert!(reasons.iter().any(|r| r.label.contains("denies")));

        input.ctx = ctx(7, 2);
        let env = build_env(&input);
        let (_, reasons) = contributions(&input, &env, a);
        assert!(!reasons.iter().any(|r| r.label.contains("denies")));
    }
}
