use banpick_model::analysis::AnalysisLayer;
use banpick_model::hero::Hero;
use banpick_model::suggestion::ScoreReason;
use banpick_model::DraftPhase;

use crate::tuning::*;
use crate::{ScoreEnv, ScoreInput};

/// The additive ban-phase contribution catalogue for one candidate.
/// Phase-1 signals apply in both ban rounds; the protect/deny bonuses are
/// phase-2 only and require the candidate to still have a role open on
/// the enemy side — banning a hero the enemy has no slot for denies
/// nothing.
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
    let phase = input.ctx.phase();

    let ban_w = w(AnalysisLayer::Ban);
    if ban_w > 0.0 && stats.ban_rate > 0.0 {
        add(
            format!("global ban rate {:.1}%", stats.ban_rate),
            stats.ban_rate * BAN_RATE_SCALE * ban_w,
        );
    }

    let meta_w = w(AnalysisLayer::Meta);
    if meta_w > 0.0 {
        let tier = match stats.win_rate {
            wr if wr >= BAN_META_TIER_HIGH_WR => BAN_META_TIER_HIGH,
            wr if wr >= BAN_META_TIER_MID_WR => BAN_META_TIER_MID,
            _ => 0.0,
        };
        if tier > 0.0 {
            add(
                format!("meta tier ({:.1}% win rate)", stats.win_rate),
                tier * meta_w,
            );
        }
    }

    // the emulated team's own ban habits, per slot and per sub-phase
    if ban_w > 0.0 {
        if let Some(usage) = input.ally_stats.and_then(|s| s.ban_usage(&hero.id)) {
            let at_slot = usage.at_slot(input.ctx.sequence_slot);
            if at_slot > 0 {
                add(
                    format!("banned here {at_slot} times before"),
                    at_slot as f64 * BAN_SLOT_SCALE * ban_w,
                );
            }
            let in_phase = match phase {
                DraftPhase::Phase1 => usage.opening,
                DraftPhase::Phase2 => usage.closing,
            };
            if in_phase > 0 {
                add(
                    format!("{in_phase} bans this phase historically"),
                    in_phase as f64 * BAN_PHASE_SCALE * ban_w,
                );
            }
        }
    }

    let roster_w = w(AnalysisLayer::Roster);
    if roster_w > 0.0 {
        if let Some(enemy_stats) = input.enemy_stats {
            if enemy_stats.mvp_hero.as_ref() == Some(&hero.id) {
                add("enemy MVP hero".to_string(), MVP_BAN_BONUS * roster_w);
            }
        }
    }

    if ban_w > 0.0 {
        if let Some(usage) = input.enemy_pool.and_then(|p| p.usage(&hero.id)) {
            if usage.picks > 0 {
                add(
                    format!("in enemy pool ({} picks)", usage.picks),
                    (usage.picks as f64 * POOL_FREQ_SCALE).min(POOL_FREQ_CAP) * ban_w,
                );
            }
        }
    }

    if phase == DraftPhase::Phase2 {
        closing_bonuses(input, env, hero, &mut add);
    }

    let total = reasons.iter().map(|r| r.delta).sum();
    (total, reasons)
}

fn closing_bonuses(
    input: &ScoreInput,
    env: &ScoreEnv,
    hero: &Hero,
    add: &mut impl FnMut(String, f64),
) {
    // mandatory role restriction for both closing bonuses
    let fills_open_enemy_role = hero
        .main_position
        .iter()
        .any(|r| env.missing_enemy.contains(r));
    if !fills_open_enemy_role {
        return;
    }

    // protect: the candidate historically beats a hero we already locked
    let counter_w = input.mode.weight(AnalysisLayer::Counter);
    if counter_w > 0.0 {
        for ally in input.ally_picks {
            if let Some(wr) = input.matchups.win_rate(&hero.id, ally) {
                if wr > 50.0 {
                    add(
                        format!("protect: threatens our {ally} ({wr:.0}%)"),
                        (wr - 50.0) * PROTECT_SCALE * counter_w,
                    );
                }
            }
        }
    }

    // deny: the enemy plays this hero often and wins with it
    let ban_w = input.mode.weight(AnalysisLayer::Ban);
    if ban_w > 0.0 {
        if let Some(enemy_stats) = input.enemy_stats {
            let usage = enemy_stats.hero_usage(&hero.id);
            if usage.picks >= DENY_MIN_PICKS && usage.win_rate() > 50.0 {
                let delta = usage.picks.min(DENY_VOLUME_CAP) as f64 * DENY_VOLUME_SCALE
                    + (usage.win_rate() - 50.0) * DENY_WR_SCALE;
                add(
                    format!(
                        "deny: {} is {}-{} on this hero",
                        enemy_stats.team,
                        usage.wins,
                        usage.picks - usage.wins
                    ),
                    delta * ban_w,
                );
            }
        }
    }
}
