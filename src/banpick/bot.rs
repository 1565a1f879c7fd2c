use anyhow::{bail, Result};
use banpick_model::draft::{DraftState, DraftStep, DRAFT_SEQUENCE};
use banpick_model::hero::{DamageType, Hero, Role};
use banpick_model::suggestion::SuggestionSet;
use banpick_model::{ActionType, HeroId, Side};
use draftwise::missing_roles;
use log::{debug, info};

use super::advisor::ExternalData;

/// Side-pick order (1-based) at which the side is expected to take its
/// counter pick: blue's third pick closes phase 1, red's fourth pick opens
/// phase 2 with full information.
fn counter_slot(side: Side) -> usize {
    match side {
        Side::Blue => 3,
        Side::Red => 4,
    }
}

const DENIAL_MIN_POOL_PICKS: u32 = 6;
const DENIAL_MIN_WIN_RATE: f64 = 58.0;
const COUNTER_TIMING_MIN_EDGE: f64 = 3.0;
const PROTECTION_BAN_MIN_WR: f64 = 55.0;
const FLEX_PICK_LIMIT: usize = 4;
const SCRIPTED_BAN_COUNT: usize = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CompArchetype {
    Teamfight,
    Dive,
    Poke,
    SplitPush,
}

#[derive(Clone, Debug)]
pub struct PlannedAction {
    pub step_index: usize,
    pub hero: HeroId,
}

/// The bot's pre-game script. Replaced wholesale whenever a backup
/// trigger fires; never patched in place.
#[derive(Clone, Debug)]
pub struct DraftPlan {
    pub archetype: CompArchetype,
    /// Absolute sequence slot of the designated key pick.
    pub key_pick_slot: usize,
    /// Versatile heroes worth taking early to hide the composition.
    pub flex_picks: Vec<HeroId>,
    pub scripted: Vec<PlannedAction>,
}

fn side_pick_steps(side: Side) -> impl Iterator<Item = &'static DraftStep> {
    DRAFT_SEQUENCE
        .iter()
        .filter(move |s| s.side == side && s.action == ActionType::Pick)
}

fn side_ban_steps(side: Side) -> impl Iterator<Item = &'static DraftStep> {
    DRAFT_SEQUENCE
        .iter()
        .filter(move |s| s.side == side && s.action == ActionType::Ban)
}

/// Builds a fresh plan from current hero-pool analysis. Deterministic for
/// a given data snapshot.
pub fn build_plan(side: Side, data: &ExternalData) -> DraftPlan {
    let side_data = data.side(side);

    let flex_picks: Vec<HeroId> = side_data
        .pool
        .as_ref()
        .map(|pool| {
            pool.flex_heroes()
                .into_iter()
                .take(FLEX_PICK_LIMIT)
                .map(|(id, _)| id.clone())
                .collect()
        })
        .unwrap_or_default();

    let archetype = pick_archetype(side, data);

    // key pick goes to the slot with the team's strongest drafting habit
    let key_order = side_data
        .stats
        .as_ref()
        .and_then(|stats| {
            (1..=5).max_by(|a, b| {
                let share = |o: &usize| {
                    stats
                        .dominant_role(*o)
                        .map(|(_, s)| s)
                        .unwrap_or(0.0)
                };
                share(a).partial_cmp(&share(b)).unwrap_or(std::cmp::Ordering::Equal)
            })
        })
        .unwrap_or(3);
    let key_pick_slot = side_pick_steps(side)
        .nth(key_order - 1)
        .map(|s| s.index)
        .unwrap_or(8);

    let mut scripted = Vec::new();
    // opening bans follow the raw ban-rate meta
    let mut by_ban_rate: Vec<&Hero> = data.heroes.all().collect();
    by_ban_rate.sort_by(|a, b| {
        let rate = |h: &Hero| {
            h.stats_at_or_before(&data.version)
                .map(|(_, s)| s.ban_rate)
                .unwrap_or(0.0)
        };
        rate(b).partial_cmp(&rate(a)).unwrap_or(std::cmp::Ordering::Equal)
    });
    for (step, hero) in side_ban_steps(side).zip(by_ban_rate.iter().take(SCRIPTED_BAN_COUNT)) {
        scripted.push(PlannedAction {
            step_index: step.index,
            hero: hero.id.clone(),
        });
    }
    // the key pick targets the team's proven best hero
    if let Some(stats) = side_data.stats.as_ref() {
        let mut proven: Vec<_> = stats
            .heroes
            .iter()
            .filter(|(_, usage)| usage.picks >= 3)
            .collect();
        proven.sort_by(|(ida, a), (idb, b)| {
            b.win_rate()
                .partial_cmp(&a.win_rate())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| ida.cmp(idb))
        });
        if let Some((hero, _)) = proven.first() {
            scripted.push(PlannedAction {
                step_index: key_pick_slot,
                hero: (*hero).clone(),
            });
        }
    }

    info!(
        "{side} bot plan: {archetype:?}, key pick at step {key_pick_slot}, {} flex heroes",
        flex_picks.len()
    );
    DraftPlan {
        archetype,
        key_pick_slot,
        flex_picks,
        scripted,
    }
}

/// Rough composition identity from the damage profile of the team's most
/// played heroes.
fn pick_archetype(side: Side, data: &ExternalData) -> CompArchetype {
    let Some(pool) = data.side(side).pool.as_ref() else {
        return CompArchetype::Teamfight;
    };
    let mut top: Vec<_> = pool.heroes.iter().collect();
    top.sort_by_key(|(id, usage)| (std::cmp::Reverse(usage.picks), (*id).clone()));
    let mut magical = 0usize;
    let mut physical = 0usize;
    let mut junglers = 0usize;
    for (id, _) in top.iter().take(8) {
        let Some(hero) = data.heroes.get(id) else {
            continue;
        };
        match hero.damage_type {
            DamageType::Magical => magical += 1,
            DamageType::Physical => physical += 1,
            DamageType::Mixed => {}
        }
        if hero.plays(Role::Jungle) {
            junglers += 1;
        }
    }
    if magical > physical {
        CompArchetype::Poke
    } else if junglers >= 3 {
        CompArchetype::Dive
    } else if physical > magical {
        CompArchetype::SplitPush
    } else {
        CompArchetype::Teamfight
    }
}

/// A backup trigger: the plan is dead once any still-pending scripted hero
/// has been taken off the board, or every flex pick is gone.
pub fn plan_invalidated(plan: &DraftPlan, draft: &DraftState) -> bool {
    let pending_scripted_gone = plan
        .scripted
        .iter()
        .any(|p| p.step_index >= draft.step_index && draft.is_used(&p.hero));
    let flex_exhausted =
        !plan.flex_picks.is_empty() && plan.flex_picks.iter().all(|h| draft.is_used(h));
    pending_scripted_gone || flex_exhausted
}

/// Everything one bot decision reads. `suggestions` is this side's fresh
/// set, or None when the advisor is degraded or stale.
pub struct BotTurn<'a> {
    pub side: Side,
    pub draft: &'a DraftState,
    pub data: &'a ExternalData,
    pub suggestions: Option<&'a SuggestionSet>,
    pub plan: Option<&'a DraftPlan>,
}

#[derive(Clone, Debug)]
pub struct BotDecision {
    pub hero: HeroId,
    pub strategy: &'static str,
}

impl BotTurn<'_> {
    fn available(&self, hero: &HeroId) -> bool {
        !self.draft.is_used(hero)
    }

    fn my_picks(&self) -> &[HeroId] {
        self.draft.picks(self.side)
    }

    fn patch_win_rate(&self, hero: &Hero) -> f64 {
        hero.stats_at_or_before(&self.data.version)
            .map(|(_, s)| s.win_rate)
            .unwrap_or(0.0)
    }

    fn patch_ban_rate(&self, hero: &Hero) -> f64 {
        hero.stats_at_or_before(&self.data.version)
            .map(|(_, s)| s.ban_rate)
            .unwrap_or(0.0)
    }
}

/// Walks the strict strategy priority list and returns the single hero to
/// act on. The first strategy that yields wins; strategies are never
/// combined. Selecting an already-used hero is an internal error the
/// caller must treat as fatal to the action.
pub fn decide(turn: &BotTurn) -> Result<BotDecision> {
    let Some(step) = turn.draft.current_step() else {
        bail!("bot asked to act on a finished draft");
    };
    if step.side != turn.side {
        bail!("bot asked to act out of turn (step {})", step.index);
    }

    let strategies: [(&'static str, fn(&BotTurn, &DraftStep) -> Option<HeroId>); 7] = [
        ("denial pick", denial_pick),
        ("follow advisor", follow_advisor),
        ("flex pick", flex_pick),
        ("counter-pick timing", counter_pick_timing),
        ("protection ban", protection_ban),
        ("follow plan", follow_plan),
        ("internal heuristic", internal_heuristic),
    ];

    for (strategy, f) in strategies {
        if let Some(hero) = f(turn, step) {
            if turn.draft.is_used(&hero) {
                bail!("bot strategy '{strategy}' selected already-used hero {hero}");
            }
            debug!("{} bot: '{strategy}' -> {hero}", turn.side);
            return Ok(BotDecision { hero, strategy });
        }
    }
    bail!("no bot strategy produced a hero (empty catalogue?)");
}

/// 1. Pre-emptively take a hero the opponent leans on hard, while it is
/// still on the board. Only worth a slot in the bot's first three picks.
fn denial_pick(turn: &BotTurn, step: &DraftStep) -> Option<HeroId> {
    if step.action != ActionType::Pick || turn.my_picks().len() >= 3 {
        return None;
    }
    let pool = turn.data.side(turn.side.opponent()).pool.as_ref()?;
    let mut threats: Vec<_> = pool
        .heroes
        .iter()
        .filter(|(id, usage)| {
            usage.picks >= DENIAL_MIN_POOL_PICKS
                && usage.win_rate() >= DENIAL_MIN_WIN_RATE
                && turn.available(id)
        })
        .collect();
    threats.sort_by(|(ida, a), (idb, b)| {
        b.win_rate()
            .partial_cmp(&a.win_rate())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.picks.cmp(&a.picks))
            .then_with(|| ida.cmp(idb))
    });
    threats.first().map(|(id, _)| (*id).clone())
}

/// 2. Take the advisor's word. For picks, prefer the highest-ranked
/// candidate that fills a role the team still misses before falling back
/// to the plain top of the list.
fn follow_advisor(turn: &BotTurn, step: &DraftStep) -> Option<HeroId> {
    let suggestions = turn.suggestions?;
    match step.action {
        ActionType::Ban => suggestions
            .smart_ban
            .iter()
            .find(|s| turn.available(&s.hero))
            .map(|s| s.hero.clone()),
        ActionType::Pick => {
            let missing = missing_roles(turn.my_picks(), &turn.data.heroes);
            let fills_missing = |hero: &HeroId| {
                turn.data
                    .heroes
                    .roles_of(hero)
                    .iter()
                    .any(|r| missing.contains(r))
            };
            suggestions
                .hybrid
                .iter()
                .find(|s| turn.available(&s.hero) && fills_missing(&s.hero))
                .or_else(|| suggestions.hybrid.iter().find(|s| turn.available(&s.hero)))
                .map(|s| s.hero.clone())
        }
    }
}

/// 3. Early flex pick from the plan to keep the composition hidden.
fn flex_pick(turn: &BotTurn, step: &DraftStep) -> Option<HeroId> {
    if step.action != ActionType::Pick || turn.my_picks().len() >= 2 {
        return None;
    }
    turn.plan?
        .flex_picks
        .iter()
        .find(|h| turn.available(h))
        .cloned()
}

/// 4. On the designated counter slot, reach into the matchup table for the
/// strongest available answer to what the enemy has shown.
fn counter_pick_timing(turn: &BotTurn, step: &DraftStep) -> Option<HeroId> {
    if step.action != ActionType::Pick {
        return None;
    }
    if turn.my_picks().len() + 1 != counter_slot(turn.side) {
        return None;
    }
    let enemy_picks = turn.draft.picks(turn.side.opponent());
    if enemy_picks.is_empty() {
        return None;
    }
    let mut best: Option<(f64, &HeroId)> = None;
    for hero in turn.data.heroes.all() {
        if !turn.available(&hero.id) {
            continue;
        }
        let edge: f64 = enemy_picks
            .iter()
            .filter_map(|e| turn.data.matchups.advantage(&hero.id, e))
            .filter(|adv| *adv > 0.0)
            .sum();
        if edge >= COUNTER_TIMING_MIN_EDGE && best.map(|(b, _)| edge > b).unwrap_or(true) {
            best = Some((edge, &hero.id));
        }
    }
    best.map(|(_, id)| id.clone())
}

/// 5. Late bans shield the key hero: remove whatever beats the bot's most
/// recent pick hardest.
fn protection_ban(turn: &BotTurn, step: &DraftStep) -> Option<HeroId> {
    if step.action != ActionType::Ban {
        return None;
    }
    let ban_number = turn.draft.bans(turn.side).len() + 1;
    if !(3..=4).contains(&ban_number) {
        return None;
    }
    let key_hero = turn.my_picks().last()?;
    let mut threats: Vec<(HeroId, f64)> = turn
        .data
        .matchups
        .threats_against(key_hero)
        .filter(|(hero, wr)| *wr >= PROTECTION_BAN_MIN_WR && turn.available(hero))
        .map(|(hero, wr)| (hero.clone(), wr))
        .collect();
    threats.sort_by(|(ida, a), (idb, b)| {
        b.partial_cmp(a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| ida.cmp(idb))
    });
    threats.into_iter().next().map(|(hero, _)| hero)
}

/// 6. The scripted plan action for this exact step, if its hero is legal.
fn follow_plan(turn: &BotTurn, step: &DraftStep) -> Option<HeroId> {
    turn.plan?
        .scripted
        .iter()
        .find(|p| p.step_index == step.index && turn.available(&p.hero))
        .map(|p| p.hero.clone())
}

/// 7. Last resort, fully independent of the advisor: ban rate for bans,
/// win rate with missing-role priority for picks.
fn internal_heuristic(turn: &BotTurn, step: &DraftStep) -> Option<HeroId> {
    let available: Vec<&Hero> = turn
        .data
        .heroes
        .all()
        .filter(|h| turn.available(&h.id))
        .collect();
    match step.action {
        ActionType::Ban => available
            .iter()
            .max_by(|a, b| {
                turn.patch_ban_rate(a)
                    .partial_cmp(&turn.patch_ban_rate(b))
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| b.id.cmp(&a.id))
            })
            .map(|h| h.id.clone()),
        ActionType::Pick => {
            let missing = missing_roles(turn.my_picks(), &turn.data.heroes);
            let by_win_rate = |pool: &[&Hero]| {
                pool.iter()
                    .max_by(|a, b| {
                        turn.patch_win_rate(a)
                            .partial_cmp(&turn.patch_win_rate(b))
                            .unwrap_or(std::cmp::Ordering::Equal)
                            .then_with(|| b.id.cmp(&a.id))
                    })
                    .map(|h| h.id.clone())
            };
            let role_fillers: Vec<&Hero> = available
                .iter()
                .copied()
                .filter(|h| h.main_position.iter().any(|r| missing.contains(r)))
                .collect();
            by_win_rate(&role_fillers).or_else(|| by_win_rate(&available))
        }
    }
}
