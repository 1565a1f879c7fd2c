use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use banpick_model::analysis::AnalysisMode;
use banpick_model::draft::{DraftState, DraftStep, DRAFT_SEQUENCE};
use banpick_model::hero::HeroDb;
use banpick_model::stats::{HeroPoolStats, MatchupTable, SynergyTable, TeamStats};
use banpick_model::suggestion::SuggestionSet;
use banpick_model::{ActionType, GameVersion, HeroId, Side, TeamName};
use draftwise::{score, ScoreContext, ScoreInput};

/// Historical evidence for one drafting side.
#[derive(Clone, Debug)]
pub struct SideData {
    pub team: TeamName,
    pub stats: Option<TeamStats>,
    pub pool: Option<HeroPoolStats>,
    /// Heroes this team already played earlier in the series.
    pub global_bans: Vec<HeroId>,
}

/// The full advisory snapshot fetched from collaborators at session start.
/// Immutable once loaded; scoring reads it through shared references.
#[derive(Clone, Debug)]
pub struct ExternalData {
    pub version: GameVersion,
    pub heroes: HeroDb,
    pub blue: SideData,
    pub red: SideData,
    pub matchups: MatchupTable,
    pub synergies: SynergyTable,
}

impl ExternalData {
    pub fn side(&self, side: Side) -> &SideData {
        match side {
            Side::Blue => &self.blue,
            Side::Red => &self.red,
        }
    }
}

/// Identity of the draft position a suggestion batch was computed for.
/// Any change to the step, the picks or the bans produces a new key, and
/// a batch carrying a stale key is discarded, never merged.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecomputeKey(u64);

pub fn recompute_key(draft: &DraftState) -> RecomputeKey {
    let mut hasher = DefaultHasher::new();
    draft.step_index.hash(&mut hasher);
    draft.blue_picks.hash(&mut hasher);
    draft.red_picks.hash(&mut hasher);
    draft.blue_bans.hash(&mut hasher);
    draft.red_bans.hash(&mut hasher);
    RecomputeKey(hasher.finish())
}

#[derive(Clone, Debug)]
pub struct SuggestionBatch {
    pub key: RecomputeKey,
    /// Live step the batch was computed at; the bot refuses batches whose
    /// step no longer matches.
    pub step_index: usize,
    pub blue: SuggestionSet,
    pub red: SuggestionSet,
}

/// Each side's next step in the fixed sequence, if it still has one.
fn upcoming_step_for(draft: &DraftState, side: Side) -> Option<&'static DraftStep> {
    DRAFT_SEQUENCE[draft.step_index.min(DRAFT_SEQUENCE.len())..]
        .iter()
        .find(|s| s.side == side)
}

fn side_suggestions(data: &ExternalData, draft: &DraftState, mode: &AnalysisMode, side: Side) -> SuggestionSet {
    let Some(step) = upcoming_step_for(draft, side) else {
        // this side has no actions left; nothing to recommend
        return SuggestionSet::default();
    };
    let ally = data.side(side);
    let enemy = data.side(side.opponent());
    let ally_picks = draft.picks(side);
    let order_within_side = match step.action {
        ActionType::Pick => ally_picks.len() + 1,
        ActionType::Ban => draft.bans(side).len() + 1,
    };
    let banned: Vec<HeroId> = draft
        .bans(Side::Blue)
        .iter()
        .chain(draft.bans(Side::Red))
        .cloned()
        .collect();

    let input = ScoreInput {
        version: &data.version,
        heroes: &data.heroes,
        ally_picks,
        enemy_picks: draft.picks(side.opponent()),
        banned: &banned,
        ally_global_bans: &ally.global_bans,
        ctx: ScoreContext {
            side,
            action: step.action,
            order_within_side,
            sequence_slot: step.index,
            team: ally.team.clone(),
        },
        mode,
        ally_stats: ally.stats.as_ref(),
        enemy_stats: enemy.stats.as_ref(),
        enemy_pool: enemy.pool.as_ref(),
        matchups: &data.matchups,
        synergies: &data.synergies,
    };
    score(&input)
}

/// Ranks both sides' upcoming actions against the given draft position.
/// Pure computation; the caller decides whether the result is still fresh
/// when it arrives.
pub fn compute_batch(data: &ExternalData, draft: &DraftState, mode: &AnalysisMode) -> SuggestionBatch {
    SuggestionBatch {
        key: recompute_key(draft),
        step_index: draft.step_index,
        blue: side_suggestions(data, draft, mode, Side::Blue),
        red: side_suggestions(data, draft, mode, Side::Red),
    }
}
