use serde::{Deserialize, Serialize};

use crate::{ActionType, DraftPhase, HeroId, Side};

/// One entry of the fixed turn order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftStep {
    pub index: usize,
    pub side: Side,
    pub action: ActionType,
    pub phase: DraftPhase,
    /// True when this is the second of two consecutive actions by the same
    /// side. Kept as a separate step rather than a count field: slot
    /// bookkeeping, timers and undo all assume one hero per step.
    pub continuation: bool,
}

const fn step(
    index: usize,
    side: Side,
    action: ActionType,
    phase: DraftPhase,
    continuation: bool,
) -> DraftStep {
    DraftStep {
        index,
        side,
        action,
        phase,
        continuation,
    }
}

/// The full 18-step tournament draft order: 4 phase-1 bans (alternating,
/// blue first), 6 phase-1 picks (B R R B B R), 4 phase-2 bans (red first),
/// 4 phase-2 picks (R B B R). Never changes at runtime.
pub static DRAFT_SEQUENCE: [DraftStep; 18] = {
    use ActionType::{Ban, Pick};
    use DraftPhase::{Phase1, Phase2};
    use Side::{Blue, Red};
    [
        step(0, Blue, Ban, Phase1, false),
        step(1, Red, Ban, Phase1, false),
        step(2, Blue, Ban, Phase1, false),
        step(3, Red, Ban, Phase1, false),
        step(4, Blue, Pick, Phase1, false),
        step(5, Red, Pick, Phase1, false),
        step(6, Red, Pick, Phase1, true),
        step(7, Blue, Pick, Phase1, false),
        step(8, Blue, Pick, Phase1, true),
        step(9, Red, Pick, Phase1, false),
        step(10, Red, Ban, Phase2, false),
        step(11, Blue, Ban, Phase2, false),
        step(12, Red, Ban, Phase2, false),
        step(13, Blue, Ban, Phase2, false),
        step(14, Red, Pick, Phase2, false),
        step(15, Blue, Pick, Phase2, false),
        step(16, Blue, Pick, Phase2, true),
        step(17, Red, Pick, Phase2, false),
    ]
};

/// Countdown durations per action type, captured from config when the
/// draft is created.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSettings {
    pub ban_secs: u32,
    pub pick_secs: u32,
}

impl Default for TimerSettings {
    fn default() -> Self {
        TimerSettings {
            ban_secs: 30,
            pick_secs: 60,
        }
    }
}

impl TimerSettings {
    pub fn duration_for(&self, action: ActionType) -> u32 {
        match action {
            ActionType::Ban => self.ban_secs,
            ActionType::Pick => self.pick_secs,
        }
    }
}

/// Everything lock_in snapshots for undo. The undo history itself is not
/// part of a snapshot; popping an entry restores the stack depth on its own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftSnapshot {
    step_index: usize,
    blue_picks: Vec<HeroId>,
    red_picks: Vec<HeroId>,
    blue_bans: Vec<HeroId>,
    red_bans: Vec<HeroId>,
    timer: u32,
    is_paused: bool,
    is_finished: bool,
}

/// Authoritative draft state. Mutated only through `lock_in`, `undo`,
/// `toggle_pause` and `tick`; everything else gets read-only snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftState {
    pub step_index: usize,
    /// Picks in arrival order; the slot index of a pick never changes once
    /// assigned.
    pub blue_picks: Vec<HeroId>,
    pub red_picks: Vec<HeroId>,
    pub blue_bans: Vec<HeroId>,
    pub red_bans: Vec<HeroId>,
    /// Seconds remaining for the current step. A purely presentational
    /// deadline: hitting zero never auto-locks.
    pub timer: u32,
    pub is_paused: bool,
    pub is_finished: bool,
    timers: TimerSettings,
    #[serde(skip)]
    history: Vec<DraftSnapshot>,
}

impl DraftState {
    /// Drafts start paused on the first ban with a full ban timer.
    pub fn new(timers: TimerSettings) -> Self {
        DraftState {
            step_index: 0,
            blue_picks: Vec::new(),
            red_picks: Vec::new(),
            blue_bans: Vec::new(),
            red_bans: Vec::new(),
            timer: timers.ban_secs,
            is_paused: true,
            is_finished: false,
            timers,
            history: Vec::new(),
        }
    }

    pub fn current_step(&self) -> Option<&'static DraftStep> {
        DRAFT_SEQUENCE.get(self.step_index)
    }

    pub fn picks(&self, side: Side) -> &[HeroId] {
        match side {
            Side::Blue => &self.blue_picks,
            Side::Red => &self.red_picks,
        }
    }

    pub fn bans(&self, side: Side) -> &[HeroId] {
        match side {
            Side::Blue => &self.blue_bans,
            Side::Red => &self.red_bans,
        }
    }

    /// All heroes already committed to the draft, either side, either list.
    pub fn used_heroes(&self) -> impl Iterator<Item = &HeroId> {
        self.blue_picks
            .iter()
            .chain(&self.red_picks)
            .chain(&self.blue_bans)
            .chain(&self.red_bans)
    }

    pub fn is_used(&self, hero: &HeroId) -> bool {
        self.used_heroes().any(|h| h == hero)
    }

    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    /// Records the current step's hero and advances the turn. A no-op when
    /// the draft is finished. Hero existence is the caller's concern.
    pub fn lock_in(&mut self, hero: HeroId) {
        let Some(step) = self.current_step() else {
            return;
        };
        let step = *step;
        self.history.push(self.snapshot());

        match (step.action, step.side) {
            (ActionType::Ban, Side::Blue) => self.blue_bans.push(hero),
            (ActionType::Ban, Side::Red) => self.red_bans.push(hero),
            // The target slot is the count of slots already filled; slots
            // are never reused or reordered.
            (ActionType::Pick, Side::Blue) => self.blue_picks.push(hero),
            (ActionType::Pick, Side::Red) => self.red_picks.push(hero),
        }

        self.step_index += 1;
        match DRAFT_SEQUENCE.get(self.step_index) {
            Some(next) => self.timer = self.timers.duration_for(next.action),
            None => {
                self.is_finished = true;
                self.timer = 0;
            }
        }
    }

    /// Restores the exact state from before the most recent lock_in,
    /// including the timer value. A no-op with an empty history.
    pub fn undo(&mut self) {
        if let Some(prev) = self.history.pop() {
            self.restore(prev);
        }
    }

    pub fn toggle_pause(&mut self) {
        self.is_paused = !self.is_paused;
    }

    /// One wall-clock second elapsed. Zero is a floor, not a trigger.
    pub fn tick(&mut self) {
        if !self.is_paused && !self.is_finished && self.timer > 0 {
            self.timer -= 1;
        }
    }

    fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot {
            step_index: self.step_index,
            blue_picks: self.blue_picks.clone(),
            red_picks: self.red_picks.clone(),
            blue_bans: self.blue_bans.clone(),
            red_bans: self.red_bans.clone(),
            timer: self.timer,
            is_paused: self.is_paused,
            is_finished: self.is_finished,
        }
    }

    fn restore(&mut self, snap: DraftSnapshot) {
        self.step_index = snap.step_index;
        self.blue_picks = snap.blue_picks;
        self.red_picks = snap.red_picks;
        self.blue_bans = snap.blue_bans;
        self.red_bans = snap.red_bans;
        self.timer = snap.timer;
        self.is_paused = snap.is_paused;
        self.is_finished = snap.is_finished;
    }
}

impl Default for DraftState {
    fn default() -> Self {
        DraftState::new(TimerSettings::default())
    }
}
