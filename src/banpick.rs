use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use banpick_model::analysis::AnalysisMode;
use banpick_model::draft::DraftState;
use banpick_model::suggestion::SuggestionSet;
use banpick_model::{HeroId, Side};
use draftwise::tuning::SURFACED_LIMIT;
use futures_util::stream::{StreamExt as _, TryStreamExt as _};
use log::{debug, error, info, warn};
use rand::Rng as _;
use tokio::task::JoinHandle;

use crate::utils::{print_err, ResultExt as _};
use advisor::{compute_batch, recompute_key, ExternalData, SuggestionBatch};
use bot::{BotTurn, DraftPlan};
use config::Config;
use message_bus::{Event, Message, MessageBus, MessageBusSubscription, UiCommand};
use ui_state::UiState;

pub(crate) mod advisor;
pub(crate) mod bot;
pub(crate) mod config;
pub(crate) mod data_source;
pub(crate) mod message_bus;
pub(crate) mod store;
pub(crate) mod ui_state;

/// Owns all mutable session state and consumes bus messages one at a
/// time. Every pick/ban mutation funnels through `lock_in` here.
pub struct BanPick {
    config: Config,
    draft: DraftState,
    modes: Vec<AnalysisMode>,
    active_mode: usize,
    data: Option<Arc<ExternalData>>,
    suggestions: Option<SuggestionBatch>,
    loading: bool,
    warning: Option<String>,
    bot_side: Option<Side>,
    plan: Option<DraftPlan>,
    bot_task: Option<JoinHandle<()>>,
    bot_pending: bool,
    message_bus: MessageBus,
}

impl BanPick {
    pub fn new(config: Config, custom_modes: Vec<AnalysisMode>, message_bus: MessageBus) -> Self {
        let draft = DraftState::new(config.timers());
        let modes = AnalysisMode::merge_with_builtin(custom_modes);
        BanPick {
            bot_side: config.bot_side,
            config,
            draft,
            modes,
            active_mode: 0,
            data: None,
            suggestions: None,
            loading: true,
            warning: None,
            plan: None,
            bot_task: None,
            bot_pending: false,
            message_bus,
        }
    }

    pub fn dispatch_ui_command(&mut self, ui_command: UiCommand) {
        match ui_command {
            UiCommand::InitializeUi => {}
            UiCommand::LockIn(hero) => self.manual_lock_in(hero),
            UiCommand::TogglePause => self.toggle_pause(),
            UiCommand::Undo => self.undo(),
            UiCommand::SelectAnalysisMode(name) => self.select_analysis_mode(&name),
            UiCommand::SetBotSide(side) => self.set_bot_side(side),
            UiCommand::CloseApplication => {
                self.cancel_bot();
                store::store_config(&self.config)
                    .context("Failed to store config")
                    .print_err();
                info!("Session closed at step {}", self.draft.step_index);
            }
        }
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::TimerTick => self.draft.tick(),
            Event::DataLoaded(data) => self.on_data_loaded(data),
            Event::DataFailed(e) => self.on_data_failed(e),
            Event::SuggestionsReady(batch) => self.on_suggestions_ready(*batch),
            Event::BotThinkFinished { step_index } => self.on_bot_think_finished(step_index),
        }
    }

    /// Consumes commands and events until CloseApplication, emitting a
    /// fresh UI snapshot after every handled message. The subscription is
    /// created by the caller so that no startup event can slip past.
    pub async fn dispatch_messages(
        mut self,
        subscription: MessageBusSubscription,
        message_bus: MessageBus,
    ) {
        let mut stream = subscription.stream().boxed();
        loop {
            match stream.try_next().await {
                Ok(Some(Message::UiCommand(command @ UiCommand::CloseApplication))) => {
                    self.dispatch_ui_command(command);
                    break;
                }
                Ok(Some(Message::UiCommand(command))) => {
                    self.dispatch_ui_command(command);
                }
                Ok(Some(Message::Event(event))) => {
                    self.handle_event(event);
                }
                Ok(Some(Message::UiUpdate(_))) => {
                    // our own snapshots echoing back; never re-emit
                    continue;
                }
                Ok(None) => {
                    break;
                }
                Err(e) => {
                    print_err(&e);
                    break;
                }
            }
            message_bus.send(self.ui_state().into())
        }
    }

    pub fn ui_state(&self) -> UiState {
        let surfaced = |set: Option<&SuggestionSet>| {
            set.map(|s| s.truncated(SURFACED_LIMIT)).unwrap_or_default()
        };
        let fresh = self.fresh_suggestions();
        UiState {
            draft: self.draft.clone(),
            current_step: self.draft.current_step().copied(),
            blue_suggestions: surfaced(fresh.map(|b| &b.blue)),
            red_suggestions: surfaced(fresh.map(|b| &b.red)),
            loading: self.loading,
            warning: self.warning.clone(),
            analysis_modes: self.modes.iter().map(|m| m.name.clone()).collect(),
            active_mode: self.mode().name.clone(),
            bot_side: self.bot_side,
            bot_thinking: self.bot_pending,
        }
    }

    fn mode(&self) -> &AnalysisMode {
        &self.modes[self.active_mode]
    }

    /// The stored batch, only while it matches the live draft position.
    fn fresh_suggestions(&self) -> Option<&SuggestionBatch> {
        self.suggestions
            .as_ref()
            .filter(|b| b.key == recompute_key(&self.draft))
    }

    fn manual_lock_in(&mut self, hero: HeroId) {
        if self.draft.is_finished {
            debug!("lock_in ignored: draft finished");
            return;
        }
        self.apply_lock_in(hero);
    }

    /// Shared lock-in tail: advance the draft, drop the now-stale bot
    /// task, re-check the plan, kick off a recomputation.
    fn apply_lock_in(&mut self, hero: HeroId) {
        self.cancel_bot();
        self.draft.lock_in(hero);
        self.check_backup_trigger();
        self.refresh_suggestions();
    }

    fn toggle_pause(&mut self) {
        self.draft.toggle_pause();
        if self.draft.is_paused {
            self.cancel_bot();
        } else {
            self.maybe_schedule_bot();
        }
    }

    fn undo(&mut self) {
        self.cancel_bot();
        self.draft.undo();
        self.refresh_suggestions();
    }

    fn select_analysis_mode(&mut self, name: &str) {
        match self.modes.iter().position(|m| m.name == name) {
            Some(idx) => {
                info!("Analysis mode: {name}");
                self.active_mode = idx;
                self.refresh_suggestions();
            }
            None => warn!("Unknown analysis mode: {name}"),
        }
    }

    fn set_bot_side(&mut self, side: Option<Side>) {
        info!("Bot side: {side:?}");
        self.cancel_bot();
        self.bot_side = side;
        self.plan = None;
        self.ensure_plan();
        self.maybe_schedule_bot();
    }

    fn on_data_loaded(&mut self, data: Arc<ExternalData>) {
        info!(
            "External data loaded: {} heroes, patch {}",
            data.heroes.len(),
            data.version
        );
        self.loading = false;
        self.warning = None;
        self.data = Some(data);
        self.ensure_plan();
        self.refresh_suggestions();
    }

    /// Advisory subsystems degrade to "no suggestions"; the draft itself
    /// keeps running on manual input.
    fn on_data_failed(&mut self, e: String) {
        error!("External data fetch failed: {e}");
        self.loading = false;
        self.suggestions = None;
        self.warning = Some(e);
    }

    fn on_suggestions_ready(&mut self, batch: SuggestionBatch) {
        if batch.key != recompute_key(&self.draft) {
            debug!(
                "Discarding stale suggestions for step {}",
                batch.step_index
            );
            return;
        }
        self.warning = batch
            .blue
            .warning
            .clone()
            .or_else(|| batch.red.warning.clone());
        self.suggestions = Some(batch);
        self.maybe_schedule_bot();
    }

    fn refresh_suggestions(&mut self) {
        let Some(data) = self.data.clone() else {
            return;
        };
        let draft = self.draft.clone();
        let mode = self.mode().clone();
        let message_bus = self.message_bus.clone();
        tokio::spawn(async move {
            let batch = compute_batch(&data, &draft, &mode);
            message_bus.send(Message::Event(Event::SuggestionsReady(Box::new(batch))));
        });
    }

    fn ensure_plan(&mut self) {
        let (Some(side), Some(data)) = (self.bot_side, self.data.as_ref()) else {
            return;
        };
        if self.plan.is_none() {
            self.plan = Some(bot::build_plan(side, data));
        }
    }

    fn check_backup_trigger(&mut self) {
        let (Some(plan), Some(side), Some(data)) =
            (self.plan.as_ref(), self.bot_side, self.data.as_ref())
        else {
            return;
        };
        if bot::plan_invalidated(plan, &self.draft) {
            info!("Backup trigger fired; rebuilding {side} bot plan");
            self.plan = Some(bot::build_plan(side, data));
        }
    }

    /// Spawns the per-turn deliberation task when every precondition
    /// holds: it is the bot's unpaused turn, data is in, suggestions are
    /// fresh for the live step, and no deliberation is already running.
    fn maybe_schedule_bot(&mut self) {
        let Some(side) = self.bot_side else {
            return;
        };
        let Some(step) = self.draft.current_step() else {
            return;
        };
        if step.side != side || self.draft.is_paused || self.bot_pending {
            return;
        }
        if self.data.is_none() || self.fresh_suggestions().is_none() {
            // keep waiting; the next SuggestionsReady re-checks
            return;
        }

        let step_index = self.draft.step_index;
        let delay_ms = rand::thread_rng()
            .gen_range(self.config.bot_think_min_ms..=self.config.bot_think_max_ms.max(self.config.bot_think_min_ms));
        debug!("{side} bot deliberating {delay_ms}ms at step {step_index}");
        self.bot_pending = true;
        let message_bus = self.message_bus.clone();
        self.bot_task = Some(tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
            message_bus.send(Message::Event(Event::BotThinkFinished { step_index }));
        }));
    }

    fn on_bot_think_finished(&mut self, step_index: usize) {
        self.bot_pending = false;
        if step_index != self.draft.step_index {
            debug!("Dropping bot action planned for stale step {step_index}");
            return;
        }
        if self.draft.is_paused || self.draft.is_finished {
            return;
        }
        match self.bot_decision() {
            Ok(hero) => self.apply_lock_in(hero),
            // fatal to the action only: the draft state stays untouched
            Err(e) => error!("Bot action aborted: {e:#}"),
        }
    }

    fn bot_decision(&self) -> Result<HeroId> {
        let Some(side) = self.bot_side else {
            bail!("bot disabled mid-deliberation");
        };
        let Some(data) = self.data.as_ref() else {
            bail!("external data disappeared");
        };
        let suggestions = self.fresh_suggestions().map(|b| match side {
            Side::Blue => &b.blue,
            Side::Red => &b.red,
        });
        let turn = BotTurn {
            side,
            draft: &self.draft,
            data,
            suggestions,
            plan: self.plan.as_ref(),
        };
        let decision = bot::decide(&turn)?;
        if self.draft.is_used(&decision.hero) {
            bail!(
                "bot decision {} duplicates a drafted hero",
                decision.hero
            );
        }
        info!(
            "{side} bot locks {} via '{}'",
            decision.hero, decision.strategy
        );
        Ok(decision.hero)
    }

    fn cancel_bot(&mut self) {
        if let Some(task) = self.bot_task.take() {
            task.abort();
        }
        self.bot_pending = false;
    }
}

#[cfg(test)]
mod tests {
    use banpick_model::ActionType;

    use super::advisor::test_support::external_data;
    use super::*;

    fn worker_with_data() -> BanPick {
        let mut worker = BanPick::new(
            Config::default(),
            Vec::new(),
            MessageBus::new(),
        );
        worker.loading = false;
        worker.data = Some(Arc::new(external_data()));
        worker
    }

    fn fresh_batch(worker: &BanPick) -> SuggestionBatch {
        compute_batch(
            worker.data.as_ref().unwrap(),
            &worker.draft,
            worker.mode(),
        )
    }

    #[tokio::test]
    async fn stale_suggestion_batches_are_discarded() {
        let mut worker = worker_with_data();
        let stale = fresh_batch(&worker);
        worker.draft.lock_in(HeroId::from("Slayer1"));
        worker.on_suggestions_ready(stale);
        assert!(worker.suggestions.is_none());

        let fresh = fresh_batch(&worker);
        worker.on_suggestions_ready(fresh);
        assert!(worker.fresh_suggestions().is_some());
    }

    #[tokio::test]
    async fn lock_in_after_finish_is_a_no_op() {
        let mut worker = worker_with_data();
        let ids: Vec<HeroId> = worker
            .data
            .as_ref()
            .unwrap()
            .heroes
            .all()
            .map(|h| h.id.clone())
            .collect();
        for hero in ids.into_iter().take(18) {
            worker.draft.lock_in(hero);
        }
        assert!(worker.draft.is_finished);
        let before = worker.draft.clone();
        worker.dispatch_ui_command(UiCommand::LockIn(HeroId::from("Roamer4")));
        assert_eq!(worker.draft, before);
    }

    #[tokio::test]
    async fn bot_waits_for_fresh_suggestions() {
        let mut worker = worker_with_data();
        worker.bot_side = Some(Side::Blue);
        worker.draft.toggle_pause(); // unpause; step 0 is blue's ban
        worker.maybe_schedule_bot();
        assert!(!worker.bot_pending); // nothing fresh yet

        let batch = fresh_batch(&worker);
        worker.on_suggestions_ready(batch);
        assert!(worker.bot_pending);
    }

    #[tokio::test]
    async fn bot_think_for_stale_step_is_dropped() {
        let mut worker = worker_with_data();
        worker.bot_side = Some(Side::Blue);
        worker.draft.toggle_pause();
        let batch = fresh_batch(&worker);
        worker.on_suggestions_ready(batch);
        assert!(worker.bot_pending);

        // the operator locks in manually before the bot wakes up
        worker.dispatch_ui_command(UiCommand::LockIn(HeroId::from("Slayer1")));
        let before = worker.draft.clone();
        worker.handle_event(Event::BotThinkFinished { step_index: 0 });
        assert_eq!(worker.draft, before);
    }

    #[tokio::test]
    async fn bot_locks_in_on_its_turn() {
        let mut worker = worker_with_data();
        worker.bot_side = Some(Side::Blue);
        worker.draft.toggle_pause();
        let batch = fresh_batch(&worker);
        worker.suggestions = Some(batch);
        worker.bot_pending = true;

        worker.on_bot_think_finished(0);
        assert_eq!(worker.draft.step_index, 1);
        assert_eq!(worker.draft.blue_bans.len(), 1);
        assert_eq!(
            worker.draft.current_step().unwrap().action,
            ActionType::Ban
        );
    }

    #[tokio::test]
    async fn data_failure_clears_suggestions_but_not_the_draft() {
        let mut worker = worker_with_data();
        let batch = fresh_batch(&worker);
        worker.on_suggestions_ready(batch);
        worker.draft.toggle_pause();
        worker.draft.lock_in(HeroId::from("Slayer1"));

        worker.handle_event(Event::DataFailed("connection refused".into()));
        assert!(worker.suggestions.is_none());
        assert_eq!(worker.warning.as_deref(), Some("connection refused"));
        assert_eq!(worker.draft.step_index, 1);
        assert!(!worker.draft.is_paused);
    }

    #[tokio::test]
    async fn undo_via_command_restores_previous_position() {
        let mut worker = worker_with_data();
        let before = worker.draft.clone();
        worker.dispatch_ui_command(UiCommand::LockIn(HeroId::from("Slayer1")));
        assert_eq!(worker.draft.step_index, 1);
        worker.dispatch_ui_command(UiCommand::Undo);
        assert_eq!(worker.draft, before);
    }

    #[tokio::test]
    async fn ui_state_surfaces_capped_lists() {
        let mut worker = worker_with_data();
        let batch = fresh_batch(&worker);
        worker.on_suggestions_ready(batch);
        let ui = worker.ui_state();
        assert!(ui.blue_suggestions.hybrid.len() <= SURFACED_LIMIT);
        assert!(ui.blue_suggestions.smart_ban.len() <= SURFACED_LIMIT);
        assert!(!ui.loading);
        assert_eq!(ui.active_mode, "Standard");
    }
}
