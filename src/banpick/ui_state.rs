use banpick_model::draft::{DraftState, DraftStep};
use banpick_model::suggestion::SuggestionSet;
use banpick_model::Side;
use serde::Serialize;

/// Snapshot handed to the presentation layer after every handled message.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub draft: DraftState,
    pub current_step: Option<DraftStep>,
    /// Surfaced (already truncated) suggestion lists per side.
    pub blue_suggestions: SuggestionSet,
    pub red_suggestions: SuggestionSet,
    /// External data still in flight; consumers must not act on partial
    /// results.
    pub loading: bool,
    pub warning: Option<String>,
    pub analysis_modes: Vec<String>,
    pub active_mode: String,
    pub bot_side: Option<Side>,
    pub bot_thinking: bool,
}
