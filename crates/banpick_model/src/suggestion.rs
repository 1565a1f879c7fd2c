use serde::{Deserialize, Serialize};

use crate::{DraftPhase, HeroId};

/// One scoring contribution, kept for explainability. The UI joins the
/// labels of all contributions into the suggestion's reason line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReason {
    pub label: String,
    pub delta: f64,
}

impl ScoreReason {
    pub fn new(label: impl Into<String>, delta: f64) -> Self {
        ScoreReason {
            label: label.into(),
            delta,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SuggestionKind {
    Counter,
    Comfort,
    Meta,
    Hybrid,
    Ban,
    History,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub hero: HeroId,
    pub score: f64,
    pub reasons: Vec<ScoreReason>,
    pub kind: SuggestionKind,
    pub phase: DraftPhase,
    /// Sequence slot this suggestion was computed for. Consumers compare
    /// it against the live draft to detect stale batches.
    pub step_index: Option<usize>,
}

impl Suggestion {
    pub fn reason_text(&self) -> String {
        self.reasons
            .iter()
            .map(|r| r.label.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Ranked candidate lists for one side and one upcoming action.
/// `hybrid` and `smart_ban` are the primary outputs; the category lists
/// are single-signal orderings surfaced alongside them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionSet {
    pub hybrid: Vec<Suggestion>,
    pub smart_ban: Vec<Suggestion>,
    pub meta: Vec<Suggestion>,
    pub counters: Vec<Suggestion>,
    pub synergies: Vec<Suggestion>,
    /// Non-fatal data problem (e.g. stats served from an older patch).
    pub warning: Option<String>,
}

impl SuggestionSet {
    pub fn truncated(&self, limit: usize) -> SuggestionSet {
        let cap = |list: &[Suggestion]| list.iter().take(limit).cloned().collect();
        SuggestionSet {
            hybrid: cap(&self.hybrid),
            smart_ban: cap(&self.smart_ban),
            meta: cap(&self.meta),
            counters: cap(&self.counters),
            synergies: cap(&self.synergies),
            warning: self.warning.clone(),
        }
    }
}
