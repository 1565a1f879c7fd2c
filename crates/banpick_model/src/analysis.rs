use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The recognized scoring layers. Every contribution category in the
/// scorer is gated by exactly one of these.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnalysisLayer {
    Meta,
    Counter,
    Comfort,
    Roster,
    Ban,
    Composition,
    Synergy,
    Recent,
}

impl AnalysisLayer {
    pub const ALL: [AnalysisLayer; 8] = [
        AnalysisLayer::Meta,
        AnalysisLayer::Counter,
        AnalysisLayer::Comfort,
        AnalysisLayer::Roster,
        AnalysisLayer::Ban,
        AnalysisLayer::Composition,
        AnalysisLayer::Synergy,
        AnalysisLayer::Recent,
    ];

    pub fn id(self) -> &'static str {
        match self {
            AnalysisLayer::Meta => "meta",
            AnalysisLayer::Counter => "counter",
            AnalysisLayer::Comfort => "comfort",
            AnalysisLayer::Roster => "roster",
            AnalysisLayer::Ban => "ban",
            AnalysisLayer::Composition => "composition",
            AnalysisLayer::Synergy => "synergy",
            AnalysisLayer::Recent => "recent",
        }
    }

    pub fn default_display_name(self) -> &'static str {
        match self {
            AnalysisLayer::Meta => "Meta Strength",
            AnalysisLayer::Counter => "Counter Matchups",
            AnalysisLayer::Comfort => "Team Comfort",
            AnalysisLayer::Roster => "Roster Habits",
            AnalysisLayer::Ban => "Ban Pressure",
            AnalysisLayer::Composition => "Composition Fit",
            AnalysisLayer::Synergy => "Ally Synergy",
            AnalysisLayer::Recent => "Recent Form",
        }
    }
}

impl Display for AnalysisLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisLayerConfig {
    pub layer: AnalysisLayer,
    pub display_name: String,
    pub active: bool,
    pub weight: f64,
    pub priority: u32,
}

impl AnalysisLayerConfig {
    pub fn new(layer: AnalysisLayer, weight: f64, priority: u32) -> Self {
        AnalysisLayerConfig {
            layer,
            display_name: layer.default_display_name().to_string(),
            active: true,
            weight,
            priority,
        }
    }
}

/// A named weighting profile. Threaded into the scorer as an explicit
/// parameter; there is no ambient weight state anywhere.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMode {
    pub name: String,
    pub layers: Vec<AnalysisLayerConfig>,
}

impl AnalysisMode {
    /// Effective multiplier for a layer. Inactive, missing and
    /// negative-weight layers all contribute exactly zero.
    pub fn weight(&self, layer: AnalysisLayer) -> f64 {
        self.layers
            .iter()
            .find(|l| l.layer == layer)
            .filter(|l| l.active && l.weight > 0.0)
            .map(|l| l.weight)
            .unwrap_or(0.0)
    }

    pub fn is_enabled(&self, layer: AnalysisLayer) -> bool {
        self.weight(layer) > 0.0
    }

    fn uniform(name: &str, weight_of: impl Fn(AnalysisLayer) -> f64) -> Self {
        AnalysisMode {
            name: name.to_string(),
            layers: AnalysisLayer::ALL
                .iter()
                .enumerate()
                .map(|(i, &l)| AnalysisLayerConfig::new(l, weight_of(l), i as u32))
                .collect(),
        }
    }

    pub fn standard() -> Self {
        Self::uniform("Standard", |_| 1.0)
    }

    pub fn counter_focus() -> Self {
        Self::uniform("Counter Focus", |l| match l {
            AnalysisLayer::Counter => 1.6,
            AnalysisLayer::Meta => 0.7,
            AnalysisLayer::Synergy => 1.2,
            _ => 1.0,
        })
    }

    pub fn comfort_focus() -> Self {
        Self::uniform("Comfort Focus", |l| match l {
            AnalysisLayer::Comfort => 1.6,
            AnalysisLayer::Roster => 1.4,
            AnalysisLayer::Recent => 1.3,
            AnalysisLayer::Counter => 0.7,
            _ => 1.0,
        })
    }

    pub fn builtin() -> Vec<AnalysisMode> {
        vec![
            Self::standard(),
            Self::counter_focus(),
            Self::comfort_focus(),
        ]
    }

    /// Built-in modes plus user profiles; a user profile with a built-in
    /// name replaces the built-in.
    pub fn merge_with_builtin(custom: Vec<AnalysisMode>) -> Vec<AnalysisMode> {
        let mut modes = Self::builtin();
        for mode in custom {
            match modes.iter_mut().find(|m| m.name == mode.name) {
                Some(slot) => *slot = mode,
                None => modes.push(mode),
            }
        }
        modes
    }
}

impl Default for AnalysisMode {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_and_zero_weight_layers_contribute_nothing() {
        let mut mode = AnalysisMode::standard();
        mode.layers[0].active = false; // meta
        mode.layers[1].weight = 0.0; // counter
        assert_eq!(mode.weight(AnalysisLayer::Meta), 0.0);
        assert_eq!(mode.weight(AnalysisLayer::Counter), 0.0);
        assert_eq!(mode.weight(AnalysisLayer::Comfort), 1.0);
    }

    #[test]
    fn missing_layer_defaults_to_zero() {
        let mode = AnalysisMode {
            name: "Sparse".into(),
            layers: vec![AnalysisLayerConfig::new(AnalysisLayer::Meta, 1.0, 0)],
        };
        assert_eq!(mode.weight(AnalysisLayer::Synergy), 0.0);
        assert!(mode.is_enabled(AnalysisLayer::Meta));
    }

    #[test]
    fn custom_profile_replaces_builtin_with_same_name() {
        let custom = AnalysisMode {
            name: "Standard".into(),
            layers: vec![AnalysisLayerConfig::new(AnalysisLayer::Meta, 2.0, 0)],
        };
        let merged = AnalysisMode::merge_with_builtin(vec![custom]);
        assert_eq!(merged.len(), AnalysisMode::builtin().len());
        let standard = merged.iter().find(|m| m.name == "Standard").unwrap();
        assert_eq!(standard.weight(AnalysisLayer::Meta), 2.0);
        assert_eq!(standard.weight(AnalysisLayer::Counter), 0.0);
    }
}
