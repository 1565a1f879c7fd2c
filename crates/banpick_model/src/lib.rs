use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod analysis;
pub mod draft;
pub mod hero;
pub mod stats;
pub mod suggestion;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Blue,
    Red,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Blue => Side::Red,
            Side::Red => Side::Blue,
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "blue" => Some(Side::Blue),
            "red" => Some(Side::Red),
            _ => None,
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Side::Blue => "Blue",
            Side::Red => "Red",
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionType {
    Ban,
    Pick,
}

impl Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ActionType::Ban => "Ban",
            ActionType::Pick => "Pick",
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftPhase {
    Phase1,
    Phase2,
}

impl Display for DraftPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DraftPhase::Phase1 => "Phase 1",
            DraftPhase::Phase2 => "Phase 2",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, PartialOrd, Ord, Hash, Default)]
pub struct HeroId(String);

impl HeroId {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<String> for HeroId {
    fn from(value: String) -> Self {
        HeroId(value)
    }
}

impl From<&str> for HeroId {
    fn from(value: &str) -> Self {
        HeroId(String::from(value))
    }
}

impl From<HeroId> for String {
    fn from(value: HeroId) -> Self {
        value.0
    }
}

impl Display for HeroId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, PartialOrd, Ord, Hash, Default)]
pub struct TeamName(String);

impl TeamName {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<String> for TeamName {
    fn from(value: String) -> Self {
        TeamName(value)
    }
}

impl From<&str> for TeamName {
    fn from(value: &str) -> Self {
        TeamName(String::from(value))
    }
}

impl Display for TeamName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Game balance patch identifier. Ordering is plain lexicographic which is
/// sufficient for the zero-padded version labels the data layer produces
/// (e.g. "1.52.1").
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, PartialOrd, Ord, Hash, Default)]
pub struct GameVersion(String);

impl GameVersion {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<String> for GameVersion {
    fn from(value: String) -> Self {
        GameVersion(value)
    }
}

impl From<&str> for GameVersion {
    fn from(value: &str) -> Self {
        GameVersion(String::from(value))
    }
}

impl Display for GameVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Error, Debug)]
#[error("Invalid value: {0}")]
pub struct FromStrError(String);

impl TryFrom<&str> for Side {
    type Error = FromStrError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Side::from_str(value).ok_or_else(|| FromStrError(value.to_string()))
    }
}
