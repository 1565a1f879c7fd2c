use std::path::PathBuf;

use banpick_model::draft::TimerSettings;
use banpick_model::Side;
use serde::{Deserialize, Serialize};

use super::store;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Team whose drafting habits the blue side emulates.
    #[serde(default = "default_blue_team")]
    pub blue_team: String,

    #[serde(default = "default_red_team")]
    pub red_team: String,

    #[serde(default = "default_game_version")]
    pub game_version: String,

    /// Restricts historical team stats to one tournament when set.
    #[serde(default)]
    pub tournament: Option<String>,

    /// Match series id used to derive cross-game hero exclusions.
    #[serde(default)]
    pub match_id: Option<String>,

    #[serde(default = "default_ban_secs")]
    pub ban_secs: u32,

    #[serde(default = "default_pick_secs")]
    pub pick_secs: u32,

    /// Side played by the bot; None means both sides are manual.
    #[serde(default)]
    pub bot_side: Option<Side>,

    /// Simulated deliberation window before a bot action.
    #[serde(default = "default_bot_think_min_ms")]
    pub bot_think_min_ms: u64,

    #[serde(default = "default_bot_think_max_ms")]
    pub bot_think_max_ms: u64,

    #[serde(default = "default_data_source")]
    pub data_source: DataSourceConfig,

    #[serde(default = "default_serving_addr")]
    pub serving_addr: String,
}

fn default_blue_team() -> String {
    "Blue Team".into()
}

fn default_red_team() -> String {
    "Red Team".into()
}

fn default_game_version() -> String {
    "1.52".into()
}

fn default_ban_secs() -> u32 {
    30
}

fn default_pick_secs() -> u32 {
    60
}

fn default_bot_think_min_ms() -> u64 {
    1500
}

fn default_bot_think_max_ms() -> u64 {
    4000
}

fn default_data_source() -> DataSourceConfig {
    DataSourceConfig::Files {
        dir: store::data_dir().join("stats"),
    }
}

fn default_serving_addr() -> String {
    "0.0.0.0:3000".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            blue_team: default_blue_team(),
            red_team: default_red_team(),
            game_version: default_game_version(),
            tournament: None,
            match_id: None,
            ban_secs: default_ban_secs(),
            pick_secs: default_pick_secs(),
            bot_side: None,
            bot_think_min_ms: default_bot_think_min_ms(),
            bot_think_max_ms: default_bot_think_max_ms(),
            data_source: default_data_source(),
            serving_addr: default_serving_addr(),
        }
    }
}

impl Config {
    pub fn timers(&self) -> TimerSettings {
        TimerSettings {
            ban_secs: self.ban_secs,
            pick_secs: self.pick_secs,
        }
    }

    pub fn team_name(&self, side: Side) -> &str {
        match side {
            Side::Blue => &self.blue_team,
            Side::Red => &self.red_team,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(tag = "type")]
pub enum DataSourceConfig {
    /// Stats service reachable over HTTP.
    Http {
        base_url: String,
        #[serde(default = "default_http_timeout_ms")]
        timeout_ms: u64,
    },
    /// JSON snapshots in a local directory.
    Files { dir: PathBuf },
}

fn default_http_timeout_ms() -> u64 {
    5 * 1000
}
