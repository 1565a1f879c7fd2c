use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, Result};
use banpick_model::hero::Hero;
use banpick_model::stats::{
    global_bans_for, HeroPoolStats, MatchupTable, SeriesGame, SynergyTable, TeamStats,
};
use banpick_model::{GameVersion, TeamName};
use log::{debug, info};
use serde::Serialize;

use super::advisor::{ExternalData, SideData};
use super::config::{Config, DataSourceConfig};

/// Read-only contract towards the persistence/collaborator layer. All
/// calls may take arbitrary wall-clock time; consumers show a loading
/// state until the full snapshot has arrived.
pub trait DataSource {
    async fn fetch_heroes(&self, version: &GameVersion) -> Result<Vec<Hero>>;
    async fn fetch_prior_games(&self, match_id: &str) -> Result<Vec<SeriesGame>>;
    async fn fetch_team_stats(
        &self,
        team: &TeamName,
        tournament: Option<&str>,
    ) -> Result<TeamStats>;
    async fn fetch_matchups(&self, version: &GameVersion) -> Result<MatchupTable>;
    async fn fetch_synergies(&self, version: &GameVersion) -> Result<SynergyTable>;
    async fn fetch_hero_pool(&self, team: &TeamName) -> Result<HeroPoolStats>;
}

/// Gathers the full advisory snapshot. The hero catalogue is mandatory;
/// every other fetch degrades to "no data" so the draft itself can always
/// continue manually.
pub async fn load_external_data(source: &impl DataSource, config: &Config) -> Result<ExternalData> {
    let version = GameVersion::from(config.game_version.clone());
    let heroes = source
        .fetch_heroes(&version)
        .await
        .context("Fetching hero catalogue")?;
    info!("Loaded {} heroes for patch {version}", heroes.len());

    let matchups = source
        .fetch_matchups(&version)
        .await
        .context("Fetching matchup table")
        .inspect_err(crate::utils::print_err)
        .unwrap_or_default();
    let synergies = source
        .fetch_synergies(&version)
        .await
        .context("Fetching synergy table")
        .inspect_err(crate::utils::print_err)
        .unwrap_or_default();

    let prior_games = match &config.match_id {
        Some(match_id) => source
            .fetch_prior_games(match_id)
            .await
            .context("Fetching prior series games")
            .inspect_err(crate::utils::print_err)
            .unwrap_or_default(),
        None => Vec::new(),
    };

    let side_data = |team: TeamName,
                     stats: Option<TeamStats>,
                     pool: Option<HeroPoolStats>,
                     prior: &[SeriesGame]| SideData {
        global_bans: global_bans_for(&team, prior),
        team,
        stats,
        pool,
    };

    let blue_team = TeamName::from(config.blue_team.clone());
    let red_team = TeamName::from(config.red_team.clone());
    let tournament = config.tournament.as_deref();

    let stamp = |mut stats: TeamStats| {
        stats.fetched_at.get_or_insert_with(chrono::Local::now);
        stats
    };
    let blue_stats = fetch_optional(source.fetch_team_stats(&blue_team, tournament).await).map(stamp);
    let red_stats = fetch_optional(source.fetch_team_stats(&red_team, tournament).await).map(stamp);
    let blue_pool = fetch_optional(source.fetch_hero_pool(&blue_team).await);
    let red_pool = fetch_optional(source.fetch_hero_pool(&red_team).await);

    Ok(ExternalData {
        version,
        heroes: banpick_model::hero::HeroDb::new(heroes),
        blue: side_data(blue_team, blue_stats, blue_pool, &prior_games),
        red: side_data(red_team, red_stats, red_pool, &prior_games),
        matchups,
        synergies,
    })
}

fn fetch_optional<T>(result: Result<T>) -> Option<T> {
    result.inspect_err(crate::utils::print_err).ok()
}

pub struct HttpDataSource {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct VersionQuery<'a> {
    version: &'a str,
}

#[derive(Serialize)]
struct TeamQuery<'a> {
    team: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tournament: Option<&'a str>,
}

#[derive(Serialize)]
struct MatchQuery<'a> {
    match_id: &'a str,
}

impl HttpDataSource {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        HttpDataSource {
            client: reqwest::Client::new(),
            base_url,
            timeout,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &impl Serialize,
    ) -> Result<T> {
        let url = format!(
            "http://{}/{}?{}",
            self.base_url,
            path,
            serde_urlencoded::to_string(query)?
        );
        debug!("GET {url}");
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

impl DataSource for HttpDataSource {
    async fn fetch_heroes(&self, version: &GameVersion) -> Result<Vec<Hero>> {
        self.get_json(
            "heroes",
            &VersionQuery {
                version: version.as_str(),
            },
        )
        .await
    }

    async fn fetch_prior_games(&self, match_id: &str) -> Result<Vec<SeriesGame>> {
        self.get_json("series_games", &MatchQuery { match_id }).await
    }

    async fn fetch_team_stats(
        &self,
        team: &TeamName,
        tournament: Option<&str>,
    ) -> Result<TeamStats> {
        self.get_json(
            "team_stats",
            &TeamQuery {
                team: team.as_str(),
                tournament,
            },
        )
        .await
    }

    async fn fetch_matchups(&self, version: &GameVersion) -> Result<MatchupTable> {
        self.get_json(
            "matchups",
            &VersionQuery {
                version: version.as_str(),
            },
        )
        .await
    }

    async fn fetch_synergies(&self, version: &GameVersion) -> Result<SynergyTable> {
        self.get_json(
            "synergies",
            &VersionQuery {
                version: version.as_str(),
            },
        )
        .await
    }

    async fn fetch_hero_pool(&self, team: &TeamName) -> Result<HeroPoolStats> {
        self.get_json(
            "hero_pool",
            &TeamQuery {
                team: team.as_str(),
                tournament: None,
            },
        )
        .await
    }
}

/// JSON snapshots in a local directory; what the offline workflow and the
/// tests use.
pub struct FileDataSource {
    dir: PathBuf,
}

impl FileDataSource {
    pub fn new(dir: PathBuf) -> Self {
        FileDataSource { dir }
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, filename: &str) -> Result<T> {
        let path = self.dir.join(filename);
        let file = std::fs::File::open(&path)
            .with_context(|| format!("Cannot open {}", path.to_string_lossy()))?;
        Ok(serde_json::from_reader(file)?)
    }

    fn team_file(prefix: &str, team: &TeamName) -> String {
        let safe_team = team.as_str().replace([' ', ':'], "_");
        format!("{prefix}.{safe_team}.json")
    }
}

impl DataSource for FileDataSource {
    async fn fetch_heroes(&self, version: &GameVersion) -> Result<Vec<Hero>> {
        let versioned = format!("heroes.{}.json", version);
        if self.dir.join(&versioned).exists() {
            return self.read_json(&versioned);
        }
        self.read_json("heroes.json")
    }

    async fn fetch_prior_games(&self, _match_id: &str) -> Result<Vec<SeriesGame>> {
        self.read_json("series_games.json")
    }

    async fn fetch_team_stats(
        &self,
        team: &TeamName,
        _tournament: Option<&str>,
    ) -> Result<TeamStats> {
        self.read_json(&Self::team_file("team_stats", team))
    }

    async fn fetch_matchups(&self, _version: &GameVersion) -> Result<MatchupTable> {
        self.read_json("matchups.json")
    }

    async fn fetch_synergies(&self, _version: &GameVersion) -> Result<SynergyTable> {
        self.read_json("synergies.json")
    }

    async fn fetch_hero_pool(&self, team: &TeamName) -> Result<HeroPoolStats> {
        self.read_json(&Self::team_file("hero_pool", team))
    }
}

pub fn make_file_source(path: &Path) -> FileDataSource {
    FileDataSource::new(path.to_owned())
}

pub async fn load_with_configured_source(config: &Config) -> Result<ExternalData> {
    match &config.data_source {
        DataSourceConfig::Http {
            base_url,
            timeout_ms,
        } => {
            let source =
                HttpDataSource::new(base_url.clone(), Duration::from_millis(*timeout_ms));
            load_external_data(&source, config).await
        }
        DataSourceConfig::Files { dir } => {
            let source = make_file_source(dir);
            load_external_data(&source, config).await
        }
    }
}
