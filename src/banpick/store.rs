use std::ffi::OsStr;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use banpick_model::analysis::AnalysisMode;
use itertools::Itertools;
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::config::Config;

fn config_file_path() -> PathBuf {
    data_dir().join("config.yaml")
}

fn analysis_modes_file_path() -> PathBuf {
    data_dir().join("analysis_modes.yaml")
}

pub fn data_dir() -> PathBuf {
    let project_dirs = directories::ProjectDirs::from("com", "banpick", "banpick")
        .expect("Cannot retrieve project dirs");
    project_dirs.data_dir().to_owned()
}

pub fn load_config() -> Result<Config> {
    info!("Config file: {}", config_file_path().to_string_lossy());
    if !config_file_path().exists() {
        info!("Config file does not exist, creating.");
        store_default_config()?;
    }
    let config_file = File::open(config_file_path())?;
    Ok(serde_yaml::from_reader(config_file)?)
}

pub fn store_default_config() -> Result<()> {
    ensure_dir_created(&config_file_path())?;
    let config_file = File::create(config_file_path())?;
    Ok(serde_yaml::to_writer(config_file, &Config::default())?)
}

pub fn store_config(config: &Config) -> Result<()> {
    ensure_dir_created(&config_file_path())?;
    store_file_with_backup(&config_file_path(), config)?;
    Ok(())
}

/// User-defined weight profiles, merged with the built-in ones at session
/// start. Missing file means no custom profiles; that is not an error.
pub fn load_custom_analysis_modes() -> Result<Vec<AnalysisMode>> {
    let path = analysis_modes_file_path();
    info!("Analysis modes file: {}", path.to_string_lossy());
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = File::open(path)?;
    let modes: Vec<AnalysisMode> = serde_yaml::from_reader(file)?;
    let names: String = modes.iter().map(|m| &m.name).join(", ");
    if modes.is_empty() {
        warn!("Loaded 0 custom analysis modes");
    } else {
        info!("Loaded {} custom analysis modes: {names}", modes.len());
    }
    Ok(modes)
}

pub fn store_custom_analysis_modes(modes: &[AnalysisMode]) -> Result<()> {
    ensure_dir_created(&analysis_modes_file_path())?;
    store_file_with_backup(&analysis_modes_file_path(), &modes.to_vec())?;
    Ok(())
}

fn store_file_with_backup<T>(path: &Path, data: &T) -> Result<()>
where
    T: Serialize + DeserializeOwned + PartialEq,
{
    let orig = if path.is_file() {
        let orig_file = File::open(path)?;
        let orig_content: T = serde_yaml::from_reader(orig_file)?;
        Some(orig_content)
    } else {
        None
    };
    if orig.as_ref() == Some(data) {
        // No need to change anything
        return Ok(());
    }
    // We are about to overwrite this file: create backup
    if path.is_file() {
        let orig_filename = path
            .file_name()
            .map(OsStr::to_string_lossy)
            .unwrap_or_default();
        let backup_path = path.with_file_name(format!("{}{}", orig_filename, ".bak"));
        std::fs::rename(path, backup_path)?;
    }
    let out_file = File::create(path)?;
    serde_yaml::to_writer(out_file, data)?;
    Ok(())
}

fn ensure_dir_created(path: &Path) -> Result<()> {
    let dir = path.parent().expect("Parent directory");
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create {}", &dir.to_string_lossy()))?;
    }
    Ok(())
}
