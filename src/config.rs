//! Application settings layered from flags, environment and TOML files.

use crate::errors::QueryError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CATALOGUE: &str = "query-config.json";
pub const CONFIG_FILE_NAME: &str = "dynaquery.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub catalogue_path: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub data_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Fill every unset field from `other`.
    pub fn merge_missing(&mut self, other: Self) {
        if self.catalogue_path.is_none() {
            self.catalogue_path = other.catalogue_path;
        }
        if self.log_dir.is_none() {
            self.log_dir = other.log_dir;
        }
        if self.log_level.is_none() {
            self.log_level = other.log_level;
        }
        if self.data_dir.is_none() {
            self.data_dir = other.data_dir;
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub(crate) fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            catalogue_path: get("DYNAQUERY_CATALOGUE").map(PathBuf::from),
            log_dir: get("DYNAQUERY_LOG_DIR").map(PathBuf::from),
            log_level: get("DYNAQUERY_LOG_LEVEL"),
            data_dir: get("DYNAQUERY_DATA_DIR").map(PathBuf::from),
        }
    }

    /// Parse one TOML file.
    pub fn read_file(path: &Path) -> Result<Self, QueryError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| QueryError::ConfigLoad(format!("{}: {e}", path.display())))?;
        toml::from_str(&text).map_err(|e| QueryError::ConfigLoad(format!("{}: {e}", path.display())))
    }

    /// Like [`AppConfig::read_file`], but a missing file is `None` and an
    /// invalid one is skipped with a warning.
    #[must_use]
    pub fn from_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        match Self::read_file(path) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                log::warn!("ignoring config file: {e}");
                None
            }
        }
    }

    #[must_use]
    pub fn catalogue_path(&self) -> PathBuf {
        self.catalogue_path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOGUE))
    }
}

/// Implicit config files, highest precedence first.
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(p) = std::env::var("DYNAQUERY_CONFIG") {
        paths.push(PathBuf::from(p));
    }
    if let Some(dir) = dirs_next::config_dir() {
        paths.push(dir.join(CONFIG_FILE_NAME));
    }
    if let Ok(cur) = std::env::current_dir() {
        paths.push(cur.join(CONFIG_FILE_NAME));
    }
    paths
}

/// Resolve settings. Precedence: `cli` > environment > config files > defaults.
///
/// An explicit `cli_config` must exist and parse; implicit candidates are
/// skipped when absent or invalid.
pub fn load_config(cli: AppConfig, cli_config: Option<&Path>) -> Result<AppConfig, QueryError> {
    let mut cfg = cli;
    cfg.merge_missing(AppConfig::from_env());
    if let Some(path) = cli_config {
        cfg.merge_missing(AppConfig::read_file(path)?);
    }
    for path in config_paths() {
        if let Some(file_cfg) = AppConfig::from_file(&path) {
            cfg.merge_missing(file_cfg);
        }
    }
    Ok(cfg)
}
