// Configuration - detector tables and fetch settings, stored as JSON
//
// A missing default config file means built-in defaults. Any field left out of
// the file falls back to its default too, so a config can override just the
// relay list or just the package manager table.

use crate::fetcher::FetchSettings;
use crate::registry::{
    default_package_managers, default_programming_tools, PackageManagerEntry,
    ProgrammingToolEntry, Registry,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid install pattern for `{prefix}`: {source}")]
    InvalidPattern { prefix: String, source: regex::Error },

    #[error("Could not determine config directory")]
    NoConfigDir,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub package_managers: Vec<PackageManagerEntry>,
    pub programming_tools: Vec<ProgrammingToolEntry>,
    pub fetch: FetchSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            package_managers: default_package_managers(),
            programming_tools: default_programming_tools(),
            fetch: FetchSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load from an explicit path (must exist) or the default location (optional)
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match Self::config_file_path() {
                Ok(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(io_err)
    }

    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|dir| dir.join("cmdpeek").join("config.json"))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn registry(&self) -> Result<Registry, ConfigError> {
        Registry::compile(&self.package_managers, &self.programming_tools)
    }
}
