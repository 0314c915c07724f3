// Configuration file loading

use crate::error::StoreError;
use crate::filter::{Chip, SortKey};
use eyre::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "focusflow";
const CONFIG_FILE: &str = "config.yml";

/// Settings for the CLI, read from YAML
///
/// Every key is optional; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the task database
    pub data_dir: PathBuf,
    pub default_sort: SortKey,
    pub default_chip: Chip,
    /// Write example tasks on first run
    pub seed_examples: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_sort: SortKey::default(),
            default_chip: Chip::default(),
            seed_examples: true,
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `None`
    ///
    /// A missing default file means defaults. An explicit path that does not
    /// exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(StoreError::Config(format!("config file not found: {}", path.display())).into());
                }
                Self::from_file(path)
            }
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("No config file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&content).with_context(|| format!("Failed to parse config file {}", path.display()))?;

        debug!(file = ?path, "Loaded config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

/// `<config_dir>/focusflow/config.yml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// `<data_dir>/focusflow`, or `./.focusflow` when no data directory is known
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".focusflow"))
}
