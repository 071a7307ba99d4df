use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::errors::CoreError;

/// Application version, shown in the window title and stamped into settings.
pub const APP_VERSION: &str = "1.0.0";

/// Schema version of trade files.
pub const DATA_FILE_VERSION: &str = "1";

/// Schema version of the change log file.
pub const CHANGE_LOG_VERSION: &str = "1";

pub const DEFAULT_CHANGE_LOG_FILE: &str = "ctt_change_log.json";
pub const DEFAULT_SETTINGS_FILE: &str = "ctt_settings.json";

/// Where the tracker keeps its own files (change log, settings).
/// Trade files live wherever the user saves them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub data_dir: PathBuf,
    pub change_log_file: PathBuf,
    pub settings_file: PathBuf,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

impl TrackerConfig {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let data_dir = dir.as_ref().to_path_buf();
        Self {
            change_log_file: data_dir.join(DEFAULT_CHANGE_LOG_FILE),
            settings_file: data_dir.join(DEFAULT_SETTINGS_FILE),
            data_dir,
        }
    }

    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_env_map(std::env::vars().collect())
    }

    /// Reads `CTT_DATA_DIR`, `CTT_CHANGE_LOG_FILE` and `CTT_SETTINGS_FILE`.
    /// File names are resolved against the data directory unless absolute.
    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, CoreError> {
        let data_dir = non_empty(&env_map, "CTT_DATA_DIR")?.unwrap_or(".");
        let mut config = Self::in_dir(data_dir);

        if let Some(file) = non_empty(&env_map, "CTT_CHANGE_LOG_FILE")? {
            config.change_log_file = config.data_dir.join(file);
        }
        if let Some(file) = non_empty(&env_map, "CTT_SETTINGS_FILE")? {
            config.settings_file = config.data_dir.join(file);
        }

        Ok(config)
    }
}

fn non_empty<'a>(
    env_map: &'a HashMap<String, String>,
    key: &str,
) -> Result<Option<&'a str>, CoreError> {
    match env_map.get(key).map(|v| v.trim()) {
        None => Ok(None),
        Some("") => Err(CoreError::InvalidConfig {
            key: key.to_string(),
            message: "must not be empty".to_string(),
        }),
        Some(value) => Ok(Some(value)),
    }
}
