use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::APP_VERSION;
use crate::errors::CoreError;
use crate::models::settings::Settings;

/// Reads and writes [`Settings`] as a small JSON file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings. A missing or unreadable file yields defaults; settings
    /// written by another application version are kept but logged.
    pub fn load(&self) -> Settings {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Settings::default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Cannot read settings, using defaults");
                return Settings::default();
            }
        };

        match serde_json::from_slice::<Settings>(&bytes) {
            Ok(settings) => {
                if !settings.version.is_empty() && settings.version != APP_VERSION {
                    warn!(
                        found = %settings.version,
                        expected = APP_VERSION,
                        "Settings were written by a different application version"
                    );
                }
                settings
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Malformed settings file, using defaults");
                Settings::default()
            }
        }
    }

    /// Write settings, stamping the current application version.
    pub fn save(&self, settings: &Settings) -> Result<(), CoreError> {
        let mut stamped = settings.clone();
        stamped.version = APP_VERSION.to_string();
        let bytes = serde_json::to_vec_pretty(&stamped)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize settings: {e}")))?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }
}
