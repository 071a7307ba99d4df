use serde::{Deserialize, Serialize};

use crate::config::APP_VERSION;

/// Application settings, stored next to the change log (not inside trade files).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Application version that last wrote these settings.
    #[serde(default)]
    pub version: String,

    /// Trade file opened most recently; empty or absent for an unsaved document.
    #[serde(default, rename = "lastUsedFile")]
    pub last_used_file: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: APP_VERSION.to_string(),
            last_used_file: None,
        }
    }
}

impl Settings {
    /// The last used file, ignoring empty paths.
    pub fn last_file(&self) -> Option<&str> {
        self.last_used_file.as_deref().filter(|p| !p.is_empty())
    }
}
