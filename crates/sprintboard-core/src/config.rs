use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{BoardError, BoardResult};

const DEFAULT_SPRINT_LENGTH_DAYS: u32 = 7;

/// One board column as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub key: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Ordered status columns. Falls back to the built-in four when empty.
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
    #[serde(default)]
    pub sprint_length_days: Option<u32>,
    /// Membership role reported by the static membership provider.
    #[serde(default)]
    pub role: Option<String>,
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/sprintboard/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("sprintboard/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("sprintboard\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    /// Loads the user config, silently falling back to defaults.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                tracing::warn!("Ignoring config at {}: {}", path.display(), e);
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> BoardResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> BoardResult<Self> {
        toml::from_str(content).map_err(|e| BoardError::Serialization(e.to_string()))
    }

    pub fn effective_columns(&self) -> Vec<ColumnConfig> {
        if !self.columns.is_empty() {
            return self.columns.clone();
        }
        [
            ("TODO", "Todo"),
            ("IN_PROGRESS", "In Progress"),
            ("IN_REVIEW", "In Review"),
            ("DONE", "Done"),
        ]
        .into_iter()
        .map(|(key, name)| ColumnConfig {
            key: key.to_string(),
            name: name.to_string(),
        })
        .collect()
    }

    pub fn effective_sprint_length_days(&self) -> u32 {
        self.sprint_length_days
            .filter(|days| *days > 0)
            .unwrap_or(DEFAULT_SPRINT_LENGTH_DAYS)
    }

    pub fn effective_role(&self) -> &str {
        self.role.as_deref().unwrap_or("member")
    }
}
