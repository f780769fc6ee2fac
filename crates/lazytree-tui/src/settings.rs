//! User settings read from `settings.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use lazytree_core::BrowserConfig;

/// Errors raised while reading the settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid settings {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}

/// Configuration for the TUI.
///
/// Settings are only ever read; the tree itself is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Theme name: `dark`, `light`, or a file in the themes directory.
    pub theme: String,
    /// Directory holding `<name>.toml` theme files.
    pub themes_dir: Option<PathBuf>,
    /// Controller and filesystem settings.
    pub browser: BrowserConfig,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            themes_dir: None,
            browser: BrowserConfig::default(),
        }
    }
}

impl TuiConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory under the user's config dir holding lazytree files.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("lazytree"))
    }

    /// Default settings file path.
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("settings.toml"))
    }

    /// Load settings from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config
            .browser
            .validate()
            .map_err(|message| ConfigError::Invalid {
                path: path.to_path_buf(),
                message,
            })?;
        Ok(config)
    }

    /// Load settings from the default location, or return defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Override the theme name.
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    /// Directory themes are loaded from.
    pub fn resolved_themes_dir(&self) -> PathBuf {
        self.themes_dir
            .clone()
            .or_else(|| Self::config_dir().map(|d| d.join("themes")))
            .unwrap_or_else(|| PathBuf::from("themes"))
    }
}
