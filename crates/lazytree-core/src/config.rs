//! Browser configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for the tree controller and the local filesystem source.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct BrowserConfig {
    /// Directories shown as extra roots after the OS volumes.
    #[builder(default)]
    #[serde(default)]
    pub extra_roots: Vec<PathBuf>,

    /// List symlinks to directories as folders instead of files.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub follow_symlinks: bool,

    /// Capacity of the channel carrying worker results back to the controller.
    #[builder(default = "64")]
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_true() -> bool {
    true
}

fn default_channel_capacity() -> usize {
    64
}

impl BrowserConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(capacity) = self.channel_capacity {
            check_capacity(capacity)?;
        }
        if let Some(roots) = &self.extra_roots {
            check_extra_roots(roots)?;
        }
        Ok(())
    }
}

fn check_capacity(capacity: usize) -> Result<(), String> {
    if capacity == 0 {
        return Err("Channel capacity must be greater than zero".to_string());
    }
    Ok(())
}

fn check_extra_roots(roots: &[PathBuf]) -> Result<(), String> {
    match roots.iter().find(|root| !root.is_absolute()) {
        Some(root) => Err(format!("Extra root must be absolute: {}", root.display())),
        None => Ok(()),
    }
}

impl BrowserConfig {
    /// Create a new browser config builder.
    pub fn builder() -> BrowserConfigBuilder {
        BrowserConfigBuilder::default()
    }

    /// Check a config that did not come through the builder, e.g. one read
    /// from a settings file.
    pub fn validate(&self) -> Result<(), String> {
        check_capacity(self.channel_capacity)?;
        check_extra_roots(&self.extra_roots)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            extra_roots: Vec::new(),
            follow_symlinks: true,
            channel_capacity: default_channel_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = BrowserConfig::builder()
            .channel_capacity(8usize)
            .follow_symlinks(false)
            .build()
            .unwrap();

        assert_eq!(config.channel_capacity, 8);
        assert!(!config.follow_symlinks);
        assert!(config.extra_roots.is_empty());
    }

    #[test]
    fn test_config_rejects_zero_capacity() {
        let result = BrowserConfig::builder().channel_capacity(0usize).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_rejects_relative_root() {
        let result = BrowserConfig::builder()
            .extra_roots(vec![PathBuf::from("relative/dir")])
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialized_config_is_validated() {
        let config: BrowserConfig =
            serde_json::from_str(r#"{"channel_capacity": 0}"#).unwrap();
        assert!(config.validate().is_err());

        let config: BrowserConfig =
            serde_json::from_str(r#"{"extra_roots": ["relative/dir"]}"#).unwrap();
        assert!(config.validate().is_err());

        assert!(BrowserConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_serde_defaults() {
        let config: BrowserConfig = serde_json::from_str("{}").unwrap();
        assert!(config.follow_symlinks);
        assert_eq!(config.channel_capacity, 64);
    }
}
