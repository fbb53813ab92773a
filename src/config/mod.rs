use crate::models::ConsoleConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "opsconsole.yaml";

/// Configuration manager for loading and saving the YAML configuration file.
///
/// Loading never fails because of the file itself: a missing or unparseable
/// file falls back to [`ConsoleConfig::default`] with a warning.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager for the given configuration file.
    ///
    /// # Arguments
    /// * `config_path` - Path to the YAML file (e.g., "opsconsole.yaml")
    pub fn new<P: AsRef<Utf8Path>>(config_path: P) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    /// Load the configuration file.
    ///
    /// # Returns
    /// The loaded ConsoleConfig, or defaults if the file is missing or invalid
    pub fn load(&self) -> ConsoleConfig {
        if !self.config_path.exists() {
            tracing::warn!(
                "Config file not found at {}, using defaults",
                self.config_path
            );
            return ConsoleConfig::default();
        }

        let file_contents = match fs::read_to_string(&self.config_path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(
                    "Failed to read config {}: {}, using defaults",
                    self.config_path,
                    e
                );
                return ConsoleConfig::default();
            }
        };

        match serde_yaml_ng::from_str::<ConsoleConfig>(&file_contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", self.config_path);
                config
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse config {}: {}, using defaults",
                    self.config_path,
                    e
                );
                ConsoleConfig::default()
            }
        }
    }

    /// Save the configuration file.
    ///
    /// # Arguments
    /// * `config` - The ConsoleConfig to save
    pub fn save(&self, config: &ConsoleConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize config to YAML")?;

        if let Some(parent) = self.config_path.parent() {
            if !parent.as_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create config directory: {}", parent))?;
            }
        }

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write config: {}", self.config_path))?;

        tracing::info!("Saved config to {}", self.config_path);
        Ok(())
    }

    /// Create the out directory (lock markers and audit log) if it doesn't exist.
    pub fn ensure_out_dir(&self, config: &ConsoleConfig) -> Result<()> {
        if !config.out_dir.exists() {
            fs::create_dir_all(&config.out_dir)
                .with_context(|| format!("Failed to create out directory: {}", config.out_dir))?;
            tracing::info!("Created out directory {}", config.out_dir);
        }
        Ok(())
    }

    /// Get the configuration file path.
    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }
}
