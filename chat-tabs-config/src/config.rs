//! `TabsConfig` loading, saving and path resolution.
//!
//! Config lives in `~/.config/chat-tabs/config.yaml`. A missing file yields
//! the defaults; a present but invalid file is an error.

use crate::error::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Storage key the tab snapshot is written under unless overridden.
pub const DEFAULT_STORAGE_KEY: &str = "chat-tabs-state";

/// How the persistence writer hands snapshots to the storage medium.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Write synchronously from the subscriber callback
    #[default]
    Inline,
    /// Queue writes to a dedicated writer thread (FIFO)
    Background,
}

/// Settings for tab persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabsConfig {
    /// Key the whole tab document is stored under
    pub storage_key: String,

    /// Directory used by the file-backed store.
    /// `None` resolves to `<config_dir>/storage`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,

    /// Inline or background writes
    pub write_mode: WriteMode,

    /// When false, neither hydration nor writes touch the storage medium
    pub persistence_enabled: bool,
}

impl Default for TabsConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            storage_dir: None,
            write_mode: WriteMode::default(),
            persistence_enabled: true,
        }
    }
}

impl TabsConfig {
    /// Load configuration from the default location, or defaults if absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(ConfigError::from)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml_ng::from_str(&contents)
            .map_err(ConfigError::from)
            .with_context(|| format!("Failed to parse config from {:?}", path))?;
        config.validate()?;

        log::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a specific file.
    ///
    /// Writes to a temp file first and renames it over the target.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let yaml = serde_yaml_ng::to_string(self)
            .map_err(ConfigError::from)
            .context("Failed to serialize config")?;

        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml)
            .with_context(|| format!("Failed to write config to {:?}", temp_path))?;
        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to move config into place at {:?}", path))?;

        Ok(())
    }

    /// Reject values the persistence layer cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "storage_key must not be empty".to_string(),
            ));
        }
        if let Some(dir) = &self.storage_dir
            && dir.as_os_str().is_empty()
        {
            return Err(ConfigError::Validation(
                "storage_dir must not be an empty path".to_string(),
            ));
        }
        Ok(())
    }

    /// Directory the file-backed store writes into
    pub fn resolved_storage_dir(&self) -> PathBuf {
        self.storage_dir
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("storage"))
    }

    /// Get the configuration directory (`~/.config/chat-tabs`)
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chat-tabs")
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }
}
