use crate::types::TallyConfig;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::debug;

/// Errors that can occur during config management
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Config file not found at {0}")]
    ConfigNotFound(PathBuf),

    #[error("Home directory not found")]
    HomeNotFound,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Manager for tally configuration
///
/// Manages the configuration stored in ~/.tally/config.toml.
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
    config: TallyConfig,
}

impl ConfigManager {
    /// Get the default config path (~/.tally/config.toml)
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".tally").join("config.toml"))
    }

    /// Load config from specific path
    pub async fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !fs::try_exists(path).await? {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path).await?;
        let config: TallyConfig = toml::from_str(&contents)?;
        debug!(path = %path.display(), "loaded config");

        Ok(Self {
            config_path: path.to_path_buf(),
            config,
        })
    }

    /// Load an explicit config file, or the default one if it exists.
    ///
    /// An explicit path must exist. Without one, a missing default file
    /// yields the built-in defaults (not written to disk).
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load_from(path).await;
        }

        let config_path = Self::config_path()?;
        match Self::load_from(&config_path).await {
            Err(ConfigError::ConfigNotFound(_)) => {
                debug!(path = %config_path.display(), "no config file, using defaults");
                Ok(Self {
                    config_path,
                    config: TallyConfig::default(),
                })
            }
            other => other,
        }
    }

    /// Initialize config at specific path, overwriting any existing file
    pub async fn init_at(path: &Path) -> Result<Self, ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let manager = Self {
            config_path: path.to_path_buf(),
            config: TallyConfig::default(),
        };
        manager.save().await?;

        Ok(manager)
    }

    /// Save config to disk atomically
    ///
    /// Uses a temporary file and atomic rename to prevent corruption
    pub async fn save(&self) -> Result<(), ConfigError> {
        let toml_str = toml::to_string_pretty(&self.config)?;

        let temp_path = self.config_path.with_extension("toml.tmp");
        fs::write(&temp_path, toml_str).await?;
        fs::rename(&temp_path, &self.config_path).await?;

        Ok(())
    }

    /// Location this manager reads from and saves to
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Get reference to config
    pub fn config(&self) -> &TallyConfig {
        &self.config
    }

    /// Get mutable reference to config (caller must call save())
    pub fn config_mut(&mut self) -> &mut TallyConfig {
        &mut self.config
    }
}
