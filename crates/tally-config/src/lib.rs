//! Configuration for tally, stored as TOML in `~/.tally/config.toml`.

pub mod manager;
pub mod types;

pub use manager::{ConfigError, ConfigManager};
pub use types::{RegistrySettings, TallyConfig, CONFIG_VERSION};
