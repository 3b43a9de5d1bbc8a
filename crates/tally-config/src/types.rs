use serde::{Deserialize, Serialize};
use url::Url;

use crate::manager::ConfigError;

pub const CONFIG_VERSION: &str = "1.0";

/// Main configuration structure for tally
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TallyConfig {
    /// Schema version for migrations
    #[serde(default = "default_version")]
    pub version: String,

    /// Registry access settings
    #[serde(default)]
    pub registry: RegistrySettings,
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            registry: RegistrySettings::default(),
        }
    }
}

impl TallyConfig {
    /// Reject settings that would make fetching impossible.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let registry = &self.registry;

        for (field, value) in [
            ("registry.registry_url", &registry.registry_url),
            ("registry.downloads_url", &registry.downloads_url),
        ] {
            let url = Url::parse(value)
                .map_err(|e| ConfigError::Invalid(format!("{field}: {e} ({value})")))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::Invalid(format!(
                    "{field}: unsupported scheme '{}'",
                    url.scheme()
                )));
            }
        }

        if registry.max_concurrent_requests == 0 {
            return Err(ConfigError::Invalid(
                "registry.max_concurrent_requests must be at least 1".to_string(),
            ));
        }
        if registry.requests_per_second == 0 {
            return Err(ConfigError::Invalid(
                "registry.requests_per_second must be at least 1".to_string(),
            ));
        }
        if registry.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "registry.request_timeout_secs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Registry endpoints and request limits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrySettings {
    /// Base URL of the package document registry
    #[serde(default = "default_registry_url")]
    pub registry_url: String,

    /// Base URL of the download count API
    #[serde(default = "default_downloads_url")]
    pub downloads_url: String,

    /// Packages fetched at the same time
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,

    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            registry_url: default_registry_url(),
            downloads_url: default_downloads_url(),
            max_concurrent_requests: default_max_concurrent(),
            requests_per_second: default_requests_per_second(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_version() -> String {
    CONFIG_VERSION.to_string()
}

fn default_registry_url() -> String {
    "https://registry.npmjs.org".to_string()
}

fn default_downloads_url() -> String {
    "https://api.npmjs.org".to_string()
}

fn default_max_concurrent() -> usize {
    8
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_request_timeout() -> u64 {
    30
}
