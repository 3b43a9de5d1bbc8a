//! Error types for tally-info

use thiserror::Error;

/// Result type alias for tally-info operations
pub type Result<T> = std::result::Result<T, Error>;

/// Why a registry request failed.
///
/// The fetcher turns these into degraded records (primary request) or
/// ignores them (download counts); they only surface through
/// [`RegistrySource`](crate::RegistrySource) calls made directly.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure, timeout or undecodable body
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success HTTP status
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded for URL: {0}")]
    RateLimitExceeded(String),

    /// Registry document without `dist-tags.latest`
    #[error("Package '{0}' has no latest version")]
    MissingLatestVersion(String),

    /// Invalid base URL in the fetch options
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Whether the registry answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}
