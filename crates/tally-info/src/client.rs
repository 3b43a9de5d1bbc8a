//! HTTP client wrapper with rate limiting

use crate::error::{Error, Result};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Rate limiter shared by every request of one client
pub type RegistryRateLimiter = Arc<
    RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
>;

/// User agent sent with every request.
pub fn user_agent() -> String {
    format!("tally/{}", env!("CARGO_PKG_VERSION"))
}

/// HTTP client for registry requests with a per-request timeout and an
/// optional client-side rate limit
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    rate_limiter: Option<RegistryRateLimiter>,
}

impl HttpClient {
    /// Create a client without rate limiting
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent())
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            rate_limiter: None,
        })
    }

    /// Create a client allowing at most `requests_per_second` requests.
    ///
    /// A rate of zero is treated as one request per second.
    pub fn with_rate_limit(requests_per_second: u32, timeout: Duration) -> Result<Self> {
        let quota = Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));

        Ok(Self {
            rate_limiter: Some(Arc::new(RateLimiter::direct(quota))),
            ..Self::new(timeout)?
        })
    }

    /// Wait for rate limiter if enabled
    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }
    }

    /// Make a GET request and deserialize JSON response
    pub async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.wait_for_rate_limit().await;
        debug!(url, "GET");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimitExceeded(url.to_string()));
        }

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        // Read as bytes first so malformed bodies surface as `Error::Json`.
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
