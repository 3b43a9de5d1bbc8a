//! Concurrent metadata fetching for a set of packages.
//!
//! Every package is fetched independently: a failing package turns into a
//! degraded record and never affects the others. The batch itself cannot
//! fail.

use crate::alternatives::apply_alternatives;
use crate::client::HttpClient;
use crate::downloads::{self, NPM_DOWNLOADS_URL};
use crate::error::Result;
use crate::npm::{self, NPM_REGISTRY_URL};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tally_core::{PackageMetadata, PackageName};
use tracing::{debug, info, warn};
use url::Url;

/// Where package metadata comes from.
#[async_trait]
pub trait RegistrySource: Send + Sync {
    /// Primary request: the package document, parsed.
    async fn package_metadata(&self, name: &PackageName) -> Result<PackageMetadata>;

    /// Secondary request: downloads over the last week.
    async fn weekly_downloads(&self, name: &PackageName) -> Result<u64>;
}

/// Endpoints and limits for registry access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub registry_url: String,
    pub downloads_url: String,
    /// Packages fetched at the same time.
    pub max_concurrent_requests: usize,
    /// Client-side limit across all requests.
    pub requests_per_second: u32,
    pub request_timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            registry_url: NPM_REGISTRY_URL.to_string(),
            downloads_url: NPM_DOWNLOADS_URL.to_string(),
            max_concurrent_requests: 8,
            requests_per_second: 10,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// The public npm registry, or any server speaking its API.
#[derive(Debug, Clone)]
pub struct NpmRegistry {
    client: HttpClient,
    registry_url: String,
    downloads_url: String,
}

impl NpmRegistry {
    /// Build a registry client, validating both base URLs.
    pub fn new(options: &FetchOptions) -> Result<Self> {
        let registry_url = Url::parse(&options.registry_url)?;
        let downloads_url = Url::parse(&options.downloads_url)?;

        Ok(Self {
            client: HttpClient::with_rate_limit(
                options.requests_per_second,
                options.request_timeout,
            )?,
            registry_url: registry_url.as_str().trim_end_matches('/').to_string(),
            downloads_url: downloads_url.as_str().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RegistrySource for NpmRegistry {
    async fn package_metadata(&self, name: &PackageName) -> Result<PackageMetadata> {
        npm::fetch_package(&self.client, &self.registry_url, name).await
    }

    async fn weekly_downloads(&self, name: &PackageName) -> Result<u64> {
        downloads::fetch_weekly_downloads(&self.client, &self.downloads_url, name).await
    }
}

/// Fetches metadata for many packages with bounded concurrency.
pub struct MetadataFetcher<S = NpmRegistry> {
    source: S,
    max_concurrent: usize,
}

impl MetadataFetcher<NpmRegistry> {
    /// Fetcher backed by the npm registry.
    pub fn npm(options: &FetchOptions) -> Result<Self> {
        Ok(Self::new(
            NpmRegistry::new(options)?,
            options.max_concurrent_requests,
        ))
    }
}

impl<S: RegistrySource> MetadataFetcher<S> {
    pub fn new(source: S, max_concurrent: usize) -> Self {
        Self {
            source,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Fetch metadata for every package.
    ///
    /// Always returns exactly one record per input package. Results are
    /// gathered only after every request has settled; alternatives are then
    /// attached to all records.
    pub async fn fetch(
        &self,
        packages: &BTreeSet<PackageName>,
    ) -> BTreeMap<PackageName, PackageMetadata> {
        info!(
            packages = packages.len(),
            concurrency = self.max_concurrent,
            "fetching registry metadata"
        );

        let mut results: BTreeMap<PackageName, PackageMetadata> = stream::iter(packages)
            .map(|name| self.fetch_one(name))
            .buffer_unordered(self.max_concurrent)
            .map(|metadata| (metadata.name.clone(), metadata))
            .collect()
            .await;

        apply_alternatives(&mut results);

        let degraded = results.values().filter(|m| m.is_degraded()).count();
        if degraded > 0 {
            warn!(degraded, "some packages could not be fetched");
        }

        results
    }

    async fn fetch_one(&self, name: &PackageName) -> PackageMetadata {
        let mut metadata = match self.source.package_metadata(name).await {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!(package = %name, error = %err, "registry request failed");
                return PackageMetadata::degraded(name.clone(), err.to_string());
            }
        };
        // The record is keyed by the requested name regardless of the source.
        metadata.name = name.clone();

        match self.source.weekly_downloads(name).await {
            Ok(downloads) => metadata.weekly_downloads = downloads,
            Err(err) => {
                debug!(package = %name, error = %err, "download count unavailable");
                metadata.weekly_downloads = 0;
            }
        }

        metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn name(s: &str) -> PackageName {
        PackageName::from_specifier(s).unwrap()
    }

    fn names(list: &[&str]) -> BTreeSet<PackageName> {
        list.iter().map(|s| name(s)).collect()
    }

    /// In-memory registry. Packages listed in `broken` fail the primary
    /// request, packages in `no_downloads` fail the secondary one.
    #[derive(Default)]
    struct MockRegistry {
        broken: Vec<&'static str>,
        no_downloads: Vec<&'static str>,
        download_requests: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl RegistrySource for MockRegistry {
        async fn package_metadata(&self, name: &PackageName) -> Result<PackageMetadata> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.broken.iter().any(|b| *b == name.as_str()) {
                return Err(Error::Status {
                    status: 404,
                    url: format!("mock://{name}"),
                });
            }

            let mut metadata = PackageMetadata::new(name.clone(), "1.0.0");
            metadata.description = format!("{name} description");
            metadata.license = "MIT".to_string();
            metadata.maintainers = 3;
            Ok(metadata)
        }

        async fn weekly_downloads(&self, name: &PackageName) -> Result<u64> {
            self.download_requests
                .lock()
                .unwrap()
                .push(name.to_string());

            if self.no_downloads.iter().any(|b| *b == name.as_str()) {
                return Err(Error::RateLimitExceeded(format!("mock://{name}")));
            }
            Ok(name.as_str().len() as u64 * 1000)
        }
    }

    #[tokio::test]
    async fn test_one_record_per_package() {
        let fetcher = MetadataFetcher::new(MockRegistry::default(), 4);
        let packages = names(&["react", "@scope/pkg", "zod"]);

        let results = fetcher.fetch(&packages).await;

        assert_eq!(results.keys().cloned().collect::<BTreeSet<_>>(), packages);
        assert_eq!(results["react"].version, "1.0.0");
        assert_eq!(results["react"].weekly_downloads, 5000);
        assert_eq!(results["@scope/pkg"].name.as_str(), "@scope/pkg");
    }

    #[tokio::test]
    async fn test_failed_primary_is_degraded_and_isolated() {
        let registry = MockRegistry {
            broken: vec!["gone"],
            ..Default::default()
        };
        let fetcher = MetadataFetcher::new(registry, 8);

        let results = fetcher.fetch(&names(&["gone", "react"])).await;

        let gone = &results["gone"];
        assert!(gone.is_degraded());
        assert!(!gone.error.as_deref().unwrap().is_empty());
        assert_eq!(gone.version, "");
        assert_eq!(gone.weekly_downloads, 0);
        assert_eq!(gone.maintainers, 0);
        assert_eq!(gone.description, "");

        let react = &results["react"];
        assert!(!react.is_degraded());
        assert_eq!(react.description, "react description");
    }

    #[tokio::test]
    async fn test_no_secondary_request_after_primary_failure() {
        let registry = MockRegistry {
            broken: vec!["gone"],
            ..Default::default()
        };
        let fetcher = MetadataFetcher::new(registry, 2);

        fetcher.fetch(&names(&["gone", "react"])).await;

        let requested = fetcher.source.download_requests.lock().unwrap().clone();
        assert_eq!(requested, ["react"]);
    }

    #[tokio::test]
    async fn test_failed_secondary_leaves_zero_downloads() {
        let registry = MockRegistry {
            no_downloads: vec!["react"],
            ..Default::default()
        };
        let fetcher = MetadataFetcher::new(registry, 2);

        let results = fetcher.fetch(&names(&["react"])).await;

        assert!(!results["react"].is_degraded());
        assert_eq!(results["react"].weekly_downloads, 0);
        assert_eq!(results["react"].license, "MIT");
    }

    #[tokio::test]
    async fn test_alternatives_attached_after_fetch() {
        let registry = MockRegistry {
            broken: vec!["moment"],
            ..Default::default()
        };
        let fetcher = MetadataFetcher::new(registry, 2);

        let results = fetcher.fetch(&names(&["moment", "react", "uuid"])).await;

        assert_eq!(results["moment"].alternatives, ["date-fns", "dayjs", "luxon"]);
        assert_eq!(results["uuid"].alternatives, ["nanoid"]);
        assert!(results["react"].alternatives.is_empty());
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let fetcher = MetadataFetcher::new(MockRegistry::default(), 2);
        let many: Vec<String> = (0..20).map(|i| format!("pkg-{i}")).collect();
        let packages: BTreeSet<_> = many.iter().map(|s| name(s)).collect();

        let results = fetcher.fetch(&packages).await;

        assert_eq!(results.len(), 20);
        assert!(fetcher.source.peak_in_flight.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let fetcher = MetadataFetcher::new(MockRegistry::default(), 0);
        assert!(fetcher.fetch(&BTreeSet::new()).await.is_empty());
    }

    #[test]
    fn test_invalid_registry_url() {
        let options = FetchOptions {
            registry_url: "not a url".to_string(),
            ..FetchOptions::default()
        };
        assert!(matches!(NpmRegistry::new(&options), Err(Error::InvalidUrl(_))));
    }
}
