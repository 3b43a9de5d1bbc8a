//! npm registry metadata fetcher for tally
//!
//! Given the packages found by a scan, fetches each package's registry
//! document and weekly download count, with bounded concurrency and a
//! client-side rate limit. Failures never abort the batch: a package whose
//! registry request fails is returned as a degraded
//! [`PackageMetadata`](tally_core::PackageMetadata) record.
//!
//! # Example
//!
//! ```no_run
//! use std::collections::BTreeSet;
//! use tally_core::PackageName;
//! use tally_info::{FetchOptions, MetadataFetcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = MetadataFetcher::npm(&FetchOptions::default())?;
//!
//!     let packages: BTreeSet<_> = ["react", "@types/node"]
//!         .into_iter()
//!         .filter_map(PackageName::from_specifier)
//!         .collect();
//!
//!     for (name, metadata) in fetcher.fetch(&packages).await {
//!         println!("{name} v{} ({} downloads/week)", metadata.version, metadata.weekly_downloads);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod alternatives;
mod client;
mod downloads;
mod error;
mod fetcher;
mod npm;

pub use alternatives::{alternatives_for, apply_alternatives};
pub use client::HttpClient;
pub use downloads::NPM_DOWNLOADS_URL;
pub use error::{Error, Result};
pub use fetcher::{FetchOptions, MetadataFetcher, NpmRegistry, RegistrySource};
pub use npm::{encode_package_name, parse_package_document, NPM_REGISTRY_URL};
