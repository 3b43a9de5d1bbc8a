//! npm registry documents

use crate::client::HttpClient;
use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tally_core::{PackageMetadata, PackageName};

pub const NPM_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// The parts of a registry package document tally reads.
///
/// Most fields are loosely typed: published documents are not consistent
/// across the registry's history.
#[derive(Debug, Deserialize)]
struct NpmPackageDocument {
    description: Option<Value>,
    #[serde(rename = "dist-tags", default)]
    dist_tags: BTreeMap<String, Value>,
    license: Option<Value>,
    homepage: Option<Value>,
    repository: Option<Value>,
    #[serde(default)]
    maintainers: Option<Value>,
    #[serde(default)]
    time: Map<String, Value>,
    #[serde(default)]
    versions: Map<String, Value>,
}

/// Path segment for a package; scoped names encode `/` as `%2F`.
pub fn encode_package_name(name: &PackageName) -> String {
    if name.is_scoped() {
        name.as_str().replace('/', "%2F")
    } else {
        name.as_str().to_string()
    }
}

/// Full document URL for a package under `registry_url`.
pub fn package_url(registry_url: &str, name: &PackageName) -> String {
    format!(
        "{}/{}",
        registry_url.trim_end_matches('/'),
        encode_package_name(name)
    )
}

/// Fetch and parse the registry document of one package.
pub async fn fetch_package(
    client: &HttpClient,
    registry_url: &str,
    name: &PackageName,
) -> Result<PackageMetadata> {
    let url = package_url(registry_url, name);
    let document: Value = client.get_json(&url).await?;
    parse_package_document(name, document)
}

/// Build metadata from a registry document.
///
/// Only `dist-tags.latest` is required; every other field falls back to its
/// default. The record is keyed by the requested name, not the document's.
pub fn parse_package_document(name: &PackageName, document: Value) -> Result<PackageMetadata> {
    let document: NpmPackageDocument = serde_json::from_value(document)?;

    let version = document
        .dist_tags
        .get("latest")
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::MissingLatestVersion(name.to_string()))?
        .to_string();

    let mut metadata = PackageMetadata::new(name.clone(), version.clone());

    if let Some(description) = document.description.as_ref().and_then(Value::as_str) {
        metadata.description = description.to_string();
    }
    if let Some(license) = document.license.as_ref().and_then(license_name) {
        metadata.license = license;
    }
    metadata.homepage = document
        .homepage
        .as_ref()
        .and_then(Value::as_str)
        .map(String::from);
    metadata.repository = document.repository.as_ref().and_then(repository_url);
    metadata.maintainers = match &document.maintainers {
        Some(Value::Array(maintainers)) => maintainers.len(),
        _ => 0,
    };
    metadata.last_published = document
        .time
        .get(&version)
        .and_then(Value::as_str)
        .map(String::from);
    metadata.dependencies = document
        .versions
        .get(&version)
        .and_then(|v| v.get("dependencies"))
        .and_then(Value::as_object)
        .map(|deps| {
            let mut names: Vec<String> = deps.keys().cloned().collect();
            names.sort();
            names
        })
        .unwrap_or_default();

    Ok(metadata)
}

/// `"MIT"` or `{ "type": "MIT", "url": ... }`
fn license_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(obj) => obj.get("type").and_then(Value::as_str).map(String::from),
        _ => None,
    }
}

/// `"github:user/repo"` or `{ "type": "git", "url": ... }`
fn repository_url(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(obj) => obj.get("url").and_then(Value::as_str).map(String::from),
        _ => None,
    }
}
