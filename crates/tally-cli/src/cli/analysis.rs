//! Analysis orchestration: target → scan → fetch → report → output.

use crate::formatters::{Formatter, HumanFormatter, JsonFormatter};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tally_config::{ConfigError, ConfigManager, TallyConfig};
use tally_core::report::assemble;
use tally_core::{scan, AnalysisTarget, PackageMetadata, PackageName, ProjectScan, ScanOutcome};
use tally_info::{FetchOptions, MetadataFetcher};
use tokio::runtime::Runtime;
use tracing::{debug, info};

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Options for running analysis.
pub struct AnalysisRunOptions {
    pub paths: Vec<PathBuf>,
    pub config: Option<PathBuf>,
    pub offline: bool,
    pub concurrency: Option<usize>,
    pub verbose: u8,
    pub format: OutputFormat,
}

/// Runs the analysis with the given options.
pub fn run_analysis(options: &AnalysisRunOptions) -> Result<()> {
    // Step 1: Resolve the target; bad paths fail before any work
    let target = AnalysisTarget::from_paths(&options.paths)
        .context("Failed to resolve analysis target")?;
    debug!(?target, "resolved target");

    // Step 2: Scan
    let outcome = scan(&target).context("Scan failed")?;
    info!(files_scanned = outcome.files_scanned(), "scan finished");

    let project = match outcome {
        ScanOutcome::Found(project) => project,
        ScanOutcome::NoPackagesFound { .. } => {
            debug!("no package imports found");
            eprintln!("No packages found");
            return Ok(());
        }
    };

    // Step 3: Registry metadata
    let metadata = if options.offline {
        info!("offline mode, skipping registry requests");
        BTreeMap::new()
    } else {
        fetch_metadata(&project, options)?
    };

    // Step 4: Assemble and print
    let report = assemble(project, metadata);

    match options.format {
        OutputFormat::Json => JsonFormatter.print(&report),
        OutputFormat::Human => HumanFormatter {
            root: target.root().map(Path::to_path_buf),
            verbose: options.verbose > 0,
        }
        .print(&report),
    }
}

fn fetch_metadata(
    project: &ProjectScan,
    options: &AnalysisRunOptions,
) -> Result<BTreeMap<PackageName, PackageMetadata>> {
    let runtime = Runtime::new().context("Failed to create tokio runtime")?;

    runtime.block_on(async {
        let config = load_config(options.config.as_deref()).await?;
        let fetch_options = fetch_options(config, options.concurrency)?;
        let fetcher =
            MetadataFetcher::npm(&fetch_options).context("Failed to create registry client")?;

        if options.format == OutputFormat::Human {
            eprintln!("Fetching metadata for {} packages...", project.packages.len());
        }

        Ok(fetcher.fetch(&project.packages).await)
    })
}

/// Load the effective configuration. Without a home directory the built-in
/// defaults are used.
async fn load_config(path: Option<&Path>) -> Result<TallyConfig> {
    match ConfigManager::load_or_default(path).await {
        Ok(manager) => Ok(manager.config().clone()),
        Err(ConfigError::HomeNotFound) => {
            debug!("home directory not found, using default config");
            Ok(TallyConfig::default())
        }
        Err(err) => Err(err).context("Failed to load config"),
    }
}

/// Apply command-line overrides and translate the config into fetch options.
fn fetch_options(mut config: TallyConfig, concurrency: Option<usize>) -> Result<FetchOptions> {
    if let Some(concurrency) = concurrency {
        config.registry.max_concurrent_requests = concurrency;
    }
    config.validate().context("Invalid configuration")?;

    let registry = config.registry;
    Ok(FetchOptions {
        registry_url: registry.registry_url,
        downloads_url: registry.downloads_url,
        max_concurrent_requests: registry.max_concurrent_requests,
        requests_per_second: registry.requests_per_second,
        request_timeout: Duration::from_secs(registry.request_timeout_secs),
    })
}
