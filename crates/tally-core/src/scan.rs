//! Scan entry point: target → per-file packages → usage index.

use crate::aggregate::aggregate;
use crate::error::{Error, Result};
use crate::extract::analyze_file;
use crate::target::AnalysisTarget;
use crate::types::{FileMap, PackageName, ProjectTree, UsageIndex};
use crate::walker;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, info};

/// Local results of a scan, before any registry metadata is attached.
#[derive(Debug, Clone)]
pub struct ProjectScan {
    /// Walked hierarchy, for directory targets only.
    pub tree: Option<ProjectTree>,
    pub files: FileMap,
    pub deep_dive: Vec<PathBuf>,
    pub files_scanned: usize,
    pub usage: UsageIndex,
    /// Distinct packages found (the key set of `usage`).
    pub packages: BTreeSet<PackageName>,
}

/// Outcome of a scan.
///
/// Finding nothing is not an error; it is reported as its own variant so
/// callers can skip metadata fetching and rendering.
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    Found(ProjectScan),
    NoPackagesFound { files_scanned: usize },
}

impl ScanOutcome {
    pub fn files_scanned(&self) -> usize {
        match self {
            ScanOutcome::Found(scan) => scan.files_scanned,
            ScanOutcome::NoPackagesFound { files_scanned } => *files_scanned,
        }
    }
}

/// Scans a target and aggregates package usage.
///
/// Directory targets tolerate unreadable entries below the root. A root
/// that cannot be listed, or a designated file that cannot be read, fails
/// with [`Error::Io`].
pub fn scan(target: &AnalysisTarget) -> Result<ScanOutcome> {
    let (tree, files, deep_dive, files_scanned) = match target {
        AnalysisTarget::Directory(root) => {
            let outcome = walker::walk(root);
            if let Some(source) = outcome.root_error {
                return Err(Error::Io {
                    path: root.clone(),
                    source,
                });
            }
            if outcome.skipped_entries > 0 {
                info!(skipped = outcome.skipped_entries, "some entries could not be read");
            }
            (
                Some(outcome.tree),
                outcome.files,
                outcome.deep_dive,
                outcome.files_scanned,
            )
        }
        AnalysisTarget::File(path) => scan_files(std::slice::from_ref(path))?,
        AnalysisTarget::Files(paths) => scan_files(paths)?,
    };

    let (usage, packages) = aggregate(&files);
    debug!(
        files_scanned,
        files_with_packages = files.len(),
        packages = packages.len(),
        "scan complete"
    );

    if usage.is_empty() {
        return Ok(ScanOutcome::NoPackagesFound { files_scanned });
    }

    Ok(ScanOutcome::Found(ProjectScan {
        tree,
        files,
        deep_dive,
        files_scanned,
        usage,
        packages,
    }))
}

type FileScan = (Option<ProjectTree>, FileMap, Vec<PathBuf>, usize);

fn scan_files(paths: &[PathBuf]) -> Result<FileScan> {
    let mut files = FileMap::new();
    let mut deep_dive = Vec::new();

    for path in paths {
        let analysis = analyze_file(path)?;
        if analysis.needs_deep_dive() && !deep_dive.contains(&analysis.path) {
            deep_dive.push(analysis.path.clone());
        }
        if !analysis.packages.is_empty() {
            files.insert(analysis.path, analysis.packages);
        }
    }

    Ok((None, files, deep_dive, paths.len()))
}
