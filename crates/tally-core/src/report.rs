//! Report assembly: usage index + registry metadata → ranked report.

use crate::scan::ProjectScan;
use crate::types::{
    AnalysisReport, PackageMetadata, PackageName, PackageReport, PackageUsage, Summary, UsageIndex,
};
use std::collections::BTreeMap;

/// Orders packages by descending usage count.
///
/// The sort is stable, so ties keep the index's key order.
pub fn rank_packages(usage: &UsageIndex) -> Vec<(&PackageName, &PackageUsage)> {
    let mut ranked: Vec<_> = usage.iter().collect();
    ranked.sort_by(|a, b| b.1.count.cmp(&a.1.count));
    ranked
}

/// Combines a scan with fetched metadata into a renderable report.
///
/// Every package of the scan appears exactly once. Packages missing from
/// `metadata` (e.g. when fetching was skipped) get `metadata: None`; entries
/// in `metadata` for packages the scan did not find are ignored.
pub fn assemble(
    scan: ProjectScan,
    mut metadata: BTreeMap<PackageName, PackageMetadata>,
) -> AnalysisReport {
    let packages: Vec<PackageReport> = rank_packages(&scan.usage)
        .into_iter()
        .map(|(name, usage)| PackageReport {
            name: name.clone(),
            count: usage.count,
            files: usage.files.clone(),
            metadata: metadata.remove(name),
        })
        .collect();

    let summary = Summary {
        files_scanned: scan.files_scanned,
        files_analyzed: scan.files.len(),
        packages_found: scan.usage.len(),
        degraded_packages: packages
            .iter()
            .filter(|p| p.metadata.as_ref().is_some_and(PackageMetadata::is_degraded))
            .count(),
    };

    AnalysisReport {
        tree: scan.tree,
        files: scan.files,
        deep_dive: scan.deep_dive,
        packages,
        summary,
    }
}
