//! Tally Core - import extraction and package usage aggregation.
//!
//! This crate is the local half of tally. It finds which registry packages a
//! JavaScript/TypeScript code base references, without parsing:
//!
//! - [`extract`]: regex scans turning source text into [`PackageName`]s
//! - [`walker`]: recursive directory walk producing a [`ProjectTree`]
//! - [`aggregate`]: file → packages map folded into a [`UsageIndex`]
//! - [`report`]: usage + registry metadata merged into an [`AnalysisReport`]
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   tally-cli     │  (User interface)
//! └────────┬────────┘
//!          │
//!          ├──────────────────────┐
//!          ▼                      ▼
//! ┌─────────────────┐    ┌─────────────────┐
//! │   tally-core    │◀───│   tally-info    │  (npm registry metadata)
//! └─────────────────┘    └─────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use tally_core::{scan, AnalysisTarget, ScanOutcome};
//! use std::collections::BTreeMap;
//!
//! let target = AnalysisTarget::directory("./my-app")?;
//! match scan(&target)? {
//!     ScanOutcome::Found(project) => {
//!         let report = tally_core::report::assemble(project, BTreeMap::new());
//!         for package in &report.packages {
//!             println!("{} used in {} files", package.name, package.count);
//!         }
//!     }
//!     ScanOutcome::NoPackagesFound { .. } => println!("No packages found"),
//! }
//! # Ok::<(), tally_core::Error>(())
//! ```

pub mod aggregate;
pub mod error;
pub mod extract;
pub mod report;
pub mod scan;
pub mod target;
pub mod types;
pub mod walker;

/// A file referencing more distinct packages than this is suggested for a
/// deep dive.
pub const DEEP_DIVE_THRESHOLD: usize = 3;

// Re-export core types for convenience
pub use error::{Error, Result};
pub use scan::{scan, ProjectScan, ScanOutcome};
pub use target::AnalysisTarget;
pub use types::{
    AnalysisReport, FileAnalysis, FileMap, PackageMetadata, PackageName, PackageReport,
    PackageUsage, ProjectTree, Summary, TreeNode, UsageIndex, DEFAULT_LICENSE,
};
