//! Core data types for tally analysis.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// License reported when the registry document does not declare one.
pub const DEFAULT_LICENSE: &str = "Unknown";

/// Normalized registry package name.
///
/// Built from an import specifier: the first path segment, or the first two
/// segments for scoped packages (`@scope/name`). Never empty and never a
/// relative or absolute path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageName(String);

impl PackageName {
    /// Normalizes an import specifier into a package name.
    ///
    /// Returns `None` for empty specifiers, paths starting with `.` or `/`,
    /// and scoped specifiers missing their name segment (`@scope`).
    ///
    /// ```
    /// use tally_core::PackageName;
    ///
    /// assert_eq!(PackageName::from_specifier("lodash/fp").unwrap().as_str(), "lodash");
    /// assert_eq!(PackageName::from_specifier("@babel/core/lib").unwrap().as_str(), "@babel/core");
    /// assert!(PackageName::from_specifier("./local").is_none());
    /// ```
    pub fn from_specifier(specifier: &str) -> Option<Self> {
        if specifier.is_empty() || specifier.starts_with('.') || specifier.starts_with('/') {
            return None;
        }

        let mut segments = specifier.split('/');
        let first = segments.next().filter(|s| !s.is_empty())?;

        if first.starts_with('@') {
            let name = segments.next().filter(|s| !s.is_empty())?;
            if first.len() == 1 {
                return None;
            }
            Some(Self(format!("{}/{}", first, name)))
        } else {
            Some(Self(first.to_string()))
        }
    }

    /// The package name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a scoped (`@scope/name`) package.
    pub fn is_scoped(&self) -> bool {
        self.0.starts_with('@')
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PackageName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PackageName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match Self::from_specifier(&value) {
            Some(name) if name.0 == value => Ok(name),
            _ => Err(format!("invalid package name: {:?}", value)),
        }
    }
}

impl From<PackageName> for String {
    fn from(name: PackageName) -> Self {
        name.0
    }
}

/// Packages referenced by each analyzed file, keyed by absolute path.
pub type FileMap = BTreeMap<PathBuf, BTreeSet<PackageName>>;

/// Packages referenced by a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAnalysis {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Distinct packages the file references.
    pub packages: BTreeSet<PackageName>,
}

impl FileAnalysis {
    /// Create a new file analysis.
    pub fn new(path: impl Into<PathBuf>, packages: BTreeSet<PackageName>) -> Self {
        Self {
            path: path.into(),
            packages,
        }
    }

    /// Whether the file references more packages than the deep-dive threshold.
    pub fn needs_deep_dive(&self) -> bool {
        self.packages.len() > crate::DEEP_DIVE_THRESHOLD
    }
}

/// Node of the directory hierarchy visited during a walk.
///
/// Directory children list subdirectories before files, each group in the
/// order the directory listing returned them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    Directory {
        name: String,
        path: PathBuf,
        children: Vec<TreeNode>,
    },
    File {
        name: String,
        path: PathBuf,
    },
}

/// Root of a walked directory hierarchy.
pub type ProjectTree = TreeNode;

impl TreeNode {
    /// Display name of the node (last path component).
    pub fn name(&self) -> &str {
        match self {
            TreeNode::Directory { name, .. } | TreeNode::File { name, .. } => name,
        }
    }

    /// Absolute path of the node.
    pub fn path(&self) -> &Path {
        match self {
            TreeNode::Directory { path, .. } | TreeNode::File { path, .. } => path,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, TreeNode::Directory { .. })
    }

    /// Direct children (empty for files).
    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Directory { children, .. } => children,
            TreeNode::File { .. } => &[],
        }
    }

    /// Number of file nodes in this subtree.
    pub fn file_count(&self) -> usize {
        match self {
            TreeNode::File { .. } => 1,
            TreeNode::Directory { children, .. } => children.iter().map(TreeNode::file_count).sum(),
        }
    }
}

/// Where a package is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageUsage {
    /// Number of files referencing the package.
    pub count: usize,
    /// Referencing files in first-seen order.
    pub files: Vec<PathBuf>,
}

/// Usage sites of every package found in a scan.
pub type UsageIndex = BTreeMap<PackageName, PackageUsage>;

/// Registry metadata for one package.
///
/// When the primary registry request fails the record is degraded: only
/// `name`, `error` and an empty `version` are meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: PackageName,
    pub description: String,
    /// Latest published version (`dist-tags.latest`).
    pub version: String,
    pub license: String,
    pub homepage: Option<String>,
    pub repository: Option<String>,
    pub maintainers: usize,
    /// Publish timestamp of the latest version.
    pub last_published: Option<String>,
    /// Dependency names declared by the latest version.
    pub dependencies: Vec<String>,
    pub weekly_downloads: u64,
    /// Suggested replacement packages.
    pub alternatives: Vec<String>,
    /// Why the primary fetch failed, for degraded records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PackageMetadata {
    /// Create a record with every optional field at its documented default.
    pub fn new(name: PackageName, version: impl Into<String>) -> Self {
        Self {
            name,
            description: String::new(),
            version: version.into(),
            license: DEFAULT_LICENSE.to_string(),
            homepage: None,
            repository: None,
            maintainers: 0,
            last_published: None,
            dependencies: Vec::new(),
            weekly_downloads: 0,
            alternatives: Vec::new(),
            error: None,
        }
    }

    /// Create a degraded record standing in for a failed fetch.
    pub fn degraded(name: PackageName, error: impl Into<String>) -> Self {
        Self {
            name,
            description: String::new(),
            version: String::new(),
            license: String::new(),
            homepage: None,
            repository: None,
            maintainers: 0,
            last_published: None,
            dependencies: Vec::new(),
            weekly_downloads: 0,
            alternatives: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// One ranked package in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageReport {
    pub name: PackageName,
    pub count: usize,
    pub files: Vec<PathBuf>,
    /// Absent when metadata was not fetched (offline runs).
    pub metadata: Option<PackageMetadata>,
}

/// Summary counts of a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Source files read during the scan.
    pub files_scanned: usize,
    /// Files that reference at least one package.
    pub files_analyzed: usize,
    /// Distinct packages found.
    pub packages_found: usize,
    /// Packages whose registry fetch failed.
    pub degraded_packages: usize,
}

/// Everything the render surface needs for one analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Walked hierarchy; only present for directory analyses.
    pub tree: Option<ProjectTree>,
    /// Packages per analyzed file.
    pub files: FileMap,
    /// Files flagged for closer review.
    pub deep_dive: Vec<PathBuf>,
    /// Packages ranked by descending usage.
    pub packages: Vec<PackageReport>,
    pub summary: Summary,
}

impl AnalysisReport {
    /// Looks up a ranked package by name.
    pub fn package(&self, name: &str) -> Option<&PackageReport> {
        self.packages.iter().find(|p| p.name.as_str() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> PackageName {
        PackageName::from_specifier(s).unwrap()
    }

    #[test]
    fn test_unscoped_specifier_keeps_first_segment() {
        assert_eq!(name("lodash").as_str(), "lodash");
        assert_eq!(name("lodash/fp").as_str(), "lodash");
        assert_eq!(name("react-dom/client").as_str(), "react-dom");
    }

    // `@scope/pkg` is kept whole; naive first-segment splitting would
    // truncate it to `@scope`.
    #[test]
    fn test_scoped_specifier_keeps_scope_and_name() {
        assert_eq!(name("@scope/pkg").as_str(), "@scope/pkg");
        assert_eq!(name("@babel/core/lib/index").as_str(), "@babel/core");
        assert!(name("@types/node").is_scoped());
        assert_ne!(name("@scope/pkg").as_str(), "@scope");
    }

    #[test]
    fn test_rejected_specifiers() {
        assert!(PackageName::from_specifier("").is_none());
        assert!(PackageName::from_specifier("./local").is_none());
        assert!(PackageName::from_specifier("../up").is_none());
        assert!(PackageName::from_specifier("/abs/path").is_none());
        assert!(PackageName::from_specifier(".hidden").is_none());
        assert!(PackageName::from_specifier("@scope").is_none());
        assert!(PackageName::from_specifier("@scope/").is_none());
        assert!(PackageName::from_specifier("@/x").is_none());
    }

    #[test]
    fn test_package_name_serde_round_trip_rejects_invalid() {
        let json = serde_json::to_string(&name("@scope/pkg")).unwrap();
        assert_eq!(json, "\"@scope/pkg\"");

        let parsed: PackageName = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, name("@scope/pkg"));

        assert!(serde_json::from_str::<PackageName>("\"lodash/fp\"").is_err());
        assert!(serde_json::from_str::<PackageName>("\"./x\"").is_err());
    }

    #[test]
    fn test_degraded_metadata() {
        let meta = PackageMetadata::degraded(name("left-pad"), "HTTP 404");
        assert!(meta.is_degraded());
        assert!(meta.version.is_empty());
        assert_eq!(meta.weekly_downloads, 0);
        assert!(meta.alternatives.is_empty());
        assert_eq!(meta.error.as_deref(), Some("HTTP 404"));
    }

    #[test]
    fn test_metadata_defaults() {
        let meta = PackageMetadata::new(name("react"), "18.3.1");
        assert!(!meta.is_degraded());
        assert_eq!(meta.license, DEFAULT_LICENSE);
        assert!(meta.description.is_empty());
        assert!(meta.dependencies.is_empty());
    }

    #[test]
    fn test_tree_file_count() {
        let tree = TreeNode::Directory {
            name: "root".into(),
            path: PathBuf::from("/root"),
            children: vec![
                TreeNode::Directory {
                    name: "src".into(),
                    path: PathBuf::from("/root/src"),
                    children: vec![TreeNode::File {
                        name: "a.ts".into(),
                        path: PathBuf::from("/root/src/a.ts"),
                    }],
                },
                TreeNode::File {
                    name: "b.js".into(),
                    path: PathBuf::from("/root/b.js"),
                },
            ],
        };

        assert_eq!(tree.file_count(), 2);
        assert_eq!(tree.children().len(), 2);
        assert!(tree.children()[0].is_directory());
        assert_eq!(tree.children()[1].name(), "b.js");
    }
}
