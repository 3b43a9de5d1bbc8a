//! Recursive directory walk.
//!
//! The walk is synchronous and depth-first. Each call returns its own
//! [`WalkOutcome`] which the parent merges explicitly, so there is no shared
//! accumulator across recursive calls. Problems with individual entries are
//! logged and skipped; they never abort the walk.

use crate::extract;
use crate::types::{FileMap, TreeNode};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Source file suffixes that are scanned for imports (case-sensitive).
pub const SUPPORTED_EXTENSIONS: [&str; 4] = [".js", ".jsx", ".ts", ".tsx"];

/// Directory names never descended into, in addition to dot-directories.
pub const EXCLUDED_DIRECTORIES: [&str; 2] = ["node_modules", ".git"];

/// Whether a path names a supported source file.
pub fn is_supported_source(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| SUPPORTED_EXTENSIONS.iter().any(|ext| name.ends_with(ext)))
}

/// Whether a directory with this name is skipped during traversal.
pub fn is_excluded_directory(name: &str) -> bool {
    name.starts_with('.') || EXCLUDED_DIRECTORIES.contains(&name)
}

/// Result of walking one directory (and everything below it).
#[derive(Debug)]
pub struct WalkOutcome {
    /// Hierarchy actually visited.
    pub tree: TreeNode,
    /// Packages per file, only for files referencing at least one package.
    pub files: FileMap,
    /// Files exceeding the deep-dive threshold.
    pub deep_dive: Vec<PathBuf>,
    /// Source files successfully read.
    pub files_scanned: usize,
    /// Entries skipped because they could not be read.
    pub skipped_entries: usize,
    /// Why the root itself could not be listed, if it could not.
    pub root_error: Option<io::Error>,
}

impl WalkOutcome {
    fn unreadable(root: &Path, error: io::Error) -> Self {
        Self {
            tree: TreeNode::Directory {
                name: node_name(root),
                path: root.to_path_buf(),
                children: Vec::new(),
            },
            files: FileMap::new(),
            deep_dive: Vec::new(),
            files_scanned: 0,
            skipped_entries: 1,
            root_error: Some(error),
        }
    }
}

/// Walks `root` and analyzes every eligible source file below it.
///
/// An unreadable root yields an empty outcome (with a warning) rather than
/// an error; the cause is kept in [`WalkOutcome::root_error`].
pub fn walk(root: &Path) -> WalkOutcome {
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());

    match walk_directory(&root) {
        Ok(outcome) => outcome,
        Err(err) => WalkOutcome::unreadable(&root, err),
    }
}

/// Fails only when `dir` itself cannot be listed.
fn walk_directory(dir: &Path) -> io::Result<WalkOutcome> {
    let entries = fs::read_dir(dir).inspect_err(|err| {
        warn!(path = %dir.display(), error = %err, "skipping unreadable directory");
    })?;

    let mut skipped_entries = 0;
    let mut subdirectories = Vec::new();
    let mut source_files = Vec::new();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(path = %dir.display(), error = %err, "skipping unreadable entry");
                skipped_entries += 1;
                continue;
            }
        };

        // Symlinks report neither is_dir nor is_file here and are not followed.
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(err) => {
                warn!(path = %entry.path().display(), error = %err, "skipping entry without file type");
                skipped_entries += 1;
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();

        if file_type.is_dir() {
            if !is_excluded_directory(&name) {
                subdirectories.push(path);
            }
        } else if file_type.is_file() && is_supported_source(&path) {
            source_files.push((name, path));
        }
    }

    let mut children = Vec::with_capacity(subdirectories.len() + source_files.len());
    let mut files = FileMap::new();
    let mut deep_dive = Vec::new();
    let mut files_scanned = 0;

    for subdirectory in subdirectories {
        let Ok(child) = walk_directory(&subdirectory) else {
            skipped_entries += 1;
            continue;
        };

        children.push(child.tree);
        files.extend(child.files);
        deep_dive.extend(child.deep_dive);
        files_scanned += child.files_scanned;
        skipped_entries += child.skipped_entries;
    }

    for (name, path) in source_files {
        let analysis = match extract::analyze_file(&path) {
            Ok(analysis) => analysis,
            Err(err) => {
                warn!(error = %err, "skipping unreadable file");
                skipped_entries += 1;
                continue;
            }
        };

        debug!(path = %path.display(), packages = analysis.packages.len(), "scanned file");
        files_scanned += 1;

        if analysis.needs_deep_dive() {
            deep_dive.push(path.clone());
        }
        if !analysis.packages.is_empty() {
            files.insert(analysis.path, analysis.packages);
        }
        children.push(TreeNode::File { name, path });
    }

    Ok(WalkOutcome {
        tree: TreeNode::Directory {
            name: node_name(dir),
            path: dir.to_path_buf(),
            children,
        },
        files,
        deep_dive,
        files_scanned,
        skipped_entries,
        root_error: None,
    })
}

fn node_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
