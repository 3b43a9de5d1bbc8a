//! Resolution of user-supplied paths into an analysis target.
//!
//! Validation happens up front: a target that resolves successfully can be
//! scanned without further input errors.

use crate::error::{Error, Result};
use crate::walker::is_supported_source;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// What a scan should cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisTarget {
    /// A single source file.
    File(PathBuf),
    /// A directory root, walked recursively.
    Directory(PathBuf),
    /// An explicit list of source files.
    Files(Vec<PathBuf>),
}

impl AnalysisTarget {
    /// Detect the target from command-line paths.
    ///
    /// - one directory → [`AnalysisTarget::Directory`]
    /// - one file → [`AnalysisTarget::File`]
    /// - several paths → [`AnalysisTarget::Files`] (all must be files)
    pub fn from_paths(paths: &[PathBuf]) -> Result<Self> {
        match paths {
            [] => Err(Error::NoTargets),
            [single] => {
                let resolved = resolve(single)?;
                if resolved.is_dir() {
                    Ok(Self::Directory(resolved))
                } else {
                    Self::file(resolved)
                }
            }
            many => Self::files(many),
        }
    }

    /// Target a single source file.
    pub fn file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::File(resolve_source_file(path.as_ref())?))
    }

    /// Target a directory root.
    pub fn directory(path: impl AsRef<Path>) -> Result<Self> {
        let resolved = resolve(path.as_ref())?;
        if !resolved.is_dir() {
            return Err(Error::TargetNotFound { path: resolved });
        }
        Ok(Self::Directory(resolved))
    }

    /// Target a list of source files. Every member is validated before any
    /// work starts.
    pub fn files<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        if paths.is_empty() {
            return Err(Error::NoTargets);
        }

        let mut resolved = paths
            .iter()
            .map(|p| resolve_source_file(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let mut seen = HashSet::new();
        resolved.retain(|p| seen.insert(p.clone()));

        Ok(Self::Files(resolved))
    }

    /// Whether the scan produces a directory tree.
    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory(_))
    }

    /// Directory used as the display root of a report.
    pub fn root(&self) -> Option<&Path> {
        match self {
            Self::Directory(root) => Some(root),
            Self::File(file) => file.parent(),
            Self::Files(files) => files.first().and_then(|f| f.parent()),
        }
    }
}

fn resolve(path: &Path) -> Result<PathBuf> {
    path.canonicalize().map_err(|_| Error::TargetNotFound {
        path: path.to_path_buf(),
    })
}

fn resolve_source_file(path: &Path) -> Result<PathBuf> {
    let resolved = resolve(path)?;

    if resolved.is_dir() {
        return Err(Error::NotAFile { path: resolved });
    }
    if !is_supported_source(&resolved) {
        return Err(Error::UnsupportedExtension { path: resolved });
    }

    Ok(resolved)
}
