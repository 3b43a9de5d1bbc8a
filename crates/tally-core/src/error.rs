//! Error types for tally core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for tally operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that reach the caller of a scan.
///
/// Per-entry problems met while walking a directory are never surfaced here;
/// they are logged and skipped so one bad entry cannot abort a scan.
#[derive(Debug, Error)]
pub enum Error {
    /// A designated target path does not exist.
    #[error("Target not found: {path}")]
    TargetNotFound {
        /// Path that was requested.
        path: PathBuf,
    },

    /// A designated file does not have a supported source extension.
    #[error("Unsupported file type: {path} (expected one of .js, .jsx, .ts, .tsx)")]
    UnsupportedExtension {
        /// Path of the rejected file.
        path: PathBuf,
    },

    /// A list of files was requested but a member is a directory.
    #[error("Expected a file but found a directory: {path}")]
    NotAFile {
        /// Offending path.
        path: PathBuf,
    },

    /// No target paths were supplied.
    #[error("No paths given to analyze")]
    NoTargets,

    /// A designated file exists but could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Whether this error comes from invalid user input rather than I/O.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Error::TargetNotFound { .. }
                | Error::UnsupportedExtension { .. }
                | Error::NotAFile { .. }
                | Error::NoTargets
        )
    }
}
