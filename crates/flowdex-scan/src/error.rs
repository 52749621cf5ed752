//! Fatal error types for the scan layer.
//!
//! Almost nothing aborts a scan: malformed manifests, unresolved
//! dependencies and broken modules are all recorded in the ledger while the
//! scan continues. The variants here are the exceptions that escalate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a scan outright.
#[derive(Debug, Error)]
pub enum FatalError {
    /// The scan root does not exist or is not a directory.
    #[error("scan root not found: {path}")]
    RootNotFound { path: PathBuf },

    /// A manifest file is present but unreadable at the file-system level
    /// (permission, disk). Distinct from malformed content, which degrades
    /// to a first-party-only scan.
    #[error("manifest {path} exists but could not be read: {source}")]
    ManifestIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The exclusion pattern is not a valid regular expression.
    #[error("invalid exclusion pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// I/O error outside the manifest path.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
