//! Storage error taxonomy.
//!
//! Every failure inside `store` aborts the whole call and is surfaced to the
//! caller; `delete` alone converts failure into a boolean. Nothing is retried.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for core storage operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failures surfaced by placement, verification, and retrieval.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A path the deposit workflow promised would be a soft link is not one
    /// (either level of the two-level chain).
    #[error("\"{}\" is not a soft link", .path.display())]
    NotASymlink { path: PathBuf },

    /// At least one declared fixity failed verification. The file has already
    /// been relocated to `path`, but placement must not be reported as
    /// successful.
    #[error("fixity check on \"{}\" failed for entity {}", .path.display(), .pid)]
    FixityMismatch { pid: String, path: PathBuf },

    /// An algorithm name outside the built-in set had no registered plugin.
    #[error("no checksum plugin registered for algorithm \"{0}\"")]
    UnknownPlugin(String),

    /// A registered checksum plugin ran and failed.
    #[error("checksum plugin \"{name}\" failed")]
    Plugin {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// Invalid offsets for a ranged read.
    #[error("invalid byte range {start}..={end} for a {len}-byte file")]
    RangeOutOfBounds { start: u64, end: u64, len: u64 },

    /// Filesystem failure, tagged with the operation and path for diagnosis.
    #[error("{} {}: {}", .op, .path.display(), .source)]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            op,
            path: path.into(),
            source,
        }
    }
}
