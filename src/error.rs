//! Error types for the docrank library.

use std::io;
use thiserror::Error;

/// Result type alias for docrank operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during outline analysis and ranking.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The collaborator could not yield any text runs for a document.
    ///
    /// Corrupt, encrypted, or scanned-only documents end up here. The
    /// document is excluded from the corpus; the run continues.
    #[error("Extraction failure for '{document_id}': {reason}")]
    Extraction {
        /// Document the failure belongs to
        document_id: String,
        /// Collaborator-reported reason
        reason: String,
    },

    /// Heading candidates arrived out of reading order.
    ///
    /// This is a collaborator contract violation and is fatal for the
    /// affected document only.
    #[error("Candidates out of order at index {index} (order {found} after {previous})")]
    MalformedCandidateOrder {
        /// Position of the offending candidate
        index: usize,
        /// Order index that was found
        found: usize,
        /// Order index that preceded it
        previous: usize,
    },

    /// The single-flight cache computation failed.
    ///
    /// All waiters on the same fingerprint receive this error; no entry is
    /// written and the next lookup recomputes from scratch.
    #[error("Cached computation failed: {0}")]
    CacheCompute(String),

    /// A document exceeded its soft processing timeout.
    #[error("Document '{0}' timed out after {1} ms")]
    Timeout(String, u64),

    /// The run was cancelled before this document finished.
    #[error("Run cancelled")]
    Cancelled,

    /// The worker pool could not be started. Fatal for the whole run.
    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error is isolated to a single document.
    ///
    /// Per-document failures are reported and skipped; anything else aborts
    /// the whole run.
    pub fn is_document_scoped(&self) -> bool {
        matches!(
            self,
            Error::Extraction { .. }
                | Error::MalformedCandidateOrder { .. }
                | Error::CacheCompute(_)
                | Error::Timeout(_, _)
        )
    }
}
