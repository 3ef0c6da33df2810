//! Engine error types.

use orihon_stream::RecordKey;
use thiserror::Error;

/// Errors from key-addressed bulk rewrites.
///
/// Cursor-relative operations degrade with a log on bad preconditions;
/// typed errors are reserved for violations of the caller's key contract,
/// which would otherwise be indistinguishable from legitimately empty
/// ranges.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RewriteError {
    /// A boundary key did not resolve to any record.
    ///
    /// Keys go stale when the record they named was removed; callers must
    /// re-fetch keys after mutations that may have dropped the record.
    #[error("Boundary record not found: key {0}")]
    BoundaryNotFound(RecordKey),

    /// The resolved boundaries are in the wrong order.
    #[error("Inverted range: resolved indices {from} > {to}")]
    InvertedRange {
        /// Resolved start index.
        from: usize,
        /// Resolved end index (exclusive).
        to: usize,
    },
}

impl RewriteError {
    pub(crate) fn inverted(from: usize, to: usize) -> Self {
        Self::InvertedRange { from, to }
    }
}
