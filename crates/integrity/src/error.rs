//! Integrity Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Integrity *verdicts* are not errors: a missing or mismatched blob is a
//! normal outcome of a check and is reported as a [`Verdict`](crate::Verdict).
//! The kinds below cover the cases where a check could not be carried out.

use derive_more::{Display, Error};

/// An integrity scan error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for integrity scan operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// ### Per-asset
/// Counted as a failure for that asset; the scan carries on:
/// - [`ErrorKind::ForeignBlobStore`]
///
/// ### Per-scan
/// The scan of the repository stops:
/// - [`ErrorKind::Browse`]
///
/// ### Setup
/// - [`ErrorKind::InvalidBatchSize`]
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The asset's blob reference points at a blob store other than the one
    /// being checked.
    #[display("blob {_0} belongs to another blob store")]
    ForeignBlobStore(#[error(not(source))] String),
    /// A page of assets could not be fetched from the repository.
    #[display("failed to browse assets of repository {_0}")]
    Browse(#[error(not(source))] String),
    /// Browse batch size must be greater than zero.
    #[display("browse batch size must be greater than zero")]
    InvalidBatchSize,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Browse(_))
    }
}
