//! Content Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A content error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for content operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The content store could not be queried.
    #[display("content store error")]
    Store,
    /// The continuation token handed to `browse` was rejected.
    #[display("invalid continuation token")]
    Token,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store)
    }
}
