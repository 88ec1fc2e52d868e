//! Access Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An access-filtering error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for access-filtered operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Active content selectors could not be loaded.
    #[display("selector service unavailable")]
    SelectorUnavailable,
    /// The browse tree of a repository could not be read.
    #[display("browse failed for repository {_0}")]
    Browse(#[error(not(source))] String),
    /// The search backend failed to execute a query.
    #[display("search backend failure")]
    Search,
    /// The client's continuation token was rejected.
    #[display("invalid continuation token")]
    Token,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Token)
    }
}
