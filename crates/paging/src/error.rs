//! Continuation Token Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Every variant means "reject this request". None of them are retryable: the
//! same token against the same query will fail the same way forever.

use derive_more::{Display, Error};

/// A token error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for token operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a continuation token was rejected. Each variant carries the token as
/// it was received.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The token is not a validly encoded string at all.
    #[display("Continuation token {_0} is not valid.")]
    Malformed(#[error(not(source))] String),
    /// The token decodes, but not into exactly two `:`-separated parts.
    #[display("Unable to parse token {_0}")]
    Unparseable(#[error(not(source))] String),
    /// The offset segment is not a non-negative integer.
    #[display("Continuation token {_0} is not valid. index must be a valid integer.")]
    IndexInvalid(#[error(not(source))] String),
    /// The token was issued for a different query.
    #[display("Continuation token {_0} does not match this query")]
    Mismatch(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` when the token could not be read at all, as opposed to
    /// carrying a bad offset or belonging to another query.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_) | Self::Unparseable(_))
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
