//! Blob Store Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Backends translate whatever their SDK throws into one of the closed
//! [`ErrorKind`] variants below. Callers never inspect SDK error types or
//! message strings; they ask the kind whether it is an infrastructure problem
//! via [`ErrorKind::is_infrastructure`].

use crate::id::BlobId;
use derive_more::{Display, Error};
use std::io::{Error as IoError, ErrorKind as IoErrorKind};

/// A blob store error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for blob store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
///
/// ### Infrastructure
/// The store could not be reached or did not answer in time. Nothing is known
/// about the blob itself:
/// - [`ErrorKind::Connection`]
/// - [`ErrorKind::Timeout`]
/// - [`ErrorKind::UnknownHost`]
/// - [`ErrorKind::NoRoute`]
/// - [`ErrorKind::ClosedChannel`]
/// - [`ErrorKind::Protocol`]
/// - [`ErrorKind::Provider`]
///
/// ### Data
/// The store answered, and the answer is bad news for the blob:
/// - [`ErrorKind::NotFound`]
/// - [`ErrorKind::Corrupt`]
/// - [`ErrorKind::PermissionDenied`]
/// - [`ErrorKind::InvalidBlobId`]
/// - [`ErrorKind::InvalidBlobRef`]
/// - [`ErrorKind::Backend`]
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Blob (or its attributes) does not exist.
    #[display("blob not found: {_0}")]
    NotFound(#[error(not(source))] BlobId),
    /// Stored attributes or content could not be decoded.
    #[display("corrupt blob: {_0}")]
    Corrupt(#[error(not(source))] BlobId),
    /// Access denied (permissions or credentials).
    #[display("permission denied: {_0}")]
    PermissionDenied(#[error(not(source))] BlobId),
    /// Blob id contains characters that cannot be stored.
    #[display("invalid blob id: {_0:?}")]
    InvalidBlobId(#[error(not(source))] String),
    /// Blob reference is not of the form `store@blob-id`.
    #[display("invalid blob reference: {_0:?}")]
    InvalidBlobRef(#[error(not(source))] String),
    /// Connection refused, reset or aborted.
    #[display("connection failure: {_0}")]
    Connection(#[error(not(source))] String),
    /// Request or socket timed out.
    #[display("timed out: {_0}")]
    Timeout(#[error(not(source))] String),
    /// Store endpoint could not be resolved.
    #[display("unknown host: {_0}")]
    UnknownHost(#[error(not(source))] String),
    /// Network or host unreachable.
    #[display("no route to host: {_0}")]
    NoRoute(#[error(not(source))] String),
    /// The channel/stream to the store was closed mid-request.
    #[display("channel closed")]
    ClosedChannel,
    /// Malformed response on the wire.
    #[display("protocol error: {_0}")]
    Protocol(#[error(not(source))] String),
    /// Transient client/service error reported by a cloud provider SDK
    /// (S3, Azure, Google Cloud storage exceptions).
    #[display("{provider} storage error: {message}")]
    Provider { provider: String, message: String },
    /// Backend-specific error that is not known to be transient.
    #[display("backend error: {_0}")]
    Backend(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` for connectivity, timeout and provider-transient
    /// failures: the store said nothing about whether the blob exists.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::Connection(_)
                | Self::Timeout(_)
                | Self::UnknownHost(_)
                | Self::NoRoute(_)
                | Self::ClosedChannel
                | Self::Protocol(_)
                | Self::Provider { .. }
        )
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        self.is_infrastructure()
    }

    /// Translate an I/O error raised while accessing `blob` into the closed
    /// taxonomy. Intended for filesystem-like backends.
    pub fn from_io(err: &IoError, blob: &BlobId) -> Self {
        match err.kind() {
            IoErrorKind::NotFound => Self::NotFound(blob.clone()),
            IoErrorKind::PermissionDenied => Self::PermissionDenied(blob.clone()),
            IoErrorKind::InvalidData | IoErrorKind::UnexpectedEof => Self::Corrupt(blob.clone()),
            IoErrorKind::ConnectionRefused | IoErrorKind::ConnectionReset | IoErrorKind::ConnectionAborted => {
                Self::Connection(err.to_string())
            },
            IoErrorKind::NotConnected | IoErrorKind::BrokenPipe => Self::ClosedChannel,
            IoErrorKind::TimedOut | IoErrorKind::Interrupted => Self::Timeout(err.to_string()),
            IoErrorKind::HostUnreachable | IoErrorKind::NetworkUnreachable => Self::NoRoute(err.to_string()),
            _ => Self::Backend(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn blob() -> BlobId {
        BlobId::new("0f3c2a4e-b7f4-4a9c-9c5e-1f2d3c4b5a69").unwrap()
    }

    #[rstest]
    #[case(ErrorKind::Connection("refused".into()), true)]
    #[case(ErrorKind::Timeout("read".into()), true)]
    #[case(ErrorKind::UnknownHost("s3.invalid".into()), true)]
    #[case(ErrorKind::NoRoute("10.0.0.1".into()), true)]
    #[case(ErrorKind::ClosedChannel, true)]
    #[case(ErrorKind::Protocol("bad chunk".into()), true)]
    #[case(ErrorKind::Provider { provider: "s3".into(), message: "SlowDown".into() }, true)]
    #[case(ErrorKind::NotFound(blob()), false)]
    #[case(ErrorKind::Corrupt(blob()), false)]
    #[case(ErrorKind::PermissionDenied(blob()), false)]
    #[case(ErrorKind::Backend("unexpected".into()), false)]
    fn test_infrastructure_classification(#[case] kind: ErrorKind, #[case] expected: bool) {
        assert_eq!(kind.is_infrastructure(), expected);
        assert_eq!(kind.is_retryable(), expected);
    }

    #[rstest]
    #[case(IoErrorKind::NotFound, true, false)]
    #[case(IoErrorKind::ConnectionRefused, false, true)]
    #[case(IoErrorKind::ConnectionReset, false, true)]
    #[case(IoErrorKind::TimedOut, false, true)]
    #[case(IoErrorKind::BrokenPipe, false, true)]
    #[case(IoErrorKind::PermissionDenied, false, false)]
    #[case(IoErrorKind::InvalidData, false, false)]
    fn test_from_io(#[case] io_kind: IoErrorKind, #[case] not_found: bool, #[case] infrastructure: bool) {
        let kind = ErrorKind::from_io(&IoError::new(io_kind, "boom"), &blob());
        assert_eq!(matches!(kind, ErrorKind::NotFound(_)), not_found);
        assert_eq!(kind.is_infrastructure(), infrastructure);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ErrorKind::Provider { provider: "azure".into(), message: "ServerBusy".into() }.to_string(),
            "azure storage error: ServerBusy"
        );
        assert_eq!(ErrorKind::ClosedChannel.to_string(), "channel closed");
    }
}
