//! Blob identifiers and references.
//!
//! A [`BlobId`] names a blob inside one blob store. A [`BlobRef`] pairs it
//! with the name of the store that holds it; its text form is
//! `store@blob-id`.

use crate::error::{ErrorKind, Result};
use std::fmt;
use std::str::FromStr;

const REF_SEPARATOR: char = '@';

/// Identifier of a blob within a single blob store.
///
/// Blob ids end up as object keys and file names in backends, so anything
/// that could escape a directory or truncate a syscall is rejected.
///
/// # Examples
///
/// ```
/// use depot_storage::BlobId;
///
/// assert!(BlobId::new("a8f2c1d0-6b1e-4bb4-9a53-0c3e5d7f9a11").is_ok());
/// assert!(BlobId::new("../escape").is_err());
/// assert!(BlobId::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlobId(String);

impl BlobId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let invalid = id.is_empty()
            || id == "."
            || id == ".."
            || id.contains(['/', '\\', '\0', REF_SEPARATOR])
            || id.chars().any(char::is_whitespace);
        if invalid {
            exn::bail!(ErrorKind::InvalidBlobId(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
impl AsRef<str> for BlobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reference from an asset to a blob held by a named blob store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobRef {
    store: String,
    blob: BlobId,
}

impl BlobRef {
    pub fn new(store: impl Into<String>, blob: BlobId) -> Self {
        Self { store: store.into(), blob }
    }

    /// Name of the blob store holding the blob.
    pub fn store(&self) -> &str {
        &self.store
    }

    pub fn blob_id(&self) -> &BlobId {
        &self.blob
    }
}
impl fmt::Display for BlobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{REF_SEPARATOR}{}", self.store, self.blob)
    }
}
impl FromStr for BlobRef {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        let Some((store, blob)) = s.split_once(REF_SEPARATOR) else {
            exn::bail!(ErrorKind::InvalidBlobRef(s.to_string()));
        };
        if store.is_empty() {
            exn::bail!(ErrorKind::InvalidBlobRef(s.to_string()));
        }
        let blob = match BlobId::new(blob) {
            Ok(blob) => blob,
            Err(_) => exn::bail!(ErrorKind::InvalidBlobRef(s.to_string())),
        };
        Ok(Self::new(store, blob))
    }
}
