//! Blob attribute models.
//!
//! Every blob carries a sidecar of attributes next to its bytes: free-form
//! headers (one of which records the name the blob was written under),
//! metrics computed at write time, and a soft-delete tombstone.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// Prefix applied to header keys when they are stored in the property map.
pub const HEADER_PREFIX: &str = "@";
/// Header recording the name (usually the asset path) the blob was written under.
pub const BLOB_NAME_HEADER: &str = "BlobStore.blob-name";

/// Checksum algorithms recorded for assets and blobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}
impl HashAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }
}
impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "md5" => Ok(Self::Md5),
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            _ => Err(s.to_string()),
        }
    }
}

/// Metrics computed by the blob store when the blob was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobMetrics {
    pub created: OffsetDateTime,
    pub content_size: u64,
    pub checksums: BTreeMap<HashAlgorithm, String>,
}
impl BlobMetrics {
    pub fn new(created: OffsetDateTime, content_size: u64) -> Self {
        Self { created, content_size, checksums: BTreeMap::new() }
    }

    pub fn with_checksum(mut self, algorithm: HashAlgorithm, digest: impl Into<String>) -> Self {
        self.checksums.insert(algorithm, digest.into());
        self
    }

    pub fn checksum(&self, algorithm: HashAlgorithm) -> Option<&str> {
        self.checksums.get(&algorithm).map(String::as_str)
    }

    pub fn sha1(&self) -> Option<&str> {
        self.checksum(HashAlgorithm::Sha1)
    }
}

/// Sidecar metadata for a blob.
///
/// Read-only from the point of view of anything consuming a
/// [`BlobStore`](crate::BlobStore); the builder methods exist for backends and
/// test fixtures.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlobAttributes {
    properties: BTreeMap<String, String>,
    metrics: Option<BlobMetrics>,
    deleted: bool,
    deleted_reason: Option<String>,
}

impl BlobAttributes {
    pub fn new(properties: BTreeMap<String, String>, metrics: Option<BlobMetrics>) -> Self {
        Self { properties, metrics, deleted: false, deleted_reason: None }
    }

    /// Set a header, storing it under its prefixed key.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.properties.insert(format!("{HEADER_PREFIX}{name}"), value.into());
        self
    }

    pub fn with_metrics(mut self, metrics: BlobMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Mark the blob as soft-deleted; it will be removed on the next compact.
    pub fn tombstoned(mut self, reason: impl Into<String>) -> Self {
        self.deleted = true;
        self.deleted_reason = Some(reason.into());
        self
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Look up a header by its unprefixed name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.properties.get(&format!("{HEADER_PREFIX}{name}")).map(String::as_str)
    }

    /// The name recorded when the blob was written.
    pub fn blob_name(&self) -> Option<&str> {
        self.header(BLOB_NAME_HEADER)
    }

    pub fn metrics(&self) -> Option<&BlobMetrics> {
        self.metrics.as_ref()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn deleted_reason(&self) -> Option<&str> {
        self.deleted_reason.as_deref()
    }
}
