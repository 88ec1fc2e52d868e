//! In-memory blob store for testing.

use crate::attributes::{BLOB_NAME_HEADER, BlobAttributes, BlobMetrics, HashAlgorithm};
use crate::error::{ErrorKind, Result};
use crate::id::BlobId;
use crate::BlobStore;
use async_trait::async_trait;
use sha1::{Digest, Sha1};
use std::collections::HashMap;
use time::OffsetDateTime;
use tokio::sync::RwLock;

#[derive(Default)]
struct Entry {
    bytes: Option<Vec<u8>>,
    attributes: Option<BlobAttributes>,
}

#[derive(Default)]
struct Faults {
    attributes: Option<ErrorKind>,
    bytes: Option<ErrorKind>,
}

/// In-memory blob store for testing.
///
/// Blobs are stored in a `HashMap` behind a [`RwLock`], so trait methods
/// operate on `&self` without external synchronisation. Every part of a blob
/// can be broken independently: the bytes can go missing, the attributes can
/// go missing or be tombstoned, and either call can be made to fail with any
/// [`ErrorKind`].
///
/// # Examples
///
/// ```
/// use depot_storage::backend::MockBlobStore;
/// use depot_storage::error::ErrorKind;
/// use depot_storage::{BlobId, BlobStore};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MockBlobStore::default()
///     .with_blob("b1", "/org/example/lib-1.0.jar", b"jar bytes")
///     .fail_bytes("b1", ErrorKind::Timeout("read".into()));
/// let id = BlobId::new("b1")?;
/// assert!(store.blob_attributes(&id).await?.is_some());
/// assert!(store.bytes_exists(&id).await.is_err());
/// # Ok(())
/// # }
/// ```
pub struct MockBlobStore {
    name: String,
    blobs: RwLock<HashMap<BlobId, Entry>>,
    faults: RwLock<HashMap<BlobId, Faults>>,
}

impl MockBlobStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blobs: RwLock::new(HashMap::new()),
            faults: RwLock::new(HashMap::new()),
        }
    }

    fn id(id: &str) -> BlobId {
        // The panic here is DELIBERATE. MockBlobStore is intended to be used
        // in tests; if test setup is wrong, then test should not pass.
        match BlobId::new(id) {
            Ok(id) => id,
            Err(_) => panic!("MockBlobStore: invalid blob id {id:?}"),
        }
    }

    fn entry(&mut self, id: &str) -> &mut Entry {
        self.blobs.get_mut().entry(Self::id(id)).or_default()
    }

    fn faults(&mut self, id: &str) -> &mut Faults {
        self.faults.get_mut().entry(Self::id(id)).or_default()
    }

    /// Add a complete, healthy blob: bytes plus attributes carrying the blob
    /// name header and metrics with the SHA-1 of `bytes`.
    pub fn with_blob(mut self, id: &str, name: &str, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let metrics = BlobMetrics::new(OffsetDateTime::now_utc(), bytes.len() as u64)
            .with_checksum(HashAlgorithm::Sha1, sha1_hex(&bytes));
        let attributes = BlobAttributes::default().with_header(BLOB_NAME_HEADER, name).with_metrics(metrics);
        let entry = self.entry(id);
        entry.bytes = Some(bytes);
        entry.attributes = Some(attributes);
        self
    }

    /// Replace (or add) the attributes of a blob, leaving its bytes alone.
    pub fn with_attributes(mut self, id: &str, attributes: BlobAttributes) -> Self {
        self.entry(id).attributes = Some(attributes);
        self
    }

    /// Drop the byte payload of a blob, keeping its attributes.
    pub fn without_bytes(mut self, id: &str) -> Self {
        self.entry(id).bytes = None;
        self
    }

    /// Drop the attributes of a blob, keeping its bytes.
    pub fn without_attributes(mut self, id: &str) -> Self {
        self.entry(id).attributes = None;
        self
    }

    /// Soft-delete a blob.
    pub fn tombstone(mut self, id: &str, reason: &str) -> Self {
        let entry = self.entry(id);
        entry.attributes = Some(entry.attributes.take().unwrap_or_default().tombstoned(reason));
        self
    }

    /// Make every [`blob_attributes`](BlobStore::blob_attributes) call for
    /// this blob fail with `kind`.
    pub fn fail_attributes(mut self, id: &str, kind: ErrorKind) -> Self {
        self.faults(id).attributes = Some(kind);
        self
    }

    /// Make every [`bytes_exists`](BlobStore::bytes_exists) call for this
    /// blob fail with `kind`.
    pub fn fail_bytes(mut self, id: &str, kind: ErrorKind) -> Self {
        self.faults(id).bytes = Some(kind);
        self
    }
}
impl Default for MockBlobStore {
    fn default() -> Self {
        Self::new("default")
    }
}

/// Lowercase hex SHA-1, the digest format recorded on assets and blobs.
pub fn sha1_hex(bytes: &[u8]) -> String {
    hex::encode(Sha1::digest(bytes))
}

#[async_trait]
impl BlobStore for MockBlobStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn bytes_exists(&self, id: &BlobId) -> Result<bool> {
        if let Some(kind) = self.faults.read().await.get(id).and_then(|f| f.bytes.clone()) {
            exn::bail!(kind);
        }
        Ok(self.blobs.read().await.get(id).is_some_and(|e| e.bytes.is_some()))
    }

    async fn blob_attributes(&self, id: &BlobId) -> Result<Option<BlobAttributes>> {
        if let Some(kind) = self.faults.read().await.get(id).and_then(|f| f.attributes.clone()) {
            exn::bail!(kind);
        }
        Ok(self.blobs.read().await.get(id).and_then(|e| e.attributes.clone()))
    }
}
