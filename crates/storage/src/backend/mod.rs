//! Blob store trait and test implementation.
//!
//! This module defines the [`BlobStore`] trait: the read-side contract that
//! integrity checking consumes from a blob store backend (filesystem, S3,
//! Azure, ...). Backends themselves live outside this workspace.

#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "mock")]
pub use self::mock::{MockBlobStore, sha1_hex};
use crate::attributes::BlobAttributes;
use crate::error::Result;
use crate::id::BlobId;
use async_trait::async_trait;

/// Read-side interface to a blob store.
///
/// All operations are asynchronous; each one may cross the network.
///
/// # Errors
///
/// Implementations must map every failure onto the closed
/// [`ErrorKind`](crate::error::ErrorKind) taxonomy. In particular, anything
/// that only says "the store could not be reached" must use one of the
/// infrastructure kinds so that callers never mistake an outage for a
/// missing blob.
///
/// # Examples
///
/// ```
/// use depot_storage::{BlobId, BlobStore, error::Result};
///
/// async fn is_intact(store: &dyn BlobStore, id: &BlobId) -> Result<bool> {
///     let Some(attributes) = store.blob_attributes(id).await? else {
///         return Ok(false);
///     };
///     Ok(!attributes.is_deleted() && store.bytes_exists(id).await?)
/// }
/// ```
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Name of the configured blob store. Asset blob references carry the
    /// same name (see [`BlobRef::store`](crate::BlobRef::store)).
    fn name(&self) -> &str;

    /// Check whether the blob's byte payload is retrievable.
    ///
    /// Returns `Ok(false)` when the store positively knows the bytes are
    /// gone.
    async fn bytes_exists(&self, id: &BlobId) -> Result<bool>;

    /// Fetch the attribute sidecar for a blob.
    ///
    /// Returns `Ok(None)` when the attributes do not exist. Backends may also
    /// signal absence with [`NotFound`](crate::error::ErrorKind::NotFound);
    /// callers treat both the same way.
    async fn blob_attributes(&self, id: &BlobId) -> Result<Option<BlobAttributes>>;
}
