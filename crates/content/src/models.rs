//! Content models.
//!
//! These mirror rows owned by the content store. Nothing in this workspace
//! writes them; they are read, checked and filtered.

use depot_storage::{BlobRef, HashAlgorithm};
use std::collections::BTreeMap;
use std::fmt;
use time::OffsetDateTime;

/// A hosted, proxy or group repository: a named collection of assets of one
/// format, backed by one blob store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repository {
    pub name: String,
    /// Format identifier, e.g. `maven2`, `npm`, `raw`.
    pub format: String,
    /// Name of the blob store holding this repository's blobs.
    pub blob_store: String,
}
impl Repository {
    pub fn new(name: impl Into<String>, format: impl Into<String>, blob_store: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            format: format.into(),
            blob_store: blob_store.into(),
        }
    }
}
impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Stable identifier of an asset row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u64);
impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The blob side of an asset: where the bytes live and what they hashed to
/// when the asset was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetBlob {
    pub blob_ref: BlobRef,
    pub blob_size: u64,
    pub content_type: Option<String>,
    /// Checksums recorded at upload time (algorithm -> lowercase hex digest).
    pub checksums: BTreeMap<HashAlgorithm, String>,
    pub blob_created: OffsetDateTime,
}
impl AssetBlob {
    pub fn new(blob_ref: BlobRef, blob_size: u64, blob_created: OffsetDateTime) -> Self {
        Self {
            blob_ref,
            blob_size,
            content_type: None,
            checksums: BTreeMap::new(),
            blob_created,
        }
    }

    pub fn with_checksum(mut self, algorithm: HashAlgorithm, digest: impl Into<String>) -> Self {
        self.checksums.insert(algorithm, digest.into());
        self
    }
}

/// Metadata describing one stored artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub id: AssetId,
    /// Repository-scoped path, usually with a leading `/`.
    pub path: String,
    pub blob: Option<AssetBlob>,
    pub created: OffsetDateTime,
    pub last_updated: OffsetDateTime,
}
impl AssetRecord {
    pub fn new(id: AssetId, path: impl Into<String>, blob: Option<AssetBlob>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id,
            path: path.into(),
            blob,
            created: now,
            last_updated: now,
        }
    }

    pub fn blob_ref(&self) -> Option<&BlobRef> {
        self.blob.as_ref().map(|b| &b.blob_ref)
    }

    pub fn checksum(&self, algorithm: HashAlgorithm) -> Option<&str> {
        self.blob.as_ref().and_then(|b| b.checksums.get(&algorithm)).map(String::as_str)
    }

    pub fn sha1(&self) -> Option<&str> {
        self.checksum(HashAlgorithm::Sha1)
    }
}
impl fmt::Display for AssetRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Asset{{id={}, path={}}}", self.id, self.path)
    }
}

/// One node of the virtual folder tree over a repository's assets and
/// components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseNode {
    /// Last path segment, shown in listings.
    pub name: String,
    /// Full display path. Access control is evaluated against this.
    pub path: String,
    pub asset_id: Option<AssetId>,
    pub component_id: Option<u64>,
    /// `true` when the node has no children.
    pub leaf: bool,
}
impl BrowseNode {
    /// Folder node for `path`; its name is the last segment.
    pub fn folder(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default().to_string();
        Self { name, path, asset_id: None, component_id: None, leaf: false }
    }

    /// Leaf node for an asset at `path`.
    pub fn asset(path: impl Into<String>, asset_id: AssetId) -> Self {
        Self { asset_id: Some(asset_id), leaf: true, ..Self::folder(path) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_storage::BlobId;
    use rstest::rstest;

    #[rstest]
    #[case("org/example", "example")]
    #[case("org/example/", "example")]
    #[case("/org", "org")]
    #[case("single", "single")]
    fn test_folder_name(#[case] path: &str, #[case] name: &str) {
        assert_eq!(BrowseNode::folder(path).name, name);
    }

    #[test]
    fn test_asset_node() {
        let node = BrowseNode::asset("org/example/lib-1.0.jar", AssetId(7));
        assert!(node.leaf);
        assert_eq!(node.name, "lib-1.0.jar");
        assert_eq!(node.asset_id, Some(AssetId(7)));
    }

    #[test]
    fn test_asset_checksums() {
        let blob_ref = BlobRef::new("default", BlobId::new("b1").unwrap());
        let blob = AssetBlob::new(blob_ref.clone(), 3, OffsetDateTime::UNIX_EPOCH)
            .with_checksum(HashAlgorithm::Sha1, "a9993e364706816aba3e25717850c26c9cd0d89d");
        let asset = AssetRecord::new(AssetId(1), "/abc.txt", Some(blob));
        assert_eq!(asset.sha1(), Some("a9993e364706816aba3e25717850c26c9cd0d89d"));
        assert_eq!(asset.checksum(HashAlgorithm::Md5), None);
        assert_eq!(asset.blob_ref(), Some(&blob_ref));
        assert_eq!(asset.to_string(), "Asset{id=1, path=/abc.txt}");
    }

    #[test]
    fn test_asset_without_blob() {
        let asset = AssetRecord::new(AssetId(2), "/orphan", None);
        assert!(asset.blob_ref().is_none());
        assert!(asset.sha1().is_none());
    }
}
