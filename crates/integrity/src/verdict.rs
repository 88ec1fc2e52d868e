use derive_more::Display;

/// Outcome of checking one asset against its blob.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Blob attributes and bytes are present and agree with the asset.
    #[display("ok")]
    Ok,
    /// The asset has no blob, or the blob store has no attributes for it.
    #[display("missing blob metadata")]
    MissingBlobMetadata,
    /// The blob's attributes exist but its bytes do not.
    #[display("missing blob data")]
    MissingBlobData,
    /// The SHA-1 recorded on the asset differs from the blob's.
    #[display("checksum mismatch (asset: {asset}, blob: {})", blob.as_deref().unwrap_or("<none>"))]
    ChecksumMismatch { asset: String, blob: Option<String> },
    /// The blob's recorded name differs from the asset's path.
    #[display("name mismatch (asset: {asset}, blob: {})", blob.as_deref().unwrap_or("<none>"))]
    NameMismatch { asset: String, blob: Option<String> },
    /// The blob has been soft-deleted and awaits compaction.
    #[display("tombstoned")]
    Tombstoned,
    /// The blob store could not be reached; assumed intact.
    #[display("indeterminate")]
    Indeterminate,
}

impl Verdict {
    /// Whether this verdict counts as a failed integrity check.
    ///
    /// [`Verdict::Indeterminate`] is not a failure: nothing is known to be
    /// wrong with the blob.
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Ok | Self::Indeterminate)
    }

    /// Tombstones are failures, but expected to resolve themselves on the
    /// next compaction.
    pub fn is_soft_failure(&self) -> bool {
        matches!(self, Self::Tombstoned)
    }
}

/// Why an asset was reported to a scan's failure handler.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// The check ran and found a problem.
    #[display("{_0}")]
    Integrity(Verdict),
    /// The check itself could not be completed for this asset.
    #[display("processing error: {_0}")]
    Processing(String),
}
