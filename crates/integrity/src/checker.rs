use crate::error::{ErrorKind, Result};
use crate::progress::{DEFAULT_PROGRESS_INTERVAL, ProgressLogger};
use crate::verdict::{FailureCause, Verdict};
use depot_config::IntegrityConfig;
use depot_content::{AssetRecord, ContentBrowser, Repository};
use depot_storage::error::ErrorKind as StorageErrorKind;
use depot_storage::{BlobAttributes, BlobStore};
use exn::ResultExt;
use std::time::Duration;
use time::{Date, OffsetDateTime, UtcOffset};

pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Final counters of one repository scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Assets checked (skipped assets excluded).
    pub processed: u64,
    /// Assets reported to the failure handler.
    pub failures: u64,
    /// Assets whose blob could not be reached; not counted as failures.
    pub indeterminate: u64,
    /// Assets older than the `since_days` cutoff.
    pub skipped: u64,
    pub cancelled: bool,
    pub elapsed: Duration,
}

/// Checks that every asset of a repository has an intact, correctly named
/// blob in the blob store.
///
/// Holds only configuration, so one checker can scan any number of
/// repositories concurrently.
#[derive(Debug, Clone)]
pub struct IntegrityChecker {
    batch_size: usize,
    progress_interval: Duration,
}

impl IntegrityChecker {
    /// # Errors
    /// - [`ErrorKind::InvalidBatchSize`] if `batch_size` is zero.
    pub fn new(batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            exn::bail!(ErrorKind::InvalidBatchSize);
        }
        Ok(Self {
            batch_size,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        })
    }

    /// # Errors
    /// - [`ErrorKind::InvalidBatchSize`] if the configured batch size is zero.
    pub fn from_config(config: &IntegrityConfig) -> Result<Self> {
        Ok(Self::new(config.batch_size)?.with_progress_interval(config.progress_interval()))
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Check one asset against `blob_store`.
    ///
    /// Blob store errors that mean "the store could not be asked" make the
    /// verdict [`Verdict::Indeterminate`] unless another step confirms a
    /// failure. Any other blob store error is treated as the thing being
    /// asked about not existing.
    ///
    /// # Errors
    /// - [`ErrorKind::ForeignBlobStore`] if the asset's blob lives in a
    ///   different blob store.
    pub async fn check_asset(&self, asset: &AssetRecord, blob_store: &dyn BlobStore) -> Result<Verdict> {
        let Some(blob) = &asset.blob else {
            tracing::error!(path = %asset.path, "Error accessing blob for asset");
            return Ok(Verdict::MissingBlobMetadata);
        };
        if blob.blob_ref.store() != blob_store.name() {
            exn::bail!(ErrorKind::ForeignBlobStore(blob.blob_ref.to_string()));
        }
        let blob_id = blob.blob_ref.blob_id();
        let mut indeterminate = false;

        match blob_store.blob_attributes(blob_id).await {
            Ok(None) => {
                tracing::error!(path = %asset.path, %blob_id, "Blob properties missing for asset");
                return Ok(Verdict::MissingBlobMetadata);
            },
            Ok(Some(attributes)) if attributes.is_deleted() => {
                tracing::warn!(
                    path = %asset.path,
                    %blob_id,
                    reason = ?attributes.deleted_reason(),
                    "Blob properties marked as deleted for asset, will be removed on next compact"
                );
                return Ok(Verdict::Tombstoned);
            },
            Ok(Some(attributes)) => {
                let verdict = check_checksum(&attributes, asset).unwrap_or_else(|| check_name(&attributes, asset));
                if verdict.is_failure() {
                    tracing::error!(path = %asset.path, %blob_id, %verdict, "Asset integrity check failed");
                    return Ok(verdict);
                }
            },
            Err(e) if matches!(&*e, StorageErrorKind::NotFound(_)) => {
                tracing::error!(path = %asset.path, %blob_id, "Blob properties missing for asset");
                return Ok(Verdict::MissingBlobMetadata);
            },
            Err(e) if e.is_infrastructure() => {
                tracing::warn!(path = %asset.path, %blob_id, error = ?e, "Infrastructure failure while checking attributes existence");
                indeterminate = true;
            },
            Err(e) => {
                tracing::error!(path = %asset.path, %blob_id, error = ?e, "Failed to check attributes existence");
                return Ok(Verdict::MissingBlobMetadata);
            },
        }

        match blob_store.bytes_exists(blob_id).await {
            Ok(true) => (),
            Ok(false) => {
                tracing::error!(path = %asset.path, %blob_id, "Blob data missing for asset");
                return Ok(Verdict::MissingBlobData);
            },
            Err(e) if e.is_infrastructure() => {
                tracing::warn!(path = %asset.path, %blob_id, error = ?e, "Infrastructure failure while checking blob existence");
                indeterminate = true;
            },
            Err(e) => {
                tracing::error!(path = %asset.path, %blob_id, error = ?e, "Failed to check blob existence");
                return Ok(Verdict::MissingBlobData);
            },
        }

        Ok(if indeterminate { Verdict::Indeterminate } else { Verdict::Ok })
    }

    /// Check every asset of `repository`, page by page.
    ///
    /// `is_cancelled` is polled before each asset; once it returns `true`
    /// the scan stops and the summary so far is returned with `cancelled`
    /// set. With `since_days > 0`, assets whose blob was created before
    /// that many days ago are skipped. `on_failure` is called once for each
    /// asset that fails, whether through a failing [`Verdict`] or an error
    /// checking it; neither stops the scan.
    ///
    /// # Errors
    /// - [`ErrorKind::Browse`] if a page of assets can't be fetched. Assets
    ///   already checked have been reported to `on_failure`.
    pub async fn check<C, F>(
        &self,
        repository: &Repository,
        content: &dyn ContentBrowser,
        blob_store: &dyn BlobStore,
        is_cancelled: C,
        since_days: u32,
        mut on_failure: F,
    ) -> Result<ScanSummary>
    where
        C: Fn() -> bool,
        F: FnMut(&AssetRecord, &FailureCause),
    {
        tracing::info!(
            repository = %repository.name,
            blob_store = blob_store.name(),
            "Checking integrity of assets in repository"
        );
        let cutoff = cutoff_date(OffsetDateTime::now_utc(), since_days);
        let mut progress = ProgressLogger::new(&repository.name, self.progress_interval);
        let mut summary = ScanSummary::default();
        let mut token = None;

        'pages: loop {
            let page = content
                .browse(self.batch_size, token.as_ref())
                .await
                .or_raise(|| ErrorKind::Browse(repository.name.clone()))?;
            if page.is_empty() {
                break;
            }
            let (assets, next) = page.into_parts();
            for asset in &assets {
                if is_cancelled() {
                    tracing::warn!(repository = %repository.name, "Cancelling blob integrity check");
                    summary.cancelled = true;
                    break 'pages;
                }
                if let (Some(cutoff), Some(blob)) = (cutoff, &asset.blob)
                    && created_before(blob.blob_created, cutoff)
                {
                    summary.skipped += 1;
                    continue;
                }

                tracing::debug!(path = %asset.path, "Checking asset");
                let cause = match self.check_asset(asset, blob_store).await {
                    Ok(Verdict::Indeterminate) => {
                        summary.indeterminate += 1;
                        None
                    },
                    Ok(verdict) if verdict.is_failure() => Some(FailureCause::Integrity(verdict)),
                    Ok(_) => None,
                    Err(e) => {
                        tracing::error!(asset = %asset, error = ?e, "Error processing asset");
                        Some(FailureCause::Processing((*e).to_string()))
                    },
                };
                if let Some(cause) = &cause {
                    on_failure(asset, cause);
                }
                progress.record(cause.is_some());
            }
            // A page without a cursor is the last one.
            match next {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        let last = progress.finish();
        summary.processed = last.processed;
        summary.failures = last.failures;
        summary.elapsed = last.elapsed;
        Ok(summary)
    }
}
impl Default for IntegrityChecker {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// The earliest UTC date still checked when only blobs from the last
/// `since_days` days are wanted. `None` checks everything: `since_days` is
/// zero, or reaches back past the earliest representable date.
fn cutoff_date(now: OffsetDateTime, since_days: u32) -> Option<Date> {
    if since_days == 0 {
        return None;
    }
    now.checked_sub(time::Duration::days(i64::from(since_days)))
        .map(|then| then.to_offset(UtcOffset::UTC).date())
}

fn created_before(created: OffsetDateTime, cutoff: Date) -> bool {
    created.to_offset(UtcOffset::UTC).date() < cutoff
}

/// `None` when the checksums agree, or when the asset has no SHA-1 to
/// compare (a lenient pass).
fn check_checksum(attributes: &BlobAttributes, asset: &AssetRecord) -> Option<Verdict> {
    let Some(asset_sha1) = asset.sha1() else {
        tracing::warn!(path = %asset.path, "Asset is missing SHA1 hash code");
        return None;
    };
    let blob_sha1 = attributes.metrics().and_then(|m| m.sha1());
    if blob_sha1 == Some(asset_sha1) {
        return None;
    }
    tracing::error!(path = %asset.path, asset_sha1, blob_sha1 = ?blob_sha1, "SHA1 does not match on asset");
    Some(Verdict::ChecksumMismatch {
        asset: asset_sha1.to_string(),
        blob: blob_sha1.map(str::to_string),
    })
}

fn check_name(attributes: &BlobAttributes, asset: &AssetRecord) -> Verdict {
    let Some(blob_name) = attributes.blob_name() else {
        tracing::error!(path = %asset.path, "Blob properties is missing name");
        return Verdict::NameMismatch {
            asset: asset.path.clone(),
            blob: None,
        };
    };
    let asset_name = match asset.path.strip_prefix('/') {
        Some(stripped) if !blob_name.starts_with('/') => stripped,
        _ => asset.path.as_str(),
    };
    if asset_name == blob_name {
        return Verdict::Ok;
    }
    tracing::error!(asset_name, blob_name, "Name does not match on asset");
    Verdict::NameMismatch {
        asset: asset.path.clone(),
        blob: Some(blob_name.to_string()),
    }
}
