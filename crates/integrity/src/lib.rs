//! Blob integrity scanning.
//!
//! Every asset in a repository points at a blob. [`IntegrityChecker`] walks a
//! repository's assets and verifies, for each one, that the blob store still
//! has the blob's attributes and bytes, that the SHA-1 recorded on the asset
//! matches the blob's, and that the blob was stored under the asset's path.
//! Problems are reported as [`Verdict`]s through a callback; a broken asset
//! never stops the scan.
//!
//! [`Coordinator`] drives scans over many repositories at once and reports
//! progress as a stream of [`IntegrityEvent`]s.

mod checker;
mod coordinator;
pub mod error;
mod progress;
mod verdict;

pub use crate::checker::{DEFAULT_BATCH_SIZE, IntegrityChecker, ScanSummary};
pub use crate::coordinator::{Coordinator, Dispatcher, EventKind, IntegrityEvent, ScanTarget, ScanTotals};
pub use crate::progress::{DEFAULT_PROGRESS_INTERVAL, Progress, ProgressLogger};
pub use crate::verdict::{FailureCause, Verdict};
