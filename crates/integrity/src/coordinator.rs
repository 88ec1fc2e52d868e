use crate::checker::{IntegrityChecker, ScanSummary};
use crate::error::Result;
use crate::verdict::FailureCause;
use async_stream::stream;
use depot_config::IntegrityConfig;
use depot_content::{AssetRecord, ContentHandle, Repository};
use depot_storage::BlobStoreHandle;
use futures::stream::FuturesUnordered;
use futures::{Stream, StreamExt};
use std::collections::{HashMap, VecDeque};
use tokio_util::sync::CancellationToken;

/// A repository to scan, with the browser over its content.
#[derive(Clone)]
pub struct ScanTarget {
    pub repository: Repository,
    pub content: ContentHandle,
}

/// Counters summed over every repository of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanTotals {
    pub repositories: u64,
    pub failed_repositories: u64,
    pub processed: u64,
    pub failures: u64,
    pub indeterminate: u64,
    pub skipped: u64,
}
impl ScanTotals {
    fn add(&mut self, summary: &ScanSummary) {
        self.repositories += 1;
        self.processed += summary.processed;
        self.failures += summary.failures;
        self.indeterminate += summary.indeterminate;
        self.skipped += summary.skipped;
    }
}

/// Discriminant of [`IntegrityEvent`], used to key [`Dispatcher`] handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Started,
    RepositoryStarted,
    AssetFailed,
    RepositoryFinished,
    RepositoryFailed,
    Complete,
    Cancelled,
}

/// Events emitted by [`Coordinator::run`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started): exactly once.
/// 2. Per repository, [`RepositoryStarted`](Self::RepositoryStarted), then
///    any number of [`AssetFailed`](Self::AssetFailed), then either
///    [`RepositoryFinished`](Self::RepositoryFinished) or
///    [`RepositoryFailed`](Self::RepositoryFailed). Repositories running
///    concurrently interleave.
/// 3. [`Complete`](Self::Complete) or [`Cancelled`](Self::Cancelled):
///    exactly once.
#[derive(Debug, Clone)]
pub enum IntegrityEvent {
    Started { repositories: usize },
    RepositoryStarted { repository: String },
    AssetFailed { repository: String, asset: AssetRecord, cause: FailureCause },
    RepositoryFinished { repository: String, summary: ScanSummary },
    RepositoryFailed { repository: String, error: String },
    Complete { totals: ScanTotals },
    Cancelled { totals: ScanTotals },
}
impl IntegrityEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Started { .. } => EventKind::Started,
            Self::RepositoryStarted { .. } => EventKind::RepositoryStarted,
            Self::AssetFailed { .. } => EventKind::AssetFailed,
            Self::RepositoryFinished { .. } => EventKind::RepositoryFinished,
            Self::RepositoryFailed { .. } => EventKind::RepositoryFailed,
            Self::Complete { .. } => EventKind::Complete,
            Self::Cancelled { .. } => EventKind::Cancelled,
        }
    }
}

type Handler = Box<dyn Fn(&IntegrityEvent) + Send + Sync>;

/// Dispatch table from event kind to the handlers registered for it.
///
/// # Examples
///
/// ```
/// use depot_integrity::{Dispatcher, EventKind, IntegrityEvent};
///
/// let dispatcher = Dispatcher::new().on(EventKind::AssetFailed, |event| {
///     if let IntegrityEvent::AssetFailed { repository, asset, cause } = event {
///         eprintln!("{repository}: {} failed: {cause}", asset.path);
///     }
/// });
/// assert_eq!(dispatcher.handlers(EventKind::AssetFailed), 1);
/// assert_eq!(dispatcher.handlers(EventKind::Complete), 0);
/// ```
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<EventKind, Vec<Handler>>,
}
impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for every event of `kind`. Handlers of one kind run
    /// in registration order.
    pub fn on<F>(mut self, kind: EventKind, handler: F) -> Self
    where
        F: Fn(&IntegrityEvent) + Send + Sync + 'static,
    {
        self.handlers.entry(kind).or_default().push(Box::new(handler));
        self
    }

    /// Number of handlers registered for `kind`.
    pub fn handlers(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    pub fn dispatch(&self, event: &IntegrityEvent) {
        for handler in self.handlers.get(&event.kind()).into_iter().flatten() {
            handler(event);
        }
    }
}

/// Runs integrity scans over many repositories sharing one blob store.
pub struct Coordinator {
    checker: IntegrityChecker,
    dispatcher: Dispatcher,
    max_concurrent_repositories: usize,
    since_days: u32,
}

impl Coordinator {
    pub fn new(checker: IntegrityChecker, dispatcher: Dispatcher, max_concurrent_repositories: usize) -> Self {
        Self {
            checker,
            dispatcher,
            max_concurrent_repositories: max_concurrent_repositories.max(1),
            since_days: 0,
        }
    }

    /// Only check blobs created in the last `since_days` days when
    /// [`run`](Self::run) is not given a window of its own; 0 checks all.
    pub fn with_since_days(mut self, since_days: u32) -> Self {
        self.since_days = since_days;
        self
    }

    /// # Errors
    /// - [`ErrorKind::InvalidBatchSize`](crate::error::ErrorKind::InvalidBatchSize)
    ///   if the configured batch size is zero.
    pub fn from_config(config: &IntegrityConfig, dispatcher: Dispatcher) -> Result<Self> {
        let checker = IntegrityChecker::from_config(config)?;
        Ok(Self::new(checker, dispatcher, config.max_concurrent_repositories).with_since_days(config.since_days))
    }

    /// Streams [`IntegrityEvent`]s while scanning every target against
    /// `blob_store`, up to `max_concurrent_repositories` at a time.
    ///
    /// Every event is also sent to the [`Dispatcher`]. [`AssetFailed`](IntegrityEvent::AssetFailed)
    /// events are *only* dispatched, as they happen; the stream carries the
    /// lifecycle events. A repository whose scan fails yields its error as an
    /// `Err` item without terminating the stream.
    ///
    /// Once `cancel` fires, running scans stop at their next asset, no new
    /// repositories are started and the stream ends with
    /// [`Cancelled`](IntegrityEvent::Cancelled).
    ///
    /// `since_days` overrides the window set with
    /// [`with_since_days`](Self::with_since_days).
    pub fn run<'a>(
        &'a self,
        targets: Vec<ScanTarget>,
        blob_store: &'a BlobStoreHandle,
        cancel: CancellationToken,
        since_days: Option<u32>,
    ) -> impl Stream<Item = Result<IntegrityEvent>> + 'a {
        let since_days = since_days.unwrap_or(self.since_days);
        // `rustfmt` does not format macros that use braces. Wrap in parentheses!
        stream!({
            let event = IntegrityEvent::Started { repositories: targets.len() };
            self.dispatcher.dispatch(&event);
            yield Ok(event);

            let mut totals = ScanTotals::default();
            let mut pending: VecDeque<ScanTarget> = targets.into();
            let mut processing = FuturesUnordered::new();
            while !cancel.is_cancelled() && processing.len() < self.max_concurrent_repositories {
                let Some(target) = pending.pop_front() else {
                    break;
                };
                let event = IntegrityEvent::RepositoryStarted { repository: target.repository.name.clone() };
                self.dispatcher.dispatch(&event);
                yield Ok(event);
                processing.push(self.scan(target, blob_store, cancel.clone(), since_days));
            }

            while let Some((repository, result)) = processing.next().await {
                match result {
                    Ok(summary) => {
                        totals.add(&summary);
                        let event = IntegrityEvent::RepositoryFinished { repository, summary };
                        self.dispatcher.dispatch(&event);
                        yield Ok(event);
                    },
                    Err(e) => {
                        totals.failed_repositories += 1;
                        self.dispatcher.dispatch(&IntegrityEvent::RepositoryFailed { repository, error: (*e).to_string() });
                        yield Err(e);
                    },
                }
                // Pop-n-push, FIFO.
                let next = if cancel.is_cancelled() { None } else { pending.pop_front() };
                if let Some(target) = next {
                    let event = IntegrityEvent::RepositoryStarted { repository: target.repository.name.clone() };
                    self.dispatcher.dispatch(&event);
                    yield Ok(event);
                    processing.push(self.scan(target, blob_store, cancel.clone(), since_days));
                }
            }

            let event = if cancel.is_cancelled() {
                tracing::warn!(skipped_repositories = pending.len(), "Integrity check cancelled");
                IntegrityEvent::Cancelled { totals }
            } else {
                tracing::info!(?totals, "Integrity check complete");
                IntegrityEvent::Complete { totals }
            };
            self.dispatcher.dispatch(&event);
            yield Ok(event);
        })
    }

    async fn scan(
        &self,
        target: ScanTarget,
        blob_store: &BlobStoreHandle,
        cancel: CancellationToken,
        since_days: u32,
    ) -> (String, Result<ScanSummary>) {
        let name = target.repository.name.clone();
        let result = self
            .checker
            .check(
                &target.repository,
                target.content.as_ref(),
                blob_store.as_ref(),
                || cancel.is_cancelled(),
                since_days,
                |asset, cause| {
                    self.dispatcher.dispatch(&IntegrityEvent::AssetFailed {
                        repository: name.clone(),
                        asset: asset.clone(),
                        cause: cause.clone(),
                    })
                },
            )
            .await;
        (name, result)
    }
}
