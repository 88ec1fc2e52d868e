use std::time::{Duration, Instant};

pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(60);

/// Counters at the time of a progress emission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub elapsed: Duration,
    pub processed: u64,
    pub failures: u64,
}

/// Logs scan progress at most once per interval, however fast assets are
/// recorded, plus once more when the scan finishes.
pub struct ProgressLogger {
    repository: String,
    interval: Duration,
    started: Instant,
    last_emitted: Instant,
    processed: u64,
    failures: u64,
    emissions: u64,
}

impl ProgressLogger {
    pub fn new(repository: impl Into<String>, interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            repository: repository.into(),
            interval,
            started: now,
            last_emitted: now,
            processed: 0,
            failures: 0,
            emissions: 0,
        }
    }

    /// Count one checked asset.
    pub fn record(&mut self, failed: bool) {
        self.processed += 1;
        if failed {
            self.failures += 1;
        }
        if self.last_emitted.elapsed() >= self.interval {
            self.emit();
        }
    }

    pub fn progress(&self) -> Progress {
        Progress {
            elapsed: self.started.elapsed(),
            processed: self.processed,
            failures: self.failures,
        }
    }

    /// Number of progress lines logged so far.
    pub fn emissions(&self) -> u64 {
        self.emissions
    }

    fn emit(&mut self) -> Progress {
        let progress = self.progress();
        tracing::info!(
            repository = %self.repository,
            elapsed = ?progress.elapsed,
            processed = progress.processed,
            failures = progress.failures,
            "Integrity check progress"
        );
        self.last_emitted = Instant::now();
        self.emissions += 1;
        progress
    }

    /// Emit the final progress line and return what it reported.
    pub fn finish(mut self) -> Progress {
        self.emit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_limits_emissions() {
        let mut logger = ProgressLogger::new("releases", Duration::from_secs(3600));
        for i in 0..100 {
            logger.record(i % 10 == 0);
        }
        assert_eq!(logger.emissions(), 0);
        let progress = logger.finish();
        assert_eq!(progress.processed, 100);
        assert_eq!(progress.failures, 10);
    }

    #[test]
    fn test_zero_interval_emits_every_record() {
        let mut logger = ProgressLogger::new("releases", Duration::ZERO);
        logger.record(false);
        logger.record(true);
        assert_eq!(logger.emissions(), 2);
        assert_eq!(logger.progress().failures, 1);
    }

    #[test]
    fn test_finish_without_records() {
        let progress = ProgressLogger::new("empty", DEFAULT_PROGRESS_INTERVAL).finish();
        assert_eq!(progress.processed, 0);
        assert_eq!(progress.failures, 0);
    }
}
