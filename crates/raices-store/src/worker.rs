//! Background worker applying the report retention policy

use crate::reports::{ReportArchive, SweepMetrics};
use crate::error::Result;
use std::time::SystemTime;
use tokio::time::{interval, Duration};

/// Runs [`ReportArchive::sweep`] on a fixed interval
///
/// # Examples
///
/// ```no_run
/// use raices_store::{ReportArchive, RetentionConfig, RetentionWorker};
///
/// #[tokio::main]
/// async fn main() {
///     let archive = ReportArchive::new("reports", RetentionConfig::default());
///     let mut worker = RetentionWorker::new(archive);
///
///     // Run until Ctrl+C
///     worker.run().await;
/// }
/// ```
pub struct RetentionWorker {
    archive: ReportArchive,
    interval: Duration,
    totals: SweepMetrics,
}

impl RetentionWorker {
    /// Create a worker for `archive`, using its configured interval
    pub fn new(archive: ReportArchive) -> Self {
        let interval = archive.retention().sweep_interval();
        Self {
            archive,
            interval,
            totals: SweepMetrics::default(),
        }
    }

    /// Override the sweep interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Accumulated metrics across all cycles so far
    pub fn totals(&self) -> &SweepMetrics {
        &self.totals
    }

    fn sweep_once(&mut self) -> Result<SweepMetrics> {
        let metrics = self.archive.sweep(SystemTime::now())?;
        self.totals.scanned += metrics.scanned;
        self.totals.deleted += metrics.deleted;
        self.totals.bytes_freed += metrics.bytes_freed;
        Ok(metrics)
    }

    /// Run until a shutdown signal (Ctrl+C) is received
    ///
    /// Failed sweeps are logged and retried on the next tick.
    pub async fn run(&mut self) {
        let mut ticker = interval(self.interval);

        tracing::info!(
            dir = %self.archive.dir().display(),
            "Report retention worker started (interval: {:?})",
            self.interval
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.sweep_once() {
                        Ok(metrics) => {
                            tracing::info!(
                                "Retention sweep completed: {} scanned, {} deleted, {} bytes freed",
                                metrics.scanned,
                                metrics.deleted,
                                metrics.bytes_freed
                            );
                        }
                        Err(e) => {
                            tracing::error!("Retention sweep failed: {}", e);
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping retention worker");
                    break;
                }
            }
        }

        tracing::info!(
            "Retention worker stopped: {} reports deleted in total",
            self.totals.deleted
        );
    }

    /// Run for a fixed number of cycles, stopping at the first failure
    pub async fn run_cycles(&mut self, cycles: usize) -> Result<()> {
        let mut ticker = interval(self.interval);

        for cycle in 0..cycles {
            ticker.tick().await;
            tracing::debug!("Starting retention sweep {}/{}", cycle + 1, cycles);

            if let Err(e) = self.sweep_once() {
                tracing::error!("Retention sweep {}/{} failed: {}", cycle + 1, cycles, e);
                return Err(e);
            }
        }

        Ok(())
    }
}
