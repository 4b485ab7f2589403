//! Progress reporting for sync runs.
//!
//! Sync runs are scheduled and unattended, so progress is rendered as
//! structured logs rather than progress bars.

use zigdex::sync::{ProgressCallback, SyncProgress};

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    /// Wrap the reporter into the callback type the engine accepts.
    pub fn into_callback(self) -> ProgressCallback {
        Box::new(move |event| self.handle(event))
    }

    pub fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::SearchStarted { query } => {
                tracing::info!(query = %query, "Discovering repositories");
            }

            SyncProgress::SearchPage {
                query,
                page,
                count,
                total_so_far,
            } => {
                tracing::debug!(query = %query, page, count, total_so_far, "Fetched search page");
            }

            SyncProgress::SearchComplete { query, total } => {
                tracing::info!(query = %query, total, "Discovery complete");
            }

            SyncProgress::Reconciled {
                new,
                updated,
                removed,
            } => {
                tracing::info!(new, updated, removed, "Reconciled against ledger");
            }

            SyncProgress::BatchStarted {
                queue,
                batch,
                count,
            } => {
                tracing::info!(queue, batch, count, "Processing batch");
            }

            SyncProgress::BatchComplete {
                queue,
                batch,
                written,
                filtered,
            } => {
                tracing::info!(queue, batch, written, filtered, "Batch complete");
            }

            SyncProgress::BatchAbandoned {
                queue,
                batch,
                error,
            } => {
                tracing::warn!(queue, batch, error = %error, "Batch abandoned");
            }

            SyncProgress::RateLimitWait { resume_at } => {
                tracing::info!(resume_at = %resume_at, "Rate limited, waiting");
            }

            SyncProgress::EntryWritten { name_with_owner } => {
                tracing::debug!(repo = %name_with_owner, "Wrote catalog entry");
            }

            SyncProgress::RemovedReported { ids } => {
                tracing::info!(count = ids.len(), "Repositories no longer discovered");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
