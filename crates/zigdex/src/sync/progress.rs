//! Progress reporting types for sync operations.
//!
//! A unified event stream emitted by discovery and batch processing,
//! rendered by the CLI as structured logs.

use chrono::{DateTime, Utc};

/// Progress events emitted during a sync run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// Starting a paginated search.
    SearchStarted {
        /// The search filter string.
        query: String,
    },

    /// Fetched one page of search results.
    SearchPage {
        query: String,
        /// Page number (1-indexed).
        page: u32,
        /// Records on this page.
        count: usize,
        /// Running total for this query.
        total_so_far: usize,
    },

    /// Finished paginating a search query.
    SearchComplete { query: String, total: usize },

    /// Reconciliation against the ledger finished.
    Reconciled {
        new: usize,
        updated: usize,
        removed: usize,
    },

    /// Starting to process one batch of ids.
    BatchStarted {
        /// Which queue the batch came from ("new" or "updated").
        queue: &'static str,
        /// Batch number within the queue (1-indexed).
        batch: usize,
        /// Ids in the batch.
        count: usize,
    },

    /// A batch completed and the ledger was flushed.
    BatchComplete {
        queue: &'static str,
        batch: usize,
        /// Catalog files written.
        written: usize,
        /// Repositories filtered out (archived/disabled or missing).
        filtered: usize,
    },

    /// A batch failed for a non-rate-limit reason and was abandoned.
    BatchAbandoned {
        queue: &'static str,
        batch: usize,
        error: String,
    },

    /// Sleeping until the remote un-throttles.
    RateLimitWait {
        /// When requests may resume.
        resume_at: DateTime<Utc>,
    },

    /// One catalog entry was written.
    EntryWritten { name_with_owner: String },

    /// Ledger ids that vanished from discovery this run.
    RemovedReported { ids: Vec<String> },
}

/// Callback type for progress updates.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit a progress event if a callback is present.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(callback) = on_progress {
        callback(event);
    }
}
