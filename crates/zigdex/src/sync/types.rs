//! Shared sync types and constants.

use thiserror::Error;

use crate::github::GithubError;

/// Ids per bulk detail request. One batch is one GraphQL round trip.
pub const DETAIL_BATCH_SIZE: usize = 20;

/// Default requests-per-second budget for a sync run.
pub const DEFAULT_SYNC_RPS: u32 = 1;

/// Options for a sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Informal request budget (requests per second).
    pub requests_per_second: u32,
    /// Discover and reconcile only; skip detail fetching and all writes.
    pub dry_run: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            requests_per_second: DEFAULT_SYNC_RPS,
            dry_run: false,
        }
    }
}

/// Summary of a completed sync run.
#[derive(Debug, Default)]
pub struct SyncOutcome {
    /// Unique repositories discovered across both queries.
    pub discovered: usize,
    /// Classified as new.
    pub new: usize,
    /// Classified as updated.
    pub updated: usize,
    /// Ledger ids that vanished from discovery (reported, not deleted).
    pub removed: Vec<String>,
    /// Catalog files written.
    pub written: usize,
    /// Repositories filtered out (archived, disabled, or unresolvable).
    pub filtered: usize,
    /// Batches abandoned on non-rate-limit errors.
    pub abandoned_batches: usize,
    /// Non-fatal errors encountered along the way.
    pub errors: Vec<String>,
}

/// Errors that abort a batch or the run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Github(#[from] GithubError),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl SyncError {
    /// The resume time, when this error is a rate-limit signal.
    #[must_use]
    pub fn rate_limit_resume(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        match self {
            Self::Github(GithubError::RateLimited { resume_at }) => Some(*resume_at),
            _ => None,
        }
    }
}
