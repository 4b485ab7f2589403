//! The sync pipeline: discovery, reconciliation, batched detail fetching.

pub mod engine;
pub mod fetch;
pub mod progress;
pub mod types;

pub use engine::run_sync;
pub use fetch::{BatchStats, process_batch};
pub use progress::{ProgressCallback, SyncProgress, emit};
pub use types::{DEFAULT_SYNC_RPS, DETAIL_BATCH_SIZE, SyncError, SyncOptions, SyncOutcome};
