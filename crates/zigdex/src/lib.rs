//! zigdex - an incremental GitHub-to-catalog mirror for Zig packages.
//!
//! The library discovers repositories tagged `zig-package` or
//! `zig-application`, reconciles them against a persisted ledger, fetches
//! full metadata for anything new or changed in fixed-size batches, and
//! writes one JSON catalog entry per repository for a static front-end to
//! consume. Runs are incremental: unchanged repositories are skipped, and
//! a crash loses at most one batch of progress.
//!
//! # Example
//!
//! ```ignore
//! use zigdex::catalog::CatalogStore;
//! use zigdex::github::GithubClient;
//! use zigdex::http::ReqwestTransport;
//! use zigdex::ledger::LedgerStore;
//! use zigdex::sync::{SyncOptions, run_sync};
//!
//! let transport = ReqwestTransport::new(reqwest::Client::new());
//! let client = GithubClient::new(transport, token);
//! let store = CatalogStore::new("zig-catalog/packages");
//! let mut ledger = LedgerStore::open("zig-catalog/ledger.json")?;
//!
//! let outcome = run_sync(&client, &store, &mut ledger, &SyncOptions::default(), None).await?;
//! println!("wrote {} entries", outcome.written);
//! ```

pub mod catalog;
pub mod github;
pub mod http;
pub mod ledger;
pub mod manifest;
pub mod pacing;
pub mod reconcile;
pub mod sync;

pub use catalog::{CatalogEntry, CatalogStore, RepoType};
pub use github::{GithubClient, GithubError};
pub use ledger::{Ledger, LedgerEntry, LedgerStore};
pub use reconcile::{ReconcileReport, reconcile};
pub use sync::{SyncError, SyncOptions, SyncOutcome, run_sync};
