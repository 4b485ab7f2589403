//! The reconciliation ledger.
//!
//! A single JSON document mapping stable repository ids to the state they
//! were last synced at. Loaded once at startup, mutated in memory by the
//! detail fetcher, and flushed back to disk after every batch so a crash
//! loses at most one batch of progress. The design assumes one sync
//! process at a time; there is no cross-process locking.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::RepoType;

/// Last-known sync state for one tracked repository.
///
/// An entry exists for an id iff that repository was successfully
/// processed at least once and has not been explicitly purged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: String,
    pub name: String,
    pub owner: String,
    #[serde(rename = "type")]
    pub repo_type: RepoType,
    /// Remote last-updated timestamp at the time of processing.
    pub updated_at: DateTime<Utc>,
    /// Head commit processed. Absent for repositories with an empty
    /// default branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_hash: Option<String>,
    /// Local wall-clock time of the last successful sync.
    pub last_synced: DateTime<Utc>,
}

/// The full ledger document.
///
/// `repos` is a `BTreeMap` so serialization is deterministic: flushing
/// unchanged state produces a byte-identical file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    /// Completion time of the last full run.
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
    #[serde(default)]
    pub repos: BTreeMap<String, LedgerEntry>,
}

impl Ledger {
    /// Load the ledger from `path`, or start empty if the file is absent.
    pub fn load(path: &Path) -> io::Result<Self> {
        match std::fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Write the full document to `path`, creating parent directories on
    /// demand. Full overwrite; the single-writer assumption makes this
    /// atomic enough.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let mut json = serde_json::to_vec_pretty(self)?;
        json.push(b'\n');
        std::fs::write(path, json)
    }

    /// Look up an entry by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&LedgerEntry> {
        self.repos.get(id)
    }

    /// Record a successful sync of one repository.
    pub fn record(&mut self, entry: LedgerEntry) {
        self.repos.insert(entry.id.clone(), entry);
    }

    /// Mark the end of a full run.
    pub fn finish_run(&mut self, at: DateTime<Utc>) {
        self.last_sync = Some(at);
    }
}

/// A ledger bound to its storage path.
///
/// Keeps the flush-after-every-batch call sites from threading the path
/// alongside the state.
#[derive(Debug)]
pub struct LedgerStore {
    path: PathBuf,
    ledger: Ledger,
}

impl LedgerStore {
    /// Open the ledger at `path` (empty when absent).
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let ledger = Ledger::load(&path)?;
        Ok(Self { path, ledger })
    }

    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// Flush the current state to disk.
    pub fn flush(&self) -> io::Result<()> {
        self.ledger.save(&self.path)
    }
}
