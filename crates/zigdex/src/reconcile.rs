//! Reconciliation of discovery results against the ledger.
//!
//! A pure diff: nothing here performs I/O or mutates the ledger, so the
//! classification rules are directly testable.

use std::collections::HashSet;

use crate::github::types::DiscoveredRepo;
use crate::ledger::Ledger;

/// Classification of one run's discovery results.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// Discovered ids with no ledger entry.
    pub new: Vec<DiscoveredRepo>,
    /// Discovered ids whose remote state moved past the ledger's.
    pub updated: Vec<DiscoveredRepo>,
    /// Ledger ids that no longer appear in discovery. Reported only;
    /// entries and catalog files are never deleted automatically, so a
    /// repository that briefly drops its qualifying topic is not purged.
    pub removed: Vec<String>,
}

/// Classify each discovered record as new, updated, or unchanged, and
/// collect ledger ids that vanished from discovery.
///
/// A record with a head commit is compared by commit hash; one without
/// (empty default branch) falls back to the last-updated timestamp.
#[must_use]
pub fn reconcile(discovered: &[DiscoveredRepo], ledger: &Ledger) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    let mut seen: HashSet<&str> = HashSet::with_capacity(discovered.len());

    for repo in discovered {
        seen.insert(repo.id.as_str());

        let Some(entry) = ledger.get(&repo.id) else {
            report.new.push(repo.clone());
            continue;
        };

        let changed = match (&repo.commit_hash, &entry.commit_hash) {
            (Some(current), Some(processed)) => current != processed,
            (Some(_), None) | (None, Some(_)) => true,
            (None, None) => repo.updated_at != entry.updated_at,
        };

        if changed {
            report.updated.push(repo.clone());
        }
    }

    report.removed = ledger
        .repos
        .keys()
        .filter(|id| !seen.contains(id.as_str()))
        .cloned()
        .collect();

    report
}
