//! Sync orchestration.
//!
//! One run: discover both topic queries, dedupe, reconcile against the
//! ledger, then drive the New queue and the Updated queue through the
//! detail fetcher in fixed-size batches. The ledger is flushed after every
//! batch so a crash loses at most one batch of progress; removed ids are
//! reported at the end and never deleted.

use std::collections::HashSet;

use chrono::Utc;

use super::fetch::process_batch;
use super::progress::{ProgressCallback, SyncProgress, emit};
use super::types::{DETAIL_BATCH_SIZE, SyncError, SyncOptions, SyncOutcome};
use crate::catalog::CatalogStore;
use crate::github::client::GithubClient;
use crate::github::queries::{APPLICATION_SEARCH, PACKAGE_SEARCH};
use crate::github::search::discover;
use crate::github::types::{DiscoveredRepo, DiscoveryOrigin};
use crate::http::HttpTransport;
use crate::ledger::LedgerStore;
use crate::pacing::{ApiRateLimiter, sleep_past};
use crate::reconcile::reconcile;

/// Run one full sync.
///
/// Errors from this function are fatal to the run (ledger persistence
/// failures); remote failures are absorbed per-page and per-batch as
/// partial results.
pub async fn run_sync<T: HttpTransport>(
    client: &GithubClient<T>,
    store: &CatalogStore,
    ledger_store: &mut LedgerStore,
    options: &SyncOptions,
    on_progress: Option<&ProgressCallback>,
) -> Result<SyncOutcome, SyncError> {
    let limiter = ApiRateLimiter::new(options.requests_per_second);
    let mut outcome = SyncOutcome::default();

    // Package-tagged repositories first: when both queries return the same
    // id, the package origin wins the dedupe.
    let mut discovered = discover(
        client,
        PACKAGE_SEARCH,
        DiscoveryOrigin::Package,
        &limiter,
        on_progress,
    )
    .await;
    discovered.extend(
        discover(
            client,
            APPLICATION_SEARCH,
            DiscoveryOrigin::Application,
            &limiter,
            on_progress,
        )
        .await,
    );

    let discovered = dedupe_by_id(discovered);
    outcome.discovered = discovered.len();

    let report = reconcile(&discovered, ledger_store.ledger());
    outcome.new = report.new.len();
    outcome.updated = report.updated.len();
    outcome.removed = report.removed.clone();

    emit(
        on_progress,
        SyncProgress::Reconciled {
            new: report.new.len(),
            updated: report.updated.len(),
            removed: report.removed.len(),
        },
    );
    tracing::info!(
        discovered = outcome.discovered,
        new = outcome.new,
        updated = outcome.updated,
        removed = outcome.removed.len(),
        "reconciled discovery against ledger"
    );

    if options.dry_run {
        report_removed(&report.removed, on_progress);
        return Ok(outcome);
    }

    // New repositories take priority over updates.
    drive_queue(
        client,
        store,
        ledger_store,
        "new",
        &report.new,
        &limiter,
        &mut outcome,
        on_progress,
    )
    .await?;
    drive_queue(
        client,
        store,
        ledger_store,
        "updated",
        &report.updated,
        &limiter,
        &mut outcome,
        on_progress,
    )
    .await?;

    report_removed(&report.removed, on_progress);

    ledger_store.ledger_mut().finish_run(Utc::now());
    ledger_store.flush()?;

    Ok(outcome)
}

/// Drop repeated ids, keeping the first occurrence.
///
/// Each query's cursor guarantees no repeats within itself, but a
/// repository tagged with both topics shows up once per query.
fn dedupe_by_id(discovered: Vec<DiscoveredRepo>) -> Vec<DiscoveredRepo> {
    let mut seen: HashSet<String> = HashSet::with_capacity(discovered.len());
    discovered
        .into_iter()
        .filter(|repo| seen.insert(repo.id.clone()))
        .collect()
}

/// Drive one queue through the detail fetcher in fixed-size batches.
///
/// A rate-limited batch is retried with the identical id list after
/// sleeping past the advertised reset, as many times as it takes. Any
/// other failure abandons just that batch, trading completeness for
/// forward progress. The ledger is flushed after every attempt.
#[allow(clippy::too_many_arguments)]
async fn drive_queue<T: HttpTransport>(
    client: &GithubClient<T>,
    store: &CatalogStore,
    ledger_store: &mut LedgerStore,
    queue_name: &'static str,
    queue: &[DiscoveredRepo],
    limiter: &ApiRateLimiter,
    outcome: &mut SyncOutcome,
    on_progress: Option<&ProgressCallback>,
) -> Result<(), SyncError> {
    for (index, batch) in queue.chunks(DETAIL_BATCH_SIZE).enumerate() {
        let batch_no = index + 1;
        emit(
            on_progress,
            SyncProgress::BatchStarted {
                queue: queue_name,
                batch: batch_no,
                count: batch.len(),
            },
        );

        loop {
            let result = process_batch(
                client,
                store,
                ledger_store.ledger_mut(),
                batch,
                limiter,
                on_progress,
            )
            .await;

            match result {
                Ok(stats) => {
                    ledger_store.flush()?;
                    outcome.written += stats.written;
                    outcome.filtered += stats.filtered;
                    emit(
                        on_progress,
                        SyncProgress::BatchComplete {
                            queue: queue_name,
                            batch: batch_no,
                            written: stats.written,
                            filtered: stats.filtered,
                        },
                    );
                    break;
                }
                Err(err) => {
                    if let Some(resume_at) = err.rate_limit_resume() {
                        emit(on_progress, SyncProgress::RateLimitWait { resume_at });
                        tracing::info!(
                            %resume_at,
                            queue = queue_name,
                            batch = batch_no,
                            "batch rate limited, waiting"
                        );
                        sleep_past(resume_at).await;
                        // Retry the identical batch.
                        continue;
                    }

                    tracing::warn!(
                        error = %err,
                        queue = queue_name,
                        batch = batch_no,
                        "abandoning batch"
                    );
                    // Entries written before the failure are already
                    // recorded; persist that partial progress.
                    ledger_store.flush()?;
                    outcome.abandoned_batches += 1;
                    outcome
                        .errors
                        .push(format!("{queue_name} batch {batch_no}: {err}"));
                    emit(
                        on_progress,
                        SyncProgress::BatchAbandoned {
                            queue: queue_name,
                            batch: batch_no,
                            error: err.to_string(),
                        },
                    );
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Log ids that dropped out of discovery. Reporting only: a repository
/// that briefly loses its qualifying topic should not have its catalog
/// entry destroyed.
fn report_removed(removed: &[String], on_progress: Option<&ProgressCallback>) {
    if removed.is_empty() {
        return;
    }

    for id in removed {
        tracing::info!(id = %id, "no longer discovered; keeping ledger entry and catalog file");
    }
    emit(
        on_progress,
        SyncProgress::RemovedReported {
            ids: removed.to_vec(),
        },
    );
}
