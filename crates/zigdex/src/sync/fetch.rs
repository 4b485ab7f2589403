//! Detail fetching and normalization for one batch of ids.

use std::collections::HashMap;

use chrono::Utc;
use serde_json::json;

use super::progress::{ProgressCallback, SyncProgress, emit};
use super::types::SyncError;
use crate::catalog::{CatalogStore, to_catalog_entry};
use crate::github::GithubError;
use crate::github::client::GithubClient;
use crate::github::queries::REPO_DETAILS_QUERY;
use crate::github::types::{DiscoveredRepo, DiscoveryOrigin, NodesData};
use crate::http::HttpTransport;
use crate::ledger::{Ledger, LedgerEntry};
use crate::pacing::ApiRateLimiter;

/// Per-batch accounting.
#[derive(Debug, Default, Clone, Copy)]
pub struct BatchStats {
    /// Catalog files written.
    pub written: usize,
    /// Repositories skipped: archived, disabled, or no longer resolvable.
    pub filtered: usize,
}

/// Fetch details for one batch and write the surviving entries.
///
/// Mutates the ledger in place; each entry is recorded only after its
/// catalog file landed on disk. Archived and disabled repositories are
/// neither written nor recorded: their stale ledger state is deliberately
/// left alone, so they re-enter the updated queue on every run as an
/// idempotent no-op until they disappear from discovery or come back.
///
/// Errors propagate without any retry here; the orchestrator decides
/// whether to wait (rate limits) or abandon the batch (anything else).
pub async fn process_batch<T: HttpTransport>(
    client: &GithubClient<T>,
    store: &CatalogStore,
    ledger: &mut Ledger,
    batch: &[DiscoveredRepo],
    limiter: &ApiRateLimiter,
    on_progress: Option<&ProgressCallback>,
) -> Result<BatchStats, SyncError> {
    let mut stats = BatchStats::default();
    if batch.is_empty() {
        return Ok(stats);
    }

    let origins: HashMap<&str, DiscoveryOrigin> = batch
        .iter()
        .map(|repo| (repo.id.as_str(), repo.origin))
        .collect();

    limiter.wait().await;

    let ids: Vec<&str> = batch.iter().map(|repo| repo.id.as_str()).collect();
    let data = client
        .graphql(REPO_DETAILS_QUERY, json!({ "ids": ids }))
        .await?;

    let parsed: NodesData = serde_json::from_value(data)
        .map_err(|e| GithubError::Decode(e.to_string()))?;

    let resolved = parsed.nodes.len();
    stats.filtered += batch.len().saturating_sub(resolved);

    for details in parsed.nodes.into_iter() {
        let Some(details) = details else {
            // Deleted or made private between discovery and fetch.
            stats.filtered += 1;
            continue;
        };

        if details.is_archived || details.is_disabled {
            tracing::debug!(
                repo = %details.name_with_owner,
                archived = details.is_archived,
                disabled = details.is_disabled,
                "skipping inactive repository"
            );
            stats.filtered += 1;
            continue;
        }

        let origin = origins
            .get(details.id.as_str())
            .copied()
            .unwrap_or(DiscoveryOrigin::Package);

        let entry = to_catalog_entry(&details, origin);
        store.write(&entry)?;

        ledger.record(LedgerEntry {
            id: details.id.clone(),
            name: details.name.clone(),
            owner: entry.owner.clone(),
            repo_type: entry.repo_type,
            updated_at: details.updated_at,
            commit_hash: details.head_commit(),
            last_synced: Utc::now(),
        });

        emit(
            on_progress,
            SyncProgress::EntryWritten {
                name_with_owner: details.name_with_owner.clone(),
            },
        );
        stats.written += 1;
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RepoType;
    use crate::http::{HttpResponse, MockTransport};
    use chrono::TimeZone;

    const TEST_URL: &str = "https://github.test/graphql";

    fn client(transport: MockTransport) -> GithubClient<MockTransport> {
        GithubClient::new(transport, "test-token").with_endpoint(TEST_URL)
    }

    fn discovered(id: &str, origin: DiscoveryOrigin) -> DiscoveredRepo {
        DiscoveredRepo {
            id: id.to_string(),
            name: format!("repo-{id}"),
            owner: "owner".to_string(),
            name_with_owner: format!("owner/repo-{id}"),
            updated_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            commit_hash: Some(format!("oid-{id}")),
            origin,
        }
    }

    fn detail_node(id: &str, archived: bool) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "name": format!("repo-{id}"),
            "nameWithOwner": format!("owner/repo-{id}"),
            "description": "desc",
            "stargazerCount": 7,
            "forkCount": 1,
            "watchers": {"totalCount": 2},
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z",
            "isArchived": archived,
            "isDisabled": false,
            "isFork": false,
            "repositoryTopics": {"nodes": [{"topic": {"name": "zig-package"}}]},
            "defaultBranchRef": {"target": {"oid": format!("oid-{id}")}},
            "owner": {"login": "owner", "avatarUrl": "https://a.example/owner"}
        })
    }

    fn nodes_response(nodes: Vec<serde_json::Value>) -> serde_json::Value {
        serde_json::json!({"data": {"nodes": nodes}})
    }

    #[tokio::test]
    async fn writes_entries_and_records_ledger_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::new(dir.path());
        let mut ledger = Ledger::default();

        let transport = MockTransport::new();
        transport.push_json(
            TEST_URL,
            nodes_response(vec![detail_node("a", false), detail_node("b", false)]),
        );

        let batch = vec![
            discovered("a", DiscoveryOrigin::Package),
            discovered("b", DiscoveryOrigin::Application),
        ];
        let stats = process_batch(
            &client(transport),
            &store,
            &mut ledger,
            &batch,
            &ApiRateLimiter::new(1000),
            None,
        )
        .await
        .expect("batch");

        assert_eq!(stats.written, 2);
        assert_eq!(stats.filtered, 0);

        assert!(store.read("owner", "repo-a").unwrap().is_some());
        assert!(store.read("owner", "repo-b").unwrap().is_some());

        let entry = ledger.get("a").expect("ledger entry");
        assert_eq!(entry.owner, "owner");
        assert_eq!(entry.repo_type, RepoType::Project);
        assert_eq!(entry.commit_hash.as_deref(), Some("oid-a"));
    }

    #[tokio::test]
    async fn archived_repos_produce_no_file_and_no_ledger_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::new(dir.path());
        let mut ledger = Ledger::default();

        let transport = MockTransport::new();
        transport.push_json(
            TEST_URL,
            nodes_response(vec![detail_node("a", true), detail_node("b", false)]),
        );

        let batch = vec![
            discovered("a", DiscoveryOrigin::Package),
            discovered("b", DiscoveryOrigin::Package),
        ];
        let stats = process_batch(
            &client(transport),
            &store,
            &mut ledger,
            &batch,
            &ApiRateLimiter::new(1000),
            None,
        )
        .await
        .expect("batch");

        assert_eq!(stats.written, 1);
        assert_eq!(stats.filtered, 1);
        assert!(store.read("owner", "repo-a").unwrap().is_none());
        assert!(ledger.get("a").is_none());
        assert!(ledger.get("b").is_some());
    }

    #[tokio::test]
    async fn stale_ledger_entry_survives_archived_filter() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::new(dir.path());

        let mut ledger = Ledger::default();
        ledger.record(LedgerEntry {
            id: "a".to_string(),
            name: "repo-a".to_string(),
            owner: "owner".to_string(),
            repo_type: RepoType::Project,
            updated_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            commit_hash: Some("old-oid".to_string()),
            last_synced: Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap(),
        });

        let transport = MockTransport::new();
        transport.push_json(TEST_URL, nodes_response(vec![detail_node("a", true)]));

        let batch = vec![discovered("a", DiscoveryOrigin::Package)];
        process_batch(
            &client(transport),
            &store,
            &mut ledger,
            &batch,
            &ApiRateLimiter::new(1000),
            None,
        )
        .await
        .expect("batch");

        // The pre-existing entry is left untouched, not deleted or
        // advanced.
        let entry = ledger.get("a").expect("stale entry");
        assert_eq!(entry.commit_hash.as_deref(), Some("old-oid"));
    }

    #[tokio::test]
    async fn null_nodes_count_as_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::new(dir.path());
        let mut ledger = Ledger::default();

        let transport = MockTransport::new();
        transport.push_json(
            TEST_URL,
            nodes_response(vec![serde_json::Value::Null, detail_node("b", false)]),
        );

        let batch = vec![
            discovered("a", DiscoveryOrigin::Package),
            discovered("b", DiscoveryOrigin::Package),
        ];
        let stats = process_batch(
            &client(transport),
            &store,
            &mut ledger,
            &batch,
            &ApiRateLimiter::new(1000),
            None,
        )
        .await
        .expect("batch");

        assert_eq!(stats.written, 1);
        assert_eq!(stats.filtered, 1);
    }

    #[tokio::test]
    async fn rate_limit_propagates_without_partial_ledger_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::new(dir.path());
        let mut ledger = Ledger::default();

        let transport = MockTransport::new();
        transport.push_response(
            TEST_URL,
            HttpResponse {
                status: 429,
                headers: vec![("retry-after".to_string(), "60".to_string())],
                body: Vec::new(),
            },
        );

        let batch = vec![discovered("a", DiscoveryOrigin::Package)];
        let err = process_batch(
            &client(transport),
            &store,
            &mut ledger,
            &batch,
            &ApiRateLimiter::new(1000),
            None,
        )
        .await
        .expect_err("rate limited");

        assert!(err.rate_limit_resume().is_some());
        assert!(ledger.repos.is_empty());
    }

    #[tokio::test]
    async fn reprocessing_unchanged_data_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::new(dir.path());
        let mut ledger = Ledger::default();

        let transport = MockTransport::new();
        transport.push_json(TEST_URL, nodes_response(vec![detail_node("a", false)]));
        transport.push_json(TEST_URL, nodes_response(vec![detail_node("a", false)]));

        let batch = vec![discovered("a", DiscoveryOrigin::Package)];
        let client = client(transport);
        let limiter = ApiRateLimiter::new(1000);

        process_batch(&client, &store, &mut ledger, &batch, &limiter, None)
            .await
            .expect("first pass");
        let first_bytes = std::fs::read(store.entry_path("owner", "repo-a")).unwrap();
        let first_entry = ledger.get("a").unwrap().clone();

        process_batch(&client, &store, &mut ledger, &batch, &limiter, None)
            .await
            .expect("second pass");
        let second_bytes = std::fs::read(store.entry_path("owner", "repo-a")).unwrap();
        let second_entry = ledger.get("a").unwrap().clone();

        assert_eq!(first_bytes, second_bytes);
        assert_eq!(first_entry.updated_at, second_entry.updated_at);
        assert_eq!(first_entry.commit_hash, second_entry.commit_hash);
        // Only lastSynced may move between passes.
        assert!(second_entry.last_synced >= first_entry.last_synced);
    }
}
