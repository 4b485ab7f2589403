//! Integration tests for the persistence layer.
//!
//! These exercise the ledger and catalog store together on a real
//! filesystem, plus the reconciliation cycle a scheduled run goes through:
//! load ledger, diff discovery, record progress, flush, reload.

use chrono::{TimeZone, Utc};
use zigdex::catalog::{CatalogEntry, CatalogStore, RepoType};
use zigdex::github::types::{DiscoveredRepo, DiscoveryOrigin};
use zigdex::ledger::{LedgerEntry, LedgerStore};
use zigdex::reconcile::reconcile;

fn discovered(id: &str, commit: &str) -> DiscoveredRepo {
    DiscoveredRepo {
        id: id.to_string(),
        name: format!("repo-{id}"),
        owner: "owner".to_string(),
        name_with_owner: format!("owner/repo-{id}"),
        updated_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        commit_hash: Some(commit.to_string()),
        origin: DiscoveryOrigin::Package,
    }
}

fn ledger_entry(id: &str, commit: &str) -> LedgerEntry {
    LedgerEntry {
        id: id.to_string(),
        name: format!("repo-{id}"),
        owner: "owner".to_string(),
        repo_type: RepoType::Project,
        updated_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        commit_hash: Some(commit.to_string()),
        last_synced: Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap(),
    }
}

fn catalog_entry(owner: &str, repo: &str) -> CatalogEntry {
    CatalogEntry {
        name: repo.to_string(),
        owner: owner.to_string(),
        repo: repo.to_string(),
        description: Some("integration fixture".to_string()),
        repo_type: RepoType::Project,
        category: Some("library".to_string()),
        license: Some("MIT".to_string()),
        homepage: None,
        readme: None,
        dependencies: None,
        minimum_zig_version: Some("0.13.0".to_string()),
        topics: vec!["zig-package".to_string()],
        stars: 5,
        forks: 1,
        watchers: 2,
        updated_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        owner_profile: None,
        releases: Vec::new(),
    }
}

#[test]
fn ledger_survives_a_reload_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("ledger.json");

    {
        let mut store = LedgerStore::open(&path).unwrap();
        store.ledger_mut().record(ledger_entry("a", "hash1"));
        store.ledger_mut().record(ledger_entry("b", "hash2"));
        store.flush().unwrap();
        store
            .ledger_mut()
            .finish_run(Utc.with_ymd_and_hms(2026, 1, 3, 0, 0, 0).unwrap());
        store.flush().unwrap();
    }

    let reopened = LedgerStore::open(&path).unwrap();
    assert_eq!(reopened.ledger().repos.len(), 2);
    assert_eq!(
        reopened.ledger().last_sync,
        Some(Utc.with_ymd_and_hms(2026, 1, 3, 0, 0, 0).unwrap())
    );
}

#[test]
fn reconcile_drives_the_incremental_cycle_across_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.json");

    // Run 1: empty ledger, both repos are new; record them and flush.
    {
        let mut store = LedgerStore::open(&path).unwrap();
        let found = vec![discovered("a", "hash1"), discovered("b", "hash2")];
        let report = reconcile(&found, store.ledger());
        assert_eq!(report.new.len(), 2);

        for repo in &report.new {
            store.ledger_mut().record(ledger_entry(
                &repo.id,
                repo.commit_hash.as_deref().unwrap(),
            ));
        }
        store.flush().unwrap();
    }

    // Run 2 (fresh process): "a" advanced, "b" unchanged, "c" appeared.
    {
        let mut store = LedgerStore::open(&path).unwrap();
        let found = vec![
            discovered("a", "hash1-next"),
            discovered("b", "hash2"),
            discovered("c", "hash3"),
        ];
        let report = reconcile(&found, store.ledger());

        let new_ids: Vec<&str> = report.new.iter().map(|r| r.id.as_str()).collect();
        let updated_ids: Vec<&str> = report.updated.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(new_ids, vec!["c"]);
        assert_eq!(updated_ids, vec!["a"]);
        assert!(report.removed.is_empty());

        store.ledger_mut().record(ledger_entry("a", "hash1-next"));
        store.ledger_mut().record(ledger_entry("c", "hash3"));
        store.flush().unwrap();
    }

    // Run 3: "b" vanished from discovery; it is reported but stays in the
    // ledger.
    {
        let store = LedgerStore::open(&path).unwrap();
        let found = vec![discovered("a", "hash1-next"), discovered("c", "hash3")];
        let report = reconcile(&found, store.ledger());
        assert!(report.new.is_empty());
        assert!(report.updated.is_empty());
        assert_eq!(report.removed, vec!["b".to_string()]);
        assert!(store.ledger().get("b").is_some());
    }
}

#[test]
fn catalog_and_ledger_are_independent_documents() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = CatalogStore::new(dir.path().join("packages"));
    let mut ledger = LedgerStore::open(dir.path().join("ledger.json")).unwrap();

    catalog.write(&catalog_entry("owner", "repo-a")).unwrap();
    ledger.ledger_mut().record(ledger_entry("a", "hash1"));
    ledger.flush().unwrap();

    // Deleting the catalog file leaves the ledger intact, and vice versa:
    // the catalog is a derived projection, the ledger is sync state.
    std::fs::remove_file(catalog.entry_path("owner", "repo-a")).unwrap();
    let reopened = LedgerStore::open(dir.path().join("ledger.json")).unwrap();
    assert!(reopened.ledger().get("a").is_some());
    assert!(catalog.read("owner", "repo-a").unwrap().is_none());
}

#[test]
fn catalog_layout_is_one_file_per_repo_under_owner_directories() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = CatalogStore::new(dir.path());

    catalog.write(&catalog_entry("alice", "one")).unwrap();
    catalog.write(&catalog_entry("alice", "two")).unwrap();
    catalog.write(&catalog_entry("bob", "one")).unwrap();

    assert!(dir.path().join("alice").join("one.json").is_file());
    assert!(dir.path().join("alice").join("two.json").is_file());
    assert!(dir.path().join("bob").join("one.json").is_file());

    // Same-named repos under different owners do not collide.
    let alice = catalog.read("alice", "one").unwrap().unwrap();
    let bob = catalog.read("bob", "one").unwrap().unwrap();
    assert_eq!(alice.owner, "alice");
    assert_eq!(bob.owner, "bob");
}

#[test]
fn catalog_documents_use_the_published_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = CatalogStore::new(dir.path());
    catalog.write(&catalog_entry("owner", "repo-a")).unwrap();

    let raw = std::fs::read_to_string(catalog.entry_path("owner", "repo-a")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(json["type"], "project");
    assert_eq!(json["minimumZigVersion"], "0.13.0");
    assert_eq!(json["updatedAt"], "2026-01-01T00:00:00Z");
    assert!(json.get("ownerProfile").is_none());
}
