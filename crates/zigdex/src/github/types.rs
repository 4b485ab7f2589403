//! GitHub API data types.
//!
//! Response shapes for the two GraphQL documents in [`super::queries`],
//! plus the lightweight identity record that drives reconciliation.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Which search query surfaced a repository.
///
/// Needed downstream: repositories discovered under the application query
/// get a different category fallback than package-tagged ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryOrigin {
    Package,
    Application,
}

/// Lightweight identity tuple returned by the search query.
///
/// Consumed once by the reconciler; never persisted.
#[derive(Debug, Clone)]
pub struct DiscoveredRepo {
    /// Stable GraphQL node id.
    pub id: String,
    pub name: String,
    pub owner: String,
    pub name_with_owner: String,
    pub updated_at: DateTime<Utc>,
    /// Head commit of the default branch. Absent for empty repositories.
    pub commit_hash: Option<String>,
    pub origin: DiscoveryOrigin,
}

// ---------- search response ----------

#[derive(Debug, Deserialize)]
pub struct SearchData {
    pub search: SearchConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConnection {
    pub page_info: PageInfo,
    #[serde(default)]
    pub nodes: Vec<SearchNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchNode {
    pub id: String,
    pub name: String,
    pub owner: OwnerLogin,
    pub name_with_owner: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub default_branch_ref: Option<BranchRef>,
}

impl SearchNode {
    /// Convert to the identity record used by the reconciler.
    #[must_use]
    pub fn into_discovered(self, origin: DiscoveryOrigin) -> DiscoveredRepo {
        let commit_hash = self
            .default_branch_ref
            .and_then(|r| r.target)
            .map(|t| t.oid);
        DiscoveredRepo {
            id: self.id,
            name: self.name,
            owner: self.owner.login,
            name_with_owner: self.name_with_owner,
            updated_at: self.updated_at,
            commit_hash,
            origin,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OwnerLogin {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct BranchRef {
    #[serde(default)]
    pub target: Option<CommitTarget>,
}

#[derive(Debug, Deserialize)]
pub struct CommitTarget {
    pub oid: String,
}

// ---------- detail response ----------

#[derive(Debug, Deserialize)]
pub struct NodesData {
    #[serde(default)]
    pub nodes: Vec<Option<RepoDetails>>,
}

/// Full repository metadata from the bulk-by-id query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoDetails {
    pub id: String,
    pub name: String,
    pub name_with_owner: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub homepage_url: Option<String>,
    pub stargazer_count: u64,
    pub fork_count: u64,
    pub watchers: TotalCount,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_archived: bool,
    pub is_disabled: bool,
    pub is_fork: bool,
    #[serde(default)]
    pub primary_language: Option<NamedNode>,
    #[serde(default)]
    pub license_info: Option<LicenseInfo>,
    #[serde(default)]
    pub repository_topics: TopicConnection,
    #[serde(default)]
    pub default_branch_ref: Option<BranchRef>,
    pub owner: OwnerDetails,
    #[serde(default)]
    pub releases: ReleaseConnection,
    #[serde(default)]
    pub manifest: Option<Blob>,
    #[serde(default)]
    pub readme_upper: Option<Blob>,
    #[serde(default)]
    pub readme_lower: Option<Blob>,
}

impl RepoDetails {
    /// Topic names, lowercased as GitHub serves them.
    #[must_use]
    pub fn topic_names(&self) -> Vec<String> {
        self.repository_topics
            .nodes
            .iter()
            .map(|n| n.topic.name.clone())
            .collect()
    }

    /// Head commit of the default branch, when one exists.
    #[must_use]
    pub fn head_commit(&self) -> Option<String> {
        self.default_branch_ref
            .as_ref()
            .and_then(|r| r.target.as_ref())
            .map(|t| t.oid.clone())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalCount {
    pub total_count: u64,
}

#[derive(Debug, Deserialize)]
pub struct NamedNode {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseInfo {
    #[serde(default)]
    pub spdx_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopicConnection {
    #[serde(default)]
    pub nodes: Vec<TopicNode>,
}

#[derive(Debug, Deserialize)]
pub struct TopicNode {
    pub topic: NamedNode,
}

/// Owner profile fields.
///
/// Users and organizations expose different optional fields; the query
/// aliases them onto one shape, so a single struct with optional fields
/// covers both account kinds.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDetails {
    pub login: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub twitter_username: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub followers: Option<TotalCount>,
    #[serde(default)]
    pub following: Option<TotalCount>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReleaseConnection {
    #[serde(default)]
    pub nodes: Vec<ReleaseNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseNode {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub is_prerelease: bool,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    pub url: String,
    #[serde(default)]
    pub release_assets: AssetConnection,
}

#[derive(Debug, Default, Deserialize)]
pub struct AssetConnection {
    #[serde(default)]
    pub nodes: Vec<AssetNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetNode {
    pub name: String,
    pub download_url: String,
    pub size: u64,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Blob {
    #[serde(default)]
    pub text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_node_converts_to_discovered_repo() {
        let node: SearchNode = serde_json::from_value(serde_json::json!({
            "id": "R_node1",
            "name": "zap",
            "owner": {"login": "ziggy"},
            "nameWithOwner": "ziggy/zap",
            "updatedAt": "2026-01-02T03:04:05Z",
            "defaultBranchRef": {"target": {"oid": "abc123"}}
        }))
        .expect("search node");

        let repo = node.into_discovered(DiscoveryOrigin::Package);
        assert_eq!(repo.id, "R_node1");
        assert_eq!(repo.owner, "ziggy");
        assert_eq!(repo.name_with_owner, "ziggy/zap");
        assert_eq!(repo.commit_hash.as_deref(), Some("abc123"));
        assert_eq!(repo.origin, DiscoveryOrigin::Package);
    }

    #[test]
    fn empty_default_branch_yields_no_commit_hash() {
        let node: SearchNode = serde_json::from_value(serde_json::json!({
            "id": "R_node2",
            "name": "empty",
            "owner": {"login": "ziggy"},
            "nameWithOwner": "ziggy/empty",
            "updatedAt": "2026-01-02T03:04:05Z",
            "defaultBranchRef": null
        }))
        .expect("search node");

        let repo = node.into_discovered(DiscoveryOrigin::Application);
        assert!(repo.commit_hash.is_none());
    }

    #[test]
    fn repo_details_deserializes_with_sparse_fields() {
        let details: RepoDetails = serde_json::from_value(serde_json::json!({
            "id": "R_node3",
            "name": "zls",
            "nameWithOwner": "zigtools/zls",
            "stargazerCount": 3000,
            "forkCount": 250,
            "watchers": {"totalCount": 40},
            "createdAt": "2020-05-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z",
            "isArchived": false,
            "isDisabled": false,
            "isFork": false,
            "owner": {"login": "zigtools"}
        }))
        .expect("sparse details");

        assert!(details.description.is_none());
        assert!(details.topic_names().is_empty());
        assert!(details.head_commit().is_none());
        assert!(details.releases.nodes.is_empty());
        assert!(details.manifest.is_none());
        assert!(details.owner.followers.is_none());
    }

    #[test]
    fn nodes_data_tolerates_null_entries() {
        let data: NodesData = serde_json::from_value(serde_json::json!({
            "nodes": [null, null]
        }))
        .expect("nodes with nulls");
        assert_eq!(data.nodes.len(), 2);
        assert!(data.nodes.iter().all(Option::is_none));
    }
}
