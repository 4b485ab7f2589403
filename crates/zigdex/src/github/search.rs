//! Discovery engine: paginate a repository search to completion.
//!
//! Pagination policy:
//! - the proactive limiter is consulted before every page to stay inside
//!   the informal search budget;
//! - a rate-limit signal sleeps past the advertised reset and retries the
//!   same cursor, so no records are lost or duplicated;
//! - any other failure stops pagination and returns what was accumulated —
//!   discovery prefers partial data over a failed run.

use serde_json::json;

use super::client::GithubClient;
use super::error::GithubError;
use super::queries::{SEARCH_PAGE_QUERY, SEARCH_PAGE_SIZE};
use super::types::{DiscoveredRepo, DiscoveryOrigin, SearchData};
use crate::http::HttpTransport;
use crate::pacing::{ApiRateLimiter, sleep_past};
use crate::sync::progress::{ProgressCallback, SyncProgress, emit};

/// Paginate `search` to completion, returning identity records in result
/// order.
///
/// The cursor guarantees no repeats within one query; callers running
/// multiple queries must dedupe across them.
pub async fn discover<T: HttpTransport>(
    client: &GithubClient<T>,
    search: &str,
    origin: DiscoveryOrigin,
    limiter: &ApiRateLimiter,
    on_progress: Option<&ProgressCallback>,
) -> Vec<DiscoveredRepo> {
    let mut repos: Vec<DiscoveredRepo> = Vec::new();
    let mut cursor: Option<String> = None;
    let mut page: u32 = 1;

    emit(
        on_progress,
        SyncProgress::SearchStarted {
            query: search.to_string(),
        },
    );

    loop {
        limiter.wait().await;

        let variables = json!({
            "searchQuery": search,
            "first": SEARCH_PAGE_SIZE,
            "after": cursor,
        });

        let data = match client.graphql(SEARCH_PAGE_QUERY, variables).await {
            Ok(data) => data,
            Err(GithubError::RateLimited { resume_at }) => {
                emit(on_progress, SyncProgress::RateLimitWait { resume_at });
                tracing::info!(%resume_at, query = search, "search rate limited, waiting");
                sleep_past(resume_at).await;
                // Cursor unchanged: retry the same page.
                continue;
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    query = search,
                    accumulated = repos.len(),
                    "search failed, returning partial results"
                );
                break;
            }
        };

        let parsed: SearchData = match serde_json::from_value(data) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    query = search,
                    accumulated = repos.len(),
                    "malformed search page, returning partial results"
                );
                break;
            }
        };

        let count = parsed.search.nodes.len();
        repos.extend(
            parsed
                .search
                .nodes
                .into_iter()
                .map(|node| node.into_discovered(origin)),
        );

        emit(
            on_progress,
            SyncProgress::SearchPage {
                query: search.to_string(),
                page,
                count,
                total_so_far: repos.len(),
            },
        );

        if !parsed.search.page_info.has_next_page {
            break;
        }
        cursor = parsed.search.page_info.end_cursor;
        page += 1;
    }

    emit(
        on_progress,
        SyncProgress::SearchComplete {
            query: search.to_string(),
            total: repos.len(),
        },
    );

    repos
}
