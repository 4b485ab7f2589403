//! Proactive request pacing.
//!
//! GitHub allows far more requests per hour than a sync run ever issues, but
//! the search and GraphQL endpoints have informal secondary budgets that are
//! easy to trip with back-to-back requests. The limiter here spaces requests
//! out ahead of time; hard rate-limit responses are still handled reactively
//! by the callers (sleep until the advertised reset).

use std::num::NonZeroU32;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

type GovernorRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Default budget for search/detail requests (requests per second).
///
/// The pipeline is sequential, so this is effectively a minimum spacing
/// between consecutive remote calls.
pub const DEFAULT_RPS: u32 = 1;

/// A standalone API rate limiter using the governor crate.
///
/// # Example
///
/// ```ignore
/// use zigdex::pacing::ApiRateLimiter;
///
/// let limiter = ApiRateLimiter::new(1);
///
/// // Before each API call:
/// limiter.wait().await;
/// client.graphql(query, variables).await?;
/// ```
#[derive(Clone)]
pub struct ApiRateLimiter {
    inner: Arc<GovernorRateLimiter>,
}

impl ApiRateLimiter {
    /// Create a new rate limiter with the specified requests per second.
    ///
    /// A zero budget is clamped to one request per second.
    pub fn new(requests_per_second: u32) -> Self {
        let rps = NonZeroU32::new(requests_per_second)
            .unwrap_or_else(|| NonZeroU32::new(1).expect("1 is non-zero"));
        let rate_limiter = RateLimiter::direct(Quota::per_second(rps));

        Self {
            inner: Arc::new(rate_limiter),
        }
    }

    /// Wait until a request is allowed by the rate limiter.
    ///
    /// Blocks (asynchronously) until the budget allows another request.
    pub async fn wait(&self) {
        self.inner.until_ready().await;
    }
}

impl Default for ApiRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_RPS)
    }
}

/// Safety margin added on top of advertised rate-limit reset times.
///
/// Reset timestamps have second granularity and the local clock may lag the
/// server's, so resuming exactly at the advertised instant can still hit
/// the closed window.
pub const RESUME_MARGIN_SECS: i64 = 5;

/// Sleep until past `resume_at` plus the safety margin.
///
/// Resolves immediately when the resume time is already in the past.
pub async fn sleep_past(resume_at: DateTime<Utc>) {
    let wait = resume_at + Duration::seconds(RESUME_MARGIN_SECS) - Utc::now();
    if let Ok(wait) = wait.to_std() {
        tokio::time::sleep(wait).await;
    }
}
