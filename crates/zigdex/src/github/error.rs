//! GitHub API error types.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// Fallback resume delay when a rate-limit response carries no usable
/// reset information (notably the GraphQL error-payload path, where no
/// headers are available).
pub const DEFAULT_RESET_DELAY_SECS: i64 = 3_600;

/// Errors that can occur when talking to the GitHub GraphQL API.
#[derive(Debug, Error)]
pub enum GithubError {
    /// The API asked us to back off. Carries the time at which requests
    /// may resume; callers sleep past it and retry.
    #[error("rate limited, resume at {resume_at}")]
    RateLimited { resume_at: DateTime<Utc> },

    /// Any other remote or network failure. Not retried.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response arrived but could not be decoded into the expected
    /// shape.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl GithubError {
    /// A rate-limit error with the default one-hour resume time.
    #[must_use]
    pub fn rate_limited_default() -> Self {
        Self::RateLimited {
            resume_at: Utc::now() + Duration::seconds(DEFAULT_RESET_DELAY_SECS),
        }
    }

    /// Check if this error is a rate limit (retryable by waiting).
    #[inline]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

impl From<crate::http::HttpError> for GithubError {
    fn from(err: crate::http::HttpError) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_default_is_about_an_hour_out() {
        let err = GithubError::rate_limited_default();
        let GithubError::RateLimited { resume_at } = err else {
            panic!("expected RateLimited");
        };
        let delta = resume_at - Utc::now();
        assert!(delta > Duration::minutes(59));
        assert!(delta <= Duration::hours(1));
    }

    #[test]
    fn is_rate_limited_matches_only_rate_limits() {
        assert!(GithubError::rate_limited_default().is_rate_limited());
        assert!(!GithubError::Transport("boom".to_string()).is_rate_limited());
        assert!(!GithubError::Decode("bad json".to_string()).is_rate_limited());
    }
}
