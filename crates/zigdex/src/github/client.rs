//! GraphQL client with rate-limit detection.
//!
//! [`GithubClient::graphql`] issues one query and classifies the outcome:
//! a successful `data` payload, a [`GithubError::RateLimited`] signal with a
//! resume timestamp, or a plain [`GithubError::Transport`]. It never retries
//! on its own — discovery wants to resume the same page and batch processing
//! wants to resume the same batch, so backoff policy lives with the callers.

use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};

use super::error::{DEFAULT_RESET_DELAY_SECS, GithubError};
use crate::http::{HttpRequest, HttpResponse, HttpTransport};

/// Public GitHub GraphQL endpoint.
pub const GRAPHQL_ENDPOINT: &str = "https://api.github.com/graphql";

const USER_AGENT: &str = concat!("zigdex/", env!("CARGO_PKG_VERSION"));

/// GitHub API client over an [`HttpTransport`].
pub struct GithubClient<T> {
    transport: T,
    endpoint: String,
    token: String,
}

impl<T: HttpTransport> GithubClient<T> {
    /// Create a client from an authentication token.
    pub fn new(transport: T, token: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: GRAPHQL_ENDPOINT.to_string(),
            token: token.into(),
        }
    }

    /// Override the GraphQL endpoint (tests, GitHub Enterprise).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// The endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute a GraphQL query and return its `data` payload.
    pub async fn graphql(&self, query: &str, variables: Value) -> Result<Value, GithubError> {
        let body = json!({ "query": query, "variables": variables });

        let request = HttpRequest {
            url: self.endpoint.clone(),
            headers: vec![
                ("Authorization".to_string(), format!("Bearer {}", self.token)),
                ("Content-Type".to_string(), "application/json".to_string()),
                ("User-Agent".to_string(), USER_AGENT.to_string()),
            ],
            body: body.to_string().into_bytes(),
        };

        let response = self.transport.post(request).await?;

        if is_throttle_status(response.status) {
            return Err(GithubError::RateLimited {
                resume_at: resume_time_from_headers(&response),
            });
        }

        if !(200..300).contains(&response.status) {
            return Err(GithubError::Transport(format!(
                "unexpected HTTP status {}",
                response.status
            )));
        }

        let payload: Value = serde_json::from_slice(&response.body)
            .map_err(|e| GithubError::Decode(e.to_string()))?;

        if let Some(errors) = payload.get("errors").and_then(Value::as_array)
            && !errors.is_empty()
        {
            return Err(classify_error_payload(errors));
        }

        payload
            .get("data")
            .cloned()
            .ok_or_else(|| GithubError::Decode("response has no data field".to_string()))
    }
}

/// Whether an HTTP status indicates throttling.
fn is_throttle_status(status: u16) -> bool {
    status == 403 || status == 429
}

/// Compute the resume time from throttle response headers.
///
/// `retry-after` carries a delay in seconds; `x-ratelimit-reset` carries an
/// epoch timestamp. Absent or unparseable headers fall back to one hour out.
fn resume_time_from_headers(response: &HttpResponse) -> DateTime<Utc> {
    if let Some(delay) = response
        .header("retry-after")
        .and_then(|v| v.trim().parse::<i64>().ok())
    {
        return Utc::now() + Duration::seconds(delay.max(0));
    }

    if let Some(epoch) = response
        .header("x-ratelimit-reset")
        .and_then(|v| v.trim().parse::<i64>().ok())
        && let Some(reset_at) = DateTime::from_timestamp(epoch, 0)
    {
        return reset_at;
    }

    Utc::now() + Duration::seconds(DEFAULT_RESET_DELAY_SECS)
}

/// Classify a GraphQL `errors` payload.
///
/// GraphQL rate limiting surfaces as a 200 with a `RATE_LIMITED` error code;
/// no reset header is available on this path, so the default delay applies.
fn classify_error_payload(errors: &[Value]) -> GithubError {
    let rate_limited = errors.iter().any(|e| {
        e.get("type")
            .and_then(Value::as_str)
            .is_some_and(|t| t.eq_ignore_ascii_case("RATE_LIMITED"))
    });

    if rate_limited {
        return GithubError::rate_limited_default();
    }

    let messages: Vec<&str> = errors
        .iter()
        .filter_map(|e| e.get("message").and_then(Value::as_str))
        .collect();

    GithubError::Transport(format!("graphql errors: {}", messages.join("; ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpHeaders, MockTransport};

    const TEST_URL: &str = "https://github.test/graphql";

    fn client(transport: MockTransport) -> GithubClient<MockTransport> {
        GithubClient::new(transport, "test-token").with_endpoint(TEST_URL)
    }

    fn response(status: u16, headers: HttpHeaders, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers,
            body: body.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn graphql_returns_data_payload() {
        let transport = MockTransport::new();
        transport.push_json(TEST_URL, serde_json::json!({"data": {"answer": 42}}));

        let data = client(transport.clone())
            .graphql("query { answer }", json!({}))
            .await
            .expect("data payload");
        assert_eq!(data, serde_json::json!({"answer": 42}));

        // The request carries auth and the query body.
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["query"], "query { answer }");
        assert!(
            requests[0]
                .headers
                .iter()
                .any(|(k, v)| k == "Authorization" && v == "Bearer test-token")
        );
    }

    #[tokio::test]
    async fn throttle_status_uses_retry_after_header() {
        let transport = MockTransport::new();
        transport.push_response(
            TEST_URL,
            response(
                403,
                vec![("retry-after".to_string(), "120".to_string())],
                "",
            ),
        );

        let err = client(transport)
            .graphql("query {}", json!({}))
            .await
            .expect_err("throttled");
        let GithubError::RateLimited { resume_at } = err else {
            panic!("expected RateLimited");
        };
        let delta = resume_at - Utc::now();
        assert!(delta > Duration::seconds(110));
        assert!(delta <= Duration::seconds(120));
    }

    #[tokio::test]
    async fn throttle_status_falls_back_to_reset_header() {
        let reset_epoch = (Utc::now() + Duration::seconds(300)).timestamp();
        let transport = MockTransport::new();
        transport.push_response(
            TEST_URL,
            response(
                429,
                vec![("x-ratelimit-reset".to_string(), reset_epoch.to_string())],
                "",
            ),
        );

        let err = client(transport)
            .graphql("query {}", json!({}))
            .await
            .expect_err("throttled");
        let GithubError::RateLimited { resume_at } = err else {
            panic!("expected RateLimited");
        };
        assert_eq!(resume_at.timestamp(), reset_epoch);
    }

    #[tokio::test]
    async fn throttle_status_without_headers_defaults_to_an_hour() {
        let transport = MockTransport::new();
        transport.push_response(TEST_URL, response(403, Vec::new(), ""));

        let err = client(transport)
            .graphql("query {}", json!({}))
            .await
            .expect_err("throttled");
        let GithubError::RateLimited { resume_at } = err else {
            panic!("expected RateLimited");
        };
        let delta = resume_at - Utc::now();
        assert!(delta > Duration::minutes(59));
        assert!(delta <= Duration::hours(1));
    }

    #[tokio::test]
    async fn rate_limited_error_payload_is_detected() {
        let transport = MockTransport::new();
        transport.push_json(
            TEST_URL,
            serde_json::json!({
                "errors": [{"type": "RATE_LIMITED", "message": "API rate limit exceeded"}]
            }),
        );

        let err = client(transport)
            .graphql("query {}", json!({}))
            .await
            .expect_err("rate limited");
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn other_error_payloads_join_messages() {
        let transport = MockTransport::new();
        transport.push_json(
            TEST_URL,
            serde_json::json!({
                "errors": [
                    {"type": "NOT_FOUND", "message": "Could not resolve"},
                    {"message": "Something else"}
                ]
            }),
        );

        let err = client(transport)
            .graphql("query {}", json!({}))
            .await
            .expect_err("transport error");
        match err {
            GithubError::Transport(msg) => {
                assert!(msg.contains("Could not resolve"));
                assert!(msg.contains("Something else"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unexpected_status_is_a_transport_error() {
        let transport = MockTransport::new();
        transport.push_response(TEST_URL, response(500, Vec::new(), "oops"));

        let err = client(transport)
            .graphql("query {}", json!({}))
            .await
            .expect_err("server error");
        assert!(matches!(err, GithubError::Transport(_)));
    }

    #[tokio::test]
    async fn garbage_body_is_a_decode_error() {
        let transport = MockTransport::new();
        transport.push_response(TEST_URL, response(200, Vec::new(), "not json"));

        let err = client(transport)
            .graphql("query {}", json!({}))
            .await
            .expect_err("decode error");
        assert!(matches!(err, GithubError::Decode(_)));
    }
}
