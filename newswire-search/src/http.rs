//! Shared HTTP client and the retrying JSON transport used by every provider.
//!
//! [`HttpTransport::fetch_json`] performs one GET per attempt, classifies
//! failures into [`SearchError`] variants and retries with exponential
//! backoff. Backoff uses `tokio::time::sleep`, so concurrent provider
//! requests keep running while one of them waits.

use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::retry::RetryPolicy;

/// Query parameters that carry credentials and must never be logged.
const SECRET_PARAMS: &[&str] = &["apiKey", "apikey", "api_token", "token"];

/// Longest raw body excerpt included in an error message.
const MAX_BODY_EXCERPT: usize = 200;

/// Default User-Agent sent to providers.
pub fn default_user_agent() -> String {
    format!("newswire/{}", env!("CARGO_PKG_VERSION"))
}

/// Build a [`reqwest::Client`] for JSON news APIs.
///
/// The client has:
/// - Timeout from config
/// - User-Agent from config, or `newswire/<version>`
/// - Brotli and gzip decompression
///
/// # Errors
///
/// Returns [`SearchError::Config`] if the client cannot be constructed.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    let ua = config.user_agent.clone().unwrap_or_else(default_user_agent);

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| SearchError::Config(format!("failed to build HTTP client: {e}")))
}

/// Retrying JSON-over-HTTP GET client. Cheap to clone; clones share the
/// connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl HttpTransport {
    /// Wrap an existing client.
    pub fn new(client: reqwest::Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Build a client from config and wrap it.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the client cannot be constructed.
    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        Ok(Self::new(build_client(config)?, config.retry))
    }

    /// The retry policy in effect.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// GET `url` and decode the body as JSON.
    ///
    /// Retries every retryable failure up to `max_retries` times. An
    /// authentication failure is returned immediately. After the last
    /// attempt the most recent error is returned.
    pub async fn fetch_json(&self, url: &Url) -> Result<Value, SearchError> {
        let shown = redact(url);
        let mut retry = 0u32;
        loop {
            tracing::debug!(url = %shown, attempt = retry + 1, "provider request");
            match self.attempt(url).await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() || retry >= self.retry.max_retries => {
                    tracing::debug!(url = %shown, error = %e, "provider request failed");
                    return Err(e);
                }
                Err(e) => {
                    retry += 1;
                    let delay = self.retry.delay_for_retry(retry);
                    tracing::warn!(
                        url = %shown,
                        error = %e,
                        retry,
                        delay_ms = delay.as_millis() as u64,
                        "retrying provider request"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn attempt(&self, url: &Url) -> Result<Value, SearchError> {
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            return Err(classify_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            SearchError::Parse(format!(
                "invalid JSON response: {e} (body: {})",
                excerpt(&body)
            ))
        })
    }
}

/// Map a non-2xx status and its body to a typed error.
pub fn classify_status(status: u16, body: &str) -> SearchError {
    let message = extract_error_message(body);
    match status {
        401 | 403 => SearchError::Auth(format!("API key rejected ({status}): {message}")),
        429 => SearchError::RateLimited(format!("rate limited (429): {message}")),
        426 | 500..=599 => {
            SearchError::UpstreamUnavailable(format!("service unavailable ({status}): {message}"))
        }
        _ => SearchError::Http { status, message },
    }
}

/// Extract a provider error message from a JSON error body.
///
/// Looks at `message`, `error.message`, `error` (string) and `errors[0]`,
/// falling back to a truncated copy of the raw body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .and_then(Value::as_str)
                .or_else(|| v.pointer("/error/message").and_then(Value::as_str))
                .or_else(|| v.get("error").and_then(Value::as_str))
                .or_else(|| v.pointer("/errors/0").and_then(Value::as_str))
                .map(String::from)
        })
        .unwrap_or_else(|| excerpt(body))
}

fn map_reqwest_error(e: reqwest::Error) -> SearchError {
    // reqwest errors embed the request URL; strip it so credentials never leak.
    let e = e.without_url();
    if e.is_timeout() {
        SearchError::Timeout(format!("request timed out: {e}"))
    } else if e.is_decode() || e.is_body() {
        SearchError::Parse(format!("failed to read response body: {e}"))
    } else {
        SearchError::Network(format!("request failed: {e}"))
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_BODY_EXCERPT {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(MAX_BODY_EXCERPT).collect();
    format!("{cut}...")
}

/// Render a URL for logging with credential parameters masked.
pub fn redact(url: &Url) -> String {
    if url.query().is_none() {
        return url.to_string();
    }
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if SECRET_PARAMS.contains(&k.as_ref()) {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    let mut shown = url.clone();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_client_with_default_config() {
        let config = SearchConfig::default();
        assert!(build_client(&config).is_ok());
    }

    #[test]
    fn build_client_with_custom_ua() {
        let config = SearchConfig {
            user_agent: Some("CustomBot/1.0".into()),
            ..Default::default()
        };
        assert!(build_client(&config).is_ok());
    }

    #[test]
    fn default_user_agent_names_crate() {
        assert!(default_user_agent().starts_with("newswire/"));
    }

    #[test]
    fn classify_auth_statuses() {
        assert_eq!(classify_status(401, "").code(), "AUTH_FAILED");
        assert_eq!(classify_status(403, "").code(), "AUTH_FAILED");
    }

    #[test]
    fn classify_rate_limit_and_upstream() {
        assert_eq!(classify_status(429, "").code(), "RATE_LIMITED");
        assert_eq!(classify_status(426, "").code(), "UPSTREAM_UNAVAILABLE");
        assert_eq!(classify_status(502, "").code(), "UPSTREAM_UNAVAILABLE");
    }

    #[test]
    fn classify_other_status_as_http() {
        match classify_status(404, "not here") {
            SearchError::Http { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "not here");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn error_message_extracted_from_json_shapes() {
        assert_eq!(extract_error_message(r#"{"message":"bad key"}"#), "bad key");
        assert_eq!(
            extract_error_message(r#"{"error":{"message":"quota"}}"#),
            "quota"
        );
        assert_eq!(
            extract_error_message(r#"{"errors":["first","second"]}"#),
            "first"
        );
        assert_eq!(extract_error_message("plain text"), "plain text");
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(1000);
        let msg = extract_error_message(&body);
        assert!(msg.len() < 300);
        assert!(msg.ends_with("..."));
    }

    #[test]
    fn redact_masks_credentials() {
        let url = Url::parse("https://newsapi.org/v2/everything?q=rust&apiKey=secret123")
            .expect("url");
        let shown = redact(&url);
        assert!(!shown.contains("secret123"));
        assert!(shown.contains("q=rust"));
        assert!(shown.contains("apiKey=***"));
    }

    #[test]
    fn redact_masks_api_token() {
        let url = Url::parse("https://api.marketaux.com/v1/news/all?api_token=abc&search=x")
            .expect("url");
        assert!(!redact(&url).contains("abc"));
    }

    #[test]
    fn redact_without_query_is_unchanged() {
        let url = Url::parse("https://gnews.io/api/v4/search").expect("url");
        assert_eq!(redact(&url), "https://gnews.io/api/v4/search");
    }
}
