//! Error types for the newswire-search crate.
//!
//! Each variant carries a stable error code (SCREAMING_SNAKE_CASE) that is
//! included in the Display output and accessible via [`SearchError::code()`].
//! No API keys appear in error messages.

use crate::types::ProviderId;

/// Stable error codes for programmatic error handling.
pub mod error_codes {
    /// The caller supplied unusable input (no providers, unknown provider id).
    pub const INPUT_INVALID: &str = "INPUT_INVALID";

    /// The provider rejected the credential (401/403).
    pub const AUTH_FAILED: &str = "AUTH_FAILED";

    /// The provider is throttling requests (429).
    pub const RATE_LIMITED: &str = "RATE_LIMITED";

    /// The provider refused service (426 or 5xx).
    pub const UPSTREAM_UNAVAILABLE: &str = "UPSTREAM_UNAVAILABLE";

    /// Any other non-2xx HTTP status.
    pub const HTTP_ERROR: &str = "HTTP_ERROR";

    /// The provider answered with its own error envelope.
    pub const PROVIDER_PAYLOAD: &str = "PROVIDER_PAYLOAD";

    /// Connection-level failure.
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";

    /// Request timed out.
    pub const TIMEOUT_ERROR: &str = "TIMEOUT_ERROR";

    /// Response body was not valid JSON.
    pub const PARSE_ERROR: &str = "PARSE_ERROR";

    /// Invalid or missing configuration.
    pub const CONFIG_INVALID: &str = "CONFIG_INVALID";

    /// Every enabled provider failed.
    pub const ALL_PROVIDERS_FAILED: &str = "ALL_PROVIDERS_FAILED";
}

/// Errors that can occur while fetching, normalising or aggregating news.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Caller-side input error. Raised before any network attempt.
    #[error("[{}] {}", error_codes::INPUT_INVALID, .0)]
    Input(String),

    /// Bad or missing credential. Never retried.
    #[error("[{}] {}", error_codes::AUTH_FAILED, .0)]
    Auth(String),

    /// HTTP 429 from the provider.
    #[error("[{}] {}", error_codes::RATE_LIMITED, .0)]
    RateLimited(String),

    /// HTTP 426 or 5xx from the provider.
    #[error("[{}] {}", error_codes::UPSTREAM_UNAVAILABLE, .0)]
    UpstreamUnavailable(String),

    /// Any other non-2xx HTTP status.
    #[error("[{}] HTTP {status}: {message}", error_codes::HTTP_ERROR)]
    Http {
        /// Response status code.
        status: u16,
        /// Message extracted from the body, or the raw body.
        message: String,
    },

    /// The provider's own error envelope (`status: "error"`, `errors`, `error`).
    /// `message` is the upstream text, verbatim.
    #[error("[{}] {provider}: {message}", error_codes::PROVIDER_PAYLOAD)]
    ProviderPayload {
        /// Which provider reported the error.
        provider: ProviderId,
        /// Upstream message.
        message: String,
    },

    /// Connection refused, DNS failure, reset, and similar.
    #[error("[{}] {}", error_codes::NETWORK_ERROR, .0)]
    Network(String),

    /// Request exceeded its time budget.
    #[error("[{}] {}", error_codes::TIMEOUT_ERROR, .0)]
    Timeout(String),

    /// Response body could not be decoded as JSON.
    #[error("[{}] {}", error_codes::PARSE_ERROR, .0)]
    Parse(String),

    /// Invalid configuration.
    #[error("[{}] {}", error_codes::CONFIG_INVALID, .0)]
    Config(String),

    /// Every enabled provider failed; carries the joined per-provider reasons.
    #[error("[{}] {}", error_codes::ALL_PROVIDERS_FAILED, .0)]
    AllProvidersFailed(String),
}

impl SearchError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Input(_) => error_codes::INPUT_INVALID,
            Self::Auth(_) => error_codes::AUTH_FAILED,
            Self::RateLimited(_) => error_codes::RATE_LIMITED,
            Self::UpstreamUnavailable(_) => error_codes::UPSTREAM_UNAVAILABLE,
            Self::Http { .. } => error_codes::HTTP_ERROR,
            Self::ProviderPayload { .. } => error_codes::PROVIDER_PAYLOAD,
            Self::Network(_) => error_codes::NETWORK_ERROR,
            Self::Timeout(_) => error_codes::TIMEOUT_ERROR,
            Self::Parse(_) => error_codes::PARSE_ERROR,
            Self::Config(_) => error_codes::CONFIG_INVALID,
            Self::AllProvidersFailed(_) => error_codes::ALL_PROVIDERS_FAILED,
        }
    }

    /// Returns the inner message without the code prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Input(m)
            | Self::Auth(m)
            | Self::RateLimited(m)
            | Self::UpstreamUnavailable(m)
            | Self::Network(m)
            | Self::Timeout(m)
            | Self::Parse(m)
            | Self::Config(m)
            | Self::AllProvidersFailed(m) => m,
            Self::Http { message, .. } | Self::ProviderPayload { message, .. } => message,
        }
    }

    /// Returns true if the transport should try the request again.
    ///
    /// Everything that comes out of a failed HTTP exchange is retryable except
    /// an authentication failure. Provider envelopes, input and config errors
    /// are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited(_)
            | Self::UpstreamUnavailable(_)
            | Self::Http { .. }
            | Self::Network(_)
            | Self::Timeout(_)
            | Self::Parse(_) => true,
            Self::Input(_)
            | Self::Auth(_)
            | Self::ProviderPayload { .. }
            | Self::Config(_)
            | Self::AllProvidersFailed(_) => false,
        }
    }
}

/// Convenience type alias for newswire-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
