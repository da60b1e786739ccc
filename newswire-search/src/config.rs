//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] holds per-provider credentials, the retry policy and
//! request behaviour. It is the runtime view; the application loads it from
//! a TOML file.

use std::collections::HashMap;
use std::fmt;

use crate::error::SearchError;
use crate::retry::{RetryPolicy, MAX_RETRIES_LIMIT};
use crate::types::ProviderId;

/// Credentials and endpoint for one provider.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProviderSettings {
    /// API key sent with every request.
    pub api_key: String,
    /// Override for the provider's public API host (used for proxies and tests).
    pub base_url: Option<String>,
}

impl ProviderSettings {
    /// Settings with just a key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
        }
    }

    /// Point the provider at a different host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Configuration for news search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Configured providers. A provider without an entry cannot be queried.
    pub providers: HashMap<ProviderId, ProviderSettings>,
    /// Retry behaviour for every provider request.
    pub retry: RetryPolicy,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Custom User-Agent. Defaults to `newswire/<version>`.
    pub user_agent: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            retry: RetryPolicy::default(),
            timeout_seconds: 10,
            user_agent: None,
        }
    }
}

impl SearchConfig {
    /// Add a provider with an API key.
    pub fn with_provider(mut self, id: ProviderId, api_key: impl Into<String>) -> Self {
        self.providers.insert(id, ProviderSettings::new(api_key));
        self
    }

    /// Add a provider with full settings.
    pub fn with_provider_settings(mut self, id: ProviderId, settings: ProviderSettings) -> Self {
        self.providers.insert(id, settings);
        self
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `timeout_seconds` must be greater than 0
    /// - `retry.max_retries` must not exceed [`MAX_RETRIES_LIMIT`]
    /// - every configured provider has a non-blank API key
    /// - every `base_url` override parses as an absolute URL
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.retry.max_retries > MAX_RETRIES_LIMIT {
            return Err(SearchError::Config(format!(
                "max_retries must be at most {MAX_RETRIES_LIMIT}, got {}",
                self.retry.max_retries
            )));
        }
        for (id, settings) in &self.providers {
            if settings.api_key.trim().is_empty() {
                return Err(SearchError::Config(format!("{id}: api_key is empty")));
            }
            if let Some(base) = &settings.base_url {
                url::Url::parse(base).map_err(|e| {
                    SearchError::Config(format!("{id}: invalid base_url '{base}': {e}"))
                })?;
            }
        }
        Ok(())
    }
}
