//! Configuration types for the newswire application.
//!
//! The file is TOML with four sections:
//!
//! ```toml
//! [providers.newsapi]
//! api_key = "..."
//!
//! [providers.gnews]
//! enabled = false
//!
//! [transport]
//! max_retries = 3
//! timeout_seconds = 10
//!
//! [search]
//! providers = ["newsapi", "newsdata", "gnews"]
//! language = "en"
//! sort_by = "publishedAt"
//!
//! [logging]
//! filter = "newswire=debug"
//! ```
//!
//! Credentials left out of the file are read from `<PROVIDER>_API_KEY`
//! environment variables, e.g. `NEWSAPI_API_KEY`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use newswire_search::{
    ProviderId, ProviderSettings, RetryPolicy, SearchConfig, SearchOptions, SortBy,
};
use serde::{Deserialize, Serialize};

use crate::error::{NewswireError, Result};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewswireConfig {
    /// Per-provider credentials and overrides, keyed by provider id.
    pub providers: BTreeMap<String, ProviderEntry>,
    /// HTTP transport settings shared by every provider.
    pub transport: TransportConfig,
    /// Defaults applied to every search.
    pub search: SearchDefaults,
    /// Log filter and optional log file directory.
    pub logging: LoggingConfig,
}

/// One `[providers.<id>]` table.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderEntry {
    /// API key. Falls back to the `<PROVIDER>_API_KEY` env var when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Override of the provider's public endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Set to `false` to never query this provider.
    pub enabled: bool,
}

impl Default for ProviderEntry {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            enabled: true,
        }
    }
}

impl fmt::Debug for ProviderEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderEntry")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// `[transport]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Retries after the first attempt for retryable failures.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub initial_backoff_ms: u64,
    /// Upper bound for a single backoff delay.
    pub max_backoff_ms: u64,
    /// Per-request timeout.
    pub timeout_seconds: u64,
    /// Custom User-Agent. Defaults to `newswire/<version>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            max_retries: retry.max_retries,
            initial_backoff_ms: retry.initial_backoff_ms,
            max_backoff_ms: retry.max_backoff_ms,
            timeout_seconds: SearchConfig::default().timeout_seconds,
            user_agent: None,
        }
    }
}

impl TransportConfig {
    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_retries(self.max_retries)
            .with_initial_backoff_ms(self.initial_backoff_ms)
            .with_max_backoff_ms(self.max_backoff_ms)
    }
}

/// `[search]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchDefaults {
    /// Providers queried when none are named on the command line.
    pub providers: Vec<ProviderId>,
    /// Two-letter language code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Country code, or a comma-separated list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Topic category for headline listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Ordering of the merged list.
    pub sort_by: SortBy,
    /// Results requested per provider per page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            providers: vec![ProviderId::NewsApi, ProviderId::NewsData, ProviderId::GNews],
            language: None,
            country: None,
            category: None,
            sort_by: SortBy::PublishedAt,
            page_size: None,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Directory for a daily rolling log file. No file logging when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

/// Where a provider's credential comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// `api_key` in the config file.
    ConfigFile,
    /// `<PROVIDER>_API_KEY` environment variable.
    Environment,
    /// No credential anywhere.
    Missing,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ConfigFile => "config file",
            Self::Environment => "environment",
            Self::Missing => "missing",
        })
    }
}

/// Environment variable holding the API key for `id`, e.g. `GNEWS_API_KEY`.
pub fn api_key_env_var(id: ProviderId) -> String {
    format!("{}_API_KEY", id.id().to_ascii_uppercase())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl NewswireConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| NewswireError::Config(e.to_string()))
    }

    /// Load the file at `path` if it exists, otherwise return the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| NewswireError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `<config dir>/newswire/config.toml`.
    pub fn default_config_path() -> PathBuf {
        crate::newswire_dirs::config_file()
    }

    /// Configuration written by `newswire config init`: the defaults plus
    /// file logging into [`crate::newswire_dirs::logs_dir`].
    pub fn initial() -> Self {
        let mut config = Self::default();
        config.logging.directory = Some(crate::newswire_dirs::logs_dir());
        config
    }

    /// Check that every `[providers.<id>]` table names a known provider.
    ///
    /// # Errors
    ///
    /// Returns [`NewswireError::Config`] naming the first unknown id.
    pub fn validate(&self) -> Result<()> {
        for key in self.providers.keys() {
            ProviderId::from_str(key)
                .map_err(|_| NewswireError::Config(format!("unknown provider in [providers]: {key}")))?;
        }
        Ok(())
    }

    fn entry(&self, id: ProviderId) -> Option<&ProviderEntry> {
        self.providers.get(id.id())
    }

    fn is_enabled(&self, id: ProviderId) -> bool {
        self.entry(id).is_none_or(|e| e.enabled)
    }

    fn resolve_key(
        &self,
        id: ProviderId,
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> (Option<String>, CredentialSource) {
        if let Some(key) = non_blank(self.entry(id).and_then(|e| e.api_key.clone())) {
            return (Some(key), CredentialSource::ConfigFile);
        }
        match non_blank(lookup(&api_key_env_var(id))) {
            Some(key) => (Some(key), CredentialSource::Environment),
            None => (None, CredentialSource::Missing),
        }
    }

    /// Where the credential for `id` would be taken from, using the process
    /// environment.
    pub fn credential_source(&self, id: ProviderId) -> CredentialSource {
        self.credential_source_with(id, |name| std::env::var(name).ok())
    }

    /// [`Self::credential_source`] with an explicit variable lookup.
    pub fn credential_source_with(
        &self,
        id: ProviderId,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> CredentialSource {
        self.resolve_key(id, &lookup).1
    }

    /// Build the search core's configuration, reading missing credentials
    /// from the process environment.
    ///
    /// # Errors
    ///
    /// See [`Self::to_search_config_with`].
    pub fn to_search_config(&self) -> Result<SearchConfig> {
        self.to_search_config_with(|name| std::env::var(name).ok())
    }

    /// Build the search core's configuration with an explicit lookup for
    /// `<PROVIDER>_API_KEY` variables.
    ///
    /// Disabled providers and providers without any credential are left out;
    /// the aggregator reports the latter as failed if they are searched.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown provider tables or settings the search
    /// core rejects (zero timeout, malformed base URL).
    pub fn to_search_config_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<SearchConfig> {
        self.validate()?;

        let mut config = SearchConfig {
            retry: self.transport.retry_policy(),
            timeout_seconds: self.transport.timeout_seconds,
            user_agent: self.transport.user_agent.clone(),
            ..SearchConfig::default()
        };

        for &id in ProviderId::all() {
            if !self.is_enabled(id) {
                continue;
            }
            let (Some(key), _) = self.resolve_key(id, &lookup) else {
                continue;
            };
            let mut settings = ProviderSettings::new(key);
            if let Some(base_url) = self.entry(id).and_then(|e| e.base_url.clone()) {
                settings = settings.with_base_url(base_url);
            }
            config = config.with_provider_settings(id, settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Providers searched by default: `[search] providers` minus any
    /// provider whose table sets `enabled = false`.
    pub fn enabled_providers(&self) -> Vec<ProviderId> {
        self.search
            .providers
            .iter()
            .copied()
            .filter(|id| self.is_enabled(*id))
            .collect()
    }

    /// Search options seeded from the `[search]` section.
    pub fn default_options(&self) -> SearchOptions {
        SearchOptions {
            language: self.search.language.clone(),
            country: self.search.country.clone(),
            category: self.search.category.clone(),
            sort_by: Some(self.search.sort_by),
            page_size: self.search.page_size,
            ..SearchOptions::default()
        }
    }
}
