//! News provider adapters.
//!
//! Each module provides a struct implementing [`crate::provider::NewsProvider`]
//! for one upstream API. Adapters share the same shape: a pure
//! `build_request` that turns unified [`SearchOptions`](crate::types::SearchOptions)
//! into the provider's parameters, a call through the shared
//! [`HttpTransport`], and a pure `parse_response` that checks the provider's
//! error envelope and normalises each item.

pub mod gnews;
pub mod marketaux;
pub mod newsapi;
pub mod newsdata;
pub(crate) mod normalize;
pub mod thenewsapi;

pub use gnews::GNewsProvider;
pub use marketaux::MarketauxProvider;
pub use newsapi::NewsApiProvider;
pub use newsdata::NewsDataProvider;
pub use thenewsapi::TheNewsApiProvider;

use std::sync::Arc;

use url::Url;

use crate::config::ProviderSettings;
use crate::error::SearchError;
use crate::http::HttpTransport;
use crate::provider::NewsProvider;
use crate::types::ProviderId;

/// Public API host for a provider.
pub fn default_base_url(id: ProviderId) -> &'static str {
    match id {
        ProviderId::NewsApi => "https://newsapi.org",
        ProviderId::GNews => "https://gnews.io",
        ProviderId::TheNewsApi => "https://api.thenewsapi.com",
        ProviderId::NewsData => "https://newsdata.io",
        ProviderId::Marketaux => "https://api.marketaux.com",
    }
}

/// Construct the adapter for `id`.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if the settings carry an unusable base URL.
pub fn build_provider(
    id: ProviderId,
    settings: &ProviderSettings,
    transport: HttpTransport,
) -> Result<Arc<dyn NewsProvider>, SearchError> {
    let endpoint = Endpoint::new(id, settings)?;
    let provider: Arc<dyn NewsProvider> = match id {
        ProviderId::NewsApi => Arc::new(NewsApiProvider::new(endpoint, transport)),
        ProviderId::GNews => Arc::new(GNewsProvider::new(endpoint, transport)),
        ProviderId::TheNewsApi => Arc::new(TheNewsApiProvider::new(endpoint, transport)),
        ProviderId::NewsData => Arc::new(NewsDataProvider::new(endpoint, transport)),
        ProviderId::Marketaux => Arc::new(MarketauxProvider::new(endpoint, transport)),
    };
    Ok(provider)
}

/// Where an adapter sends requests and the key it authenticates with.
#[derive(Clone)]
pub struct Endpoint {
    base_url: Url,
    api_key: String,
}

impl Endpoint {
    /// Resolve the base URL (override or public host) for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the override does not parse or
    /// cannot carry a path.
    pub fn new(id: ProviderId, settings: &ProviderSettings) -> Result<Self, SearchError> {
        let raw = settings
            .base_url
            .as_deref()
            .unwrap_or_else(|| default_base_url(id));
        let base_url = Url::parse(raw)
            .map_err(|e| SearchError::Config(format!("{id}: invalid base_url '{raw}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(SearchError::Config(format!(
                "{id}: base_url '{raw}' cannot carry a path"
            )));
        }
        Ok(Self {
            base_url,
            api_key: settings.api_key.clone(),
        })
    }

    /// Full request URL for `plan`, with the key attached as `key_param`.
    pub(crate) fn url_for(&self, plan: &RequestPlan, key_param: &str) -> Result<Url, SearchError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                SearchError::Config(format!("base_url '{}' cannot carry a path", self.base_url))
            })?;
            segments
                .pop_if_empty()
                .extend(plan.path.trim_start_matches('/').split('/'));
        }
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in &plan.params {
                query.append_pair(key, value);
            }
            query.append_pair(key_param, &self.api_key);
        }
        Ok(url)
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// A provider request before the host and credential are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPlan {
    /// Endpoint path, e.g. `/v2/everything`.
    pub path: &'static str,
    /// Query parameters in insertion order.
    pub params: Vec<(&'static str, String)>,
}

impl RequestPlan {
    pub(crate) fn new(path: &'static str) -> Self {
        Self {
            path,
            params: Vec::new(),
        }
    }

    /// Append `key=value`.
    pub(crate) fn push(&mut self, key: &'static str, value: impl Into<String>) {
        self.params.push((key, value.into()));
    }

    /// Append `key=value` when the value is present and not blank.
    pub(crate) fn push_opt<V: AsRef<str>>(&mut self, key: &'static str, value: Option<V>) {
        if let Some(v) = value {
            let v = v.as_ref().trim();
            if !v.is_empty() {
                self.params.push((key, v.to_string()));
            }
        }
    }

    /// Drop every parameter named in `excluded`.
    pub(crate) fn without(mut self, excluded: &[&str]) -> Self {
        self.params.retain(|(k, _)| !excluded.contains(k));
        self
    }

    /// Value of the first parameter named `key`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}
