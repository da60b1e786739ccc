//! Trait for pluggable news provider adapters and the registry that holds them.
//!
//! Each provider (NewsAPI, GNews, TheNewsAPI, NewsData, Marketaux)
//! implements [`NewsProvider`] to translate the unified query model into its
//! own request and normalise the response into [`Article`](crate::types::Article)s.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http::HttpTransport;
use crate::providers::build_provider;
use crate::types::{FetchResult, ProviderId, SearchOptions};

/// A news provider adapter.
///
/// Implementors handle their own:
///
/// - parameter mapping from [`SearchOptions`]
/// - endpoint selection
/// - the provider's error envelope
/// - normalisation of each item
///
/// Normalisation never fails; malformed items become partial articles and
/// are filtered later by the merge step.
///
/// All implementations must be `Send + Sync` for concurrent fan-out.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Which provider this adapter speaks to. Fixed for the adapter's lifetime.
    fn id(&self) -> ProviderId;

    /// Fetch one page of results.
    ///
    /// # Errors
    ///
    /// Returns a transport error after retries are exhausted, or
    /// [`SearchError::ProviderPayload`] when the provider reports an error
    /// in its response body.
    async fn fetch(&self, query: &str, options: &SearchOptions) -> Result<FetchResult, SearchError>;
}

/// Adapters keyed by provider id.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderId, Arc<dyn NewsProvider>>,
    call_deadline: Option<Duration>,
}

impl ProviderRegistry {
    /// An empty registry with no call deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build adapters for every provider configured in `config`, sharing one
    /// HTTP client.
    ///
    /// The per-call deadline is the worst case for one adapter: every attempt
    /// timing out plus every backoff delay.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the configuration is invalid.
    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let transport = HttpTransport::from_config(config)?;
        let mut registry = Self::new();
        for (id, settings) in &config.providers {
            registry.register(build_provider(*id, settings, transport.clone())?);
        }
        let per_attempt = Duration::from_secs(config.timeout_seconds);
        let deadline = per_attempt
            .saturating_mul(config.retry.max_attempts())
            .saturating_add(config.retry.total_backoff());
        Ok(registry.with_call_deadline(deadline))
    }

    /// Add or replace the adapter for its provider id.
    pub fn register(&mut self, provider: Arc<dyn NewsProvider>) {
        self.providers.insert(provider.id(), provider);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_provider(mut self, provider: Arc<dyn NewsProvider>) -> Self {
        self.register(provider);
        self
    }

    /// Bound every adapter call made through the aggregator.
    pub fn with_call_deadline(mut self, deadline: Duration) -> Self {
        self.call_deadline = Some(deadline);
        self
    }

    /// The outer deadline applied to each adapter call, if any.
    pub fn call_deadline(&self) -> Option<Duration> {
        self.call_deadline
    }

    /// Adapter for `id`, if registered.
    pub fn get(&self, id: ProviderId) -> Option<Arc<dyn NewsProvider>> {
        self.providers.get(&id).cloned()
    }

    /// Registered ids in canonical order.
    pub fn ids(&self) -> Vec<ProviderId> {
        let mut ids: Vec<ProviderId> = self.providers.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Whether any adapter is registered.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.ids())
            .field("call_deadline", &self.call_deadline)
            .finish()
    }
}

/// Query a single provider.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if no adapter is registered for `id`
/// (typically because no API key is configured), otherwise whatever the
/// adapter returns.
pub async fn fetch_news(
    registry: &ProviderRegistry,
    id: ProviderId,
    query: &str,
    options: &SearchOptions,
) -> Result<FetchResult, SearchError> {
    let provider = registry
        .get(id)
        .ok_or_else(|| SearchError::Config(format!("no API key configured for {id}")))?;
    tracing::trace!(provider = %id, query, "fetching news");
    provider.fetch(query, options).await
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::{Article, Source};

    /// A canned adapter for exercising the registry and aggregator.
    pub(crate) struct MockProvider {
        pub id: ProviderId,
        pub outcome: Result<Vec<Article>, String>,
        pub delay: Option<Duration>,
    }

    impl MockProvider {
        pub(crate) fn ok(id: ProviderId, articles: Vec<Article>) -> Self {
            Self {
                id,
                outcome: Ok(articles),
                delay: None,
            }
        }

        pub(crate) fn failing(id: ProviderId, message: &str) -> Self {
            Self {
                id,
                outcome: Err(message.to_string()),
                delay: None,
            }
        }
    }

    #[async_trait]
    impl NewsProvider for MockProvider {
        fn id(&self) -> ProviderId {
            self.id
        }

        async fn fetch(
            &self,
            _query: &str,
            _options: &SearchOptions,
        ) -> Result<FetchResult, SearchError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.outcome {
                Ok(articles) => Ok(FetchResult {
                    total_results: Some(articles.len() as u64),
                    articles: articles.clone(),
                }),
                Err(message) => Err(SearchError::Network(message.clone())),
            }
        }
    }

    pub(crate) fn article(title: &str, url: &str, published_at: &str) -> Article {
        Article {
            source: Source {
                name: "Wire".into(),
            },
            author: None,
            title: title.into(),
            description: None,
            url: Some(url.into()),
            image_url: None,
            published_at: published_at.into(),
            content: None,
            provider_id: ProviderId::NewsApi,
        }
    }

    #[test]
    fn mock_provider_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MockProvider>();
        assert_send_sync::<ProviderRegistry>();
    }

    #[test]
    fn register_replaces_same_id() {
        let registry = ProviderRegistry::new()
            .with_provider(Arc::new(MockProvider::failing(ProviderId::GNews, "a")))
            .with_provider(Arc::new(MockProvider::ok(ProviderId::GNews, vec![])));
        assert_eq!(registry.ids(), vec![ProviderId::GNews]);
    }

    #[test]
    fn ids_are_sorted() {
        let registry = ProviderRegistry::new()
            .with_provider(Arc::new(MockProvider::ok(ProviderId::Marketaux, vec![])))
            .with_provider(Arc::new(MockProvider::ok(ProviderId::NewsApi, vec![])));
        assert_eq!(
            registry.ids(),
            vec![ProviderId::NewsApi, ProviderId::Marketaux]
        );
    }

    #[test]
    fn from_config_registers_configured_providers() {
        let config = SearchConfig::default()
            .with_provider(ProviderId::NewsApi, "a")
            .with_provider(ProviderId::NewsData, "b");
        let registry = ProviderRegistry::from_config(&config).expect("registry");
        assert_eq!(
            registry.ids(),
            vec![ProviderId::NewsApi, ProviderId::NewsData]
        );
        // 10s * 4 attempts + 300 + 600 + 1200 ms of backoff
        assert_eq!(registry.call_deadline(), Some(Duration::from_millis(42_100)));
    }

    #[test]
    fn from_config_rejects_invalid_config() {
        let config = SearchConfig::default().with_provider(ProviderId::NewsApi, "");
        assert!(ProviderRegistry::from_config(&config).is_err());
    }

    #[tokio::test]
    async fn fetch_news_uses_registered_adapter() {
        let registry = ProviderRegistry::new().with_provider(Arc::new(MockProvider::ok(
            ProviderId::NewsApi,
            vec![article("A", "https://a.com/1", "2024-01-01T00:00:00Z")],
        )));
        let result = fetch_news(&registry, ProviderId::NewsApi, "q", &SearchOptions::new())
            .await
            .expect("fetch");
        assert_eq!(result.articles.len(), 1);
        assert_eq!(result.total_results, Some(1));
    }

    #[tokio::test]
    async fn fetch_news_without_adapter_is_config_error() {
        let registry = ProviderRegistry::new();
        let err = fetch_news(&registry, ProviderId::GNews, "q", &SearchOptions::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "CONFIG_INVALID");
        assert!(err.to_string().contains("gnews"));
    }
}
