//! # newswire-search
//!
//! Multi-provider news search for newswire.
//!
//! This crate queries several public news APIs (NewsAPI, GNews, TheNewsAPI,
//! NewsData, Marketaux) through one unified query model and merges their
//! answers into a single, deduplicated, date-ordered article list.
//!
//! ## Design
//!
//! - One adapter per provider behind the [`NewsProvider`] trait, held in a
//!   [`ProviderRegistry`]
//! - A shared retrying JSON transport with typed, classified failures
//! - Concurrent fan-out; a failing provider never sinks the others
//! - Deduplication by normalised link and by headline, first seen wins
//! - Query highlighting and match snippets for display
//!
//! ## Security
//!
//! - API keys are never logged; request URLs are redacted before logging
//! - Queries are logged at trace level only
//! - No network listeners; this is a library, not a server

pub mod config;
pub mod error;
pub mod highlight;
pub mod http;
pub mod orchestrator;
pub mod provider;
pub mod providers;
pub mod retry;
pub mod types;

pub use config::{ProviderSettings, SearchConfig};
pub use error::{Result, SearchError};
pub use highlight::{
    get_snippet, highlight, highlight_article, HighlightedArticle, Marker, HTML_MARK,
};
pub use orchestrator::merge::{merge, merge_with_existing};
pub use orchestrator::search::{search_all, ProviderOutcome, SearchOutcome};
pub use provider::{fetch_news, NewsProvider, ProviderRegistry};
pub use retry::{RetryPolicy, MAX_RETRIES_LIMIT};
pub use types::{Article, FetchResult, ProviderId, SearchOptions, SortBy, Source};

/// Search the given providers and return one merged article list.
///
/// Builds a [`ProviderRegistry`] from `config`, fans the query out to every
/// provider in `enabled`, then merges, deduplicates and orders the results
/// according to `options.sort_by`.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid,
/// [`SearchError::Input`] if `enabled` is empty, and
/// [`SearchError::AllProvidersFailed`] if every provider fails. Individual
/// provider failures are logged but do not fail the search.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> newswire_search::Result<()> {
/// use newswire_search::{ProviderId, SearchConfig, SearchOptions};
///
/// let config = SearchConfig::default().with_provider(ProviderId::NewsApi, "my-key");
/// let articles =
///     newswire_search::search(&config, "rust", &SearchOptions::new(), &[ProviderId::NewsApi])
///         .await?;
/// for article in &articles {
///     println!("{} ({})", article.title, article.source.name);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(
    config: &SearchConfig,
    query: &str,
    options: &SearchOptions,
    enabled: &[ProviderId],
) -> Result<Vec<Article>> {
    let registry = ProviderRegistry::from_config(config)?;
    let outcome = search_all(&registry, query, options, enabled).await?;
    Ok(outcome.merged(options.sort_by))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn search_validates_config_zero_timeout() {
        let config = SearchConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        let err = search(&config, "q", &SearchOptions::new(), &[ProviderId::NewsApi])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[tokio::test]
    async fn search_rejects_empty_provider_list() {
        let config = SearchConfig::default().with_provider(ProviderId::NewsApi, "k");
        let err = search(&config, "q", &SearchOptions::new(), &[])
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INPUT_INVALID");
    }

    #[tokio::test]
    async fn search_without_credentials_fails_every_provider() {
        let err = search(
            &SearchConfig::default(),
            "q",
            &SearchOptions::new(),
            &[ProviderId::GNews],
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "ALL_PROVIDERS_FAILED");
    }
}
