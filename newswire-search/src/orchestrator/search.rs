//! Aggregator: concurrent multi-provider fan-out with partial-failure isolation.
//!
//! Queries every enabled provider concurrently, waits for all of them to
//! settle, stamps each article with its provider and reports per-provider
//! results and failures. Merging is left to the caller (see
//! [`SearchOutcome::merged`]) so that a session can fold a load-more page
//! into its accumulated list.

use std::sync::Arc;
use std::time::Duration;

use crate::error::SearchError;
use crate::provider::{NewsProvider, ProviderRegistry};
use crate::types::{Article, FetchResult, ProviderId, SearchOptions, SortBy};

use super::merge::merge;

/// What one provider contributed to an aggregate search.
#[derive(Debug)]
pub struct ProviderOutcome {
    /// The provider queried.
    pub provider: ProviderId,
    /// Articles in provider order, stamped with `provider`. Empty on failure.
    pub articles: Vec<Article>,
    /// Provider-reported match count. `None` on failure or when not reported.
    pub total_results: Option<u64>,
    /// Why the provider failed, if it did.
    pub error: Option<SearchError>,
}

impl ProviderOutcome {
    /// Whether the provider answered successfully.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Results of an aggregate search, in the caller's provider order.
#[derive(Debug, Default)]
pub struct SearchOutcome {
    /// One entry per distinct enabled provider.
    pub providers: Vec<ProviderOutcome>,
}

impl SearchOutcome {
    /// Reported totals of the providers that succeeded.
    pub fn totals_by_provider(&self) -> Vec<(ProviderId, Option<u64>)> {
        self.providers
            .iter()
            .filter(|p| p.is_ok())
            .map(|p| (p.provider, p.total_results))
            .collect()
    }

    /// Providers that failed, with their errors.
    pub fn failures(&self) -> Vec<(ProviderId, &SearchError)> {
        self.providers
            .iter()
            .filter_map(|p| p.error.as_ref().map(|e| (p.provider, e)))
            .collect()
    }

    /// Per-provider article lists in provider order.
    pub fn article_lists(&self) -> Vec<Vec<Article>> {
        self.providers.iter().map(|p| p.articles.clone()).collect()
    }

    /// Flatten, deduplicate and order all articles.
    pub fn merged(&self, sort_by: Option<SortBy>) -> Vec<Article> {
        merge(self.article_lists(), sort_by)
    }
}

/// Query every enabled provider concurrently.
///
/// # Pipeline
///
/// 1. Reject an empty provider list before any network activity
/// 2. Drop repeated ids, keeping the first position
/// 3. Fan out with [`futures::future::join_all`], each call bounded by the
///    registry's call deadline
/// 4. Log per-provider failures at warn level
/// 5. Stamp articles with their provider
///
/// A provider with no registered adapter fails with [`SearchError::Config`].
///
/// # Errors
///
/// Returns [`SearchError::Input`] if `enabled` is empty, or
/// [`SearchError::AllProvidersFailed`] if **every** provider fails.
pub async fn search_all(
    registry: &ProviderRegistry,
    query: &str,
    options: &SearchOptions,
    enabled: &[ProviderId],
) -> Result<SearchOutcome, SearchError> {
    if enabled.is_empty() {
        return Err(SearchError::Input("no news provider selected".into()));
    }

    let mut ids: Vec<ProviderId> = Vec::with_capacity(enabled.len());
    for id in enabled {
        if !ids.contains(id) {
            ids.push(*id);
        }
    }

    tracing::trace!(query, providers = ?ids, page = options.page(), "aggregate search");

    let deadline = registry.call_deadline();
    let futures: Vec<_> = ids
        .iter()
        .map(|&id| {
            let provider = registry.get(id);
            async move {
                let result = match provider {
                    Some(provider) => query_provider(provider, query, options, deadline).await,
                    None => Err(SearchError::Config(format!(
                        "no API key configured for {id}"
                    ))),
                };
                (id, result)
            }
        })
        .collect();

    let results = futures::future::join_all(futures).await;

    let mut outcome = SearchOutcome::default();
    for (provider, result) in results {
        match result {
            Ok(FetchResult {
                total_results,
                mut articles,
            }) => {
                for article in &mut articles {
                    article.provider_id = provider;
                }
                tracing::debug!(%provider, count = articles.len(), total = ?total_results, "provider returned articles");
                outcome.providers.push(ProviderOutcome {
                    provider,
                    articles,
                    total_results,
                    error: None,
                });
            }
            Err(error) => {
                tracing::warn!(%provider, code = error.code(), %error, "provider query failed");
                outcome.providers.push(ProviderOutcome {
                    provider,
                    articles: Vec::new(),
                    total_results: None,
                    error: Some(error),
                });
            }
        }
    }

    if outcome.providers.iter().all(|p| !p.is_ok()) {
        let reasons: Vec<String> = outcome
            .failures()
            .iter()
            .map(|(provider, error)| format!("{provider}: {error}"))
            .collect();
        return Err(SearchError::AllProvidersFailed(reasons.join("; ")));
    }

    Ok(outcome)
}

async fn query_provider(
    provider: Arc<dyn NewsProvider>,
    query: &str,
    options: &SearchOptions,
    deadline: Option<Duration>,
) -> Result<FetchResult, SearchError> {
    let call = provider.fetch(query, options);
    match deadline {
        None => call.await,
        Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
            SearchError::Timeout(format!(
                "{} did not answer within {}ms",
                provider.id(),
                limit.as_millis()
            ))
        })?,
    }
}
