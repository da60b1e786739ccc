//! Search session: one query paged through with "load more".
//!
//! A [`NewsSession`] remembers the current query, options, page and the
//! accumulated article list between calls. A new search resets the page to 1
//! and replaces the list; [`NewsSession::load_more`] fetches the next page
//! from every provider and merges it into what is already there.
//!
//! Only one search or load-more may run at a time. A second call while one is
//! in flight fails with [`NewswireError::SessionBusy`] instead of cancelling
//! the first.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use newswire_search::{
    Article, ProviderId, ProviderRegistry, SearchError, SearchOptions, SearchOutcome,
    merge, merge_with_existing, search_all,
};

use crate::config::NewswireConfig;
use crate::error::{NewswireError, Result};

/// Result of one search or load-more call.
#[derive(Debug)]
pub struct SearchSummary {
    /// The query this session is paging through.
    pub query: String,
    /// Page that was just fetched (1 for a new search).
    pub page: u32,
    /// The full accumulated, merged list.
    pub articles: Vec<Article>,
    /// How many articles this call added to the list.
    pub added: usize,
    /// Per-provider totals reported for the first page.
    pub totals: Totals,
    /// Providers that failed on this call.
    pub failures: Failures,
    /// `true` when this call found nothing new ("no more stories").
    pub exhausted: bool,
}

#[derive(Debug, Default)]
struct SessionState {
    query: Option<String>,
    options: SearchOptions,
    page: u32,
    articles: Vec<Article>,
    totals: Totals,
    exhausted: bool,
}

/// Clears the in-progress flag when a call ends, including on early return.
struct InProgress<'a>(&'a AtomicBool);

impl<'a> InProgress<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| NewswireError::SessionBusy)?;
        Ok(Self(flag))
    }
}

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Per-provider totals, in provider order.
pub type Totals = Vec<(ProviderId, Option<u64>)>;
/// Failed providers with their errors.
pub type Failures = Vec<(ProviderId, SearchError)>;

/// Split an aggregate outcome into article lists, totals and failures.
fn split(outcome: SearchOutcome) -> (Vec<Vec<Article>>, Totals, Failures) {
    let totals = outcome.totals_by_provider();
    let mut lists = Vec::with_capacity(outcome.providers.len());
    let mut failures = Vec::new();
    for provider in outcome.providers {
        match provider.error {
            Some(error) => failures.push((provider.provider, error)),
            None => lists.push(provider.articles),
        }
    }
    (lists, totals, failures)
}

/// Stateful search over a fixed set of providers.
pub struct NewsSession {
    registry: ProviderRegistry,
    providers: Vec<ProviderId>,
    state: Mutex<SessionState>,
    in_progress: AtomicBool,
}

impl std::fmt::Debug for NewsSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsSession")
            .field("providers", &self.providers)
            .field("page", &self.page())
            .field("in_progress", &self.is_busy())
            .finish_non_exhaustive()
    }
}

impl NewsSession {
    /// Create a session searching `providers` through `registry`.
    pub fn new(registry: ProviderRegistry, providers: Vec<ProviderId>) -> Self {
        Self {
            registry,
            providers,
            state: Mutex::new(SessionState::default()),
            in_progress: AtomicBool::new(false),
        }
    }

    /// Build a session from application config, searching its enabled providers.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be turned into a provider registry.
    pub fn from_config(config: &NewswireConfig) -> Result<Self> {
        let search_config = config.to_search_config()?;
        let registry = ProviderRegistry::from_config(&search_config)?;
        Ok(Self::new(registry, config.enabled_providers()))
    }

    /// Replace the providers searched by later calls.
    #[must_use]
    pub fn with_providers(mut self, providers: Vec<ProviderId>) -> Self {
        self.providers = providers;
        self
    }

    /// Providers this session searches.
    pub fn providers(&self) -> &[ProviderId] {
        &self.providers
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// `true` while a search or load-more is running.
    pub fn is_busy(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Current page (0 before the first successful search).
    pub fn page(&self) -> u32 {
        self.lock_state().page
    }

    /// Current query, if a search has succeeded.
    pub fn query(&self) -> Option<String> {
        self.lock_state().query.clone()
    }

    /// Snapshot of the accumulated article list.
    pub fn articles(&self) -> Vec<Article> {
        self.lock_state().articles.clone()
    }

    /// Whether the last call added nothing.
    pub fn is_exhausted(&self) -> bool {
        self.lock_state().exhausted
    }

    /// Start a new search, replacing any previous results.
    ///
    /// `options.page` and `options.is_load_more` are ignored; a new search
    /// always fetches page 1.
    ///
    /// # Errors
    ///
    /// Returns [`NewswireError::SessionBusy`] if another call is running,
    /// or the aggregate error when no provider could answer. On error the
    /// session is left without an active search.
    pub async fn search(&self, query: &str, options: SearchOptions) -> Result<SearchSummary> {
        let _guard = InProgress::acquire(&self.in_progress)?;

        let options = SearchOptions {
            page: Some(1),
            is_load_more: false,
            ..options
        };
        *self.lock_state() = SessionState::default();

        let outcome = search_all(&self.registry, query, &options, &self.providers).await?;
        let (lists, totals, failures) = split(outcome);
        let articles = merge(lists, options.sort_by);
        let added = articles.len();
        let exhausted = articles.is_empty();

        tracing::info!(
            page = 1,
            count = added,
            failed = failures.len(),
            "search complete"
        );

        let mut state = self.lock_state();
        *state = SessionState {
            query: Some(query.to_string()),
            options,
            page: 1,
            articles: articles.clone(),
            totals: totals.clone(),
            exhausted,
        };

        Ok(SearchSummary {
            query: query.to_string(),
            page: 1,
            articles,
            added,
            totals,
            failures,
            exhausted,
        })
    }

    /// Fetch the next page and merge it into the accumulated list.
    ///
    /// The page counter only advances when the fetch succeeds. Totals keep
    /// the values reported for the first page.
    ///
    /// # Errors
    ///
    /// Returns [`NewswireError::NoActiveSearch`] before the first successful
    /// search, [`NewswireError::SessionBusy`] if another call is running,
    /// or the aggregate error when no provider could answer.
    pub async fn load_more(&self) -> Result<SearchSummary> {
        let _guard = InProgress::acquire(&self.in_progress)?;

        let (query, options, existing, totals) = {
            let state = self.lock_state();
            let Some(query) = state.query.clone() else {
                return Err(NewswireError::NoActiveSearch);
            };
            let options = state.options.clone().with_page(state.page + 1).as_load_more();
            (query, options, state.articles.clone(), state.totals.clone())
        };
        let page = options.page();

        let outcome = search_all(&self.registry, &query, &options, &self.providers).await?;
        let (lists, _, failures) = split(outcome);

        let before = existing.len();
        let articles = merge_with_existing(existing, lists, options.sort_by);
        let added = articles.len().saturating_sub(before);
        let exhausted = added == 0;

        if exhausted {
            tracing::info!(page, "no more stories");
        } else {
            tracing::info!(page, added, total = articles.len(), "loaded more stories");
        }

        let mut state = self.lock_state();
        state.page = page;
        state.articles = articles.clone();
        state.exhausted = exhausted;

        Ok(SearchSummary {
            query,
            page,
            articles,
            added,
            totals,
            failures,
            exhausted,
        })
    }
}
