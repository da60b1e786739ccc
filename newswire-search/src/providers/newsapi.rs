//! NewsAPI.org adapter.
//!
//! Full-text search goes to `/v2/everything`; an empty query lists
//! `/v2/top-headlines` instead. The two endpoints accept different
//! parameter sets, so each drops what the other needs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::normalize::{items, string_at, u64_at, RawArticle};
use super::{Endpoint, RequestPlan};
use crate::error::SearchError;
use crate::http::HttpTransport;
use crate::provider::NewsProvider;
use crate::types::{Article, FetchResult, ProviderId, SearchOptions};

const KEY_PARAM: &str = "apiKey";
const EVERYTHING: &str = "/v2/everything";
const TOP_HEADLINES: &str = "/v2/top-headlines";
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const HEADLINES_EXCLUDED: &[&str] = &[
    "from",
    "to",
    "domains",
    "excludeDomains",
    "searchIn",
    "sortBy",
    "language",
];
const EVERYTHING_EXCLUDED: &[&str] = &["country", "category"];

/// NewsAPI.org client.
#[derive(Debug, Clone)]
pub struct NewsApiProvider {
    endpoint: Endpoint,
    transport: HttpTransport,
}

impl NewsApiProvider {
    /// Create an adapter sending requests to `endpoint`.
    pub fn new(endpoint: Endpoint, transport: HttpTransport) -> Self {
        Self {
            endpoint,
            transport,
        }
    }
}

#[async_trait]
impl NewsProvider for NewsApiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::NewsApi
    }

    async fn fetch(&self, query: &str, options: &SearchOptions) -> Result<FetchResult, SearchError> {
        let plan = build_request(query, options);
        let url = self.endpoint.url_for(&plan, KEY_PARAM)?;
        let body = self.transport.fetch_json(&url).await?;
        parse_response(&body, Utc::now())
    }
}

/// Map unified options onto NewsAPI parameters.
pub fn build_request(query: &str, options: &SearchOptions) -> RequestPlan {
    let query = query.trim();
    let headlines = query.is_empty();
    let mut plan = RequestPlan::new(if headlines { TOP_HEADLINES } else { EVERYTHING });

    plan.push_opt("q", Some(query));
    plan.push("page", options.page().to_string());
    plan.push("sortBy", options.sort_by.unwrap_or_default().as_str());
    plan.push_opt("language", options.language.as_deref());
    plan.push_opt("country", options.first_country());
    plan.push_opt("category", options.category.as_deref());
    plan.push_opt("pageSize", options.page_size.map(|n| n.to_string()));
    plan.push_opt("from", options.from.map(|d| d.format(DATE_FORMAT).to_string()));
    plan.push_opt("to", options.to.map(|d| d.format(DATE_FORMAT).to_string()));
    plan.push_opt("domains", options.domains.as_deref());
    plan.push_opt("excludeDomains", options.exclude_domains.as_deref());
    plan.push_opt("searchIn", options.narrowed_search_in());

    if headlines {
        plan.without(HEADLINES_EXCLUDED)
    } else {
        plan.without(EVERYTHING_EXCLUDED)
    }
}

/// Check the `status` envelope and normalise `articles`.
pub fn parse_response(body: &Value, now: DateTime<Utc>) -> Result<FetchResult, SearchError> {
    if body.get("status").and_then(Value::as_str) == Some("error") {
        return Err(SearchError::ProviderPayload {
            provider: ProviderId::NewsApi,
            message: string_at(body, "/message").unwrap_or_else(|| "API error".into()),
        });
    }
    Ok(FetchResult {
        total_results: u64_at(body, "/totalResults"),
        articles: items(body, "articles")
            .iter()
            .map(|item| normalize(item, now))
            .collect(),
    })
}

/// Convert one NewsAPI article.
pub fn normalize(item: &Value, now: DateTime<Utc>) -> Article {
    RawArticle {
        source_name: string_at(item, "/source/name"),
        author: string_at(item, "/author"),
        title: string_at(item, "/title"),
        description: string_at(item, "/description"),
        url: string_at(item, "/url"),
        image_url: string_at(item, "/urlToImage"),
        published_at: string_at(item, "/publishedAt"),
        content: string_at(item, "/content"),
    }
    .into_article(ProviderId::NewsApi, now)
}
