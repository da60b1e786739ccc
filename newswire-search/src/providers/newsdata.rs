//! NewsData.io adapter.
//!
//! NewsData paginates with an opaque cursor rather than page numbers, so a
//! load-more continuation returns an empty page without calling the API.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use super::normalize::{items, rfc3339, string_at, u64_at, RawArticle};
use super::{Endpoint, RequestPlan};
use crate::error::SearchError;
use crate::http::HttpTransport;
use crate::provider::NewsProvider;
use crate::types::{Article, FetchResult, ProviderId, SearchOptions, SortBy};

const KEY_PARAM: &str = "apikey";
const NEWS: &str = "/api/1/news";
const PUB_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// NewsData.io client.
#[derive(Debug, Clone)]
pub struct NewsDataProvider {
    endpoint: Endpoint,
    transport: HttpTransport,
}

impl NewsDataProvider {
    /// Create an adapter sending requests to `endpoint`.
    pub fn new(endpoint: Endpoint, transport: HttpTransport) -> Self {
        Self {
            endpoint,
            transport,
        }
    }
}

#[async_trait]
impl NewsProvider for NewsDataProvider {
    fn id(&self) -> ProviderId {
        ProviderId::NewsData
    }

    async fn fetch(&self, query: &str, options: &SearchOptions) -> Result<FetchResult, SearchError> {
        if options.is_load_more {
            tracing::debug!(provider = %self.id(), "cursor pagination unsupported, skipping load more");
            return Ok(FetchResult::empty());
        }
        let plan = build_request(query, options);
        let url = self.endpoint.url_for(&plan, KEY_PARAM)?;
        let body = self.transport.fetch_json(&url).await?;
        parse_response(&body, Utc::now())
    }
}

/// Map unified options onto NewsData parameters.
///
/// Only relevance ordering can be requested; everything else uses the
/// provider's default (newest first).
pub fn build_request(query: &str, options: &SearchOptions) -> RequestPlan {
    let mut plan = RequestPlan::new(NEWS);
    plan.push_opt("q", Some(query));
    plan.push_opt("language", options.language.as_deref());
    plan.push_opt("country", options.country.as_deref());
    plan.push_opt("category", options.category.as_deref());
    plan.push_opt("domain", options.domains.as_deref());
    plan.push_opt("excludedomain", options.exclude_domains.as_deref());
    plan.push_opt("size", options.page_size.map(|n| n.to_string()));
    if matches!(
        options.sort_by,
        Some(SortBy::Relevancy | SortBy::Popularity)
    ) {
        plan.push("sort", "relevancy");
    }
    plan
}

/// Check the `status` envelope and normalise `results`.
pub fn parse_response(body: &Value, now: DateTime<Utc>) -> Result<FetchResult, SearchError> {
    if body.get("status").and_then(Value::as_str) == Some("error") {
        let message = string_at(body, "/results/message")
            .or_else(|| string_at(body, "/message"))
            .unwrap_or_else(|| "API error".into());
        return Err(SearchError::ProviderPayload {
            provider: ProviderId::NewsData,
            message,
        });
    }
    Ok(FetchResult {
        total_results: u64_at(body, "/totalResults"),
        articles: items(body, "results")
            .iter()
            .map(|item| normalize(item, now))
            .collect(),
    })
}

/// Convert one NewsData result.
pub fn normalize(item: &Value, now: DateTime<Utc>) -> Article {
    let description = string_at(item, "/description");
    RawArticle {
        source_name: string_at(item, "/source_name").or_else(|| string_at(item, "/source_id")),
        author: string_at(item, "/creator/0"),
        title: string_at(item, "/title"),
        content: string_at(item, "/content").or_else(|| description.clone()),
        description,
        url: string_at(item, "/link"),
        image_url: string_at(item, "/image_url"),
        published_at: string_at(item, "/pubDate").map(|raw| coerce_pub_date(&raw)),
    }
    .into_article(ProviderId::NewsData, now)
}

/// NewsData reports `YYYY-MM-DD HH:MM:SS` in UTC; rewrite it as RFC 3339.
fn coerce_pub_date(raw: &str) -> String {
    NaiveDateTime::parse_from_str(raw, PUB_DATE_FORMAT)
        .map(|naive| rfc3339(naive.and_utc()))
        .unwrap_or_else(|_| raw.to_string())
}
