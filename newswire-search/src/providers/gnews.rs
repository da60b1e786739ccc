//! GNews.io adapter.

use async_trait::async_trait;
use chrono::{DateTime, Months, SecondsFormat, Utc};
use serde_json::Value;

use super::normalize::{items, string_at, u64_at, RawArticle};
use super::{Endpoint, RequestPlan};
use crate::error::SearchError;
use crate::http::HttpTransport;
use crate::provider::NewsProvider;
use crate::types::{Article, FetchResult, ProviderId, SearchOptions, SortBy};

const KEY_PARAM: &str = "apikey";
const SEARCH: &str = "/api/v4/search";
const TOP_HEADLINES: &str = "/api/v4/top-headlines";

const HEADLINES_EXCLUDED: &[&str] = &["q", "in", "sortby"];
const SEARCH_EXCLUDED: &[&str] = &["category"];

/// GNews.io client.
#[derive(Debug, Clone)]
pub struct GNewsProvider {
    endpoint: Endpoint,
    transport: HttpTransport,
}

impl GNewsProvider {
    /// Create an adapter sending requests to `endpoint`.
    pub fn new(endpoint: Endpoint, transport: HttpTransport) -> Self {
        Self {
            endpoint,
            transport,
        }
    }
}

#[async_trait]
impl NewsProvider for GNewsProvider {
    fn id(&self) -> ProviderId {
        ProviderId::GNews
    }

    async fn fetch(&self, query: &str, options: &SearchOptions) -> Result<FetchResult, SearchError> {
        let now = Utc::now();
        let plan = build_request(query, options, now);
        let url = self.endpoint.url_for(&plan, KEY_PARAM)?;
        let body = self.transport.fetch_json(&url).await?;
        parse_response(&body, now)
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Map unified options onto GNews parameters.
///
/// Without an explicit lower bound GNews is asked for the last month only.
pub fn build_request(query: &str, options: &SearchOptions, now: DateTime<Utc>) -> RequestPlan {
    let query = query.trim();
    let headlines = query.is_empty();
    let mut plan = RequestPlan::new(if headlines { TOP_HEADLINES } else { SEARCH });

    let from = options
        .from
        .unwrap_or_else(|| now.checked_sub_months(Months::new(1)).unwrap_or(now));
    let sortby = match options.sort_by {
        Some(SortBy::Relevancy | SortBy::Popularity) => "relevance",
        Some(SortBy::PublishedAt) | None => "publishedAt",
    };

    plan.push_opt("q", Some(query));
    plan.push("page", options.page().to_string());
    plan.push_opt("lang", options.language.as_deref());
    plan.push_opt("max", options.page_size.map(|n| n.to_string()));
    plan.push_opt("country", options.first_country());
    plan.push_opt("category", options.category.as_deref());
    plan.push_opt("in", options.narrowed_search_in());
    plan.push("from", timestamp(from));
    plan.push_opt("to", options.to.map(timestamp));
    plan.push("sortby", sortby);

    if headlines {
        plan.without(HEADLINES_EXCLUDED)
    } else {
        plan.without(SEARCH_EXCLUDED)
    }
}

/// Check the `errors` and `status` envelopes and normalise `articles`.
pub fn parse_response(body: &Value, now: DateTime<Utc>) -> Result<FetchResult, SearchError> {
    if let Some(errors) = body.get("errors").filter(|e| !e.is_null()) {
        let first = match errors {
            Value::Array(list) => list.first(),
            Value::Object(map) => map.values().next(),
            _ => None,
        };
        let message = first
            .and_then(Value::as_str)
            .unwrap_or("GNews API error")
            .to_string();
        return Err(SearchError::ProviderPayload {
            provider: ProviderId::GNews,
            message,
        });
    }
    if body.get("status").and_then(Value::as_str) == Some("error") {
        return Err(SearchError::ProviderPayload {
            provider: ProviderId::GNews,
            message: string_at(body, "/message").unwrap_or_else(|| "API error".into()),
        });
    }
    Ok(FetchResult {
        total_results: u64_at(body, "/totalArticles"),
        articles: items(body, "articles")
            .iter()
            .map(|item| normalize(item, now))
            .collect(),
    })
}

/// Convert one GNews article. GNews does not report authors.
pub fn normalize(item: &Value, now: DateTime<Utc>) -> Article {
    RawArticle {
        source_name: string_at(item, "/source/name"),
        author: None,
        title: string_at(item, "/title"),
        description: string_at(item, "/description"),
        url: string_at(item, "/url"),
        image_url: string_at(item, "/image"),
        published_at: string_at(item, "/publishedAt"),
        content: string_at(item, "/content"),
    }
    .into_article(ProviderId::GNews, now)
}
