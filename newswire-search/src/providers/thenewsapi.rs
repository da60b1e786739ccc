//! TheNewsAPI.com adapter.
//!
//! Searches go to `/v1/news/all`; an empty query lists `/v1/news/top`,
//! which has no `sort` parameter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::normalize::{data_envelope, data_item};
use super::{Endpoint, RequestPlan};
use crate::error::SearchError;
use crate::http::HttpTransport;
use crate::provider::NewsProvider;
use crate::types::{Article, FetchResult, ProviderId, SearchOptions, SortBy};

const KEY_PARAM: &str = "api_token";
const ALL: &str = "/v1/news/all";
const TOP: &str = "/v1/news/top";
const DATE_FORMAT: &str = "%Y-%m-%d";

const TOP_EXCLUDED: &[&str] = &["sort"];

/// TheNewsAPI.com client.
#[derive(Debug, Clone)]
pub struct TheNewsApiProvider {
    endpoint: Endpoint,
    transport: HttpTransport,
}

impl TheNewsApiProvider {
    /// Create an adapter sending requests to `endpoint`.
    pub fn new(endpoint: Endpoint, transport: HttpTransport) -> Self {
        Self {
            endpoint,
            transport,
        }
    }
}

#[async_trait]
impl NewsProvider for TheNewsApiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::TheNewsApi
    }

    async fn fetch(&self, query: &str, options: &SearchOptions) -> Result<FetchResult, SearchError> {
        let plan = build_request(query, options);
        let url = self.endpoint.url_for(&plan, KEY_PARAM)?;
        let body = self.transport.fetch_json(&url).await?;
        parse_response(&body, Utc::now())
    }
}

/// Map unified options onto TheNewsAPI parameters.
pub fn build_request(query: &str, options: &SearchOptions) -> RequestPlan {
    let query = query.trim();
    let top = query.is_empty();
    let mut plan = RequestPlan::new(if top { TOP } else { ALL });

    let sort = match options.sort_by {
        Some(SortBy::Relevancy) => "relevance",
        Some(SortBy::Popularity) => "popularity",
        Some(SortBy::PublishedAt) | None => "published_at",
    };

    plan.push_opt("search", Some(query));
    plan.push("page", options.page().to_string());
    plan.push_opt("language", options.language.as_deref());
    plan.push_opt("locale", options.country.as_deref());
    plan.push_opt("categories", options.category.as_deref());
    plan.push_opt("limit", options.page_size.map(|n| n.to_string()));
    plan.push_opt("domains", options.domains.as_deref());
    plan.push_opt("exclude_domains", options.exclude_domains.as_deref());
    plan.push("sort", sort);
    plan.push_opt(
        "published_after",
        options.from.map(|d| d.format(DATE_FORMAT).to_string()),
    );
    plan.push_opt(
        "published_before",
        options.to.map(|d| d.format(DATE_FORMAT).to_string()),
    );

    if top {
        plan.without(TOP_EXCLUDED)
    } else {
        plan
    }
}

/// Decode the response envelope and normalise `data`.
pub fn parse_response(body: &Value, now: DateTime<Utc>) -> Result<FetchResult, SearchError> {
    data_envelope(ProviderId::TheNewsApi, body, now)
}

/// Convert one TheNewsAPI item.
pub fn normalize(item: &Value, now: DateTime<Utc>) -> Article {
    data_item(item, ProviderId::TheNewsApi, now)
}
