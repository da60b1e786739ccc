//! Marketaux adapter (financial news).
//!
//! Marketaux has one search endpoint and no sort or category parameters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::normalize::{data_envelope, data_item};
use super::{Endpoint, RequestPlan};
use crate::error::SearchError;
use crate::http::HttpTransport;
use crate::provider::NewsProvider;
use crate::types::{Article, FetchResult, ProviderId, SearchOptions};

const KEY_PARAM: &str = "api_token";
const ALL: &str = "/v1/news/all";
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Marketaux client.
#[derive(Debug, Clone)]
pub struct MarketauxProvider {
    endpoint: Endpoint,
    transport: HttpTransport,
}

impl MarketauxProvider {
    /// Create an adapter sending requests to `endpoint`.
    pub fn new(endpoint: Endpoint, transport: HttpTransport) -> Self {
        Self {
            endpoint,
            transport,
        }
    }
}

#[async_trait]
impl NewsProvider for MarketauxProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Marketaux
    }

    async fn fetch(&self, query: &str, options: &SearchOptions) -> Result<FetchResult, SearchError> {
        let plan = build_request(query, options);
        let url = self.endpoint.url_for(&plan, KEY_PARAM)?;
        let body = self.transport.fetch_json(&url).await?;
        parse_response(&body, Utc::now())
    }
}

/// Map unified options onto Marketaux parameters.
pub fn build_request(query: &str, options: &SearchOptions) -> RequestPlan {
    let mut plan = RequestPlan::new(ALL);
    plan.push_opt("search", Some(query));
    plan.push("page", options.page().to_string());
    plan.push_opt("language", options.language.as_deref());
    plan.push_opt("countries", options.country.as_deref());
    plan.push_opt("limit", options.page_size.map(|n| n.to_string()));
    plan.push_opt("domains", options.domains.as_deref());
    plan.push_opt("exclude_domains", options.exclude_domains.as_deref());
    plan.push_opt(
        "published_after",
        options.from.map(|d| d.format(DATE_FORMAT).to_string()),
    );
    plan.push_opt(
        "published_before",
        options.to.map(|d| d.format(DATE_FORMAT).to_string()),
    );
    plan
}

/// Decode the response envelope and normalise `data`.
pub fn parse_response(body: &Value, now: DateTime<Utc>) -> Result<FetchResult, SearchError> {
    data_envelope(ProviderId::Marketaux, body, now)
}

/// Convert one Marketaux item.
pub fn normalize(item: &Value, now: DateTime<Utc>) -> Article {
    data_item(item, ProviderId::Marketaux, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SortBy;
    use chrono::TimeZone;

    #[test]
    fn maps_filters_and_minute_precision_dates() {
        let from = Utc.with_ymd_and_hms(2024, 4, 1, 9, 30, 59).single();
        let to = Utc.with_ymd_and_hms(2024, 4, 2, 18, 0, 0).single();
        let options = SearchOptions::new()
            .with_country("us,gb")
            .with_page_size(3)
            .with_page(4)
            .with_date_range(from, to);
        let plan = build_request("TSLA", &options);
        assert_eq!(plan.path, ALL);
        assert_eq!(plan.param("search"), Some("TSLA"));
        assert_eq!(plan.param("countries"), Some("us,gb"));
        assert_eq!(plan.param("limit"), Some("3"));
        assert_eq!(plan.param("page"), Some("4"));
        assert_eq!(plan.param("published_after"), Some("2024-04-01T09:30"));
        assert_eq!(plan.param("published_before"), Some("2024-04-02T18:00"));
    }

    #[test]
    fn sort_and_category_are_not_sent() {
        let options = SearchOptions::new()
            .with_sort_by(SortBy::Relevancy)
            .with_category("business");
        let plan = build_request("TSLA", &options);
        assert!(plan.params.iter().all(|(k, _)| *k != "sort" && *k != "category"));
    }

    #[test]
    fn blank_query_still_uses_search_endpoint() {
        let plan = build_request(" ", &SearchOptions::new());
        assert_eq!(plan.path, ALL);
        assert_eq!(plan.param("search"), None);
    }
}
