//! Provider contract tests.
//!
//! Each adapter is pointed at a mock server and checked for the exact
//! endpoint and query vocabulary it sends, and for how it decodes the
//! provider's success and error payloads.

use std::sync::Arc;

use newswire_search::http::HttpTransport;
use newswire_search::providers::build_provider;
use newswire_search::{
    NewsProvider, ProviderId, ProviderSettings, RetryPolicy, SearchConfig, SearchOptions, SortBy,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn adapter(id: ProviderId, server: &MockServer, retry: RetryPolicy) -> Arc<dyn NewsProvider> {
    let config = SearchConfig::default().with_retry(retry);
    let transport = HttpTransport::from_config(&config).expect("transport");
    let settings = ProviderSettings::new("test-key").with_base_url(server.uri());
    build_provider(id, &settings, transport).expect("adapter")
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy::default()
        .with_initial_backoff_ms(1)
        .with_max_backoff_ms(5)
}

#[tokio::test]
async fn newsapi_everything_request_and_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("apiKey", "test-key"))
        .and(query_param("q", "bitcoin"))
        .and(query_param("page", "2"))
        .and(query_param("sortBy", "popularity"))
        .and(query_param("language", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "totalResults": 1234,
            "articles": [{
                "source": {"id": "wired", "name": "Wired"},
                "author": "Sam",
                "title": "Bitcoin price surges",
                "description": "Crypto is up.",
                "url": "https://wired.com/bitcoin",
                "urlToImage": "https://wired.com/b.jpg",
                "publishedAt": "2024-05-01T10:00:00Z",
                "content": "Bitcoin rose sharply..."
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let options = SearchOptions::new()
        .with_page(2)
        .with_sort_by(SortBy::Popularity)
        .with_language("en");
    let result = adapter(ProviderId::NewsApi, &server, fast_retry())
        .fetch("bitcoin", &options)
        .await
        .expect("fetch");

    assert_eq!(result.total_results, Some(1234));
    assert_eq!(result.articles.len(), 1);
    let article = &result.articles[0];
    assert_eq!(article.title, "Bitcoin price surges");
    assert_eq!(article.source.name, "Wired");
    assert_eq!(article.provider_id, ProviderId::NewsApi);
}

#[tokio::test]
async fn newsapi_error_envelope_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "code": "parameterInvalid",
            "message": "You are trying to request results too far in the past."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = adapter(ProviderId::NewsApi, &server, fast_retry())
        .fetch("bitcoin", &SearchOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "PROVIDER_PAYLOAD");
    assert_eq!(
        err.message(),
        "You are trying to request results too far in the past."
    );
}

#[tokio::test]
async fn gnews_search_request_and_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/search"))
        .and(query_param("apikey", "test-key"))
        .and(query_param("q", "climate"))
        .and(query_param("lang", "en"))
        .and(query_param("max", "5"))
        .and(query_param("sortby", "relevance"))
        .and(query_param("from", "2024-04-01T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalArticles": 2,
            "articles": [
                {
                    "title": "Climate talks stall",
                    "description": "No deal yet.",
                    "content": "Negotiators ...",
                    "url": "https://example.org/talks",
                    "image": "https://example.org/talks.jpg",
                    "publishedAt": "2024-05-02T08:00:00Z",
                    "source": {"name": "Example Org", "url": "https://example.org"}
                },
                {
                    "title": "Heatwave warning",
                    "url": "https://example.net/heat",
                    "publishedAt": "2024-05-01T08:00:00Z",
                    "source": {"name": "Example Net"}
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let from = newswire_search::types::parse_date_bound("2024-04-01").expect("date");
    let options = SearchOptions::new()
        .with_language("en")
        .with_page_size(5)
        .with_sort_by(SortBy::Relevancy)
        .with_date_range(Some(from), None);
    let result = adapter(ProviderId::GNews, &server, fast_retry())
        .fetch("climate", &options)
        .await
        .expect("fetch");

    assert_eq!(result.total_results, Some(2));
    assert_eq!(result.articles.len(), 2);
    assert_eq!(
        result.articles[0].image_url.as_deref(),
        Some("https://example.org/talks.jpg")
    );
}

#[tokio::test]
async fn gnews_errors_array_is_payload_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": ["You have reached your request limit for today."]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = adapter(ProviderId::GNews, &server, fast_retry())
        .fetch("climate", &SearchOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "PROVIDER_PAYLOAD");
    assert_eq!(err.message(), "You have reached your request limit for today.");
}

#[tokio::test]
async fn gnews_forbidden_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/search"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "errors": ["The API key is invalid."]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = adapter(ProviderId::GNews, &server, fast_retry())
        .fetch("climate", &SearchOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "AUTH_FAILED");
    assert!(err.message().contains("The API key is invalid."));
}

#[tokio::test]
async fn thenewsapi_top_stories_without_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/news/top"))
        .and(query_param("api_token", "test-key"))
        .and(query_param("locale", "us"))
        .and(query_param("categories", "tech"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"found": 11, "returned": 1, "limit": 3, "page": 1},
            "data": [{
                "uuid": "u1",
                "title": "Chip shortage eases",
                "description": "",
                "snippet": "Supply is recovering",
                "url": "https://tech.example/chips",
                "image_url": "https://tech.example/chips.png",
                "language": "en",
                "published_at": "2024-05-01T06:00:00.000000Z",
                "source": "tech.example",
                "categories": ["tech"]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let options = SearchOptions::new().with_country("us").with_category("tech");
    let result = adapter(ProviderId::TheNewsApi, &server, fast_retry())
        .fetch("", &options)
        .await
        .expect("fetch");

    assert_eq!(result.total_results, Some(11));
    let article = &result.articles[0];
    assert_eq!(article.description.as_deref(), Some("Supply is recovering"));
    assert_eq!(article.source.name, "tech.example");
}

#[tokio::test]
async fn marketaux_error_object_is_payload_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/news/all"))
        .and(query_param("api_token", "test-key"))
        .and(query_param("search", "TSLA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {"code": "usage_limit_reached", "message": "The usage limit for this account has been reached."}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = adapter(ProviderId::Marketaux, &server, fast_retry())
        .fetch("TSLA", &SearchOptions::new())
        .await
        .unwrap_err();
    assert_eq!(
        err.message(),
        "The usage limit for this account has been reached."
    );
}

#[tokio::test]
async fn newsdata_request_and_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/1/news"))
        .and(query_param("apikey", "test-key"))
        .and(query_param("q", "election"))
        .and(query_param("sort", "relevancy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "totalResults": 1,
            "results": [{
                "article_id": "a1",
                "title": "Polls close",
                "link": "https://vote.example/polls",
                "creator": ["Reporter One"],
                "description": "Counting begins.",
                "pubDate": "2024-04-30 22:00:00",
                "source_id": "vote_example"
            }],
            "nextPage": "1714514400"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let options = SearchOptions::new().with_sort_by(SortBy::Relevancy);
    let result = adapter(ProviderId::NewsData, &server, fast_retry())
        .fetch("election", &options)
        .await
        .expect("fetch");

    let article = &result.articles[0];
    assert_eq!(article.url.as_deref(), Some("https://vote.example/polls"));
    assert_eq!(article.published_at, "2024-04-30T22:00:00Z");
    assert_eq!(article.author.as_deref(), Some("Reporter One"));
}

#[tokio::test]
async fn newsdata_load_more_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .expect(0)
        .mount(&server)
        .await;

    let result = adapter(ProviderId::NewsData, &server, fast_retry())
        .fetch("election", &SearchOptions::new().with_page(2).as_load_more())
        .await
        .expect("empty page");
    assert!(result.articles.is_empty());
    assert_eq!(result.total_results, Some(0));
}
