//! End-to-end session tests: config file on disk, real adapters, mock APIs.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use newswire::config::ProviderEntry;
use newswire::{NewsSession, NewswireConfig};
use newswire_search::{ProviderId, SearchOptions};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, ids: &[ProviderId]) -> NewswireConfig {
    let mut config = NewswireConfig::default();
    config.transport.max_retries = 0;
    config.search.providers = ids.to_vec();
    for id in ids {
        config.providers.insert(
            id.id().to_string(),
            ProviderEntry {
                api_key: Some(format!("{id}-key")),
                base_url: Some(server.uri()),
                enabled: true,
            },
        );
    }
    config
}

fn newsapi_page(page: u32, titles: &[&str]) -> serde_json::Value {
    let articles: Vec<_> = titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            json!({
                "source": {"name": "Reuters"},
                "title": title,
                "url": format!("https://reuters.example/{page}/{i}"),
                "publishedAt": format!("2024-05-{:02}T10:00:00Z", 20 - page as usize - i),
            })
        })
        .collect();
    json!({"status": "ok", "totalResults": 40, "articles": articles})
}

async fn mount_newsapi_page(server: &MockServer, page: u32, titles: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(newsapi_page(page, titles)))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn load_more_requests_next_page_and_merges() {
    let server = MockServer::start().await;
    mount_newsapi_page(&server, 1, &["Fed holds rates", "Markets rally"]).await;
    mount_newsapi_page(&server, 2, &["Bond yields climb", "Markets rally"]).await;

    let config = config_for(&server, &[ProviderId::NewsApi]);
    let session = NewsSession::from_config(&config).expect("session");

    let first = session
        .search("rates", config.default_options())
        .await
        .expect("first page");
    assert_eq!(first.page, 1);
    assert_eq!(first.totals, vec![(ProviderId::NewsApi, Some(40))]);
    assert_eq!(first.articles.len(), 2);

    let second = session.load_more().await.expect("second page");
    assert_eq!(second.page, 2);
    // "Markets rally" is re-delivered under a new URL and dropped by title.
    assert_eq!(second.added, 1);
    assert_eq!(second.articles.len(), 3);
    assert_eq!(second.totals, first.totals);
}

#[tokio::test]
async fn newsdata_sits_out_load_more() {
    let server = MockServer::start().await;
    mount_newsapi_page(&server, 1, &["Fed holds rates"]).await;
    mount_newsapi_page(&server, 2, &["Bond yields climb"]).await;
    Mock::given(method("GET"))
        .and(path("/api/1/news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "totalResults": 1,
            "results": [{
                "title": "ECB signals cut",
                "link": "https://ecb.example/cut",
                "pubDate": "2024-05-19 08:00:00",
                "source_id": "ecb_example"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, &[ProviderId::NewsApi, ProviderId::NewsData]);
    let session = NewsSession::from_config(&config).expect("session");

    let first = session
        .search("rates", SearchOptions::new())
        .await
        .expect("first page");
    assert_eq!(first.articles.len(), 2);

    let second = session.load_more().await.expect("second page");
    assert!(second.failures.is_empty());
    assert_eq!(second.added, 1);
    assert_eq!(second.articles.len(), 3);
}

#[tokio::test]
async fn config_file_drives_the_session() {
    let server = MockServer::start().await;
    mount_newsapi_page(&server, 1, &["Fed holds rates"]).await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    config_for(&server, &[ProviderId::NewsApi])
        .save_to_file(&file)
        .unwrap();

    let config = NewswireConfig::from_file(&file).unwrap();
    assert_eq!(config.enabled_providers(), vec![ProviderId::NewsApi]);

    let session = NewsSession::from_config(&config).expect("session");
    let summary = session
        .search("rates", config.default_options())
        .await
        .expect("search");
    assert_eq!(summary.articles[0].title, "Fed holds rates");
}

#[tokio::test]
async fn rejected_key_fails_the_search_and_clears_the_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": "error",
            "message": "Your API key is invalid."
        })))
        .mount(&server)
        .await;

    let config = config_for(&server, &[ProviderId::NewsApi]);
    let session = NewsSession::from_config(&config).expect("session");

    let err = session
        .search("rates", SearchOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ALL_PROVIDERS_FAILED");
    assert!(err.to_string().contains("Your API key is invalid."));
    assert!(!err.to_string().contains("newsapi-key"));

    let err = session.load_more().await.unwrap_err();
    assert_eq!(err.code(), "NO_ACTIVE_SEARCH");
}
