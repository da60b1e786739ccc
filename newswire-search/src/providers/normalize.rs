//! Helpers shared by the adapters for reading loosely-typed JSON payloads.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::error::SearchError;
use crate::types::{Article, FetchResult, ProviderId, Source, PLACEHOLDER_URL, UNTITLED};

/// Non-blank string at a JSON pointer.
pub(crate) fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Owned non-blank string at a JSON pointer.
pub(crate) fn string_at(value: &Value, pointer: &str) -> Option<String> {
    str_at(value, pointer).map(String::from)
}

/// Unsigned integer at a JSON pointer. Accepts numeric strings.
pub(crate) fn u64_at(value: &Value, pointer: &str) -> Option<u64> {
    match value.pointer(pointer)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// The array at `key`, or an empty slice.
pub(crate) fn items<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Current time in the RFC 3339 form used for missing publish dates.
pub(crate) fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Fields pulled from one provider item, before fallbacks are applied.
#[derive(Debug, Default)]
pub(crate) struct RawArticle {
    pub source_name: Option<String>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub published_at: Option<String>,
    pub content: Option<String>,
}

impl RawArticle {
    /// Apply fallbacks and stamp the provider.
    ///
    /// A missing source becomes the provider's display name, a missing title
    /// becomes [`UNTITLED`], a `#` link becomes `None` and a missing
    /// publish time becomes `now`.
    pub(crate) fn into_article(self, provider: ProviderId, now: DateTime<Utc>) -> Article {
        Article {
            source: Source {
                name: self
                    .source_name
                    .unwrap_or_else(|| provider.display_name().to_string()),
            },
            author: self.author,
            title: self.title.unwrap_or_else(|| UNTITLED.to_string()),
            description: self.description,
            url: self.url.filter(|u| u != PLACEHOLDER_URL),
            image_url: self.image_url,
            published_at: self.published_at.unwrap_or_else(|| rfc3339(now)),
            content: self.content,
            provider_id: provider,
        }
    }
}

/// Decode the `{data, meta, error}` envelope used by TheNewsAPI and Marketaux.
///
/// `error.message` wins. A body without `data` is an error only if it says
/// `status: "error"`; otherwise it is an empty page with a total of 0.
pub(crate) fn data_envelope(
    provider: ProviderId,
    body: &Value,
    now: DateTime<Utc>,
) -> Result<FetchResult, SearchError> {
    if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
        let message = str_at(error, "/message")
            .map(String::from)
            .unwrap_or_else(|| format!("{} error", provider.display_name()));
        return Err(SearchError::ProviderPayload { provider, message });
    }
    let Some(data) = body.get("data").and_then(Value::as_array) else {
        if body.get("status").and_then(Value::as_str) == Some("error") {
            return Err(SearchError::ProviderPayload {
                provider,
                message: string_at(body, "/message").unwrap_or_else(|| "API error".into()),
            });
        }
        return Ok(FetchResult::empty());
    };
    Ok(FetchResult {
        total_results: Some(u64_at(body, "/meta/found").unwrap_or(0)),
        articles: data.iter().map(|item| data_item(item, provider, now)).collect(),
    })
}

/// Convert one item from a `data` array. These providers report no author
/// and use the snippet as both fallback description and content preview.
pub(crate) fn data_item(item: &Value, provider: ProviderId, now: DateTime<Utc>) -> Article {
    let snippet = string_at(item, "/snippet");
    RawArticle {
        source_name: string_at(item, "/source"),
        author: None,
        title: string_at(item, "/title"),
        description: string_at(item, "/description").or_else(|| snippet.clone()),
        url: string_at(item, "/url"),
        image_url: string_at(item, "/image_url"),
        published_at: string_at(item, "/published_at"),
        content: snippet,
    }
    .into_article(provider, now)
}
