//! Core types: the normalised article, provider identifiers and search options.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SearchError;

/// Title given to articles whose provider omitted one.
pub const UNTITLED: &str = "No Title";

/// Placeholder some providers use in place of a real link.
pub const PLACEHOLDER_URL: &str = "#";

/// Publisher of an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Display name. Never empty; falls back to the provider's display name.
    pub name: String,
}

/// A news article in the common, provider-independent shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Publisher.
    pub source: Source,
    /// Byline, when the provider reports one.
    pub author: Option<String>,
    /// Headline. [`UNTITLED`] when the provider omitted it.
    pub title: String,
    /// Short description or standfirst.
    pub description: Option<String>,
    /// Canonical link. `None` when the provider gave no usable link.
    pub url: Option<String>,
    /// Lead image.
    pub image_url: Option<String>,
    /// Publication time as reported (RFC 3339 when the provider's format is known).
    pub published_at: String,
    /// Short excerpt, not the full body.
    pub content: Option<String>,
    /// Which adapter produced this record.
    pub provider_id: ProviderId,
}

impl Article {
    /// Returns the link if it is present and not a placeholder.
    pub fn link(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty() && *u != PLACEHOLDER_URL)
    }

    /// Returns the title unless it is empty or the [`UNTITLED`] fallback.
    pub fn real_title(&self) -> Option<&str> {
        let title = self.title.trim();
        (!title.is_empty() && title != UNTITLED).then_some(title)
    }

    /// An article is usable only if it has a title or a link.
    pub fn has_identity(&self) -> bool {
        self.link().is_some() || self.real_title().is_some()
    }

    /// Parsed publication time, or `None` if `published_at` is not a
    /// recognised timestamp.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.published_at)
    }
}

/// Parse a provider timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` (interpreted as UTC) and a bare
/// `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse a user-supplied date bound (`--from 2024-05-01`, or a full RFC 3339 time).
pub fn parse_date_bound(raw: &str) -> Result<DateTime<Utc>, SearchError> {
    parse_timestamp(raw).ok_or_else(|| {
        SearchError::Input(format!(
            "invalid date '{raw}': expected YYYY-MM-DD or an RFC 3339 timestamp"
        ))
    })
}

/// The news APIs this crate can query.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// NewsAPI.org: full-text search over a large publisher index.
    NewsApi,
    /// GNews.io: general news search.
    GNews,
    /// TheNewsAPI.com: general and headline listings.
    TheNewsApi,
    /// NewsData.io: cursor-paginated latest-news search.
    NewsData,
    /// Marketaux: financial news search.
    Marketaux,
}

impl ProviderId {
    /// Short, stable identifier used in config files and on the command line.
    pub fn id(&self) -> &'static str {
        match self {
            Self::NewsApi => "newsapi",
            Self::GNews => "gnews",
            Self::TheNewsApi => "thenewsapi",
            Self::NewsData => "newsdata",
            Self::Marketaux => "marketaux",
        }
    }

    /// Human-readable name, also the fallback publisher name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::NewsApi => "NewsAPI",
            Self::GNews => "GNews",
            Self::TheNewsApi => "TheNewsAPI",
            Self::NewsData => "NewsData",
            Self::Marketaux => "Marketaux",
        }
    }

    /// Returns all provider variants.
    pub fn all() -> &'static [ProviderId] {
        &[
            Self::NewsApi,
            Self::GNews,
            Self::TheNewsApi,
            Self::NewsData,
            Self::Marketaux,
        ]
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProviderId {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|p| p.id() == needle)
            .ok_or_else(|| SearchError::Input(format!("unknown provider: {s}")))
    }
}

/// Requested ordering of the merged result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    /// Provider-native relevance; merged output keeps arrival order.
    Relevancy,
    /// Provider-native popularity; merged output keeps arrival order.
    Popularity,
    /// Newest first.
    #[default]
    PublishedAt,
}

impl SortBy {
    /// Wire name in the unified vocabulary.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relevancy => "relevancy",
            Self::Popularity => "popularity",
            Self::PublishedAt => "publishedAt",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "relevancy" | "relevance" => Ok(Self::Relevancy),
            "popularity" => Ok(Self::Popularity),
            "publishedAt" | "published_at" | "date" => Ok(Self::PublishedAt),
            other => Err(SearchError::Input(format!(
                "unknown sort order '{other}': expected relevancy, popularity or publishedAt"
            ))),
        }
    }
}

/// Per-query options in the unified vocabulary. Each adapter translates these
/// into its provider's own parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchOptions {
    /// 1-based page number. `None` means the first page.
    pub page: Option<u32>,
    /// ISO 639-1 language code.
    pub language: Option<String>,
    /// Comma-separated ISO 3166-1 country codes.
    pub country: Option<String>,
    /// Topic category, used by headline listings.
    pub category: Option<String>,
    /// Requested ordering. `None` means newest first.
    pub sort_by: Option<SortBy>,
    /// Results per page.
    pub page_size: Option<u32>,
    /// Lower date bound.
    pub from: Option<DateTime<Utc>>,
    /// Upper date bound.
    pub to: Option<DateTime<Utc>>,
    /// Comma-separated domains to restrict to.
    pub domains: Option<String>,
    /// Comma-separated domains to exclude.
    pub exclude_domains: Option<String>,
    /// Comma-joined subset of `title,description,content`.
    pub search_in: Option<String>,
    /// Set on pagination continuations.
    pub is_load_more: bool,
}

impl SearchOptions {
    /// Create empty options (first page, newest first).
    pub fn new() -> Self {
        Self::default()
    }

    /// The effective 1-based page number.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Set the page number.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the sort order.
    pub fn with_sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = Some(sort_by);
        self
    }

    /// Set the language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set the country list.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Set the date range. Either bound may be open.
    pub fn with_date_range(
        mut self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    /// Restrict to domains.
    pub fn with_domains(mut self, domains: impl Into<String>) -> Self {
        self.domains = Some(domains.into());
        self
    }

    /// Exclude domains.
    pub fn with_exclude_domains(mut self, domains: impl Into<String>) -> Self {
        self.exclude_domains = Some(domains.into());
        self
    }

    /// Restrict which article fields the query is matched against.
    pub fn with_search_in(mut self, fields: impl Into<String>) -> Self {
        self.search_in = Some(fields.into());
        self
    }

    /// Mark as a load-more continuation.
    pub fn as_load_more(mut self) -> Self {
        self.is_load_more = true;
        self
    }

    /// First entry of the country list, for providers that accept only one.
    pub fn first_country(&self) -> Option<&str> {
        self.country
            .as_deref()
            .and_then(|c| c.split(',').map(str::trim).find(|c| !c.is_empty()))
    }

    /// `search_in` unless it names all three fields, in which case the
    /// provider default is equivalent and the parameter is omitted.
    pub fn narrowed_search_in(&self) -> Option<&str> {
        let raw = self.search_in.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        let fields: Vec<&str> = raw.split(',').map(str::trim).collect();
        let covers_all = ["title", "description", "content"]
            .iter()
            .all(|f| fields.contains(f));
        (!covers_all).then_some(raw)
    }
}

/// What one provider returned for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResult {
    /// Provider-reported match count, if the payload carried one.
    pub total_results: Option<u64>,
    /// Normalised articles in provider order.
    pub articles: Vec<Article>,
}

impl FetchResult {
    /// An empty result with a reported total of zero.
    pub fn empty() -> Self {
        Self {
            total_results: Some(0),
            articles: Vec::new(),
        }
    }
}
