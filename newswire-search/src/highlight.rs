//! Query-term highlighting and match snippets.
//!
//! Pure string transforms. A query wrapped in double quotes is matched as one
//! literal phrase; otherwise each whitespace-separated term is matched on its
//! own, longest first, with word-boundary anchors on the sides that begin or
//! end with a word character. Matching is case-insensitive.

use regex::{Captures, Regex, RegexBuilder};
use serde::Serialize;

use crate::types::Article;

/// Characters of context kept on each side of a snippet match.
pub const SNIPPET_CONTEXT_CHARS: usize = 50;

const ELLIPSIS: &str = "...";

/// Strings wrapped around every match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker<'a> {
    /// Inserted before a match.
    pub open: &'a str,
    /// Inserted after a match.
    pub close: &'a str,
}

/// `<mark>` / `</mark>`.
pub const HTML_MARK: Marker<'static> = Marker {
    open: "<mark>",
    close: "</mark>",
};

impl Default for Marker<'_> {
    fn default() -> Self {
        HTML_MARK
    }
}

/// Highlight `query` in `text` with `<mark>` tags.
pub fn highlight(text: &str, query: &str) -> String {
    highlight_with(text, query, HTML_MARK)
}

/// Highlight `query` in `text` with custom markers.
///
/// Returns `text` unchanged when either argument is empty or the query has
/// no terms.
pub fn highlight_with(text: &str, query: &str, marker: Marker<'_>) -> String {
    if text.is_empty() {
        return String::new();
    }
    let Some(re) = query_regex(query) else {
        return text.to_string();
    };
    re.replace_all(text, |caps: &Captures<'_>| {
        format!("{}{}{}", marker.open, &caps[0], marker.close)
    })
    .into_owned()
}

/// Literal phrase inside surrounding double quotes, if the query is quoted.
fn quoted_phrase(query: &str) -> Option<&str> {
    if query.len() >= 2 && query.starts_with('"') && query.ends_with('"') {
        Some(&query[1..query.len() - 1])
    } else if query == "\"" {
        Some("")
    } else {
        None
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn query_regex(query: &str) -> Option<Regex> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    let pattern = match quoted_phrase(query) {
        Some(phrase) => {
            if phrase.is_empty() {
                return None;
            }
            regex::escape(phrase)
        }
        None => {
            let mut terms: Vec<&str> = query.split_whitespace().collect();
            if terms.is_empty() {
                return None;
            }
            terms.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
            terms
                .iter()
                .map(|term| {
                    let start = if term.starts_with(is_word_char) { r"\b" } else { "" };
                    let end = if term.ends_with(is_word_char) { r"\b" } else { "" };
                    format!("{start}{}{end}", regex::escape(term))
                })
                .collect::<Vec<_>>()
                .join("|")
        }
    };

    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::debug!(error = %e, "highlight pattern rejected");
            None
        }
    }
}

/// Excerpt of `content` around the first occurrence of `query`, highlighted.
pub fn get_snippet(content: &str, query: &str) -> Option<String> {
    get_snippet_with(content, query, HTML_MARK)
}

/// [`get_snippet`] with custom markers.
///
/// Finds the first case-insensitive occurrence of the whole query (quotes
/// around a phrase are not part of it) and keeps
/// [`SNIPPET_CONTEXT_CHARS`] characters either side, adding `...` where the
/// window stops short of the text. Returns `None` when there is no
/// occurrence.
pub fn get_snippet_with(content: &str, query: &str, marker: Marker<'_>) -> Option<String> {
    let trimmed = query.trim();
    let needle = quoted_phrase(trimmed).unwrap_or(trimmed);
    if content.is_empty() || needle.is_empty() {
        return None;
    }
    let finder = RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .build()
        .ok()?;
    let found = finder.find(content)?;

    let start = content[..found.start()]
        .char_indices()
        .rev()
        .nth(SNIPPET_CONTEXT_CHARS - 1)
        .map_or(0, |(i, _)| i);
    let end = content[found.end()..]
        .char_indices()
        .nth(SNIPPET_CONTEXT_CHARS)
        .map_or(content.len(), |(i, _)| found.end() + i);

    let mut window = String::with_capacity(end - start + 2 * ELLIPSIS.len());
    if start > 0 {
        window.push_str(ELLIPSIS);
    }
    window.push_str(&content[start..end]);
    if end < content.len() {
        window.push_str(ELLIPSIS);
    }
    Some(highlight_with(&window, query, marker))
}

/// Display fields of an article with query matches marked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightedArticle {
    /// Highlighted headline.
    pub title: String,
    /// Highlighted description.
    pub description: Option<String>,
    /// Highlighted excerpt of the content around the first match.
    pub snippet: Option<String>,
}

/// Highlight an article's title and description and cut a content snippet.
pub fn highlight_article(article: &Article, query: &str, marker: Marker<'_>) -> HighlightedArticle {
    HighlightedArticle {
        title: highlight_with(&article.title, query, marker),
        description: article
            .description
            .as_deref()
            .map(|d| highlight_with(d, query, marker)),
        snippet: article
            .content
            .as_deref()
            .and_then(|c| get_snippet_with(c, query, marker)),
    }
}
