//! Article deduplication by link and by headline.
//!
//! The same story often arrives from several providers with slightly
//! different links (tracking parameters, trailing slashes) or identical
//! headlines on different syndication hosts. An article is a duplicate if
//! either key has been seen before; the first occurrence wins.

use std::collections::HashSet;

use crate::types::Article;

use super::url_normalize::url_key;

/// Identity key for a headline: lower-cased, alphanumerics only.
///
/// `"Fed Raises Rates!"` and `"fed raises rates"` share a key. Non-ASCII
/// letters and digits are kept on purpose, unlike an ASCII-only `[a-z0-9]`
/// key, so `"北京 rally"` and `"上海 rally"` stay distinct.
pub fn title_key(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Both identity keys for an article. A key is `None` when the field is
/// absent, a placeholder, or normalises to nothing.
fn identity_keys(article: &Article) -> (Option<String>, Option<String>) {
    let url = article
        .link()
        .map(url_key)
        .filter(|key| !key.is_empty());
    let title = article
        .real_title()
        .map(title_key)
        .filter(|key| !key.is_empty());
    (url, title)
}

/// Drop articles whose link or headline was already seen.
///
/// Single pass, order preserving. Both keys of a kept article are recorded,
/// so a later article matching either one is dropped.
pub fn deduplicate(articles: Vec<Article>) -> Vec<Article> {
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut seen_titles: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(articles.len());

    for article in articles {
        let (url, title) = identity_keys(&article);
        let duplicate = url.as_ref().is_some_and(|k| seen_urls.contains(k))
            || title.as_ref().is_some_and(|k| seen_titles.contains(k));
        if duplicate {
            continue;
        }
        if let Some(key) = url {
            seen_urls.insert(key);
        }
        if let Some(key) = title {
            seen_titles.insert(key);
        }
        kept.push(article);
    }

    kept
}
