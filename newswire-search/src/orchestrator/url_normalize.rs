//! URL identity keys for cross-provider deduplication.
//!
//! Two links refer to the same story when they share scheme, host, port and
//! path. Query strings (tracking tags, syndication ids) and fragments are
//! ignored, as is a single trailing slash.

use url::{Origin, Url};

/// Identity key for an article link.
///
/// Returns `origin + path` with one trailing slash removed. A link that does
/// not parse, or has no tuple origin (`mailto:`, `data:`), is used verbatim
/// after trimming.
///
/// # Examples
///
/// ```
/// use newswire_search::orchestrator::url_normalize::url_key;
///
/// assert_eq!(url_key("https://site.com/a?utm=1"), url_key("https://site.com/a/"));
/// ```
pub fn url_key(raw: &str) -> String {
    let raw = raw.trim();
    let Ok(parsed) = Url::parse(raw) else {
        return raw.to_string();
    };
    let origin = parsed.origin();
    if !matches!(origin, Origin::Tuple(..)) {
        return raw.to_string();
    }
    let path = parsed.path();
    let path = path.strip_suffix('/').unwrap_or(path);
    format!("{}{path}", origin.ascii_serialization())
}
