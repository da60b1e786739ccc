//! Result ordering.

use std::cmp::Ordering;

use crate::types::{Article, SortBy};

/// Order merged articles for display.
///
/// `PublishedAt` (and no preference) sorts newest first. Articles whose
/// publish time cannot be parsed sort after every dated article. The sort is
/// stable, so ties keep merge order. `Relevancy` and `Popularity` keep the
/// providers' own order.
pub fn sort_articles(articles: &mut [Article], sort_by: Option<SortBy>) {
    match sort_by {
        Some(SortBy::Relevancy | SortBy::Popularity) => {}
        Some(SortBy::PublishedAt) | None => {
            articles.sort_by(|a, b| newest_first(a, b));
        }
    }
}

fn newest_first(a: &Article, b: &Article) -> Ordering {
    match (a.timestamp(), b.timestamp()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
