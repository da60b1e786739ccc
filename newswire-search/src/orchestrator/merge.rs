//! Merge per-provider result lists into one display list.

use crate::types::{Article, SortBy};

use super::dedup::deduplicate;
use super::ordering::sort_articles;

/// Flatten, validate, deduplicate and order provider results.
///
/// Lists are concatenated in the order given. Articles with neither a real
/// title nor a link are dropped before deduplication.
pub fn merge(lists: Vec<Vec<Article>>, sort_by: Option<SortBy>) -> Vec<Article> {
    let flattened: Vec<Article> = lists
        .into_iter()
        .flatten()
        .filter(Article::has_identity)
        .collect();
    let mut merged = deduplicate(flattened);
    sort_articles(&mut merged, sort_by);
    merged
}

/// Merge a load-more page into an already accumulated list.
///
/// The existing list goes first, so previously shown articles win against
/// re-delivered copies, and the whole set is re-sorted together.
pub fn merge_with_existing(
    existing: Vec<Article>,
    new_lists: Vec<Vec<Article>>,
    sort_by: Option<SortBy>,
) -> Vec<Article> {
    let mut lists = Vec::with_capacity(new_lists.len() + 1);
    lists.push(existing);
    lists.extend(new_lists);
    merge(lists, sort_by)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::tests::article;
    use crate::types::UNTITLED;

    #[test]
    fn merge_is_idempotent_over_duplicate_lists() {
        let list = vec![
            article("A", "https://a.com/1", "2024-01-02T00:00:00Z"),
            article("B", "https://b.com/1", "2024-01-01T00:00:00Z"),
        ];
        let once = merge(vec![list.clone()], None);
        let twice = merge(vec![list.clone(), list], None);
        assert_eq!(once, twice);
    }

    #[test]
    fn merge_output_is_sorted_newest_first() {
        let merged = merge(
            vec![
                vec![article("A", "https://a.com/1", "2024-01-01T00:00:00Z")],
                vec![
                    article("B", "https://b.com/1", "2024-03-01T00:00:00Z"),
                    article("C", "https://c.com/1", "2024-02-01T00:00:00Z"),
                ],
            ],
            Some(SortBy::PublishedAt),
        );
        for pair in merged.windows(2) {
            assert!(pair[0].timestamp() >= pair[1].timestamp());
        }
        assert_eq!(merged[0].title, "B");
    }

    #[test]
    fn articles_without_identity_are_dropped() {
        let mut orphan = article(UNTITLED, "#", "2024-01-01T00:00:00Z");
        orphan.url = None;
        let merged = merge(
            vec![vec![
                orphan,
                article(UNTITLED, "#", "2024-01-01T00:00:00Z"),
                article("Kept", "https://k.com", "2024-01-01T00:00:00Z"),
            ]],
            None,
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "Kept");
    }

    #[test]
    fn relevancy_preserves_provider_order() {
        let merged = merge(
            vec![
                vec![article("Old first", "https://a.com/1", "2020-01-01T00:00:00Z")],
                vec![article("New second", "https://b.com/1", "2024-01-01T00:00:00Z")],
            ],
            Some(SortBy::Relevancy),
        );
        assert_eq!(merged[0].title, "Old first");
    }

    #[test]
    fn load_more_keeps_existing_copy() {
        let mut existing = article("Story", "https://a.com/story", "2024-01-01T00:00:00Z");
        existing.description = Some("already shown".into());
        let fresh = vec![
            article("Story!", "https://mirror.com/story", "2024-01-01T00:00:00Z"),
            article("Another", "https://a.com/another", "2024-01-03T00:00:00Z"),
        ];
        let merged = merge_with_existing(vec![existing], vec![fresh], None);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].title, "Another");
        assert_eq!(merged[1].description.as_deref(), Some("already shown"));
    }

    #[test]
    fn empty_input_merges_to_empty() {
        assert!(merge(Vec::new(), None).is_empty());
        assert!(merge(vec![Vec::new(), Vec::new()], None).is_empty());
    }
}
