//! Rebuilding read ranges from an open mailbox

use nntp_newsrc::newsrc::format_newsrc;
use nntp_newsrc::{
    ArticleRange, GroupRegistry, LoadedArticle, OpenGroup, RangeSet, synthesize_ranges,
};

fn loaded(flags: &[(u64, bool)]) -> Vec<LoadedArticle> {
    flags
        .iter()
        .map(|&(number, read)| LoadedArticle {
            number,
            read,
            deleted: false,
        })
        .collect()
}

#[test]
fn test_mixed_flags_open_at_end() {
    let articles = loaded(&[(1, true), (2, true), (3, false), (4, true), (5, false)]);
    assert_eq!(
        synthesize_ranges(&articles, 1, 5),
        [ArticleRange::new(1, 2), ArticleRange::single(4)]
    );
}

#[test]
fn test_trailing_read_run_closes_at_last_loaded() {
    let articles = loaded(&[(1, false), (2, true), (3, true)]);
    assert_eq!(
        synthesize_ranges(&articles, 1, 40),
        [ArticleRange::new(1, 0), ArticleRange::new(2, 40)]
    );
}

#[test]
fn test_articles_below_first_are_read() {
    // 5 and 6 are unread but precede the group's first article
    let articles = loaded(&[(5, false), (6, false), (10, true), (11, false)]);
    assert_eq!(synthesize_ranges(&articles, 10, 11), [ArticleRange::new(1, 10)]);
}

#[test]
fn test_deleted_counts_as_seen() {
    let mut articles = loaded(&[(1, true), (2, false), (3, false)]);
    articles[1].deleted = true;
    assert_eq!(synthesize_ranges(&articles, 1, 3), [ArticleRange::new(1, 2)]);
}

#[test]
fn test_no_articles() {
    assert!(synthesize_ranges(&[], 1, 0).is_empty());
    assert_eq!(synthesize_ranges(&[], 1, 7), [ArticleRange::new(1, 7)]);
}

#[test]
fn test_update_from_mailbox_replaces_ranges() {
    let mut registry = GroupRegistry::new();
    let group = registry.subscribe("alt.test").unwrap();
    group.first_article = 1;
    group.last_article = 5;
    group.last_loaded = 5;
    group.set_read_ranges(RangeSet::parse("1-100"));

    let mailbox = OpenGroup::with_flags(
        "alt.test",
        &[(1, true), (2, true), (3, false), (4, true), (5, false)],
    );
    group.update_from_mailbox(&mailbox);

    assert_eq!(format_newsrc(&registry), "alt.test: 1-2,4\n");
    assert_eq!(registry.get("alt.test").unwrap().unread_count(), 2);
}

#[test]
fn test_update_from_unsorted_mailbox() {
    let mut registry = GroupRegistry::new();
    let group = registry.subscribe("alt.test").unwrap();
    group.first_article = 1;
    group.last_loaded = 3;

    let mailbox = OpenGroup::with_flags("alt.test", &[(3, true), (1, true), (2, false)]);
    group.update_from_mailbox(&mailbox);

    assert_eq!(
        group.read_ranges().unwrap().ranges(),
        &[ArticleRange::single(1), ArticleRange::new(3, 3)]
    );
}
