//! Property-based tests for read ranges and the range synthesizer

use nntp_newsrc::{ArticleRange, LoadedArticle, RangeSet, synthesize_ranges};
use proptest::prelude::*;

fn non_empty_range() -> impl Strategy<Value = ArticleRange> {
    (1u64..1_000_000, 0u64..1_000).prop_map(|(first, len)| ArticleRange::new(first, first + len))
}

fn flagged_articles() -> impl Strategy<Value = Vec<LoadedArticle>> {
    prop::collection::vec((1u64..4, any::<bool>(), any::<bool>()), 0..64).prop_map(|steps| {
        let mut number = 0;
        steps
            .into_iter()
            .map(|(gap, read, deleted)| {
                number += gap;
                LoadedArticle {
                    number,
                    read,
                    deleted,
                }
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_parse_never_panics(s in ".*") {
        let _ = RangeSet::parse(&s);
    }

    #[test]
    fn prop_serialize_then_parse_preserves_intervals(
        ranges in prop::collection::vec(non_empty_range(), 1..20)
    ) {
        let set = RangeSet::from_ranges(ranges.clone());
        let reparsed = RangeSet::parse(&set.to_string());
        prop_assert_eq!(reparsed.ranges(), ranges.as_slice());
    }

    #[test]
    fn prop_unread_count_within_window(
        ranges in prop::collection::vec(non_empty_range(), 0..20),
        first in 0u64..2_000_000,
        span in 0u64..10_000,
    ) {
        let last = first + span;
        let set = RangeSet::from_ranges(ranges);
        let unread = set.unread_count(first, last);
        if last == 0 {
            prop_assert_eq!(unread, 0);
        } else {
            prop_assert!(unread <= last - first + 1);
        }
    }

    #[test]
    fn prop_catchup_reads_everything(
        ranges in prop::collection::vec(non_empty_range(), 0..20),
        first in 1u64..1_000,
        span in 0u64..1_000,
    ) {
        let last = first + span;
        let mut set = RangeSet::from_ranges(ranges);
        set.catchup(last);
        prop_assert_eq!(set.unread_count(first, last), 0);
    }

    #[test]
    fn prop_synthesized_ranges_are_ordered(
        articles in flagged_articles(),
        first_article in 0u64..50,
    ) {
        let last_loaded = articles.last().map_or(0, |a| a.number);
        let ranges = synthesize_ranges(&articles, first_article, last_loaded);
        for pair in ranges.windows(2) {
            prop_assert!(pair[0].last < pair[1].first);
        }
    }

    #[test]
    fn prop_synthesized_ranges_cover_seen_articles(articles in flagged_articles()) {
        // With tracking from article 1, every seen article is read and every
        // unseen one is not.
        let last_loaded = articles.last().map_or(0, |a| a.number);
        let set = RangeSet::from_ranges(synthesize_ranges(&articles, 1, last_loaded));
        for article in &articles {
            prop_assert_eq!(
                set.contains(article.number),
                article.is_seen(),
                "article {}",
                article.number
            );
        }
    }
}
