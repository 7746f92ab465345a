//! Read ranges: parsing, serialization, unread counts and catch-up

use nntp_newsrc::{ArticleRange, RangeSet};

#[test]
fn test_unread_count_with_gaps() {
    let ranges = RangeSet::from_ranges(vec![ArticleRange::new(1, 3), ArticleRange::new(5, 7)]);
    assert_eq!(ranges.unread_count(1, 10), 4);
}

#[test]
fn test_unread_count_clamps_to_window() {
    let ranges = RangeSet::parse("1-150,180-400");
    // 100..=149 read, 150 read, 151..=179 unread, 180..=200 read
    assert_eq!(ranges.unread_count(100, 200), 29);
}

#[test]
fn test_unread_count_empty_window() {
    let ranges = RangeSet::parse("1-5");
    assert_eq!(ranges.unread_count(0, 0), 0);
    assert_eq!(ranges.unread_count(10, 5), 0);
}

#[test]
fn test_unread_count_overlapping_ranges_never_negative() {
    let ranges = RangeSet::parse("1-10,1-10,5-8");
    assert_eq!(ranges.unread_count(1, 10), 0);
}

#[test]
fn test_catchup_then_uncatchup_is_sentinel() {
    for last in [0, 1, 42, u64::MAX] {
        let mut ranges = RangeSet::parse("3,7-9");
        ranges.catchup(last);
        ranges.uncatchup(1);
        assert_eq!(ranges, RangeSet::empty());
    }
}

#[test]
fn test_uncatchup_first_zero() {
    let mut ranges = RangeSet::parse("1-10");
    ranges.uncatchup(0);
    assert_eq!(ranges.ranges(), &[ArticleRange::EMPTY]);
}

#[test]
fn test_parse_drops_bad_tokens() {
    let ranges = RangeSet::parse("1-5,abc,7,-3,8-x, 10 ");
    assert_eq!(
        ranges.ranges(),
        &[ArticleRange::new(1, 5), ArticleRange::single(7), ArticleRange::single(10)]
    );
}

#[test]
fn test_parse_all_bad_is_sentinel() {
    assert_eq!(RangeSet::parse("junk,more-junk"), RangeSet::empty());
    assert_eq!(RangeSet::parse(""), RangeSet::empty());
}

#[test]
fn test_serialize_keeps_order_and_adjacency() {
    let ranges = RangeSet::parse("5-7,1-3,4");
    assert_eq!(ranges.to_string(), "5-7,1-3,4");
}

#[test]
fn test_serialize_sentinel_is_blank() {
    assert_eq!(RangeSet::empty().to_string(), "");
    assert!(RangeSet::empty().is_empty());
}

#[test]
fn test_serialize_skips_empty_intervals() {
    let ranges = RangeSet::from_ranges(vec![
        ArticleRange::new(1, 0),
        ArticleRange::new(3, 4),
        ArticleRange::new(9, 2),
        ArticleRange::single(12),
    ]);
    assert_eq!(ranges.to_string(), "3-4,12");
}

#[test]
fn test_contains() {
    let ranges = RangeSet::parse("1-3,10");
    assert!(ranges.contains(1));
    assert!(ranges.contains(3));
    assert!(!ranges.contains(4));
    assert!(ranges.contains(10));
    assert!(!RangeSet::empty().contains(0));
    assert!(!RangeSet::empty().contains(1));
}
