//! Subscribe, unsubscribe, catchup and next-unread navigation

use nntp_newsrc::{GroupRegistry, LiveMailbox, OpenGroup, RangeSet};

fn listed(registry: &mut GroupRegistry, name: &str, first: u64, last: u64) {
    let group = registry.find_or_create(name);
    group.first_article = first;
    group.last_article = last;
    group.present_on_server = true;
    group.update_unread();
}

#[test]
fn test_subscribe_then_catchup_and_back() {
    let mut registry = GroupRegistry::new();
    listed(&mut registry, "comp.lang.rust", 100, 200);

    let group = registry.subscribe("comp.lang.rust").unwrap();
    assert_eq!(group.unread_count(), 101);

    let group = registry.catchup("comp.lang.rust", None).unwrap();
    assert_eq!(group.read_ranges().unwrap().to_string(), "1-200");
    assert_eq!(group.unread_count(), 0);

    let group = registry.uncatchup("comp.lang.rust", None).unwrap();
    assert_eq!(group.read_ranges().unwrap().to_string(), "1-99");
    assert_eq!(group.unread_count(), 101);
}

#[test]
fn test_catchup_without_ranges_only_zeroes_count() {
    let mut registry = GroupRegistry::new();
    listed(&mut registry, "alt.test", 1, 50);

    let group = registry.catchup("alt.test", None).unwrap();
    assert!(!group.has_ranges());
    assert_eq!(group.unread_count(), 0);
}

#[test]
fn test_unsubscribe_policy() {
    let mut registry = GroupRegistry::new();
    registry.subscribe("alt.keep").unwrap().set_read_ranges(RangeSet::parse("1-9"));
    registry.subscribe("alt.drop").unwrap().set_read_ranges(RangeSet::parse("1-9"));

    assert!(registry.unsubscribe("alt.keep", true).unwrap().has_ranges());
    assert!(!registry.unsubscribe("alt.drop", false).unwrap().has_ranges());
    assert!(registry.contains("alt.drop"));
}

#[test]
fn test_catchup_reflects_into_live_session() {
    let mut registry = GroupRegistry::new();
    listed(&mut registry, "alt.test", 1, 4);
    registry.subscribe("alt.test");

    let mut mailbox = OpenGroup::with_flags("alt.test", &[(1, false), (2, true), (4, false)]);
    registry.catchup("alt.test", Some(&mut mailbox));
    assert!(mailbox.articles().iter().all(|a| a.read));

    let group = registry.uncatchup("alt.test", Some(&mut mailbox)).unwrap();
    assert!(mailbox.articles().iter().all(|a| !a.read));
    // counted from the three loaded articles, not the bounds
    assert_eq!(group.unread_count(), 3);
}

#[test]
fn test_next_unread_skips_stale_open_group() {
    let mut registry = GroupRegistry::new();
    for name in ["alt.first", "alt.second"] {
        listed(&mut registry, name, 1, 10);
        registry.subscribe(name);
    }
    assert_eq!(registry.get("alt.first").unwrap().unread_count(), 10);

    let mailbox = OpenGroup::with_flags("alt.first", &[(9, true), (10, true)]);
    let next = registry.next_unread_group(Some(&mailbox)).unwrap();
    assert_eq!(next.name(), "alt.second");

    assert_eq!(registry.next_unread_group(None).unwrap().name(), "alt.first");
}

#[test]
fn test_next_unread_in_registry_order() {
    let mut registry = GroupRegistry::new();
    listed(&mut registry, "z.last", 1, 5);
    listed(&mut registry, "a.first", 1, 5);
    registry.subscribe("z.last");
    registry.subscribe("a.first");

    assert_eq!(registry.next_unread_group(None).unwrap().name(), "z.last");
}
