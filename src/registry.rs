//! Per-account collection of newsgroups
//!
//! Groups are looked up by name and iterated in the order they were first
//! referenced. That order is also the order in which they are written back to
//! the newsrc and the active cache.

use crate::group::NewsGroup;
use indexmap::IndexMap;
use indexmap::map::Entry;
use tracing::trace;

/// Name-indexed, insertion-ordered set of [`NewsGroup`]s
///
/// # Example
///
/// ```
/// use nntp_newsrc::GroupRegistry;
///
/// let mut registry = GroupRegistry::new();
/// registry.find_or_create("comp.lang.rust").subscribed = true;
/// registry.find_or_create("alt.test");
///
/// let names: Vec<&str> = registry.iter().map(|g| g.name()).collect();
/// assert_eq!(names, ["comp.lang.rust", "alt.test"]);
/// assert!(registry.get("comp.lang.rust").unwrap().subscribed);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GroupRegistry {
    groups: IndexMap<String, NewsGroup>,
}

impl GroupRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a group, creating it in the "not yet known" state if missing
    pub fn find_or_create(&mut self, name: &str) -> &mut NewsGroup {
        match self.groups.entry(name.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                trace!("New group {}", name);
                entry.insert(NewsGroup::new(name))
            }
        }
    }

    /// Look up a group by name
    pub fn get(&self, name: &str) -> Option<&NewsGroup> {
        self.groups.get(name)
    }

    /// Look up a group by name for modification
    pub fn get_mut(&mut self, name: &str) -> Option<&mut NewsGroup> {
        self.groups.get_mut(name)
    }

    /// Whether a group of that name is tracked
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// Position of a group in iteration order
    ///
    /// Positions only change when a group before it is removed.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.groups.get_index_of(name)
    }

    /// Groups in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &NewsGroup> {
        self.groups.values()
    }

    /// Groups in insertion order, mutable
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut NewsGroup> {
        self.groups.values_mut()
    }

    /// Number of tracked groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True when no group is tracked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Forget a group, keeping the order of the others
    pub fn remove(&mut self, name: &str) -> Option<NewsGroup> {
        self.groups.shift_remove(name)
    }

    /// Unsubscribe every group and drop its ranges ahead of a full newsrc reparse
    pub(crate) fn reset_newsrc_state(&mut self) {
        for group in self.groups.values_mut() {
            group.subscribed = false;
            group.clear_read_ranges();
            group.update_unread();
        }
    }

    /// Mark every group as no longer advertised, ahead of a full listing
    pub(crate) fn mark_all_absent(&mut self) {
        for group in self.groups.values_mut() {
            group.present_on_server = false;
        }
    }
}

impl<'a> IntoIterator for &'a GroupRegistry {
    type Item = &'a NewsGroup;
    type IntoIter = indexmap::map::Values<'a, String, NewsGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.values()
    }
}
