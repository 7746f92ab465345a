//! Per-newsgroup subscription and read state

use crate::range::RangeSet;

/// How an article should be presented, derived from newsrc state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleStatus {
    /// A read range covers the article
    Read,
    /// Not read and newer than anything in the header cache
    New,
    /// Not read but already cached, reported when old-marking is enabled
    Old,
    /// Not read and already cached, old-marking disabled
    Unread,
}

/// State of one newsgroup within an account
///
/// Groups are created on first reference in a "not yet known" state: not
/// subscribed, absent from the server, bounds `(0, 0)` and no range state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsGroup {
    name: String,
    /// Lowest article number reported by the server
    pub first_article: u64,
    /// Highest article number reported by the server, `0` when empty
    pub last_article: u64,
    /// Highest article number ever fetched into an open mailbox
    pub last_loaded: u64,
    /// Highest article number known to be in the header cache
    pub last_cached: u64,
    /// Subscription marker (`:` vs `!` in the newsrc)
    pub subscribed: bool,
    /// Posting allowed according to the active listing
    pub allowed: bool,
    /// Group description from the active listing
    pub description: Option<String>,
    /// False when the last listing no longer advertised the group
    pub present_on_server: bool,
    pub(crate) read_ranges: Option<RangeSet>,
    pub(crate) unread: u64,
}

impl NewsGroup {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            first_article: 0,
            last_article: 0,
            last_loaded: 0,
            last_cached: 0,
            subscribed: false,
            allowed: false,
            description: None,
            present_on_server: false,
            read_ranges: None,
            unread: 0,
        }
    }

    /// Newsgroup name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read ranges, `None` if the group never had any range state
    pub fn read_ranges(&self) -> Option<&RangeSet> {
        self.read_ranges.as_ref()
    }

    /// Whether the group has range state worth persisting
    #[must_use]
    pub fn has_ranges(&self) -> bool {
        self.read_ranges.is_some()
    }

    /// Cached unread count
    pub fn unread_count(&self) -> u64 {
        self.unread
    }

    /// Replace the read ranges and recompute the unread count
    pub fn set_read_ranges(&mut self, ranges: RangeSet) {
        self.read_ranges = Some(ranges);
        self.update_unread();
    }

    /// Drop all range state, the group will no longer be persisted
    pub fn clear_read_ranges(&mut self) {
        self.read_ranges = None;
    }

    /// Recompute the unread count from the ranges and current bounds
    pub fn update_unread(&mut self) {
        self.unread = match &self.read_ranges {
            Some(ranges) => ranges.unread_count(self.first_article, self.last_article),
            None => self.unread_from_bounds(),
        };
    }

    /// Unread count for a group with no range state: the full bound span
    pub(crate) fn unread_from_bounds(&self) -> u64 {
        if self.last_article != 0 && self.first_article <= self.last_article {
            self.last_article - self.first_article + 1
        } else {
            0
        }
    }

    /// Whether `article` is covered by a read range
    #[must_use]
    pub fn is_read(&self, article: u64) -> bool {
        self.read_ranges
            .as_ref()
            .is_some_and(|ranges| ranges.contains(article))
    }

    /// Classify an article for display
    ///
    /// Read articles are those covered by a range. Unread articles past
    /// `last_cached` are new; cached ones are old only if `mark_old` is set.
    pub fn article_status(&self, article: u64, mark_old: bool) -> ArticleStatus {
        if self.is_read(article) {
            ArticleStatus::Read
        } else if article > self.last_cached {
            ArticleStatus::New
        } else if mark_old {
            ArticleStatus::Old
        } else {
            ArticleStatus::Unread
        }
    }

    /// Whether caches for this group survive a sweep
    pub(crate) fn keeps_cache(&self, save_unsubscribed: bool) -> bool {
        self.has_ranges() || self.subscribed || save_unsubscribed
    }

    /// Install freshly parsed ranges from a newsrc line
    pub(crate) fn load_ranges(&mut self, ranges: RangeSet) {
        if self.last_article == 0 {
            self.last_article = ranges.last_article();
        }
        self.set_read_ranges(ranges);
    }

    pub(crate) fn ranges_mut(&mut self) -> Option<&mut RangeSet> {
        self.read_ranges.as_mut()
    }

    /// Sentinel ranges for a group that has never been read
    pub(crate) fn ensure_ranges(&mut self) {
        if self.read_ranges.is_none() {
            self.read_ranges = Some(RangeSet::empty());
        }
    }
}
