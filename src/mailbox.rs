//! Live mailbox view of an open newsgroup
//!
//! While a group is open, the per-article read and deleted flags of the loaded
//! articles are the authoritative read state. Before the newsrc is written the
//! group's ranges are rebuilt from those flags with [`synthesize_ranges`].

use crate::group::NewsGroup;
use crate::range::{ArticleRange, RangeSet};
use tracing::debug;

/// One article loaded into an open mailbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedArticle {
    /// Server article number
    pub number: u64,
    /// Read flag
    pub read: bool,
    /// Deleted flag
    pub deleted: bool,
}

impl LoadedArticle {
    /// An unread, undeleted article
    pub fn new(number: u64) -> Self {
        Self {
            number,
            read: false,
            deleted: false,
        }
    }

    /// Whether the article counts as seen for range purposes
    #[must_use]
    pub fn is_seen(&self) -> bool {
        self.read || self.deleted
    }
}

/// A group currently open in a session
///
/// `set_read` is how catchup and uncatchup reflect into the session.
pub trait LiveMailbox {
    /// Name of the group shown in this mailbox
    fn group_name(&self) -> &str;

    /// Loaded articles
    fn articles(&self) -> &[LoadedArticle];

    /// Change the read flag of the article at `index`
    fn set_read(&mut self, index: usize, read: bool);
}

/// Simple in-memory [`LiveMailbox`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenGroup {
    name: String,
    articles: Vec<LoadedArticle>,
}

impl OpenGroup {
    /// Open mailbox for `name` with the given articles
    pub fn new(name: impl Into<String>, articles: Vec<LoadedArticle>) -> Self {
        Self {
            name: name.into(),
            articles,
        }
    }

    /// Open mailbox built from `(number, read)` pairs
    pub fn with_flags(name: impl Into<String>, flags: &[(u64, bool)]) -> Self {
        let articles = flags
            .iter()
            .map(|&(number, read)| LoadedArticle {
                number,
                read,
                deleted: false,
            })
            .collect();
        Self::new(name, articles)
    }

    /// Mutable access to the loaded articles
    pub fn articles_mut(&mut self) -> &mut Vec<LoadedArticle> {
        &mut self.articles
    }
}

impl LiveMailbox for OpenGroup {
    fn group_name(&self) -> &str {
        &self.name
    }

    fn articles(&self) -> &[LoadedArticle] {
        &self.articles
    }

    fn set_read(&mut self, index: usize, read: bool) {
        if let Some(article) = self.articles.get_mut(index) {
            article.read = read;
        }
    }
}

/// Number of loaded articles that are neither read nor deleted
pub fn live_unread(mailbox: &dyn LiveMailbox) -> u64 {
    mailbox.articles().iter().filter(|a| !a.is_seen()).count() as u64
}

/// Rebuild read ranges from the flags of loaded articles
///
/// Articles must be ordered by number. Everything from 1 up to the first
/// unread article at or above `first_article` is one read run; after that,
/// each run of seen articles becomes an interval. Gaps in numbering inside a
/// read run are treated as read. If the list ends inside a read run, the run
/// is closed at `last_loaded`, which may exceed the last loaded article.
///
/// ```
/// use nntp_newsrc::{ArticleRange, LoadedArticle, synthesize_ranges};
///
/// let flags = [true, true, false, true, false];
/// let articles: Vec<LoadedArticle> = flags
///     .iter()
///     .enumerate()
///     .map(|(i, &read)| LoadedArticle { number: i as u64 + 1, read, deleted: false })
///     .collect();
///
/// let ranges = synthesize_ranges(&articles, 1, 5);
/// assert_eq!(ranges, [ArticleRange::new(1, 2), ArticleRange::single(4)]);
/// ```
pub fn synthesize_ranges(
    articles: &[LoadedArticle],
    first_article: u64,
    last_loaded: u64,
) -> Vec<ArticleRange> {
    let mut ranges = Vec::new();
    let mut first = 1;
    let mut last = 0;
    let mut in_read_run = true;

    for article in articles {
        if in_read_run {
            last = article.number;
            if last >= first_article && !article.is_seen() {
                ranges.push(ArticleRange::new(first, last.saturating_sub(1)));
                in_read_run = false;
            }
        } else {
            if article.is_seen() {
                first = last + 1;
                in_read_run = true;
            }
            last = article.number;
        }
    }

    if in_read_run && first <= last_loaded {
        ranges.push(ArticleRange::new(first, last_loaded));
    }
    ranges
}

impl NewsGroup {
    /// Replace this group's ranges with ones rebuilt from an open mailbox
    ///
    /// The previous ranges are discarded, not merged.
    pub fn update_from_mailbox(&mut self, mailbox: &dyn LiveMailbox) {
        let articles = mailbox.articles();
        let ranges = if articles.is_sorted_by_key(|a| a.number) {
            synthesize_ranges(articles, self.first_article, self.last_loaded)
        } else {
            let mut sorted = articles.to_vec();
            sorted.sort_by_key(|a| a.number);
            synthesize_ranges(&sorted, self.first_article, self.last_loaded)
        };

        debug!("{}: {} ranges from {} articles", self.name(), ranges.len(), articles.len());
        self.set_read_ranges(RangeSet::from_ranges(ranges));
    }
}
