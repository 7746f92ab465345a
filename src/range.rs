//! Read-article ranges for a single newsgroup
//!
//! A [`RangeSet`] is the ordered list of closed intervals written after the
//! group name in a newsrc line, e.g. `1-120,125,130-141`. Every article
//! number covered by an interval is considered read.
//!
//! Intervals are kept in the order they were produced or parsed; adjacent or
//! overlapping intervals are never merged, so a parsed line serializes back to
//! the same tokens.
//!
//! # Example
//!
//! ```
//! use nntp_newsrc::RangeSet;
//!
//! let ranges = RangeSet::parse("1-3,5-7");
//! assert!(ranges.contains(2));
//! assert!(!ranges.contains(4));
//! assert_eq!(ranges.unread_count(1, 10), 4);
//! assert_eq!(ranges.to_string(), "1-3,5-7");
//! ```

use std::fmt;

/// A closed interval of article numbers
///
/// An interval with `first > last` is empty; `[1, 0]` is the canonical
/// "nothing read yet" marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArticleRange {
    /// Lowest article number in the interval
    pub first: u64,
    /// Highest article number in the interval
    pub last: u64,
}

impl ArticleRange {
    /// The sentinel empty interval `[1, 0]`
    pub const EMPTY: ArticleRange = ArticleRange { first: 1, last: 0 };

    /// Create an interval covering `first..=last`
    pub const fn new(first: u64, last: u64) -> Self {
        Self { first, last }
    }

    /// Create an interval covering one article
    pub const fn single(article: u64) -> Self {
        Self {
            first: article,
            last: article,
        }
    }

    /// True when the interval covers no article
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first > self.last
    }

    /// True when `article` lies inside the interval
    #[must_use]
    pub fn contains(&self, article: u64) -> bool {
        self.first <= article && article <= self.last
    }

    /// Parse a single `n` or `n-m` token
    ///
    /// Surrounding whitespace is ignored. Returns `None` for anything that is
    /// not one or two unsigned integers.
    pub fn parse_token(token: &str) -> Option<Self> {
        let token = token.trim();
        match token.split_once('-') {
            Some((first, last)) => Some(Self {
                first: first.trim().parse().ok()?,
                last: last.trim().parse().ok()?,
            }),
            None => token.parse().ok().map(Self::single),
        }
    }
}

impl fmt::Display for ArticleRange {
    /// Writes `n` for a single article, `n-m` for a span and nothing for an
    /// empty interval.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else if self.first < self.last {
            write!(f, "{}-{}", self.first, self.last)
        } else {
            Ok(())
        }
    }
}

/// Ordered list of read-article intervals for one group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSet {
    ranges: Vec<ArticleRange>,
}

impl Default for RangeSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl RangeSet {
    /// The canonical empty set: a single `[1, 0]` interval
    pub fn empty() -> Self {
        Self {
            ranges: vec![ArticleRange::EMPTY],
        }
    }

    /// Build a set from already ordered intervals
    ///
    /// The list is taken as-is; an empty list is allowed and serializes to
    /// nothing.
    pub fn from_ranges(ranges: Vec<ArticleRange>) -> Self {
        Self { ranges }
    }

    /// Parse the comma-separated range list of a newsrc line
    ///
    /// Tokens that are not `n` or `n-m` are dropped. If no token survives the
    /// result is [`RangeSet::empty`].
    pub fn parse(text: &str) -> Self {
        Self::parse_tokens(text.split(','))
    }

    /// Parse already split range tokens, see [`RangeSet::parse`]
    pub fn parse_tokens<'a, I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let ranges: Vec<ArticleRange> = tokens
            .into_iter()
            .filter_map(ArticleRange::parse_token)
            .collect();

        if ranges.is_empty() {
            Self::empty()
        } else {
            Self { ranges }
        }
    }

    /// Stored intervals, in order
    pub fn ranges(&self) -> &[ArticleRange] {
        &self.ranges
    }

    /// Number of stored intervals, including empty ones
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// True when no stored interval covers any article
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.iter().all(ArticleRange::is_empty)
    }

    /// Upper bound of the final stored interval, `0` if there is none
    pub fn last_article(&self) -> u64 {
        self.ranges.last().map_or(0, |r| r.last)
    }

    /// True iff some interval covers `article`
    #[must_use]
    pub fn contains(&self, article: u64) -> bool {
        self.ranges.iter().any(|r| r.contains(article))
    }

    /// Count articles in `first..=last` not covered by any interval
    ///
    /// Each interval is clamped to the window before it is subtracted. An
    /// empty window (`last == 0` or `first > last`) has no unread articles,
    /// and the count never goes below zero.
    pub fn unread_count(&self, first: u64, last: u64) -> u64 {
        if last == 0 || first > last {
            return 0;
        }

        let mut unread = last - first + 1;
        for range in &self.ranges {
            let lo = range.first.max(first);
            let hi = range.last.min(last);
            if lo <= hi {
                unread = unread.saturating_sub(hi - lo + 1);
            }
        }
        unread
    }

    /// Mark everything up to `last_article` as read
    pub fn catchup(&mut self, last_article: u64) {
        self.ranges.clear();
        self.ranges.push(ArticleRange::new(1, last_article));
    }

    /// Mark everything from `first_article` on as unread
    ///
    /// With `first_article <= 1` this yields the `[1, 0]` sentinel.
    pub fn uncatchup(&mut self, first_article: u64) {
        self.ranges.clear();
        self.ranges
            .push(ArticleRange::new(1, first_article.saturating_sub(1)));
    }
}

impl fmt::Display for RangeSet {
    /// Comma-separated tokens in stored order; empty intervals are skipped.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        for range in self.ranges.iter().filter(|r| !r.is_empty()) {
            write!(f, "{}{}", sep, range)?;
            sep = ",";
        }
        Ok(())
    }
}
