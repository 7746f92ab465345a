//! Server group listing and its local cache
//!
//! Listing lines have the shape `group last first flag [description]`:
//!
//! ```text
//! comp.lang.rust 12345 1000 y The Rust programming language
//! comp.lang.moderated 900 10 m
//! ```
//!
//! The cache file (`.active`) stores the Unix time of the last full refresh
//! on its first line, followed by one listing line per group still present on
//! the server. It lets an account start without fetching the full listing.

use crate::error::Result;
use crate::newsrc::write_atomic;
use crate::registry::GroupRegistry;
use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, trace};

/// One parsed listing line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveEntry {
    /// Newsgroup name
    pub name: String,
    /// Highest article number
    pub last: u64,
    /// Lowest article number
    pub first: u64,
    /// Status flag, first character of the status field:
    /// - `y` = posting allowed
    /// - `n` = posting not allowed
    /// - `m` = moderated
    pub flag: char,
    /// Group description, if the line carries one
    pub description: Option<String>,
}

fn next_field(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}

impl ActiveEntry {
    /// Parse a listing line, `None` if it is short or malformed
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (name, rest) = next_field(line)?;
        let (last, rest) = next_field(rest)?;
        let (first, rest) = next_field(rest)?;
        let (status, rest) = next_field(rest)?;

        let description = rest.trim();
        Some(Self {
            name: name.to_string(),
            last: last.parse().ok()?,
            first: first.parse().ok()?,
            flag: status.chars().next()?,
            description: (!description.is_empty()).then(|| description.to_string()),
        })
    }

    /// Whether the flag allows posting (`y` or `m`)
    #[must_use]
    pub fn posting_allowed(&self) -> bool {
        matches!(self.flag, 'y' | 'm')
    }

    /// Record this entry in the registry
    ///
    /// The group becomes present on the server with the listed bounds and
    /// description. The unread count is recomputed from existing ranges; a
    /// group with neither ranges nor cached headers counts the whole span as
    /// unread.
    pub fn apply(&self, registry: &mut GroupRegistry) {
        let group = registry.find_or_create(&self.name);
        group.present_on_server = true;
        group.first_article = self.first;
        group.last_article = self.last;
        group.allowed = self.posting_allowed();
        group.description.clone_from(&self.description);

        if group.has_ranges() || group.last_cached != 0 {
            group.update_unread();
        } else {
            group.unread = group.unread_from_bounds();
        }
    }
}

/// Apply one listing line to the registry
///
/// Returns `false` if the line could not be parsed and was skipped.
pub fn parse_active_line(registry: &mut GroupRegistry, line: &str) -> bool {
    match ActiveEntry::parse(line) {
        Some(entry) => {
            entry.apply(registry);
            true
        }
        None => {
            trace!("Can't parse server line: {}", line);
            false
        }
    }
}

/// Render the cache file for every group still present on the server
pub fn format_active(registry: &GroupRegistry, refreshed: i64) -> String {
    let mut buf = format!("{}\n", refreshed);
    for group in registry.iter().filter(|g| g.present_on_server) {
        let flag = if group.allowed { 'y' } else { 'n' };
        // Writing to a String can't fail
        let _ = match &group.description {
            Some(desc) => writeln!(
                buf,
                "{} {} {} {} {}",
                group.name(),
                group.last_article,
                group.first_article,
                flag,
                desc
            ),
            None => writeln!(
                buf,
                "{} {} {} {}",
                group.name(),
                group.last_article,
                group.first_article,
                flag
            ),
        };
    }
    buf
}

/// Load the cache file into the registry
///
/// Returns the refresh time stored in the file, or `None` when there is no
/// usable cache (missing file, or a first line that is not a single non-zero
/// timestamp) and a live listing is needed instead.
///
/// # Errors
///
/// Returns [`NewsrcError::Io`](crate::NewsrcError::Io) if an existing file
/// can't be read.
pub fn read_active_cache(path: &Path, registry: &mut GroupRegistry) -> Result<Option<i64>> {
    debug!("Parsing {}", path.display());
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    // Descriptions are often Latin-1; undecodable bytes become U+FFFD
    let text = String::from_utf8_lossy(&raw);

    let mut lines = text.lines();
    let refreshed = match lines.next().map(|l| l.trim().parse::<i64>()) {
        Some(Ok(t)) if t != 0 => t,
        _ => {
            debug!("Ignoring {}: bad timestamp", path.display());
            return Ok(None);
        }
    };

    let count = lines
        .filter(|line| parse_active_line(registry, line))
        .count();
    debug!("Loaded {} groups from cache", count);
    Ok(Some(refreshed))
}

/// Write the cache file atomically
///
/// # Errors
///
/// Returns [`NewsrcError::Io`](crate::NewsrcError::Io) if the file can't be
/// written; the previous cache stays in place.
pub fn write_active_cache(path: &Path, registry: &GroupRegistry, refreshed: i64) -> Result<()> {
    debug!("Updating {}", path.display());
    write_atomic(path, format_active(registry, refreshed).as_bytes())?;
    Ok(())
}

/// Current time as stored in the cache header
pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// Convert a cache header timestamp back into a date
pub fn timestamp_to_datetime(refreshed: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(refreshed, 0)
}
