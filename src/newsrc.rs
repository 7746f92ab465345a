//! Reading and writing the newsrc subscription file
//!
//! Each line of a newsrc names a group, a subscription marker and the ranges
//! of read articles:
//!
//! ```text
//! comp.lang.rust: 1-1200,1204,1210-1300
//! alt.test! 1-5
//! ```
//!
//! `:` marks a subscribed group, `!` an unsubscribed one. Lines without a
//! marker are ignored and unparsable range tokens are dropped.
//!
//! The file is only reparsed when its size or modification time changed since
//! it was last read or written, and it is always rewritten through a temporary
//! sibling that is renamed over the original.

use crate::error::{NewsrcError, Outcome, Result};
use crate::range::RangeSet;
use crate::registry::GroupRegistry;
use std::ffi::OsString;
use std::fmt::Write as _;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, trace};

/// Size and modification time of a file, used to detect external edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    /// File length in bytes
    pub size: u64,
    /// Last modification time, if the platform reports one
    pub modified: Option<SystemTime>,
}

impl Fingerprint {
    /// Fingerprint of the file at `path`
    pub fn of(path: &Path) -> io::Result<Self> {
        let meta = fs::metadata(path)?;
        Ok(Self {
            size: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// Apply one newsrc line to the registry
///
/// Returns `false` if the line carries no subscription marker and was skipped.
pub fn parse_line(registry: &mut GroupRegistry, line: &str) -> bool {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(pos) = line.find([':', '!']) else {
        return false;
    };

    let name = &line[..pos];
    if name.is_empty() {
        return false;
    }
    let subscribed = line[pos..].starts_with(':');
    let ranges = RangeSet::parse(&line[pos + 1..]);

    let group = registry.find_or_create(name);
    group.subscribed = subscribed;
    group.load_ranges(ranges);
    trace!("{}", group.name());
    true
}

/// Apply every line of a newsrc to the registry
///
/// Returns the number of lines that named a group.
pub fn parse_newsrc(registry: &mut GroupRegistry, text: &str) -> usize {
    text.lines()
        .filter(|line| parse_line(registry, line))
        .count()
}

/// Render every group that has range state, in registry order
pub fn format_newsrc(registry: &GroupRegistry) -> String {
    let mut buf = String::new();
    for group in registry {
        let Some(ranges) = group.read_ranges() else {
            continue;
        };
        let marker = if group.subscribed { ':' } else { '!' };
        // Writing to a String can't fail
        let _ = writeln!(buf, "{}{} {}", group.name(), marker, ranges);
    }
    buf
}

/// Replace `path` with `contents` via a temporary sibling file
///
/// The rename is the only visible change: on failure the original file is
/// untouched and the temporary file is removed.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    write_atomic_with(path, contents, |from, to| fs::rename(from, to))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_atomic_with<F>(path: &Path, contents: &[u8], rename: F) -> io::Result<()>
where
    F: FnOnce(&Path, &Path) -> io::Result<()>,
{
    let tmp = temp_path(path);
    let result = File::create(&tmp)
        .and_then(|mut file| {
            file.write_all(contents)?;
            file.sync_all()
        })
        .and_then(|()| rename(&tmp, path));

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

/// Handle on an account's newsrc file
///
/// While a parse has succeeded and [`NewsrcFile::close`] has not been called,
/// the file is held open under an exclusive advisory lock.
#[derive(Debug)]
pub struct NewsrcFile {
    path: PathBuf,
    handle: Option<File>,
    fingerprint: Option<Fingerprint>,
}

impl NewsrcFile {
    /// Handle for the newsrc at `path`; nothing is opened yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            handle: None,
            fingerprint: None,
        }
    }

    /// Location of the newsrc
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file is currently held open and locked
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.handle.is_some()
    }

    /// Fingerprint recorded by the last parse or update
    pub fn fingerprint(&self) -> Option<Fingerprint> {
        self.fingerprint
    }

    /// Lock the newsrc and load it into `registry` if it changed
    ///
    /// A missing file is created empty. When the fingerprint matches the one
    /// recorded last time, the registry is left alone and
    /// [`Outcome::Unchanged`] is returned. Otherwise every group is
    /// unsubscribed and loses its ranges before the file is parsed.
    ///
    /// On success the lock stays held until [`NewsrcFile::close`].
    ///
    /// # Errors
    ///
    /// - [`NewsrcError::Io`] - the file can't be created, opened, read or
    ///   stat'ed
    /// - [`NewsrcError::Lock`] - the advisory lock can't be taken
    pub fn parse(&mut self, registry: &mut GroupRegistry) -> Result<Outcome> {
        if self.handle.take().is_none() {
            OpenOptions::new()
                .append(true)
                .create(true)
                .open(&self.path)?;
        }

        let mut file = File::open(&self.path)?;

        debug!("Locking {}", self.path.display());
        file.lock().map_err(|source| NewsrcError::Lock {
            path: self.path.clone(),
            source,
        })?;

        // Dropping the file on any error below also releases the lock
        let fingerprint = Fingerprint::of(&self.path)?;
        if self.fingerprint == Some(fingerprint) {
            self.handle = Some(file);
            return Ok(Outcome::Unchanged);
        }

        debug!("Parsing {}", self.path.display());
        let mut raw = Vec::with_capacity(fingerprint.size as usize);
        file.read_to_end(&mut raw)?;
        self.handle = Some(file);

        self.fingerprint = Some(fingerprint);
        registry.reset_newsrc_state();
        let count = parse_newsrc(registry, &String::from_utf8_lossy(&raw));
        debug!("Loaded {} groups from {}", count, self.path.display());
        Ok(Outcome::Updated)
    }

    /// Release the lock and close the file
    pub fn close(&mut self) {
        if let Some(file) = self.handle.take() {
            debug!("Unlocking {}", self.path.display());
            let _ = file.unlock();
        }
    }

    /// Rewrite the newsrc from `registry`
    ///
    /// The new fingerprint is recorded so the next parse sees no change.
    ///
    /// # Errors
    ///
    /// Returns [`NewsrcError::Io`] if the file can't be written, renamed or
    /// stat'ed; the previous contents stay in place.
    pub fn update(&mut self, registry: &GroupRegistry) -> Result<Outcome> {
        let buf = format_newsrc(registry);

        debug!("Updating {}", self.path.display());
        write_atomic(&self.path, buf.as_bytes())?;
        self.fingerprint = Some(Fingerprint::of(&self.path)?);
        Ok(Outcome::Updated)
    }
}

impl Drop for NewsrcFile {
    fn drop(&mut self) {
        self.close();
    }
}
