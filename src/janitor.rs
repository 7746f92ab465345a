//! Keeping article caches inside a group's article window
//!
//! Servers expire old articles, so the `[first, last]` window of a group moves
//! forward over time. Cached headers and bodies for articles that fell out of
//! the window are trimmed, and caches of groups that are no longer tracked are
//! removed altogether.
//!
//! On disk, an account's caches live under one directory:
//!
//! ```text
//! <cache_dir>/<account>/.active            group listing cache
//! <cache_dir>/<account>/<group>.hcache     header cache
//! <cache_dir>/<account>/<group>/<article>  body cache
//! ```

use crate::cache::{ArticleCache, DirCache};
use crate::error::{Outcome, Result};
use crate::group::NewsGroup;
use crate::registry::GroupRegistry;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Header cache key holding the `"<first> <last>"` window it was built for
pub const INDEX_KEY: &str = "index";

const HCACHE_SUFFIX: &str = ".hcache";

/// Article number of a cache key, `None` unless the key is exactly a number
pub fn article_key(key: &str) -> Option<u64> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

/// Parse a header cache index record
///
/// Trailing NULs and whitespace are ignored.
pub fn parse_index(raw: &[u8]) -> Option<(u64, u64)> {
    let text = std::str::from_utf8(raw).ok()?;
    let mut fields = text.trim_end_matches('\0').split_whitespace();
    let first = fields.next()?.parse().ok()?;
    let last = fields.next()?.parse().ok()?;
    Some((first, last))
}

/// Encode a header cache index record, NUL-terminated
pub fn format_index(first: u64, last: u64) -> Vec<u8> {
    let mut buf = format!("{} {}", first, last).into_bytes();
    buf.push(0);
    buf
}

/// Delete cached articles outside the group's `[first, last]` window
///
/// Keys that are not an article number are removed as well; the header
/// cache index is kept.
pub fn trim(group: &NewsGroup, cache: &mut dyn ArticleCache) -> Result<Outcome> {
    let mut outcome = Outcome::Unchanged;
    for key in cache.list("")? {
        if key == INDEX_KEY {
            continue;
        }
        let keep = article_key(&key)
            .is_some_and(|n| group.first_article <= n && n <= group.last_article);
        if !keep {
            trace!("{}: delete cached {}", group.name(), key);
            cache.delete(&key)?;
            outcome = Outcome::Updated;
        }
    }
    Ok(outcome)
}

/// Delete every cached entry of the group
pub fn purge(group: &mut NewsGroup, cache: &mut dyn ArticleCache) -> Result<Outcome> {
    group.last_cached = 0;
    purge_all(cache)
}

fn purge_all(cache: &mut dyn ArticleCache) -> Result<Outcome> {
    let keys = cache.list("")?;
    for key in &keys {
        cache.delete(key)?;
    }
    Ok(if keys.is_empty() {
        Outcome::Unchanged
    } else {
        Outcome::Updated
    })
}

/// Bring a header cache in line with the group's current window
///
/// The stored index tells the last article that was cached. Entries outside
/// the window are trimmed, then the index is rewritten if the window moved.
pub fn sync_header_index(group: &mut NewsGroup, cache: &mut dyn ArticleCache) -> Result<Outcome> {
    let old = cache.fetch(INDEX_KEY)?.and_then(|raw| parse_index(&raw));

    let mut outcome = Outcome::Unchanged;
    if let Some((_, last)) = old {
        debug!("{}: cached index last={}", group.name(), last);
        group.last_cached = last;
        outcome = trim(group, cache)?;
    }

    let current = (group.first_article, group.last_article);
    if old != Some(current) {
        debug!("{}: store index {} {}", group.name(), current.0, current.1);
        cache.store(INDEX_KEY, &format_index(current.0, current.1))?;
        outcome = Outcome::Updated;
    }
    Ok(outcome)
}

/// Recover bounds and `last_cached` from a header cache index
///
/// A group the server no longer lists adopts the cached window. The cached
/// last article becomes `last_cached` only if it still lies in the window.
pub fn recover_cached_bounds(group: &mut NewsGroup, cache: &dyn ArticleCache) -> Result<Outcome> {
    let Some((first, last)) = cache.fetch(INDEX_KEY)?.and_then(|raw| parse_index(&raw)) else {
        return Ok(Outcome::Unchanged);
    };

    if !group.present_on_server {
        group.first_article = first;
        group.last_article = last;
    }
    if group.first_article <= last && last <= group.last_article {
        group.last_cached = last;
        debug!("{} last_cached={}", group.name(), last);
    }
    Ok(Outcome::Updated)
}

/// An account's cache directory
#[derive(Debug, Clone)]
pub struct CacheDir {
    root: PathBuf,
}

impl CacheDir {
    /// Cache directory for the account namespace under `cache_dir`
    pub fn new(cache_dir: &Path, namespace: &str) -> Self {
        Self {
            root: cache_dir.join(namespace),
        }
    }

    /// Create the directory if needed
    pub fn create(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root)
    }

    /// Account cache directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the group listing cache
    pub fn active_path(&self) -> PathBuf {
        self.root.join(".active")
    }

    /// Location of a group's header cache
    ///
    /// `None` if the group name can't be used as a file name, see
    /// [`is_cacheable_name`].
    pub fn header_cache_path(&self, group: &str) -> Option<PathBuf> {
        is_cacheable_name(group).then(|| self.root.join(format!("{}{}", group, HCACHE_SUFFIX)))
    }

    /// A group's body cache, `None` for names that can't be a directory
    pub fn body_cache(&self, group: &str) -> Option<DirCache> {
        is_cacheable_name(group).then(|| DirCache::new(self.root.join(group)))
    }

    /// Names of groups that have a header cache file
    pub fn header_cache_groups(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut groups = Vec::new();
        for entry in entries {
            let entry = entry?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if let Some(group) = hcache_group(&name) {
                if entry.file_type()?.is_file() {
                    groups.push(group.to_string());
                }
            }
        }
        groups.sort();
        Ok(groups)
    }

    /// Remove a group's header cache file and body cache entries
    ///
    /// If the group is tracked its `last_cached` marker is reset. A group
    /// whose name can't be used as a file name has no cache and is left alone.
    pub fn delete_group_cache(&self, name: &str, group: Option<&mut NewsGroup>) -> Result<()> {
        if !is_cacheable_name(name) {
            debug!("Not deleting cache of {:?}: unusable name", name);
            return Ok(());
        }
        let hcache = self.root.join(format!("{}{}", name, HCACHE_SUFFIX));
        let mut body = DirCache::new(self.root.join(name));

        match fs::remove_file(&hcache) {
            Ok(()) => debug!("Deleted {}", hcache.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        match group {
            Some(group) => purge(group, &mut body)?,
            None => purge_all(&mut body)?,
        };
        debug!("Deleted {}/*", name);
        Ok(())
    }

    /// Remove caches of groups that are no longer worth keeping
    ///
    /// A cache survives only if its group is tracked and has ranges, is
    /// subscribed, or `save_unsubscribed` is set. Emptied body cache
    /// directories are removed. Returns the number of groups swept.
    pub fn sweep(&self, registry: &mut GroupRegistry, save_unsubscribed: bool) -> Result<usize> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        // (group, path, is_dir) for every header cache file and body cache dir
        let mut artifacts = Vec::new();
        for entry in entries {
            let entry = entry?;
            let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let Ok(meta) = fs::metadata(entry.path()) else {
                continue;
            };

            if meta.is_file() {
                if let Some(group) = hcache_group(&file_name) {
                    artifacts.push((group.to_string(), entry.path(), false));
                }
            } else if meta.is_dir() && is_cacheable_name(&file_name) {
                artifacts.push((file_name, entry.path(), true));
            }
        }

        let mut swept: Vec<String> = Vec::new();
        for (name, path, is_dir) in artifacts {
            let group = registry.get_mut(&name);
            if group.as_ref().is_some_and(|g| g.keeps_cache(save_unsubscribed)) {
                continue;
            }

            if !swept.contains(&name) {
                self.delete_group_cache(&name, group)?;
                swept.push(name);
            }
            if is_dir {
                match fs::remove_dir(&path) {
                    Ok(()) => debug!("Removed {}", path.display()),
                    Err(e) => debug!("Can't remove {}: {}", path.display(), e),
                }
            }
        }
        Ok(swept.len())
    }
}

/// Whether a group name is usable as a single file name in the cache directory
///
/// Empty names, `.`, `..` and names containing a path separator or NUL are
/// not: they would resolve to the cache root or outside of it.
pub fn is_cacheable_name(group: &str) -> bool {
    !group.is_empty() && group != "." && group != ".." && !group.contains(['/', '\\', '\0'])
}

fn hcache_group(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(HCACHE_SUFFIX)
        .filter(|group| is_cacheable_name(group))
}
