//! Per-group article caches
//!
//! Header and body caches store one entry per article, keyed by the decimal
//! article number. The storage engine behind a cache is pluggable through
//! [`ArticleCache`]; this crate only needs to look up, store, delete and list
//! keys in order to keep the caches inside a group's article window.
//!
//! # Example
//!
//! ```
//! use nntp_newsrc::cache::{ArticleCache, MemoryCache};
//!
//! let mut cache = MemoryCache::new();
//! cache.store("12345", b"Subject: hello").unwrap();
//!
//! assert_eq!(cache.fetch("12345").unwrap().as_deref(), Some(&b"Subject: hello"[..]));
//! assert_eq!(cache.list("").unwrap(), ["12345"]);
//!
//! cache.delete("12345").unwrap();
//! assert!(cache.is_empty());
//! ```

use crate::error::{NewsrcError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Key-value storage for cached article data
pub trait ArticleCache {
    /// Look up the value stored under `key`
    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value
    fn store(&mut self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    fn delete(&mut self, key: &str) -> Result<()>;

    /// All keys starting with `prefix`
    fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

/// In-memory cache, keys kept in sorted order
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` is stored
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl ArticleCache for MemoryCache {
    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn store(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// Directory-backed cache storing one file per key
///
/// This is the layout of a body cache: `<cache>/<group>/<article>`. The
/// directory is created on first store.
#[derive(Debug, Clone)]
pub struct DirCache {
    dir: PathBuf,
}

impl DirCache {
    /// Cache rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the entries
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(NewsrcError::Other(format!("Invalid cache key: {:?}", key)));
        }
        Ok(self.dir.join(key))
    }
}

impl ArticleCache for DirCache {
    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.entry_path(key)?) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.entry_path(key)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(path, value)?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.entry_path(key)?) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.starts_with(prefix) {
                    keys.push(name.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}
