//! Newsrc state of one news server account
//!
//! A [`NewsAccount`] owns everything this crate tracks for one server: the
//! group registry, the newsrc handle and the cache directory. It is passed
//! explicitly to whatever needs it; there is no process-wide current account.
//!
//! # Example
//!
//! ```no_run
//! use nntp_newsrc::{NewsAccount, NewsrcConfig, ServerConfig};
//!
//! # fn example() -> nntp_newsrc::Result<()> {
//! let server = ServerConfig::tls("news.example.com");
//! let config = NewsrcConfig::new("~/.newsrc-%s").with_cache_dir("~/.cache/news");
//!
//! let mut account = NewsAccount::open(server, config, false)?;
//! if account.needs_listing() {
//!     // fetch LIST ACTIVE from the server, then:
//!     account.apply_listing(["comp.lang.rust 12345 1000 y"]);
//!     account.save_active_cache()?;
//! }
//!
//! account.subscribe("comp.lang.rust");
//! account.update_newsrc()?;
//! # Ok(())
//! # }
//! ```

use crate::active::{self, parse_active_line};
use crate::cache::{ArticleCache, DirCache};
use crate::config::{NewsrcConfig, ServerConfig, expand_home};
use crate::error::{NewsrcError, Outcome, Result};
use crate::group::{ArticleStatus, NewsGroup};
use crate::janitor::{self, CacheDir};
use crate::mailbox::LiveMailbox;
use crate::newsrc::NewsrcFile;
use crate::registry::GroupRegistry;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Subscription and read state for one server
#[derive(Debug)]
pub struct NewsAccount {
    server: ServerConfig,
    config: NewsrcConfig,
    registry: GroupRegistry,
    newsrc: NewsrcFile,
    cache: Option<CacheDir>,
    refreshed: Option<i64>,
}

impl NewsAccount {
    /// Open an account and load its state from disk
    ///
    /// Expands the newsrc path, creates the cache directory, parses the
    /// newsrc, loads the cached group listing and removes caches of groups
    /// that are no longer tracked. Nothing is fetched from the network; check
    /// [`NewsAccount::needs_listing`] afterwards.
    ///
    /// If the cache directory can't be created the account works without
    /// caching. The newsrc lock is released before returning unless
    /// `leave_lock` is set.
    ///
    /// # Errors
    ///
    /// - [`NewsrcError::InvalidServer`] - the server has no host name
    /// - [`NewsrcError::NoNewsrc`] - no newsrc pattern configured
    /// - [`NewsrcError::Lock`] - the newsrc is locked by someone else
    /// - [`NewsrcError::Io`] - the newsrc or cache can't be read
    pub fn open(server: ServerConfig, config: NewsrcConfig, leave_lock: bool) -> Result<Self> {
        if server.host.is_empty() {
            return Err(NewsrcError::InvalidServer(server.account()));
        }
        if config.newsrc.is_empty() {
            return Err(NewsrcError::NoNewsrc);
        }

        let cache = config.cache_dir.as_deref().and_then(|dir| {
            let cache = CacheDir::new(&expand_home(dir), &server.cache_namespace());
            match cache.create() {
                Ok(()) => Some(cache),
                Err(e) => {
                    warn!("Can't create {}: {}", cache.root().display(), e);
                    None
                }
            }
        });

        let newsrc = NewsrcFile::new(server.expand_newsrc(&config.newsrc));
        debug!("Opening account {} ({})", server.account(), newsrc.path().display());

        let mut account = Self {
            server,
            config,
            registry: GroupRegistry::new(),
            newsrc,
            cache,
            refreshed: None,
        };

        let result = account.load();
        if result.is_err() || !leave_lock {
            account.newsrc.close();
        }
        result?;
        Ok(account)
    }

    fn load(&mut self) -> Result<()> {
        self.newsrc.parse(&mut self.registry)?;
        self.load_active_cache()?;
        self.sweep_cache()?;
        Ok(())
    }

    /// Reparse the newsrc if it changed on disk
    ///
    /// An [`Outcome::Updated`] reparse also sweeps caches, since read state
    /// may no longer match what was cached. The lock is released before
    /// returning unless `leave_lock` is set.
    ///
    /// # Errors
    ///
    /// Same as [`NewsrcFile::parse`]; in-memory state is kept.
    pub fn refresh(&mut self, leave_lock: bool) -> Result<Outcome> {
        let result = match self.newsrc.parse(&mut self.registry) {
            Ok(Outcome::Updated) => self.sweep_cache().map(|_| Outcome::Updated),
            other => other,
        };
        if result.is_err() || !leave_lock {
            self.newsrc.close();
        }
        result
    }

    /// Release the newsrc lock
    pub fn close(&mut self) {
        self.newsrc.close();
    }

    /// Rewrite the newsrc from the current registry
    ///
    /// # Errors
    ///
    /// Returns [`NewsrcError::Io`] if the file can't be replaced; the old
    /// file stays intact.
    pub fn update_newsrc(&mut self) -> Result<Outcome> {
        self.newsrc.update(&self.registry)
    }

    /// Server identity
    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    /// Newsrc settings
    pub fn config(&self) -> &NewsrcConfig {
        &self.config
    }

    /// Tracked groups
    pub fn registry(&self) -> &GroupRegistry {
        &self.registry
    }

    /// Tracked groups, mutable
    pub fn registry_mut(&mut self) -> &mut GroupRegistry {
        &mut self.registry
    }

    /// Look up a group by name
    pub fn group(&self, name: &str) -> Option<&NewsGroup> {
        self.registry.get(name)
    }

    /// The newsrc handle
    pub fn newsrc(&self) -> &NewsrcFile {
        &self.newsrc
    }

    /// Cache directory, `None` when the account is not cacheable
    pub fn cache_dir(&self) -> Option<&CacheDir> {
        self.cache.as_ref()
    }

    /// Whether listings, headers and bodies are cached on disk
    #[must_use]
    pub fn is_cacheable(&self) -> bool {
        self.cache.is_some()
    }

    /// Whether a full group listing has to be fetched from the server
    #[must_use]
    pub fn needs_listing(&self) -> bool {
        self.refreshed.is_none()
    }

    /// Time of the last full listing, from the server or the cache
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed.and_then(active::timestamp_to_datetime)
    }

    /// Load the cached group listing
    ///
    /// Returns [`Outcome::Unchanged`] when the account is not cacheable or no
    /// usable cache exists.
    pub fn load_active_cache(&mut self) -> Result<Outcome> {
        let Some(cache) = &self.cache else {
            return Ok(Outcome::Unchanged);
        };

        match active::read_active_cache(&cache.active_path(), &mut self.registry)? {
            Some(refreshed) => {
                self.refreshed = Some(refreshed);
                Ok(Outcome::Updated)
            }
            None => Ok(Outcome::Unchanged),
        }
    }

    /// Save the group listing to the cache
    ///
    /// Returns [`Outcome::Unchanged`] when the account is not cacheable or no
    /// listing was ever loaded.
    pub fn save_active_cache(&self) -> Result<Outcome> {
        match (&self.cache, self.refreshed) {
            (Some(cache), Some(refreshed)) => {
                active::write_active_cache(&cache.active_path(), &self.registry, refreshed)?;
                Ok(Outcome::Updated)
            }
            _ => Ok(Outcome::Unchanged),
        }
    }

    /// Apply a full server listing
    ///
    /// Groups missing from the listing are marked absent from the server.
    /// Returns the number of lines applied.
    pub fn apply_listing<I, S>(&mut self, lines: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.registry.mark_all_absent();
        let count = self.apply_new_groups(lines);
        debug!("{} groups listed by {}", count, self.server.account());
        count
    }

    /// Apply listing lines for newly created groups
    ///
    /// Groups not mentioned are left as they are.
    pub fn apply_new_groups<I, S>(&mut self, lines: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let count = lines
            .into_iter()
            .filter(|line| parse_active_line(&mut self.registry, line.as_ref()))
            .count();
        self.refreshed = Some(active::now_timestamp());
        count
    }

    /// Subscribe to a group, see [`GroupRegistry::subscribe`]
    pub fn subscribe(&mut self, name: &str) -> Option<&mut NewsGroup> {
        self.registry.subscribe(name)
    }

    /// Unsubscribe from a group, honouring the save-unsubscribed setting
    pub fn unsubscribe(&mut self, name: &str) -> Option<&mut NewsGroup> {
        self.registry.unsubscribe(name, self.config.save_unsubscribed)
    }

    /// Mark a group read, see [`GroupRegistry::catchup`]
    pub fn catchup(
        &mut self,
        name: &str,
        live: Option<&mut dyn LiveMailbox>,
    ) -> Option<&mut NewsGroup> {
        self.registry.catchup(name, live)
    }

    /// Mark a group unread, see [`GroupRegistry::uncatchup`]
    pub fn uncatchup(
        &mut self,
        name: &str,
        live: Option<&mut dyn LiveMailbox>,
    ) -> Option<&mut NewsGroup> {
        self.registry.uncatchup(name, live)
    }

    /// First subscribed group with unread articles
    pub fn next_unread_group(&self, live: Option<&dyn LiveMailbox>) -> Option<&NewsGroup> {
        self.registry.next_unread_group(live)
    }

    /// Rebuild the ranges of the group shown in `mailbox` from its flags
    pub fn update_from_mailbox(&mut self, mailbox: &dyn LiveMailbox) -> Option<&NewsGroup> {
        let group = self.registry.get_mut(mailbox.group_name())?;
        group.update_from_mailbox(mailbox);
        Some(group)
    }

    /// Display status of an article, honouring the mark-old setting
    pub fn article_status(&self, group: &str, article: u64) -> Option<ArticleStatus> {
        self.registry
            .get(group)
            .map(|g| g.article_status(article, self.config.mark_old))
    }

    /// Header cache location for a group, if its headers may be cached
    ///
    /// Only groups with ranges, subscribed groups, or any group when
    /// unsubscribed state is saved, get a header cache. Names that can't be a
    /// file name never do.
    pub fn header_cache_path(&self, name: &str) -> Option<PathBuf> {
        let cache = self.cache.as_ref()?;
        let group = self.registry.get(name)?;
        if !group.keeps_cache(self.config.save_unsubscribed) {
            return None;
        }
        cache.header_cache_path(name)
    }

    /// Body cache of a group, if the account is cacheable and the name is
    /// usable as a directory
    pub fn body_cache(&self, name: &str) -> Option<DirCache> {
        self.cache.as_ref()?.body_cache(name)
    }

    /// Trim a group's caches to its current article window
    ///
    /// The header cache, when given, also has its index synchronized. Returns
    /// [`Outcome::Unchanged`] for unknown groups or when nothing was removed.
    pub fn sync_group_caches(
        &mut self,
        name: &str,
        header_cache: Option<&mut dyn ArticleCache>,
    ) -> Result<Outcome> {
        let body = self.body_cache(name);
        let Some(group) = self.registry.get_mut(name) else {
            return Ok(Outcome::Unchanged);
        };

        let mut outcome = Outcome::Unchanged;
        if let Some(cache) = header_cache {
            if janitor::sync_header_index(group, cache)?.is_updated() {
                outcome = Outcome::Updated;
            }
        }
        if let Some(mut body) = body {
            if janitor::trim(group, &mut body)?.is_updated() {
                outcome = Outcome::Updated;
            }
        }
        Ok(outcome)
    }

    /// Remove caches of groups no longer worth keeping
    ///
    /// Returns the number of groups whose caches were removed.
    pub fn sweep_cache(&mut self) -> Result<usize> {
        let Some(cache) = &self.cache else {
            return Ok(0);
        };
        let swept = cache.sweep(&mut self.registry, self.config.save_unsubscribed)?;
        if swept > 0 {
            debug!("Removed caches of {} groups", swept);
        }
        Ok(swept)
    }

    /// Remove a group's header and body caches
    pub fn delete_group_cache(&mut self, name: &str) -> Result<()> {
        match &self.cache {
            Some(cache) => cache.delete_group_cache(name, self.registry.get_mut(name)),
            None => Ok(()),
        }
    }

    /// Drop an unsubscribed group the server no longer lists
    ///
    /// Its caches are removed and the group leaves the registry. Returns
    /// `None` if the group is unknown, subscribed, or still listed.
    pub fn forget_group(&mut self, name: &str) -> Result<Option<NewsGroup>> {
        let removable = self
            .registry
            .get(name)
            .is_some_and(|g| !g.subscribed && !g.present_on_server);
        if !removable {
            return Ok(None);
        }

        self.delete_group_cache(name)?;
        Ok(self.registry.remove(name))
    }

    /// Recover cached windows from existing header caches
    ///
    /// For every tracked group with a header cache file that may be opened,
    /// `open` is asked for the cache and its index is read, see
    /// [`janitor::recover_cached_bounds`]. Returns the number of groups
    /// updated.
    pub fn recover_cached_bounds<C, F>(&mut self, mut open: F) -> Result<usize>
    where
        C: ArticleCache,
        F: FnMut(&Path) -> Result<Option<C>>,
    {
        let Some(cache_dir) = &self.cache else {
            return Ok(0);
        };

        let mut updated = 0;
        for name in cache_dir.header_cache_groups()? {
            let Some(path) = self.header_cache_path(&name) else {
                continue;
            };
            let Some(cache) = open(&path)? else {
                continue;
            };
            if let Some(group) = self.registry.get_mut(&name) {
                if janitor::recover_cached_bounds(group, &cache)?.is_updated() {
                    updated += 1;
                }
            }
        }
        Ok(updated)
    }
}
