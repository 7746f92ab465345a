#![doc = include_str!("../README.md")]

mod account;
/// Server group listing and its on-disk cache
pub mod active;
/// Per-group article caches
pub mod cache;
mod config;
mod error;
mod group;
/// Trimming and sweeping of header and body caches
pub mod janitor;
/// Groups open in a reading session
pub mod mailbox;
/// Newsrc file format and locked file handling
pub mod newsrc;
mod ops;
mod range;
mod registry;

pub use account::NewsAccount;
pub use active::ActiveEntry;
pub use cache::{ArticleCache, DirCache, MemoryCache};
pub use config::{NewsrcConfig, ServerConfig};
pub use error::{NewsrcError, Outcome, Result};
pub use group::{ArticleStatus, NewsGroup};
pub use janitor::CacheDir;
pub use mailbox::{LiveMailbox, LoadedArticle, OpenGroup, live_unread, synthesize_ranges};
pub use newsrc::{Fingerprint, NewsrcFile};
pub use range::{ArticleRange, RangeSet};
pub use registry::GroupRegistry;
