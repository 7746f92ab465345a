//! News server identity and newsrc settings

use std::path::{Path, PathBuf};

/// Identity of a news server account
///
/// Only what is needed to tell accounts apart is kept here: it names the
/// cache directory and fills in the newsrc filename pattern.
///
/// # Example
///
/// ```
/// use nntp_newsrc::ServerConfig;
///
/// let server = ServerConfig::tls("News.Example.com").with_username("alice");
/// assert_eq!(server.account(), "alice@News.Example.com");
/// assert_eq!(
///     server.expand_newsrc("/home/alice/.newsrc-%s"),
///     std::path::PathBuf::from("/home/alice/.newsrc-news.example.com")
/// );
/// ```
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerConfig {
    /// Server hostname (e.g., "news.example.com")
    pub host: String,

    /// Server port (typically 119 for plain, 563 for TLS)
    pub port: u16,

    /// Use TLS/SSL encryption
    #[cfg_attr(feature = "serde", serde(default))]
    pub tls: bool,

    /// Username, if the account authenticates
    #[cfg_attr(feature = "serde", serde(default))]
    pub username: Option<String>,
}

impl ServerConfig {
    /// Standard plain NNTP port
    pub const PLAIN_PORT: u16 = 119;
    /// Standard NNTP-over-TLS port
    pub const TLS_PORT: u16 = 563;

    /// Create a new server identity
    pub fn new(host: impl Into<String>, port: u16, tls: bool) -> Self {
        Self {
            host: host.into(),
            port,
            tls,
            username: None,
        }
    }

    /// Plain connection on the standard port (119)
    pub fn plain(host: impl Into<String>) -> Self {
        Self::new(host, Self::PLAIN_PORT, false)
    }

    /// TLS connection on the standard secure port (563)
    pub fn tls(host: impl Into<String>) -> Self {
        Self::new(host, Self::TLS_PORT, true)
    }

    /// Set the account username
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// URL scheme: `snews` for TLS, `news` otherwise
    pub fn scheme(&self) -> &'static str {
        if self.tls { "snews" } else { "news" }
    }

    /// Whether the port is the standard one for the scheme
    #[must_use]
    pub fn is_default_port(&self) -> bool {
        let default = if self.tls {
            Self::TLS_PORT
        } else {
            Self::PLAIN_PORT
        };
        self.port == default
    }

    /// `[user@]host[:port]`, the port only when it is not the default
    pub fn account(&self) -> String {
        let mut account = String::new();
        if let Some(user) = &self.username {
            account.push_str(user);
            account.push('@');
        }
        account.push_str(&self.host);
        if !self.is_default_port() {
            account.push(':');
            account.push_str(&self.port.to_string());
        }
        account
    }

    /// Stable name for this account's cache directory
    pub fn cache_namespace(&self) -> String {
        self.account().replace(['/', '\\'], "_")
    }

    /// Expand a newsrc filename pattern for this account
    ///
    /// | Expando | Value
    /// |:--------|:--------------------------------
    /// | `%a`    | account, `[user@]host[:port]`
    /// | `%p`    | port
    /// | `%P`    | port if not the default
    /// | `%s`    | server name, lowercased
    /// | `%S`    | scheme (`news` or `snews`)
    /// | `%u`    | username
    /// | `%%`    | a literal `%`
    ///
    /// Unknown expandos are kept verbatim and a leading `~/` becomes the home
    /// directory.
    pub fn expand_newsrc(&self, pattern: &str) -> PathBuf {
        let mut out = String::with_capacity(pattern.len());
        let mut chars = pattern.chars();
        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('a') => out.push_str(&self.account()),
                Some('p') => out.push_str(&self.port.to_string()),
                Some('P') => {
                    if !self.is_default_port() {
                        out.push_str(&self.port.to_string());
                    }
                }
                Some('s') => out.push_str(&self.host.to_lowercase()),
                Some('S') => out.push_str(self.scheme()),
                Some('u') => out.push_str(self.username.as_deref().unwrap_or("")),
                Some('%') => out.push('%'),
                Some(other) => {
                    out.push('%');
                    out.push(other);
                }
                None => out.push('%'),
            }
        }
        expand_home(Path::new(&out))
    }
}

/// Replace a leading `~` with the home directory, when one is known
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Settings for newsrc handling and caching
///
/// # Example
///
/// ```
/// use nntp_newsrc::NewsrcConfig;
///
/// let config = NewsrcConfig::new("~/.newsrc-%s")
///     .with_cache_dir("/var/cache/news")
///     .with_save_unsubscribed(true);
/// assert!(config.save_unsubscribed);
/// assert!(!config.mark_old);
/// ```
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NewsrcConfig {
    /// Newsrc filename pattern, see [`ServerConfig::expand_newsrc`]
    pub newsrc: String,

    /// Directory for cached listings, headers and bodies; `None` disables
    /// caching
    pub cache_dir: Option<PathBuf>,

    /// Keep ranges and caches of unsubscribed groups
    pub save_unsubscribed: bool,

    /// Report cached but unread articles as old
    pub mark_old: bool,
}

impl Default for NewsrcConfig {
    fn default() -> Self {
        Self {
            newsrc: "~/.newsrc".to_string(),
            cache_dir: None,
            save_unsubscribed: false,
            mark_old: false,
        }
    }
}

impl NewsrcConfig {
    /// Settings with the given newsrc pattern and everything else default
    pub fn new(newsrc: impl Into<String>) -> Self {
        Self {
            newsrc: newsrc.into(),
            ..Self::default()
        }
    }

    /// Enable caching under `dir`
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Keep state of unsubscribed groups
    pub fn with_save_unsubscribed(mut self, save: bool) -> Self {
        self.save_unsubscribed = save;
        self
    }

    /// Mark cached unread articles as old
    pub fn with_mark_old(mut self, mark_old: bool) -> Self {
        self.mark_old = mark_old;
        self
    }
}
