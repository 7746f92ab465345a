//! Newsrc error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or persisting newsgroup state
///
/// Malformed lines and range tokens are never reported here; they are
/// skipped while parsing.
#[derive(Error, Debug)]
pub enum NewsrcError {
    /// IO error while opening, reading, writing or renaming a file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The advisory lock on the subscription file could not be taken
    #[error("Can't lock {}: {source}", path.display())]
    Lock {
        /// File that was being locked
        path: PathBuf,
        /// Underlying lock failure
        source: std::io::Error,
    },

    /// No subscription file pattern configured
    #[error("No newsrc file configured")]
    NoNewsrc,

    /// Server identity can't be used as an account
    #[error("Invalid news server: {0}")]
    InvalidServer(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias using NewsrcError
pub type Result<T> = std::result::Result<T, NewsrcError>;

/// Successful outcome of an operation that may have had nothing to do
///
/// Together with `Err(_)` this forms the failed/unchanged/updated triple
/// reported by every file-level operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing needed doing; in-memory state is untouched
    Unchanged,
    /// State was reloaded or rewritten
    Updated,
}

impl Outcome {
    /// Whether the operation changed anything
    #[must_use]
    pub fn is_updated(self) -> bool {
        self == Outcome::Updated
    }
}
