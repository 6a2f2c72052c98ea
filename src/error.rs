use thiserror::Error;

/// Failure to produce a playable word list.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not reach {url}: {reason}")]
    Transport { url: String, reason: String },
    #[error("server answered with HTTP status {0}")]
    Status(u16),
    #[error("network support is disabled in this build")]
    NetworkDisabled,
    #[error("no word list named '{0}'")]
    NotFound(String),
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("word list is not a JSON array of words: {0}")]
    Parse(String),
    #[error("word list '{0}' contains no words")]
    Empty(String),
}

/// Failure to read or write persisted statistics. Never fatal to a session.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not serialize statistics: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A controller command that is not valid in the current state.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("a session is already running or has not been reset")]
    NotIdle,
    #[error("no words are loaded")]
    NoWords,
    #[error("a word list is still loading")]
    LoadInFlight,
    #[error("the word list cannot be changed during a session; reset first")]
    ListChangeWhileRunning,
}
