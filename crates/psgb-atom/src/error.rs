use thiserror::Error;

/// Errors produced while ingesting or re-emitting feed content.
#[derive(Debug, Error)]
pub enum AtomError {
    /// The document could not be parsed, or didn't contain the structure
    /// (a `<feed>` root with a feed-level `<updated>`) this store requires.
    #[error("malformed feed: {0}")]
    MalformedFeed(String),
}

/// Result alias for atom store operations.
pub type Result<T> = std::result::Result<T, AtomError>;
