use thiserror::Error;

/// Errors surfaced by the hub engine to its HTTP surface or its own
/// background tasks. Every variant here is handled internally — nothing
/// here is meant to escape the process; `Disposition` in the doc comments
/// below mirrors how each is actually used.
#[derive(Debug, Error)]
pub enum HubError {
    /// A publish or subscribe request was missing a required field, or
    /// carried a value the wire contract forbids (e.g. `hub.mode` not
    /// `publish`).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The atom store rejected an ingest.
    #[error("malformed feed: {0}")]
    MalformedFeed(#[from] psgb_atom::AtomError),

    /// A fetched document's `Content-Type` isn't a format this hub stores.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Subscription verification failed: network error, non-2xx response,
    /// or a challenge echo that didn't match.
    #[error("verification failed: {0}")]
    VerificationFailed(String),

    /// All delivery attempts to a subscriber were exhausted.
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),

    /// Fatal: the configuration file exists but couldn't be parsed, or the
    /// listen address couldn't be bound. Surfaced through `anyhow` at the
    /// binary boundary.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result alias for hub engine operations.
pub type Result<T> = std::result::Result<T, HubError>;
