//! Error types for the Lumi presentation layer.

/// Top-level error type for the client-side UI plumbing.
#[derive(Debug, thiserror::Error)]
pub enum UiError {
    /// Pull-mode frame fetch failed (network error or non-success status).
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Push-mode avatar channel transport error.
    #[error("channel error: {0}")]
    Channel(String),

    /// Malformed inbound frame payload.
    #[error("decode error: {0}")]
    Decode(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Theme lookup or persistence error.
    #[error("theme error: {0}")]
    Theme(String),

    /// Preference store persistence error.
    #[error("preference error: {0}")]
    Prefs(String),

    /// Backend status probe error.
    #[error("status error: {0}")]
    Status(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, UiError>;
