//! Error types for the webseek crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. Per-engine and per-page failures are
//! recovered locally by the pipeline; only [`SearchError::InvalidArgument`]
//! and session store construction failures surface from the top-level call.

/// Errors that can occur during search, crawl, or session operations.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// An engine-specific navigation or parse failure.
    #[error("engine error: {0}")]
    Engine(String),

    /// A network-bound step exceeded its timeout. For engine searches this
    /// is the expected signal that a verification challenge is blocking
    /// progress.
    #[error("timed out: {0}")]
    Timeout(String),

    /// An HTTP request failed outright.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Failed to parse a search engine's response HTML.
    #[error("parse error: {0}")]
    Parse(String),

    /// A fetched page yielded no extractable readable content.
    #[error("extraction error: {0}")]
    Extraction(String),

    /// Session state persistence failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// Bad caller input to the top-level entry point.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for webseek results.
pub type Result<T> = std::result::Result<T, SearchError>;
