//! Typed errors for the pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Each failure domain gets
//! its own enum; `PipelineError` composes them for session-level calls.

use thiserror::Error;

/// Errors raised while fetching remote content through the relay chain.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A relay answered with a non-success HTTP status
    #[error("relay {relay} returned HTTP {status}")]
    RelayStatus { relay: String, status: u16 },

    /// The request to a relay failed at the transport level
    #[error("relay {relay} request failed: {source}")]
    Transport {
        relay: String,
        #[source]
        source: reqwest::Error,
    },

    /// A relay's response envelope did not have the expected shape
    #[error("relay {relay} returned a malformed envelope")]
    Envelope { relay: String },

    /// The relay cannot carry this kind of request (binary body, POST)
    #[error("relay {relay} does not support {what} requests")]
    Unsupported { relay: String, what: &'static str },

    /// Every configured relay failed; carries the last relay's error
    #[error("all relays failed fetching {url}: {last}")]
    Exhausted { url: String, last: String },
}

/// Errors raised while extracting text from a fetched document.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Could not fetch the document bytes
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The PDF could not be read
    #[error("unreadable PDF: {0}")]
    Pdf(String),
}

/// Errors raised by a source scanner.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Could not reach the external system
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The external system answered with something unparseable
    #[error("malformed {endpoint} response: {detail}")]
    Malformed { endpoint: String, detail: String },
}

/// Errors raised by the persisted bill store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store rejected the write
    #[error("write rejected: {0}")]
    Write(String),

    /// The store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Umbrella error for session-level operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for extraction operations.
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

/// Result type alias for scan operations.
pub type ScanResult<T> = std::result::Result<T, ScanError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
