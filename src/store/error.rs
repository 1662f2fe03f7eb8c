//! Store error types
//!
//! Every failure the remote table can produce. The page collapses all of
//! them into a single notice; the JSON API maps them to a status code.

use thiserror::Error;

/// Errors that can occur when reading or writing the record
#[derive(Error, Debug)]
pub enum StoreError {
    /// Credentials were missing at startup, so no handle exists
    #[error("No store connection")]
    NotConnected,

    /// Backend could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Request exceeded the configured timeout
    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend answered with a non-success status (auth failure, bad table, ...)
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// No row with the configured id
    #[error("Record {0} not found")]
    RecordNotFound(i64),

    /// Row exists but its payload is not a valid record
    #[error("Malformed record: {0}")]
    Decode(String),

    /// HTTP client could not be built
    #[error("Client setup failed: {0}")]
    Client(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}

impl StoreError {
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StoreError::Timeout
        } else if err.is_connect() {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Request(err)
        }
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
