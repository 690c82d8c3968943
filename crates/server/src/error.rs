//! Failures raised by the upstream fetchers. None of these leave the
//! pipeline: callers turn them into fallback values.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS, TLS or timeout failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Upstream answered with a non-success status
    #[error("upstream returned status {status}")]
    Status { status: u16 },

    /// Body did not have the expected shape
    #[error("unexpected payload: {0}")]
    Decode(String),

    /// No API key configured for a service that requires one
    #[error("no API key configured for {0}")]
    MissingApiKey(&'static str),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::Status { status: status.as_u16() }
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Decode(e.to_string())
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
