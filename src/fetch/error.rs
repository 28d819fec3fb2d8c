//! Error kinds surfaced by the fetch path.

use thiserror::Error;

/// Outcome of a failed fetch.
///
/// Only two kinds exist: the caller dropped interest, or the upstream call
/// failed. Callers must not log [`FetchError::Cancelled`] as an error.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("fetch cancelled")]
    Cancelled,
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

/// Detail carried by [`FetchError::Transport`], for diagnostics only.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("upstream returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("invalid endpoint url: {0}")]
    Endpoint(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport(e.into())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Transport(e.into())
    }
}
