use thiserror::Error;

use crate::scope::ScopeError;

/// Failure talking to one of the upstream services.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("failed to decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("upstream responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error(transparent)]
    Scope(#[from] ScopeError),
}

/// Outcome of a failed weather lookup, as seen by callers.
///
/// The `Display` text is the exact body returned over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("invalid zipcode")]
    InvalidZipcode,
    #[error("can not find zipcode")]
    NotFound,
}
