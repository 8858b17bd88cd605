//! Error types for the FordPass client
//!
//! Every fallible operation in the library returns [`FordPassError`]. Transport-level
//! detail lives in [`RequestError`], which is wrapped either as `Request` (vehicle
//! endpoints) or `Auth` (the token exchange).

use std::time::Duration;
use thiserror::Error;

/// Result type alias for FordPass operations
pub type Result<T> = std::result::Result<T, FordPassError>;

/// Failure talking to a backend endpoint
#[derive(Debug, Error)]
pub enum RequestError {
    /// The request did not complete within the per-request timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection, TLS, or protocol failure
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered with a non-success HTTP status
    #[error("server responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the JSON we expected
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The body decoded but is missing usable content
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl RequestError {
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else {
            Self::Transport(err)
        }
    }
}

/// Main error type for FordPass operations
#[derive(Debug, Error)]
pub enum FordPassError {
    /// The authentication exchange failed or returned an unusable token
    #[error("authentication failed: {0}")]
    Auth(#[source] RequestError),

    /// The requested action is not one the vehicle supports
    #[error("unrecognized action: {0:?}")]
    InvalidAction(String),

    /// A vehicle endpoint request failed
    #[error("request failed: {0}")]
    Request(#[from] RequestError),

    /// The command status endpoint returned a code outside {200, 552}
    #[error("unexpected command status {0}")]
    UnexpectedStatus(i64),

    /// The operation was cancelled by the caller
    #[error("operation cancelled")]
    Cancelled,

    /// The caller's deadline elapsed before the operation finished
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Invalid client configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl FordPassError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Re-tag a request failure as an authentication failure.
    ///
    /// Cancellation and deadline errors pass through unchanged.
    pub(crate) fn into_auth(self) -> Self {
        match self {
            Self::Request(err) => Self::Auth(err),
            other => other,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// True for both explicit cancellation and deadline expiry
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}
