//! Error types for WebHDFS operations.
//!
//! Every failure a caller can observe falls into one of four families:
//!
//! | Variant | Raised when |
//! |---------|-------------|
//! | [`WebHdfsError::Validation`] | Caller input is malformed; raised before any I/O |
//! | [`WebHdfsError::Transport`] | Connection, DNS or timeout failure in the HTTP transport |
//! | [`WebHdfsError::Remote`] | The service reported a structured `RemoteException` |
//! | [`WebHdfsError::Protocol`] | Redirect without `Location`, missing JSON field, unexpected status |
//!
//! JSON and I/O failures are folded in through `From` conversions so `?` works
//! throughout the crate. Nothing here is retried automatically.

use crate::types::RemoteException;
use std::io;
use thiserror::Error;

/// Result type alias for WebHDFS operations.
pub type Result<T> = std::result::Result<T, WebHdfsError>;

/// Main error type for WebHDFS operations.
#[derive(Error, Debug)]
pub enum WebHdfsError {
    /// Malformed caller input, e.g. an empty path.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The underlying HTTP transport failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote service reported an application-level failure.
    #[error("Remote exception: {0}")]
    Remote(RemoteException),

    /// Client and server disagree about the wire protocol.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local I/O failure, typically from a caller-supplied byte source.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl WebHdfsError {
    /// Shorthand for a [`WebHdfsError::Protocol`] error.
    pub fn protocol(msg: impl Into<String>) -> Self {
        WebHdfsError::Protocol(msg.into())
    }

    /// Shorthand for a [`WebHdfsError::Validation`] error.
    pub fn validation(msg: impl Into<String>) -> Self {
        WebHdfsError::Validation(msg.into())
    }

    /// True when the server answered with a structured exception.
    pub fn is_remote(&self) -> bool {
        matches!(self, WebHdfsError::Remote(_))
    }

    /// The decoded remote exception, if this error carries one.
    pub fn remote_exception(&self) -> Option<&RemoteException> {
        match self {
            WebHdfsError::Remote(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for WebHdfsError {
    fn from(err: reqwest::Error) -> Self {
        WebHdfsError::Transport(err.to_string())
    }
}

impl From<url::ParseError> for WebHdfsError {
    fn from(err: url::ParseError) -> Self {
        WebHdfsError::Validation(format!("invalid url: {}", err))
    }
}
