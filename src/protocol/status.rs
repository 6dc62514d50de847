//! Status classification and remote exception decoding.
//!
//! [`StatusClass::of`] sorts a status code into exactly one class. Error
//! bodies are decoded by [`parse_remote_exception`], which looks for the
//! `{"RemoteException": {"message": ...}}` envelope.
//!
//! Decoding runs in one of two modes:
//!
//! - **non-strict**: a body without an envelope still yields an exception
//!   with the message `"Unknown error"`. Used for remote-error statuses, where
//!   the status alone already says the call failed.
//! - **strict**: no envelope means no exception (`None`). Used where a status
//!   alone is not conclusive, so the caller can fall back to a protocol error.

use super::constants::status;
use super::keys;
use crate::error::WebHdfsError;
use crate::types::RemoteException;
use serde_json::Value;

/// Message used when an error body carries no recognizable envelope.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Classification of an HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// `200` or `201`.
    Success,
    /// `301` or `307`; only valid with a `Location` header.
    Redirect,
    /// Codes the service uses to report a `RemoteException`.
    RemoteError,
    /// Anything else.
    Unexpected,
}

impl StatusClass {
    /// Classify a status code.
    ///
    /// ```
    /// use webhdfs_http::protocol::StatusClass;
    ///
    /// assert_eq!(StatusClass::of(201), StatusClass::Success);
    /// assert_eq!(StatusClass::of(307), StatusClass::Redirect);
    /// assert_eq!(StatusClass::of(404), StatusClass::RemoteError);
    /// assert_eq!(StatusClass::of(302), StatusClass::Unexpected);
    /// ```
    pub fn of(code: u16) -> Self {
        if status::SUCCESS.contains(&code) {
            StatusClass::Success
        } else if status::REDIRECT.contains(&code) {
            StatusClass::Redirect
        } else if status::REMOTE_ERROR.contains(&code) {
            StatusClass::RemoteError
        } else {
            StatusClass::Unexpected
        }
    }
}

/// Decode a remote exception from an already parsed JSON body.
pub fn parse_remote_exception_value(body: &Value, strict: bool) -> Option<RemoteException> {
    let envelope = body
        .get(keys::REMOTE_EXCEPTION)
        .filter(|inner| inner.get("message").map_or(false, Value::is_string))
        .and_then(|inner| serde_json::from_value::<RemoteException>(inner.clone()).ok());

    match envelope {
        Some(e) => Some(e.with_raw(body.to_string())),
        None if strict => None,
        None => Some(RemoteException::new(UNKNOWN_ERROR).with_raw(body.to_string())),
    }
}

/// Decode a remote exception from a raw response body.
///
/// Bodies that are not JSON are treated as carrying no envelope.
///
/// ```
/// use webhdfs_http::protocol::parse_remote_exception;
///
/// let body = br#"{"RemoteException":{"message":"File not found"}}"#;
/// assert_eq!(parse_remote_exception(body, true).unwrap().message, "File not found");
///
/// assert!(parse_remote_exception(b"<html>oops</html>", true).is_none());
/// assert_eq!(
///     parse_remote_exception(b"<html>oops</html>", false).unwrap().message,
///     "Unknown error"
/// );
/// ```
pub fn parse_remote_exception(body: &[u8], strict: bool) -> Option<RemoteException> {
    let raw = String::from_utf8_lossy(body).into_owned();
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => parse_remote_exception_value(&value, strict).map(|e| e.with_raw(raw)),
        Err(_) if strict => None,
        Err(_) => Some(RemoteException::new(UNKNOWN_ERROR).with_raw(raw)),
    }
}

/// Turn a failed response (status plus fully read body) into an error.
///
/// Remote-error statuses always yield [`WebHdfsError::Remote`]. Any other
/// non-success status yields `Remote` only when the body carries an envelope,
/// and [`WebHdfsError::Protocol`] otherwise.
pub fn error_for_status(code: u16, body: &[u8]) -> WebHdfsError {
    match StatusClass::of(code) {
        StatusClass::RemoteError => match parse_remote_exception(body, false) {
            Some(e) => WebHdfsError::Remote(e),
            None => WebHdfsError::Remote(RemoteException::new(UNKNOWN_ERROR)),
        },
        StatusClass::Redirect => WebHdfsError::protocol("unexpected redirect"),
        _ => match parse_remote_exception(body, true) {
            Some(e) => WebHdfsError::Remote(e),
            None => WebHdfsError::protocol(format!("unexpected status code {}", code)),
        },
    }
}
