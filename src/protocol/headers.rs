//! Response header helpers.
//!
//! The only header the transfer protocol depends on is `Location`: it carries
//! the data endpoint on a redirect, and some deployments repeat it on a
//! successful write to report where the file landed.

use crate::error::{Result, WebHdfsError};
use http::header::LOCATION;
use http::HeaderMap;
use url::Url;

/// Value of the `Location` header, if present and valid UTF-8.
///
/// # Examples
///
/// ```
/// use http::{HeaderMap, HeaderValue};
/// use webhdfs_http::protocol::location;
///
/// let mut headers = HeaderMap::new();
/// assert_eq!(location(&headers), None);
///
/// headers.insert("location", HeaderValue::from_static("http://datanode:50075/a"));
/// assert_eq!(location(&headers).as_deref(), Some("http://datanode:50075/a"));
/// ```
pub fn location(headers: &HeaderMap) -> Option<String> {
    headers
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Extract the redirect target from a redirect-class response.
///
/// # Errors
///
/// A redirect without a usable `Location` is a [`WebHdfsError::Protocol`] error.
pub fn redirect_target(headers: &HeaderMap) -> Result<Url> {
    let value = location(headers)
        .ok_or_else(|| WebHdfsError::protocol("redirect response without Location header"))?;
    Url::parse(&value)
        .map_err(|e| WebHdfsError::protocol(format!("invalid Location header '{}': {}", value, e)))
}
