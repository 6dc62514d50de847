//! Endpoint construction for WebHDFS operations.
//!
//! Every request URL has the shape
//!
//! ```text
//! {scheme}://{host}:{port}{prefix}{path}?op={OP}&user.name={user}&{extra...}
//! ```
//!
//! Query parameters are emitted in a fixed order: `op`, then `user.name`, then
//! the operation-specific parameters in the order the caller supplied them.
//! The same inputs always yield byte-identical URLs.
//!
//! # Examples
//!
//! ```
//! use webhdfs_http::protocol::build_endpoint;
//! use webhdfs_http::types::Operation;
//! use url::Url;
//!
//! let base = Url::parse("http://namenode:50070/webhdfs/v1").unwrap();
//! let params = vec![("overwrite".to_string(), "true".to_string())];
//! let url = build_endpoint(&base, Operation::Create, "/tmp/a.txt", "hdfs", &params).unwrap();
//! assert_eq!(
//!     url.as_str(),
//!     "http://namenode:50070/webhdfs/v1/tmp/a.txt?op=CREATE&user.name=hdfs&overwrite=true"
//! );
//! ```

use super::constants::params;
use crate::error::{Result, WebHdfsError};
use crate::types::Operation;
use url::Url;

/// Reject paths the gateway cannot address.
///
/// Runs before any request is issued so malformed input never reaches the network.
pub fn validate_path(path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(WebHdfsError::validation("path must be a non-empty string"));
    }
    Ok(())
}

/// Build the fully qualified URL for `op` on `path`.
///
/// `base` is the gateway prefix (e.g. `http://host:50070/webhdfs/v1`). Path
/// segments are percent-encoded individually; the root path `/` maps to the
/// prefix with a trailing slash. An empty `user` omits `user.name`.
///
/// # Errors
///
/// [`WebHdfsError::Validation`] for an empty path or a base URL that cannot
/// carry a path.
pub fn build_endpoint(
    base: &Url,
    op: Operation,
    path: &str,
    user: &str,
    extra: &[(String, String)],
) -> Result<Url> {
    validate_path(path)?;

    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| WebHdfsError::validation(format!("cannot use {} as a base url", base)))?;
        segments.pop_if_empty();

        let mut pushed = false;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            segments.push(segment);
            pushed = true;
        }
        if !pushed {
            segments.push("");
        }
    }

    {
        let mut query = url.query_pairs_mut();
        query.clear();
        query.append_pair(params::OP, op.as_str());
        if !user.is_empty() {
            query.append_pair(params::USER_NAME, user);
        }
        for (key, value) in extra {
            query.append_pair(key, value);
        }
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://localhost:50070/webhdfs/v1").unwrap()
    }

    #[test]
    fn test_build_endpoint_ordering() {
        let extra = vec![
            ("permission".to_string(), "0755".to_string()),
            ("overwrite".to_string(), "true".to_string()),
        ];
        let url = build_endpoint(&base(), Operation::Create, "/foo/bar", "webuser", &extra).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:50070/webhdfs/v1/foo/bar?op=CREATE&user.name=webuser&permission=0755&overwrite=true"
        );
    }

    #[test]
    fn test_build_endpoint_root() {
        let url = build_endpoint(&base(), Operation::ListStatus, "/", "webuser", &[]).unwrap();
        assert_eq!(url.path(), "/webhdfs/v1/");
    }

    #[test]
    fn test_build_endpoint_trailing_slash_in_base() {
        let base = Url::parse("http://localhost:50070/webhdfs/v1/").unwrap();
        let url = build_endpoint(&base, Operation::Open, "a.txt", "", &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:50070/webhdfs/v1/a.txt?op=OPEN");
    }

    #[test]
    fn test_build_endpoint_encodes_segments() {
        let url = build_endpoint(&base(), Operation::Open, "/dir/my file#1", "webuser", &[]).unwrap();
        assert_eq!(url.path(), "/webhdfs/v1/dir/my%20file%231");
    }

    #[test]
    fn test_build_endpoint_is_deterministic() {
        let extra = vec![("aclspec".to_string(), "user:carla:rw-".to_string())];
        let a = build_endpoint(&base(), Operation::SetAcl, "/x", "u", &extra).unwrap();
        let b = build_endpoint(&base(), Operation::SetAcl, "/x", "u", &extra).unwrap();
        assert_eq!(a, b);
        assert!(a.as_str().ends_with("aclspec=user%3Acarla%3Arw-"));
    }

    #[test]
    fn test_empty_path_rejected() {
        let err = build_endpoint(&base(), Operation::Open, "", "webuser", &[]).unwrap_err();
        assert!(matches!(err, WebHdfsError::Validation(_)));
        assert!(validate_path("   ").is_err());
        assert!(validate_path("/ok").is_ok());
    }
}
