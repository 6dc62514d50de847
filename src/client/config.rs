//! Client configuration.
//!
//! [`ClientConfig`] is plain data with serde support, so callers can load it
//! from whatever source they like (TOML, JSON, environment via their own
//! layer). Every field has a default matching a stock single-node cluster.
//!
//! ```
//! use webhdfs_http::client::ClientConfig;
//!
//! let config = ClientConfig {
//!     host: "namenode.internal".to_string(),
//!     user: "etl".to_string(),
//!     ..Default::default()
//! };
//! assert_eq!(
//!     config.base_url().unwrap().as_str(),
//!     "http://namenode.internal:50070/webhdfs/v1"
//! );
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use url::Url;

/// WebHDFS client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `http` or `https`.
    pub scheme: String,

    /// Namenode host.
    pub host: String,

    /// Namenode HTTP port.
    pub port: u16,

    /// REST prefix on the namenode.
    pub path: String,

    /// Identity sent as `user.name`; empty to omit.
    pub user: String,

    /// Per-request timeout handed to the transport. No timeout when unset.
    pub request_timeout_ms: Option<u64>,

    /// Proxy for all requests; empty for none.
    pub proxy_url: String,

    /// Depth of the bounded channels behind read and write streams.
    pub stream_buffer: usize,

    /// Emit per-request debug logs.
    pub enable_logging: bool,

    /// Permission applied to files created by uploads.
    pub default_permission: String,

    /// Whether uploads replace existing files.
    pub default_overwrite: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            port: 50070,
            path: "/webhdfs/v1".to_string(),
            user: "webuser".to_string(),
            request_timeout_ms: None,
            proxy_url: String::new(),
            stream_buffer: 16,
            enable_logging: true,
            default_permission: "0755".to_string(),
            default_overwrite: true,
        }
    }
}

impl ClientConfig {
    /// Config pointing at `base_url`, e.g. `http://nn:9870/webhdfs/v1`.
    pub fn from_url(base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url)?;
        let defaults = ClientConfig::default();
        Ok(ClientConfig {
            scheme: url.scheme().to_string(),
            host: url.host_str().unwrap_or(&defaults.host).to_string(),
            port: url.port_or_known_default().unwrap_or(defaults.port),
            path: url.path().to_string(),
            ..defaults
        })
    }

    /// Namenode base URL including the REST prefix.
    pub fn base_url(&self) -> Result<Url> {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };
        Ok(Url::parse(&format!(
            "{}://{}:{}{}",
            self.scheme, self.host, self.port, path
        ))?)
    }
}
