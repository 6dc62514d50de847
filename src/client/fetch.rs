//! Main WebHDFS client and metadata dispatcher.
//!
//! [`WebHdfsClient`] owns the configuration and a [`Transport`]. Metadata
//! operations (see [`metadata`](super::metadata)) are single request/response
//! exchanges routed through [`WebHdfsClient::dispatch`]; uploads and downloads
//! run their own two-phase sessions (see [`upload`](super::upload) and
//! [`download`](super::download)).
//!
//! # Examples
//!
//! ## Stat a file
//!
//! ```ignore
//! use webhdfs_http::WebHdfsClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = WebHdfsClient::new()?;
//!     let status = client.stat("/user/webuser/data.csv").await?;
//!     println!("{} bytes, owner {}", status.length, status.owner);
//!     Ok(())
//! }
//! ```
//!
//! ## Custom transport
//!
//! ```ignore
//! use std::sync::Arc;
//! use webhdfs_http::{client::ClientConfig, WebHdfsClient};
//!
//! let transport = Arc::new(MyTransport::new());
//! let client = WebHdfsClient::with_transport(ClientConfig::default(), transport)?;
//! ```

use crate::client::config::ClientConfig;
use crate::error::{Result, WebHdfsError};
use crate::protocol::{self, StatusClass};
use crate::transport::{OperationRequest, ReqwestTransport, Transport, TransportResponse};
use crate::types::Operation;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// Operation-specific query parameters, in emission order.
pub type Params = Vec<(String, String)>;

/// The main WebHDFS client.
///
/// Cheap to clone; clones share the transport and configuration. Every
/// upload or download creates its own session, so any number of transfers
/// may run concurrently on one client.
#[derive(Clone, Debug)]
pub struct WebHdfsClient {
    transport: Arc<dyn Transport>,
    config: Arc<ClientConfig>,
    base_url: Url,
}

impl WebHdfsClient {
    /// Create a client with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client with custom configuration over the default transport.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client over a caller-supplied transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let base_url = config.base_url()?;
        Ok(WebHdfsClient {
            transport,
            config: Arc::new(config),
            base_url,
        })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// URL for `op` on `path` with this client's identity.
    pub fn endpoint(&self, op: Operation, path: &str, params: &[(String, String)]) -> Result<Url> {
        protocol::build_endpoint(&self.base_url, op, path, &self.config.user, params)
    }

    /// Issue one metadata operation and return its decoded JSON body.
    ///
    /// Empty success bodies decode to `Value::Null`. No retries are attempted.
    ///
    /// # Errors
    ///
    /// - [`WebHdfsError::Validation`] for a malformed path, before any I/O
    /// - [`WebHdfsError::Transport`] when the request cannot be sent
    /// - [`WebHdfsError::Remote`] for remote-error statuses
    /// - [`WebHdfsError::Protocol`] for redirects and unexpected statuses
    pub async fn dispatch(&self, op: Operation, path: &str, params: Params) -> Result<Value> {
        let url = self.endpoint(op, path, &params)?;
        if self.config.enable_logging {
            tracing::debug!(%op, %url, "dispatching metadata operation");
        }

        let response = self.transport.send(OperationRequest::new(op.method(), url)).await?;
        let status = response.status().as_u16();

        match StatusClass::of(status) {
            StatusClass::Success => {
                let body = response.bytes().await?;
                if body.iter().all(u8::is_ascii_whitespace) {
                    return Ok(Value::Null);
                }
                serde_json::from_slice(&body).map_err(|e| {
                    WebHdfsError::protocol(format!("invalid data structure in {} response: {}", op, e))
                })
            }
            StatusClass::Redirect => {
                response.close();
                Err(WebHdfsError::protocol(format!("unexpected redirect for {}", op)))
            }
            StatusClass::RemoteError | StatusClass::Unexpected => {
                let err = read_error(response).await;
                if self.config.enable_logging {
                    tracing::debug!(%op, status, error = %err, "metadata operation failed");
                }
                Err(err)
            }
        }
    }

    /// Issue one metadata operation and project the field `key` out of its body.
    pub async fn dispatch_as<T: DeserializeOwned>(
        &self,
        op: Operation,
        path: &str,
        params: Params,
        key: &str,
    ) -> Result<T> {
        let body = self.dispatch(op, path, params).await?;
        extract_field(body, key)
    }
}

/// Project the top-level field `key` out of a response body.
///
/// # Errors
///
/// [`WebHdfsError::Protocol`] ("invalid data structure") when the field is
/// missing or does not have the expected shape.
pub fn extract_field<T: DeserializeOwned>(mut body: Value, key: &str) -> Result<T> {
    let field = body
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| WebHdfsError::protocol(format!("invalid data structure: missing '{}'", key)))?;
    serde_json::from_value(field)
        .map_err(|e| WebHdfsError::protocol(format!("invalid data structure in '{}': {}", key, e)))
}

/// Drain a failed response and decode its error.
///
/// If the body cannot be read the status alone decides the error.
pub(crate) async fn read_error(response: TransportResponse) -> WebHdfsError {
    let status = response.status().as_u16();
    match response.bytes().await {
        Ok(body) => protocol::error_for_status(status, &body),
        Err(e) => {
            tracing::debug!(status, error = %e, "failed to read error body");
            protocol::error_for_status(status, &[])
        }
    }
}
