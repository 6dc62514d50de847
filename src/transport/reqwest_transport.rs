//! [`Transport`] implementation on `reqwest`.

use super::{transport_error, OperationRequest, RequestBody, Transport, TransportResponse};
use crate::client::ClientConfig;
use crate::error::{Result, WebHdfsError};
use async_trait::async_trait;
use futures::TryStreamExt;
use std::time::Duration;

/// Default transport built on a pooled `reqwest::Client`.
///
/// Redirects are never followed; the transfer sessions handle them.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport from the timeout and proxy settings in `config`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .pool_idle_timeout(Duration::from_secs(90));

        if let Some(ms) = config.request_timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }

        if !config.proxy_url.is_empty() {
            let proxy = reqwest::Proxy::all(&config.proxy_url)
                .map_err(|e| WebHdfsError::validation(format!("invalid proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(transport_error)?;
        Ok(ReqwestTransport { client })
    }

    /// Wrap an existing client. It must be configured not to follow redirects.
    pub fn from_client(client: reqwest::Client) -> Self {
        ReqwestTransport { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OperationRequest) -> Result<TransportResponse> {
        let (method, url, headers, body) = request.into_parts();

        let mut req_builder = self.client.request(method, url).headers(headers);
        req_builder = match body {
            RequestBody::Empty => req_builder,
            RequestBody::Bytes(bytes) => req_builder.body(bytes),
            RequestBody::Stream(stream) => req_builder.body(reqwest::Body::wrap_stream(stream)),
        };

        let response = req_builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let stream = response.bytes_stream().map_err(WebHdfsError::from);

        Ok(TransportResponse::new(status, headers, Box::pin(stream)))
    }
}
