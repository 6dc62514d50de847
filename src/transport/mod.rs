//! Injectable HTTP transport.
//!
//! The protocol logic in [`crate::client`] never talks to an HTTP library
//! directly. It builds an [`OperationRequest`], hands it to a [`Transport`],
//! and reads status, headers and a streaming body back from a
//! [`TransportResponse`].
//!
//! A transport must:
//!
//! - **not follow redirects**: the two-phase transfer protocol needs to see
//!   the `307` and its `Location` header itself
//! - **stream request bodies**: upload payloads are never buffered in full
//! - **stream response bodies**: download payloads are relayed chunk by chunk
//!
//! [`ReqwestTransport`] is the default implementation.

mod reqwest_transport;

pub use reqwest_transport::ReqwestTransport;

use crate::error::{Result, WebHdfsError};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::{Stream, StreamExt};
use http::{HeaderMap, Method, StatusCode};
use std::fmt;
use std::io;
use std::pin::Pin;
use url::Url;

/// Boxed, sendable stream.
pub type BoxStream<T> = Pin<Box<dyn Stream<Item = T> + Send + Sync + 'static>>;

/// Boxed response body stream.
pub type ResponseStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send + 'static>>;

/// Request body.
pub enum RequestBody {
    /// No body.
    Empty,
    /// Buffered bytes.
    Bytes(Bytes),
    /// Streaming body, pulled by the transport as it writes.
    Stream(BoxStream<io::Result<Bytes>>),
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Empty => write!(f, "RequestBody::Empty"),
            RequestBody::Bytes(bytes) => f.debug_tuple("RequestBody::Bytes").field(&bytes.len()).finish(),
            RequestBody::Stream(_) => write!(f, "RequestBody::Stream(..)"),
        }
    }
}

impl Default for RequestBody {
    fn default() -> Self {
        RequestBody::Empty
    }
}

/// A single HTTP request, immutable once built.
#[derive(Debug)]
pub struct OperationRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: RequestBody,
}

impl OperationRequest {
    /// Create a request with no headers and no body.
    pub fn new(method: Method, url: Url) -> Self {
        OperationRequest {
            method,
            url,
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }

    /// Replace the request headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Attach a body.
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Split into parts for the transport to consume.
    pub fn into_parts(self) -> (Method, Url, HeaderMap, RequestBody) {
        (self.method, self.url, self.headers, self.body)
    }
}

/// A response whose body has not been read yet.
///
/// Dropping the response closes the underlying connection.
pub struct TransportResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: ResponseStream,
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl TransportResponse {
    /// Create a response from a streaming body.
    pub fn new(status: StatusCode, headers: HeaderMap, body: ResponseStream) -> Self {
        TransportResponse { status, headers, body }
    }

    /// Create a response from a buffered body.
    pub fn from_bytes(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        let body: Bytes = body.into();
        Self::new(
            status,
            headers,
            Box::pin(futures::stream::once(async move { Ok::<_, WebHdfsError>(body) })),
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The `Location` header, if any.
    pub fn location(&self) -> Option<String> {
        crate::protocol::location(&self.headers)
    }

    /// Read the whole body.
    pub async fn bytes(self) -> Result<Bytes> {
        let mut stream = self.body;
        let mut buf = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }

    /// Take the body as a stream of chunks.
    pub fn into_stream(self) -> ResponseStream {
        self.body
    }

    /// Explicitly close the connection without reading the body.
    pub fn close(self) {
        drop(self);
    }
}

/// Sends single HTTP requests without following redirects.
///
/// Implement this to run the client over a different HTTP stack, or to
/// script responses in tests.
#[async_trait]
pub trait Transport: fmt::Debug + Send + Sync {
    /// Send one request and return as soon as the status and headers arrive.
    ///
    /// # Errors
    ///
    /// Connection, DNS and timeout failures map to [`WebHdfsError::Transport`].
    async fn send(&self, request: OperationRequest) -> Result<TransportResponse>;
}

/// Transport failure with a message.
pub(crate) fn transport_error(msg: impl fmt::Display) -> WebHdfsError {
    WebHdfsError::Transport(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_response_bytes_concatenates_chunks() {
        let chunks: Vec<Result<Bytes>> = vec![Ok(Bytes::from_static(b"hello ")), Ok(Bytes::from_static(b"world"))];
        let response = TransportResponse::new(
            StatusCode::OK,
            HeaderMap::new(),
            Box::pin(futures::stream::iter(chunks)),
        );
        assert_eq!(response.bytes().await.unwrap(), Bytes::from_static(b"hello world"));
    }

    #[tokio::test]
    async fn test_response_bytes_surfaces_stream_error() {
        let chunks: Vec<Result<Bytes>> = vec![Ok(Bytes::from_static(b"partial")), Err(transport_error("reset"))];
        let response = TransportResponse::new(
            StatusCode::OK,
            HeaderMap::new(),
            Box::pin(futures::stream::iter(chunks)),
        );
        assert!(matches!(response.bytes().await, Err(WebHdfsError::Transport(_))));
    }

    #[test]
    fn test_request_parts() {
        let url = Url::parse("http://nn:50070/webhdfs/v1/a?op=OPEN").unwrap();
        let request = OperationRequest::new(Method::GET, url.clone())
            .with_body(RequestBody::Bytes(Bytes::from_static(b"x")));
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.url(), &url);
        assert!(matches!(request.body(), RequestBody::Bytes(b) if b.len() == 1));
        let (method, _, headers, _) = request.into_parts();
        assert_eq!(method, Method::GET);
        assert!(headers.is_empty());
    }
}
