//! Download session: `OPEN` over the two-phase redirect protocol.
//!
//! # Protocol
//!
//! 1. `GET ?op=OPEN` goes to the namenode, with byte-range options passed through.
//! 2. On `307` the session closes the locate connection and issues a second
//!    `GET` to the `Location` target. On `200` the namenode is serving the data
//!    itself and the same response is relayed.
//! 3. The data response's status is known before its body. On a remote-error
//!    status the body is drained into the error decoder and never shown to
//!    the caller as data. On success, chunks are relayed as they arrive
//!    through a bounded channel, so memory stays flat for any file size.
//! 4. The end of the body finishes the session. A transport failure
//!    mid-body yields exactly one `Err` and the stream ends.
//!
//! # Examples
//!
//! ```ignore
//! use futures::StreamExt;
//! use webhdfs_http::{client::DownloadOptions, WebHdfsClient};
//!
//! let client = WebHdfsClient::new()?;
//! let mut stream = client.open("/data/big.bin", DownloadOptions::default()).await?;
//! while let Some(chunk) = stream.next().await {
//!     let chunk = chunk?;
//!     println!("{} bytes", chunk.len());
//! }
//! ```

use crate::client::fetch::{read_error, WebHdfsClient};
use crate::client::session::{Phase, TransferSession};
use crate::client::utils::DownloadOptions;
use crate::error::{Result, WebHdfsError};
use crate::protocol::{self, StatusClass};
use crate::transport::{OperationRequest, TransportResponse};
use crate::types::Operation;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use http::Method;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Lazy, single-pass sequence of file chunks from a download.
///
/// Yields `Ok(chunk)` items in file order. At most one `Err` is ever
/// yielded, and nothing follows it. `None` after the last chunk means the
/// transfer finished. Dropping the stream closes the connection.
pub struct ReadStream {
    receiver: ReceiverStream<Result<Bytes>>,
}

impl std::fmt::Debug for ReadStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadStream").finish_non_exhaustive()
    }
}

impl ReadStream {
    fn new(receiver: mpsc::Receiver<Result<Bytes>>) -> Self {
        ReadStream {
            receiver: ReceiverStream::new(receiver),
        }
    }

    /// Receive the next chunk.
    pub async fn next_chunk(&mut self) -> Option<Result<Bytes>> {
        self.receiver.next().await
    }

    /// Collect the remaining chunks into one buffer.
    pub async fn into_bytes(mut self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.next_chunk().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }
}

impl Stream for ReadStream {
    type Item = Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_next(cx)
    }
}

struct DownloadSession {
    client: WebHdfsClient,
    state: TransferSession,
}

impl DownloadSession {
    fn new(client: WebHdfsClient) -> Self {
        let logging = client.config().enable_logging;
        DownloadSession {
            client,
            state: TransferSession::new("download", logging),
        }
    }

    fn fail(&mut self, err: WebHdfsError) -> WebHdfsError {
        self.state
            .fail(err)
            .unwrap_or_else(|| WebHdfsError::protocol("download session already terminated"))
    }

    async fn send(&mut self, url: url::Url) -> Result<TransportResponse> {
        match self
            .client
            .transport()
            .send(OperationRequest::new(Method::GET, url))
            .await
        {
            Ok(response) => Ok(response),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Drive the session up to the point where the data response status is known.
    async fn run(mut self, path: &str, options: DownloadOptions) -> Result<ReadStream> {
        let url = self.client.endpoint(Operation::Open, path, &options.to_params())?;
        if self.state.logging() {
            tracing::debug!(%url, "sending open request");
        }

        let first = self.send(url).await?;
        let data = match StatusClass::of(first.status().as_u16()) {
            StatusClass::Success => {
                self.state.advance(Phase::Direct);
                first
            }
            StatusClass::Redirect => {
                self.state.advance(Phase::AwaitingRedirect);
                let target = match protocol::redirect_target(first.headers()) {
                    Ok(target) => target,
                    Err(e) => {
                        first.close();
                        return Err(self.fail(e));
                    }
                };
                if self.state.logging() {
                    tracing::debug!(%target, "redirected; closing locate connection");
                }
                first.close();

                let second = self.send(target).await?;
                match StatusClass::of(second.status().as_u16()) {
                    StatusClass::Success => second,
                    StatusClass::Redirect => {
                        second.close();
                        return Err(self.fail(WebHdfsError::protocol(
                            "data endpoint answered with another redirect",
                        )));
                    }
                    StatusClass::RemoteError | StatusClass::Unexpected => {
                        let err = read_error(second).await;
                        return Err(self.fail(err));
                    }
                }
            }
            StatusClass::RemoteError | StatusClass::Unexpected => {
                let err = read_error(first).await;
                return Err(self.fail(err));
            }
        };

        Ok(self.relay(data))
    }

    /// Spawn the task that forwards body chunks to the returned stream.
    fn relay(self, response: TransportResponse) -> ReadStream {
        let (tx, rx) = mpsc::channel(self.client.config().stream_buffer.max(1));
        let mut body = response.into_stream();
        let mut state = self.state;
        state.advance(Phase::Streaming);

        tokio::spawn(async move {
            loop {
                let next = tokio::select! {
                    _ = tx.closed() => None,
                    next = body.next() => Some(next),
                };
                let chunk = match next {
                    Some(Some(chunk)) => chunk,
                    Some(None) => break,
                    None => {
                        if state.logging() {
                            tracing::debug!("read stream dropped; closing data connection");
                        }
                        return;
                    }
                };
                match chunk {
                    Ok(chunk) => {
                        if tx.send(Ok(chunk)).await.is_err() {
                            if state.logging() {
                                tracing::debug!("read stream dropped; closing data connection");
                            }
                            return;
                        }
                    }
                    Err(e) => {
                        if let Some(e) = state.fail(e) {
                            let _ = tx.send(Err(e)).await;
                        }
                        return;
                    }
                }
            }
            state.finish();
        });

        ReadStream::new(rx)
    }
}

impl WebHdfsClient {
    /// Open `path` for reading.
    ///
    /// Resolves once the data response status is known: a failed transfer
    /// returns its error here and never produces a [`ReadStream`].
    ///
    /// # Errors
    ///
    /// - [`WebHdfsError::Validation`] for a malformed path, before any I/O
    /// - [`WebHdfsError::Remote`] with the decoded `RemoteException` when
    ///   either request is refused
    /// - [`WebHdfsError::Protocol`] for a redirect without `Location`
    /// - [`WebHdfsError::Transport`] when a request cannot be sent
    pub async fn open(&self, path: &str, options: DownloadOptions) -> Result<ReadStream> {
        DownloadSession::new(self.clone()).run(path, options).await
    }

    /// Same as [`open`](Self::open).
    pub async fn create_read_stream(&self, path: &str, options: DownloadOptions) -> Result<ReadStream> {
        self.open(path, options).await
    }

    /// Read the whole file at `path` into memory.
    pub async fn read_file(&self, path: &str) -> Result<Bytes> {
        self.open(path, DownloadOptions::default())
            .await?
            .into_bytes()
            .await
    }
}
