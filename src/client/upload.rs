//! Upload session: `CREATE` and `APPEND` over the two-phase redirect protocol.
//!
//! # Protocol
//!
//! 1. **Locate**: `PUT ?op=CREATE` (or `POST ?op=APPEND`) goes to the namenode
//!    with no payload. The caller's byte source is wrapped in a closed
//!    [`GatedSource`] and held by the session; not a single byte is pulled.
//! 2. The namenode answers `307` with `Location: http://datanode/...`. The
//!    locate connection is closed at once, since it only carried the routing
//!    decision.
//! 3. **Data**: the same method is sent to the redirect target with the gated
//!    source as its streaming body. The session opens the gate exactly once;
//!    from then on ordinary transport backpressure paces the source.
//! 4. A `201` completes the upload, carrying a trailing `Location` if the
//!    datanode sent one. A remote-error or transport failure on either request
//!    ends the session with exactly one error, and no second request is made
//!    if the first one failed.
//!
//! # Examples
//!
//! ```ignore
//! use bytes::Bytes;
//! use webhdfs_http::{client::UploadOptions, WebHdfsClient};
//!
//! let client = WebHdfsClient::new()?;
//! client.write_file("/tmp/hello.txt", "hello world").await?;
//!
//! let chunks = futures::stream::iter(vec![
//!     Ok(Bytes::from_static(b"part 1\n")),
//!     Ok(Bytes::from_static(b"part 2\n")),
//! ]);
//! client.upload("/tmp/log.txt", chunks, UploadOptions::append()).await?;
//! ```

use crate::client::fetch::{read_error, WebHdfsClient};
use crate::client::session::{GatedSource, Phase, TransferSession};
use crate::client::utils::UploadOptions;
use crate::error::{Result, WebHdfsError};
use crate::protocol::{self, StatusClass};
use crate::transport::{BoxStream, OperationRequest, RequestBody};
use crate::types::Operation;
use bytes::Bytes;
use futures::Stream;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::HeaderMap;
use std::io;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;

/// Terminal success of an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Trailing `Location` sent with the data endpoint's success response.
    pub location: Option<String>,
}

struct UploadSession {
    client: WebHdfsClient,
    state: TransferSession,
}

impl UploadSession {
    fn new(client: WebHdfsClient) -> Self {
        let logging = client.config().enable_logging;
        UploadSession {
            client,
            state: TransferSession::new("upload", logging),
        }
    }

    fn fail(&mut self, err: WebHdfsError) -> WebHdfsError {
        self.state
            .fail(err)
            .unwrap_or_else(|| WebHdfsError::protocol("upload session already terminated"))
    }

    async fn run(
        mut self,
        path: &str,
        source: BoxStream<io::Result<Bytes>>,
        options: UploadOptions,
    ) -> Result<UploadOutcome> {
        let op = if options.append {
            Operation::Append
        } else {
            Operation::Create
        };
        let params = options.to_params(self.client.config())?;
        let url = self.client.endpoint(op, path, &params)?;
        let method = op.method();

        let (gated, gate) = GatedSource::new(source);

        self.state.advance(Phase::AwaitingRedirect);
        if self.state.logging() {
            tracing::debug!(%op, %url, "sending locate request");
        }
        let locate = match self
            .client
            .transport()
            .send(OperationRequest::new(method.clone(), url))
            .await
        {
            Ok(response) => response,
            Err(e) => return Err(self.fail(e)),
        };

        let status = locate.status().as_u16();
        let target = match StatusClass::of(status) {
            StatusClass::Redirect => match protocol::redirect_target(locate.headers()) {
                Ok(target) => target,
                Err(e) => {
                    locate.close();
                    return Err(self.fail(e));
                }
            },
            StatusClass::Success => {
                locate.close();
                return Err(self.fail(WebHdfsError::protocol(format!(
                    "{} answered {} without redirecting to a data endpoint",
                    op, status
                ))));
            }
            StatusClass::RemoteError | StatusClass::Unexpected => {
                let err = read_error(locate).await;
                return Err(self.fail(err));
            }
        };
        if self.state.logging() {
            tracing::debug!(%op, %target, "redirected; closing locate connection");
        }
        locate.close();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"));
        let request = OperationRequest::new(method, target)
            .with_headers(headers)
            .with_body(RequestBody::Stream(Box::pin(gated)));

        self.state.advance(Phase::Streaming);
        gate.release();

        let response = match self.client.transport().send(request).await {
            Ok(response) => response,
            Err(e) => return Err(self.fail(e)),
        };

        let status = response.status().as_u16();
        match StatusClass::of(status) {
            StatusClass::Success => {
                let location = response.location();
                response.close();
                self.state.finish();
                if self.state.logging() {
                    tracing::debug!(%op, ?location, "upload complete");
                }
                Ok(UploadOutcome { location })
            }
            _ => {
                let err = read_error(response).await;
                Err(self.fail(err))
            }
        }
    }
}

impl WebHdfsClient {
    /// Upload a byte stream to `path`.
    ///
    /// The source is not polled until the namenode has redirected the
    /// session to a datanode. A source that yields an error aborts the data
    /// request and fails the upload.
    ///
    /// # Errors
    ///
    /// Exactly one of the [`WebHdfsError`] variants; see the module docs for
    /// which phase produces which.
    pub async fn upload<S>(&self, path: &str, source: S, options: UploadOptions) -> Result<UploadOutcome>
    where
        S: Stream<Item = io::Result<Bytes>> + Send + Sync + 'static,
    {
        UploadSession::new(self.clone())
            .run(path, Box::pin(source), options)
            .await
    }

    /// Create (or replace) `path` with `data`.
    pub async fn write_file(&self, path: &str, data: impl Into<Bytes>) -> Result<UploadOutcome> {
        self.upload(path, single_chunk(data.into()), UploadOptions::create())
            .await
    }

    /// Append `data` to the existing file at `path`.
    pub async fn append_file(&self, path: &str, data: impl Into<Bytes>) -> Result<UploadOutcome> {
        self.upload(path, single_chunk(data.into()), UploadOptions::append())
            .await
    }

    /// Start an upload fed incrementally through a [`WriteStream`].
    ///
    /// Path and options are validated before the session starts. The upload
    /// runs as a task on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// [`WebHdfsError::Io`] when called outside a Tokio runtime.
    pub fn create_write_stream(&self, path: &str, options: UploadOptions) -> Result<WriteStream> {
        protocol::validate_path(path)?;
        options.to_params(self.config())?;
        let runtime = tokio::runtime::Handle::try_current().map_err(io::Error::other)?;

        let (sender, receiver) = mpsc::channel(self.config().stream_buffer.max(1));
        let client = self.clone();
        let path = path.to_string();
        let task = runtime.spawn(async move {
            client
                .upload(&path, ReceiverStream::new(receiver), options)
                .await
        });

        Ok(WriteStream {
            sender: Some(sender),
            task: Some(task),
        })
    }
}

fn single_chunk(data: Bytes) -> impl Stream<Item = io::Result<Bytes>> + Send + Sync + 'static {
    futures::stream::iter(std::iter::once(Ok(data)))
}

/// Push-style handle on a running upload.
///
/// Writes wait while the bounded buffer is full, so a slow datanode slows the
/// writer down. Call [`finish`](WriteStream::finish) to end the file and
/// collect the outcome. Dropping the stream without finishing fails the
/// upload like [`abort`](WriteStream::abort): the data request is cut off
/// and the partial file is never committed.
#[derive(Debug)]
pub struct WriteStream {
    sender: Option<mpsc::Sender<io::Result<Bytes>>>,
    task: Option<JoinHandle<Result<UploadOutcome>>>,
}

impl WriteStream {
    /// Queue one chunk for upload.
    ///
    /// # Errors
    ///
    /// Returns the session's error if the upload already ended.
    pub async fn write(&mut self, chunk: impl Into<Bytes>) -> Result<()> {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| WebHdfsError::validation("write after the stream was closed"))?;

        if sender.send(Ok(chunk.into())).await.is_ok() {
            return Ok(());
        }

        // receiver gone: the session ended before consuming all input
        self.sender = None;
        match self.join().await {
            Err(e) => Err(e),
            Ok(_) => Err(WebHdfsError::protocol("upload ended before all data was written")),
        }
    }

    /// End the input and wait for the upload's terminal result.
    pub async fn finish(mut self) -> Result<UploadOutcome> {
        self.sender = None;
        self.join().await
    }

    /// Abort the upload. The session fails instead of completing.
    pub async fn abort(mut self) -> Result<()> {
        if let Some(sender) = self.sender.take() {
            let _ = sender
                .send(Err(io::Error::new(io::ErrorKind::Interrupted, "write stream aborted")))
                .await;
        }
        match self.join().await {
            Err(e) => Err(e),
            Ok(_) => Err(WebHdfsError::protocol("upload completed despite abort")),
        }
    }

    async fn join(&mut self) -> Result<UploadOutcome> {
        let task = self
            .task
            .take()
            .ok_or_else(|| WebHdfsError::protocol("write stream already terminated"))?;
        task.await.map_err(|e| WebHdfsError::Io(io::Error::other(e)))?
    }
}

impl Drop for WriteStream {
    fn drop(&mut self) {
        let Some(sender) = self.sender.take() else {
            return;
        };
        let dropped = io::Error::new(io::ErrorKind::BrokenPipe, "write stream dropped before finish");
        if sender.try_send(Err(dropped)).is_err() {
            // buffer full or session gone: the body cannot carry the error
            if let Some(task) = self.task.take() {
                task.abort();
            }
        }
    }
}
