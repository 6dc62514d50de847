#![doc = include_str!("../README.md")]

//! # WebHDFS over HTTP
//!
//! This crate is a client for the WebHDFS REST gateway of a Hadoop
//! distributed filesystem.
//!
//! ## Overview
//!
//! WebHDFS traffic comes in two shapes:
//!
//! 1. **Metadata operations** - stat, listing, rename, permissions, ACLs,
//!    snapshots and delegation tokens. One request, one JSON response.
//! 2. **Content transfer** - `CREATE`, `APPEND` and `OPEN`. The namenode never
//!    moves file bytes itself: it answers the first (locate) request with a
//!    `307` pointing at a datanode, and the payload flows over a second
//!    request to that target.
//!
//! The transfer sessions reproduce that two-phase protocol exactly: an
//! upload's byte source is held behind a gate until the redirect is known, a
//! download relays chunks without buffering the file, and every transfer ends
//! with exactly one success or one error.
//!
//! ## Key Features
//!
//! - **Redirect state machine** for uploads and downloads
//! - **Backpressure**: upload sources are not polled before the datanode is known
//! - **Exactly-once termination** per transfer
//! - **Typed metadata**: `FileStatus`, `ContentSummary`, `AclStatus`, ...
//! - **Pluggable transport**: the protocol logic never names an HTTP library
//! - **Status Codes**:
//!   - `200`/`201` - success
//!   - `301`/`307` - redirect to the data endpoint (requires `Location`)
//!   - `400`/`401`/`402`/`403`/`404`/`500` - `RemoteException`
//!
//! ## Usage
//!
//! ```ignore
//! use futures::StreamExt;
//! use webhdfs_http::{client::DownloadOptions, WebHdfsClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = WebHdfsClient::new()?;
//!
//!     client.write_file("/tmp/hello.txt", "hello world").await?;
//!
//!     let mut stream = client.open("/tmp/hello.txt", DownloadOptions::default()).await?;
//!     while let Some(chunk) = stream.next().await {
//!         print!("{}", String::from_utf8_lossy(&chunk?));
//!     }
//!
//!     for entry in client.readdir("/tmp").await? {
//!         println!("{} {}", entry.permission, entry.path_suffix);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - **[types]** - Operation names, `RemoteException` and typed JSON bodies
//! - **[error]** - Error types and result handling
//! - **[client]** - The client, transfer sessions and metadata operations
//! - **[protocol]** - Endpoint construction, status classification, constants
//! - **[transport]** - Injectable HTTP transport and its reqwest implementation

pub mod client;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod types;

pub use client::{ClientConfig, DownloadOptions, ReadStream, UploadOptions, UploadOutcome, WebHdfsClient, WriteStream};
pub use error::{Result, WebHdfsError};
pub use transport::{OperationRequest, ReqwestTransport, Transport, TransportResponse};
pub use types::{FileStatus, Operation, RemoteException};

#[cfg(test)]
mod tests;
