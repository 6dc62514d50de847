//! WebHDFS HTTP client implementation.
//!
//! This module provides a complete WebHDFS client, enabling callers to:
//!
//! - **Run metadata operations** (stat, listing, rename, permissions, ACLs,
//!   snapshots, delegation tokens) as single request/response calls
//! - **Upload** byte streams with the two-phase `CREATE`/`APPEND` redirect protocol
//! - **Download** files as lazy chunk streams with the two-phase `OPEN` protocol
//! - **Swap the HTTP stack** through the [`Transport`](crate::transport::Transport) trait
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── fetch     - WebHdfsClient and the metadata dispatcher
//! ├── metadata  - One method per metadata operation
//! ├── upload    - Upload session and WriteStream
//! ├── download  - Download session and ReadStream
//! ├── session   - Transfer state machine and backpressure gate
//! ├── config    - Client configuration
//! └── utils     - Option types and input validation
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`WebHdfsClient`] | Main client |
//! | [`ClientConfig`] | Client configuration options |
//! | [`UploadOptions`] | `CREATE`/`APPEND` parameters |
//! | [`DownloadOptions`] | `OPEN` parameters |
//! | [`ReadStream`] | Chunk stream of a download |
//! | [`WriteStream`] | Push-style upload handle |
//! | [`TransferSession`] | Per-transfer phase tracking with terminal latch |
//!
//! # Examples
//!
//! ## Creating a Client
//!
//! ```
//! use webhdfs_http::client::{ClientConfig, WebHdfsClient};
//!
//! // Default configuration
//! let client = WebHdfsClient::new().unwrap();
//!
//! // Custom configuration
//! let config = ClientConfig {
//!     host: "namenode".to_string(),
//!     port: 9870,
//!     user: "etl".to_string(),
//!     ..Default::default()
//! };
//! let client = WebHdfsClient::with_config(config).unwrap();
//! ```
//!
//! ## Round Trip
//!
//! ```ignore
//! use webhdfs_http::WebHdfsClient;
//!
//! let client = WebHdfsClient::new()?;
//! client.write_file("/tmp/greeting", "hello").await?;
//! assert_eq!(client.read_file("/tmp/greeting").await?, "hello");
//! ```

mod config;
mod download;
mod fetch;
mod metadata;
mod session;
mod upload;
mod utils;

pub use config::ClientConfig;
pub use download::ReadStream;
pub use fetch::{extract_field, Params, WebHdfsClient};
pub use session::{GateHandle, GatedSource, Phase, TransferSession};
pub use upload::{UploadOutcome, WriteStream};
pub use utils::*;
