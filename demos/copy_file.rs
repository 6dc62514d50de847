//! Copy a local file into WebHDFS and read it back.
//!
//! ```text
//! WEBHDFS_URL=http://namenode:9870/webhdfs/v1 WEBHDFS_USER=hdfs \
//!     cargo run --example copy_file -- ./local.bin /tmp/remote.bin
//! ```

use anyhow::{bail, Context};
use futures::StreamExt;
use tokio::io::AsyncReadExt;
use webhdfs_http::client::{ClientConfig, DownloadOptions, UploadOptions};
use webhdfs_http::WebHdfsClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(local), Some(remote)) = (args.next(), args.next()) else {
        bail!("usage: copy_file <local-file> <remote-path>");
    };

    let mut config = match std::env::var("WEBHDFS_URL") {
        Ok(url) => ClientConfig::from_url(&url)?,
        Err(_) => ClientConfig::default(),
    };
    if let Ok(user) = std::env::var("WEBHDFS_USER") {
        config.user = user;
    }
    let client = WebHdfsClient::with_config(config)?;

    let mut file = tokio::fs::File::open(&local)
        .await
        .with_context(|| format!("opening {}", local))?;
    let mut writer = client.create_write_stream(&remote, UploadOptions::create())?;
    let mut buf = vec![0u8; 64 * 1024];
    let mut sent = 0usize;
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        writer.write(buf[..n].to_vec()).await?;
        sent += n;
    }
    let outcome = writer.finish().await?;
    tracing::info!(sent, location = ?outcome.location, "upload finished");

    let status = client.stat(&remote).await?;
    tracing::info!(length = status.length, owner = %status.owner, "remote status");

    let mut stream = client.open(&remote, DownloadOptions::default()).await?;
    let mut received = 0usize;
    let mut chunks = 0usize;
    while let Some(chunk) = stream.next().await {
        received += chunk?.len();
        chunks += 1;
    }
    tracing::info!(received, chunks, "download finished");

    if received != sent {
        bail!("size mismatch: sent {} bytes, read back {}", sent, received);
    }
    Ok(())
}
