//! Streaming download of a single artifact bundle.

use std::path::Path;
use std::time::Duration;

use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::{Result, SetupError};

/// User-Agent header sent with download requests.
const USER_AGENT: &str = "lpac-provisioner";

/// Overall timeout for one bundle download.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Builds the HTTP client shared by all download tasks of one invocation.
pub fn download_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}").into())
}

/// Downloads `url` to `dest`, streaming the body chunk by chunk.
///
/// Parent directories are created as needed and any prior content at `dest`
/// is overwritten. The response must carry a success status; anything else
/// fails the download without touching the destination file.
pub async fn download_artifact(client: &reqwest::Client, url: &str, dest: &Path) -> Result<()> {
    log::info!("Downloading {url}");

    let mut response = client.get(url).send().await.map_err(|e| SetupError::Network {
        url: url.to_string(),
        reason: format!("transport error: {e}"),
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SetupError::Network {
            url: url.to_string(),
            reason: format!("HTTP {status}"),
        });
    }

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut out = BufWriter::new(tokio::fs::File::create(dest).await?);

    while let Some(chunk) = response.chunk().await.map_err(|e| SetupError::Network {
        url: url.to_string(),
        reason: format!("body read failed: {e}"),
    })? {
        out.write_all(&chunk).await?;
    }
    out.flush().await?;

    log::info!("Staged {}", dest.display());
    Ok(())
}
