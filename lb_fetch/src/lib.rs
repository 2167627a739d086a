//! ABOUTME: Media asset fetcher with filename-based local caching
//! ABOUTME: Downloads loop files from the remote host exactly once

use lb_core::{Error, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for the asset fetcher
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Remote directory the media files live under
    pub base_url: String,
    /// Local cache directory
    pub media_dir: PathBuf,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://z0r.de/L".to_string(),
            media_dir: PathBuf::from("."),
        }
    }
}

/// Downloads loop media files, skipping anything already cached on disk.
///
/// There is deliberately no retry and no checksum: a failed download aborts
/// the whole run, and a cached file is trusted by name alone.
pub struct AssetFetcher {
    client: Client,
    config: FetchConfig,
}

impl AssetFetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent("loopbench/0.1")
            .build()
            .map_err(|e| Error::Fetch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Canonical on-disk filename for a loop identifier
    pub fn asset_filename(loop_id: &str) -> String {
        format!("z0r-de_{}.swf", loop_id)
    }

    /// Local cache path for a loop identifier
    pub fn asset_path(&self, loop_id: &str) -> PathBuf {
        self.config.media_dir.join(Self::asset_filename(loop_id))
    }

    /// Remote URL for a loop identifier
    pub fn remote_url(&self, loop_id: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            Self::asset_filename(loop_id)
        )
    }

    /// Make sure the media file for `loop_id` exists locally, downloading it
    /// if absent, and return its path
    pub async fn ensure(&self, loop_id: &str) -> Result<PathBuf> {
        let path = self.asset_path(loop_id);
        if path.exists() {
            debug!(loop_id = %loop_id, path = %path.display(), "Asset already cached");
            return Ok(path);
        }

        let url = self.remote_url(loop_id);
        info!(loop_id = %loop_id, url = %url, "Downloading asset");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("Download request failed for {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::Fetch(format!(
                "Download of {} returned status {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Fetch(format!("Download body failed for {}: {}", url, e)))?;

        write_atomic(&path, &bytes).await?;
        info!(loop_id = %loop_id, bytes = bytes.len(), path = %path.display(), "Asset downloaded");

        Ok(path)
    }
}

/// Write via a temp file so a failed download never leaves a truncated file
/// that would satisfy the cache check on the next run
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("swf.part");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
