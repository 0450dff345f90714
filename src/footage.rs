use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use rand::seq::IndexedRandom;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::app_config::FootageConfig;
use crate::file_utils::FileManager;
use crate::providers::map_status_error;

// Hex characters of the URL digest used as cache file name
const CACHE_KEY_LEN: usize = 16;

/// Finds and downloads a clip for a search query
#[async_trait]
pub trait FootageSource: Send + Sync {
    /// Download a clip matching `query` into `destination_dir`.
    ///
    /// Returns `None` when nothing usable was found; the failure is logged.
    async fn fetch(&self, query: &str, destination_dir: &Path) -> Option<PathBuf>;
}

/// Pexels video search response
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub videos: Vec<PexelsVideo>,
}

/// One search hit
#[derive(Debug, Clone, Deserialize)]
pub struct PexelsVideo {
    pub id: u64,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub video_files: Vec<PexelsVideoFile>,
}

/// One rendition of a video
#[derive(Debug, Clone, Deserialize)]
pub struct PexelsVideoFile {
    #[serde(default)]
    pub quality: Option<String>,
    pub link: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Pexels REST client
#[derive(Debug, Clone)]
pub struct PexelsClient {
    client: Client,
    api_key: String,
    endpoint: String,
    orientation: String,
    size: String,
    per_page: u32,
}

impl PexelsClient {
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        orientation: impl Into<String>,
        size: impl Into<String>,
        per_page: u32,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            orientation: orientation.into(),
            size: size.into(),
            per_page: per_page.max(1),
        }
    }

    pub fn from_config(config: &FootageConfig, orientation: &str) -> Self {
        Self::new(
            config.api_key.clone(),
            config.endpoint.clone(),
            orientation,
            config.size.clone(),
            config.per_page,
        )
    }

    /// Search URL for a query
    pub fn search_url(&self, query: &str) -> Result<Url> {
        let base = format!("{}/videos/search", self.endpoint.trim_end_matches('/'));
        let per_page = self.per_page.to_string();
        Url::parse_with_params(
            &base,
            &[
                ("query", query),
                ("orientation", self.orientation.as_str()),
                ("size", self.size.as_str()),
                ("per_page", per_page.as_str()),
            ],
        )
        .with_context(|| format!("Invalid footage endpoint: {}", self.endpoint))
    }

    /// Run one search
    pub async fn search(&self, query: &str) -> Result<Vec<PexelsVideo>> {
        let url = self.search_url(query)?;
        debug!("Searching footage: {}", url);

        let response = self.client.get(url)
            .header("Authorization", &self.api_key)
            .send()
            .await
            .context("Footage search request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(map_status_error(status.as_u16(), error_text).into());
        }

        let body = response.json::<SearchResponse>().await
            .context("Failed to parse footage search response")?;
        Ok(body.videos)
    }

    /// Stream a file to `destination`, reusing it if already downloaded
    pub async fn download(&self, link: &str, destination_dir: &Path) -> Result<PathBuf> {
        download_to(&self.client, link, destination_dir).await
    }
}

#[async_trait]
impl FootageSource for PexelsClient {
    async fn fetch(&self, query: &str, destination_dir: &Path) -> Option<PathBuf> {
        let videos = match self.search(query).await {
            Ok(videos) => videos,
            Err(e) => {
                warn!("Footage search for '{}' failed: {}", query, e);
                return None;
            }
        };

        let Some(link) = choose_video(&videos).and_then(preferred_file).map(|f| f.link.clone()) else {
            warn!("No footage found for '{}'", query);
            return None;
        };

        match self.download(&link, destination_dir).await {
            Ok(path) => {
                info!("Footage for '{}': {}", query, path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Footage download for '{}' failed: {:#}", query, e);
                None
            }
        }
    }
}

/// Download `link` into `destination_dir` under its cache name.
///
/// Each call streams into its own temporary file, which is moved into place
/// once complete and removed if the download fails. Concurrent downloads of
/// the same link both succeed and leave one file.
pub async fn download_to(client: &Client, link: &str, destination_dir: &Path) -> Result<PathBuf> {
    FileManager::ensure_dir(destination_dir)?;
    let destination = destination_dir.join(cache_file_name(link));
    if FileManager::file_exists(&destination) {
        debug!("Reusing cached footage {}", destination.display());
        return Ok(destination);
    }

    let mut response = client.get(link)
        .send()
        .await
        .with_context(|| format!("Failed to download {}", link))?;
    if !response.status().is_success() {
        return Err(anyhow!("Download of {} returned {}", link, response.status()));
    }

    let partial = tempfile::Builder::new()
        .prefix(".download-")
        .suffix(".part")
        .tempfile_in(destination_dir)
        .with_context(|| format!("Failed to create a temporary file in {:?}", destination_dir))?;
    let (std_file, partial_path) = partial.into_parts();

    let mut file = tokio::fs::File::from_std(std_file);
    while let Some(chunk) = response.chunk().await.context("Download interrupted")? {
        file.write_all(&chunk).await
            .with_context(|| format!("Failed to write {:?}", partial_path))?;
    }
    file.flush().await?;
    drop(file);

    partial_path.persist(&destination)
        .with_context(|| format!("Failed to move download into {:?}", destination))?;
    Ok(destination)
}

/// Random pick among the search hits
pub fn choose_video(videos: &[PexelsVideo]) -> Option<&PexelsVideo> {
    videos.choose(&mut rand::rng())
}

/// First `hd` rendition, else the first one listed
pub fn preferred_file(video: &PexelsVideo) -> Option<&PexelsVideoFile> {
    video.video_files.iter()
        .find(|f| f.quality.as_deref() == Some("hd"))
        .or_else(|| video.video_files.first())
}

/// Stable local name for a download URL
pub fn cache_file_name(link: &str) -> String {
    let digest = Sha256::digest(link.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    format!("{}.mp4", &hex[..CACHE_KEY_LEN])
}
