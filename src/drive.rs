use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

use crate::app_config::DriveConfig;
use crate::file_utils::FileManager;
use crate::providers::map_status_error;

/// MIME type Drive uses for folders
const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Drive v3 base URLs
#[derive(Debug, Clone)]
pub struct DriveEndpoints {
    /// Metadata API, e.g. https://www.googleapis.com/drive/v3
    pub api_base: String,
    /// Media upload API, e.g. https://www.googleapis.com/upload/drive/v3
    pub upload_base: String,
}

impl Default for DriveEndpoints {
    fn default() -> Self {
        Self {
            api_base: "https://www.googleapis.com/drive/v3".to_string(),
            upload_base: "https://www.googleapis.com/upload/drive/v3".to_string(),
        }
    }
}

/// A file or folder record returned by Drive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

/// Uploads project folders with a caller-supplied OAuth access token
#[derive(Debug, Clone)]
pub struct DriveUploader {
    client: Client,
    access_token: String,
    endpoints: DriveEndpoints,
}

impl DriveUploader {
    pub fn new(access_token: impl Into<String>, endpoints: DriveEndpoints) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(600))
                .build()
                .unwrap_or_default(),
            access_token: access_token.into(),
            endpoints,
        }
    }

    /// Uploader for the configured token, or `None` when no token is set
    pub fn from_config(config: &DriveConfig) -> Option<Self> {
        if config.access_token.trim().is_empty() {
            None
        } else {
            Some(Self::new(config.access_token.clone(), DriveEndpoints::default()))
        }
    }

    /// Folder `name` under `parent` (or the Drive root), created if absent
    pub async fn find_or_create_folder(&self, name: &str, parent: Option<&str>) -> Result<DriveFile> {
        let query = folder_query(name, parent);
        let response = self.client.get(format!("{}/files", self.endpoints.api_base))
            .bearer_auth(&self.access_token)
            .query(&[
                ("q", query.as_str()),
                ("spaces", "drive"),
                ("fields", "files(id, name)"),
            ])
            .send()
            .await
            .context("Drive folder lookup failed")?;
        let response = check_status(response).await?;

        let list = response.json::<FileList>().await
            .context("Failed to parse Drive folder list")?;
        if let Some(folder) = list.files.into_iter().next() {
            debug!("Found Drive folder '{}' ({})", folder.name, folder.id);
            return Ok(folder);
        }

        let mut metadata = json!({ "name": name, "mimeType": FOLDER_MIME_TYPE });
        if let Some(parent) = parent {
            metadata["parents"] = json!([parent]);
        }

        let response = self.client.post(format!("{}/files", self.endpoints.api_base))
            .bearer_auth(&self.access_token)
            .query(&[("fields", "id, name")])
            .json(&metadata)
            .send()
            .await
            .context("Drive folder creation failed")?;
        let response = check_status(response).await?;

        let folder = response.json::<DriveFile>().await
            .context("Failed to parse created Drive folder")?;
        info!("Created Drive folder '{}' ({})", folder.name, folder.id);
        Ok(folder)
    }

    /// Upload one file into `folder_id`
    pub async fn upload_file(&self, path: &Path, folder_id: &str) -> Result<DriveFile> {
        let name = path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| anyhow!("Not a file path: {:?}", path))?;
        let data = tokio::fs::read(path).await
            .with_context(|| format!("Failed to read {:?}", path))?;

        let metadata = json!({ "name": name, "parents": [folder_id] });
        let boundary = format!("autoshorts-{}", Uuid::new_v4().simple());
        let body = build_multipart_body(&boundary, &metadata.to_string(), mime_type_for(path), &data);

        let response = self.client.post(format!("{}/files", self.endpoints.upload_base))
            .bearer_auth(&self.access_token)
            .query(&[("uploadType", "multipart"), ("fields", "id, name")])
            .header("Content-Type", format!("multipart/related; boundary={}", boundary))
            .body(body)
            .send()
            .await
            .with_context(|| format!("Upload of {} failed", name))?;
        let response = check_status(response).await?;

        let file = response.json::<DriveFile>().await
            .context("Failed to parse uploaded file record")?;
        info!("Uploaded {} ({})", file.name, file.id);
        Ok(file)
    }

    /// Mirror the regular files of `dir` into `<root_folder>/<slug>/`
    pub async fn upload_project_folder(&self, dir: &Path, root_folder: &str, slug: &str) -> Result<Vec<DriveFile>> {
        let root = self.find_or_create_folder(root_folder, None).await?;
        let project = self.find_or_create_folder(slug, Some(&root.id)).await?;

        let files = FileManager::list_files(dir)?;
        let mut uploaded = Vec::with_capacity(files.len());
        for path in &files {
            uploaded.push(self.upload_file(path, &project.id).await?);
        }
        Ok(uploaded)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let message = response.text().await.unwrap_or_default();
        Err(map_status_error(status.as_u16(), message).into())
    }
}

/// Drive search expression for a non-trashed folder
pub fn folder_query(name: &str, parent: Option<&str>) -> String {
    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
    let mut query = format!(
        "name = '{}' and mimeType = '{}' and trashed = false",
        escaped, FOLDER_MIME_TYPE
    );
    if let Some(parent) = parent {
        query.push_str(&format!(" and '{}' in parents", parent));
    }
    query
}

/// MIME type sent for an uploaded file
pub fn mime_type_for(path: &Path) -> &'static str {
    let ext = path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "json" => "application/json",
        "ipynb" => "application/x-ipynb+json",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

/// `multipart/related` body: JSON metadata part, then the media part
pub fn build_multipart_body(boundary: &str, metadata: &str, mime_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + metadata.len() + 256);
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.as_bytes());
    body.extend_from_slice(format!("\r\n--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", mime_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}
