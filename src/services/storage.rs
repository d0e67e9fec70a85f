use std::path::Path;
use std::time::Duration;

use axum::body::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;

use crate::config::StorageConfig;
use crate::error::{AppError, Result};
use crate::models::EntityId;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Folder an uploaded file is stored under, per kind of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFolder {
    Notes,
    Gk,
    Blog,
    Pradesh,
    ModelSets,
    Templates,
    Gallery,
    CurrentEvents,
}

impl UploadFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadFolder::Notes => "notes",
            UploadFolder::Gk => "gk/docs",
            UploadFolder::Blog => "blog",
            UploadFolder::Pradesh => "pradesh/docs",
            UploadFolder::ModelSets => "model_sets",
            UploadFolder::Templates => "templates",
            UploadFolder::Gallery => "gallery",
            UploadFolder::CurrentEvents => "current_events",
        }
    }
}

/// Object name for an upload: a fresh UUID keeping the original extension.
pub fn object_path(folder: UploadFolder, original_name: &str) -> String {
    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    format!("{}/{}{}", folder.as_str(), EntityId::generate(), extension)
}

#[derive(Debug, Deserialize)]
struct UploadedObject {
    name: String,
}

pub struct ObjectStorage {
    client: Client,
    bucket: String,
    access_token: String,
    upload_url: String,
    public_base_url: String,
}

impl ObjectStorage {
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            access_token: config.access_token.clone(),
            upload_url: config.upload_url.trim_end_matches('/').to_string(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn public_url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, self.bucket, path)
    }

    /// Uploads one file and returns its public URL.
    pub async fn upload(
        &self,
        folder: UploadFolder,
        original_name: &str,
        content_type: Option<&str>,
        bytes: Bytes,
    ) -> Result<String> {
        let path = object_path(folder, original_name);
        let size = bytes.len();

        let response = self
            .client
            .post(format!("{}/b/{}/o", self.upload_url, self.bucket))
            .query(&[
                ("uploadType", "media"),
                ("name", path.as_str()),
                ("predefinedAcl", "publicRead"),
            ])
            .bearer_auth(&self.access_token)
            .header(CONTENT_TYPE, content_type.unwrap_or(DEFAULT_CONTENT_TYPE))
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::Upload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!("Storage rejected {}: {} {}", path, status, error_text);
            return Err(AppError::Upload(format!("storage responded with {status}")));
        }

        // The name echoed back is authoritative if the service normalised it.
        let stored = match response.json::<UploadedObject>().await {
            Ok(object) => object.name,
            Err(_) => path,
        };

        tracing::info!("Uploaded {} ({} bytes)", stored, size);
        Ok(self.public_url(&stored))
    }
}
