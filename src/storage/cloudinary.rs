//! Cloudinary-compatible image host over its signed REST upload API.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

use crate::domain::product::ImageRef;
use crate::domain::types::{ImageUrl, PublicId};
use crate::models::config::CloudinaryConfig;
use crate::storage::{ImageStorage, StorageError};

const SIGNATURE_ALGORITHM: &str = "sha256";

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorMessage,
}

#[derive(Deserialize)]
struct ErrorMessage {
    message: String,
}

/// Signs request parameters the way the upload API expects: sorted by name,
/// joined as `k=v` with `&`, secret appended, SHA-256, lower-case hex.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let to_sign = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// [`ImageStorage`] backed by Cloudinary.
pub struct CloudinaryStorage {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryStorage {
    pub fn new(config: CloudinaryConfig) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/{}/image/{action}",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.cloud_name
        )
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        Err(StorageError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ImageStorage for CloudinaryStorage {
    async fn upload(&self, path: &Path) -> Result<ImageRef, StorageError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| StorageError::ReadFile {
                path: path.display().to_string(),
                source,
            })?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();

        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[
                ("folder", self.config.folder.as_str()),
                ("timestamp", timestamp.as_str()),
            ],
            &self.config.api_secret,
        );

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.config.folder.clone())
            .text("signature", signature)
            .text("signature_algorithm", SIGNATURE_ALGORITHM);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;
        let body: UploadResponse = Self::read_json(response).await?;

        let url = ImageUrl::new(body.secure_url)
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;
        let public_id = PublicId::new(body.public_id)
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;

        log::debug!(public_id = public_id.as_str(); "Image uploaded");
        Ok(ImageRef { url, public_id })
    }

    async fn destroy(&self, public_id: &PublicId) -> Result<(), StorageError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[
                ("public_id", public_id.as_str()),
                ("timestamp", timestamp.as_str()),
            ],
            &self.config.api_secret,
        );

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&[
                ("public_id", public_id.as_str()),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.config.api_key.as_str()),
                ("signature", signature.as_str()),
                ("signature_algorithm", SIGNATURE_ALGORITHM),
            ])
            .send()
            .await?;
        let body: DestroyResponse = Self::read_json(response).await?;

        // "not found" comes back with a 200 as well.
        if body.result == "ok" {
            Ok(())
        } else {
            Err(StorageError::Rejected {
                status: 200,
                message: format!("destroy returned \"{}\"", body.result),
            })
        }
    }
}
