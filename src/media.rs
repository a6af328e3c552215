//! Media host client.
//!
//! Product, brand, category and slider images live on an external image host.
//! Uploads return both the public URL and the host's resource id; the id is
//! stored next to the URL so deletion never has to reverse-engineer it from
//! the URL.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::config::MediaConfig;

/// A stored image: where to fetch it and how to delete it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub url: String,
    pub public_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("media uploads are not configured")]
    Disabled,
    #[error("media host request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("media host rejected the request: {0}")]
    Rejected(String),
}

/// Image host backend trait.
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Upload a file into the configured folder.
    async fn upload(&self, file_name: &str, content_type: Option<&str>, bytes: Vec<u8>) -> Result<MediaRef, MediaError>;

    /// Delete a previously uploaded file by its resource id.
    async fn delete(&self, public_id: &str) -> Result<(), MediaError>;
}

/// Used when no media credentials are configured.
pub struct DisabledMediaHost;

#[async_trait]
impl MediaHost for DisabledMediaHost {
    async fn upload(&self, _file_name: &str, _content_type: Option<&str>, _bytes: Vec<u8>) -> Result<MediaRef, MediaError> {
        Err(MediaError::Disabled)
    }

    async fn delete(&self, public_id: &str) -> Result<(), MediaError> {
        warn!(public_id, "media host disabled, skipping delete");
        Ok(())
    }
}

/// Cloudinary-style signed upload API.
pub struct CloudinaryHost {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
    folder: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryHost {
    pub fn new(config: &MediaConfig) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            client,
            base_url: format!("https://api.cloudinary.com/v1_1/{}/image", config.cloud_name),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            folder: config.folder.clone(),
        })
    }

    fn timestamp() -> String {
        chrono::Utc::now().timestamp().to_string()
    }
}

#[async_trait]
impl MediaHost for CloudinaryHost {
    async fn upload(&self, file_name: &str, content_type: Option<&str>, bytes: Vec<u8>) -> Result<MediaRef, MediaError> {
        let timestamp = Self::timestamp();
        let signature = sign_params(&[("folder", self.folder.as_str()), ("timestamp", timestamp.as_str())], &self.api_secret);
        let size = bytes.len();

        let mut part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        if let Some(ct) = content_type {
            part = part.mime_str(ct)?;
        }
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.folder.clone())
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let response = self.client.post(format!("{}/upload", self.base_url)).multipart(form).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::Rejected(format!("{status}: {body}")));
        }
        let uploaded: UploadResponse = response.json().await?;
        debug!(public_id = %uploaded.public_id, size, "image uploaded");
        Ok(MediaRef { url: uploaded.secure_url, public_id: uploaded.public_id })
    }

    async fn delete(&self, public_id: &str) -> Result<(), MediaError> {
        let timestamp = Self::timestamp();
        let signature = sign_params(&[("public_id", public_id), ("timestamp", timestamp.as_str())], &self.api_secret);
        let params = [
            ("public_id", public_id),
            ("api_key", self.api_key.as_str()),
            ("timestamp", timestamp.as_str()),
            ("signature_algorithm", "sha256"),
            ("signature", signature.as_str()),
        ];
        let response = self.client.post(format!("{}/destroy", self.base_url)).form(&params).send().await?;
        if !response.status().is_success() {
            return Err(MediaError::Rejected(response.status().to_string()));
        }
        let outcome: DestroyResponse = response.json().await?;
        match outcome.result.as_str() {
            "ok" => Ok(()),
            "not found" => {
                warn!(public_id, "image already gone from media host");
                Ok(())
            }
            other => Err(MediaError::Rejected(other.to_string())),
        }
    }
}

/// Request signature: params sorted by key, joined as `k=v&k=v`, secret
/// appended, SHA-256, lowercase hex.
pub fn sign_params(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&");
    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Best-effort removal after the owning row is gone. Failures are logged.
pub async fn remove_quietly(host: &dyn MediaHost, public_ids: impl IntoIterator<Item = String>) {
    for public_id in public_ids {
        if let Err(e) = host.delete(&public_id).await {
            warn!(public_id = %public_id, error = %e, "failed to delete image from media host");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_ignores_param_order() {
        let a = sign_params(&[("timestamp", "1700000000"), ("folder", "abrar-shop")], "s3cret");
        let b = sign_params(&[("folder", "abrar-shop"), ("timestamp", "1700000000")], "s3cret");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, sign_params(&[("folder", "abrar-shop"), ("timestamp", "1700000000")], "other"));
    }

    #[test]
    fn signature_matches_sha256_of_canonical_string() {
        let expected = hex::encode(Sha256::digest(b"folder=f&timestamp=1secret"));
        assert_eq!(sign_params(&[("timestamp", "1"), ("folder", "f")], "secret"), expected);
    }

    #[tokio::test]
    async fn disabled_host_refuses_uploads() {
        let host = DisabledMediaHost;
        assert!(matches!(host.upload("a.jpg", None, vec![1, 2, 3]).await, Err(MediaError::Disabled)));
        assert!(host.delete("abrar-shop/x").await.is_ok());
    }
}
