//! Signed uploads to the Cloudinary REST API.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::CloudinaryConfig;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors from the Cloudinary client.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Cloudinary returned a non-2xx status code.
    #[error("Cloudinary API error ({status}): {body}")]
    ApiError { status: u16, body: String },
}

/// The subset of Cloudinary's upload response the API returns to clients.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct UploadedAsset {
    pub public_id: String,
    pub secure_url: String,
    pub resource_type: String,
    pub format: Option<String>,
    pub bytes: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// A file ready to send.
#[derive(Debug)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub struct CloudinaryClient {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Upload `file` into `folder`, letting Cloudinary detect the resource
    /// type.
    pub async fn upload(&self, file: UploadFile, folder: &str) -> Result<UploadedAsset, UploadError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("folder", folder), ("timestamp", &timestamp)],
            &self.config.api_secret,
        );

        let part = reqwest::multipart::Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.to_string())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .client
            .post(format!("{API_BASE}/{}/auto/upload", self.config.cloud_name))
            .multipart(form)
            .timeout(UPLOAD_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<UploadedAsset>().await?)
    }
}

/// Cloudinary request signature: parameters sorted by name, joined as
/// `k=v&k=v`, suffixed with the API secret, SHA-256 hex.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_ignores_parameter_order() {
        let a = sign_params(&[("timestamp", "1700000000"), ("folder", "x")], "secret");
        let b = sign_params(&[("folder", "x"), ("timestamp", "1700000000")], "secret");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn signature_matches_manual_digest() {
        let mut hasher = Sha256::new();
        hasher.update(b"folder=x&timestamp=1700000000secret");
        let expected = format!("{:x}", hasher.finalize());
        assert_eq!(
            sign_params(&[("timestamp", "1700000000"), ("folder", "x")], "secret"),
            expected
        );
    }

    #[test]
    fn empty_values_are_not_signed() {
        assert_eq!(
            sign_params(&[("folder", ""), ("timestamp", "1")], "s"),
            sign_params(&[("timestamp", "1")], "s")
        );
    }
}
