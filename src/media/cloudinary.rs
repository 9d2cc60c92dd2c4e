use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, info};

use super::{MediaError, MediaStore, UploadFile, UploadedMedia};
use crate::config::{MediaConfig, SignatureAlgorithm};

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Signed uploads to Cloudinary's REST API
pub struct CloudinaryStore {
    client: reqwest::Client,
    config: MediaConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
    resource_type: String,
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl CloudinaryStore {
    pub fn new(config: MediaConfig) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upload_timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn is_configured(&self) -> bool {
        !self.config.cloud_name.is_empty() && !self.config.api_key.is_empty() && !self.config.api_secret.is_empty()
    }

    fn endpoint(&self, resource_type: &str, action: &str) -> String {
        format!("{}/{}/{}/{}", API_BASE, self.config.cloud_name, resource_type, action)
    }

    fn sign(&self, params: &[(&str, String)]) -> String {
        sign_params(params, &self.config.api_secret, self.config.signature_algorithm)
    }

    /// Parameters shared by every signed request, plus the signature itself
    fn signed_params(&self, mut params: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        params.push(("timestamp", Utc::now().timestamp().to_string()));
        let signature = self.sign(&params);
        params.push(("api_key", self.config.api_key.clone()));
        params.push(("signature", signature));
        params
    }

    async fn provider_error(response: reqwest::Response) -> MediaError {
        let status = response.status().as_u16();
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error.message,
            Err(_) => "no error message".to_string(),
        };
        MediaError::Provider { status, message }
    }
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    async fn upload(&self, file: UploadFile) -> Result<UploadedMedia, MediaError> {
        if file.is_empty() {
            return Err(MediaError::EmptyFile);
        }
        if !self.is_configured() {
            return Err(MediaError::NotConfigured);
        }

        let mut params = Vec::new();
        if let Some(folder) = &self.config.folder {
            params.push(("folder", folder.clone()));
        }

        let size = file.len();
        let mut part = Part::stream_with_length(file.bytes, size as u64).file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type)?;
        }

        let mut form = Form::new().part("file", part);
        for (key, value) in self.signed_params(params) {
            form = form.text(key, value);
        }

        let response = self
            .client
            .post(self.endpoint("auto", "upload"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::UnexpectedResponse(e.to_string()))?;

        info!(
            "Uploaded {} ({} bytes) to {} as {}",
            file.file_name, size, body.resource_type, body.public_id
        );

        Ok(UploadedMedia {
            url: body.secure_url,
            duration: body.duration,
        })
    }

    async fn destroy(&self, url: &str) -> Result<(), MediaError> {
        if !self.is_configured() {
            return Err(MediaError::NotConfigured);
        }

        let asset = parse_asset_url(url)?;
        let params = self.signed_params(vec![("public_id", asset.public_id.clone())]);

        let response = self
            .client
            .post(self.endpoint(&asset.resource_type, "destroy"))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }

        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|e| MediaError::UnexpectedResponse(e.to_string()))?;

        match body.result.as_str() {
            "ok" => {
                info!("Deleted {} asset {}", asset.resource_type, asset.public_id);
                Ok(())
            }
            "not found" => {
                debug!("Asset {} was already gone", asset.public_id);
                Ok(())
            }
            other => Err(MediaError::UnexpectedResponse(format!("destroy result '{}'", other))),
        }
    }
}

/// Hex digest of `k=v` pairs sorted by key, joined with `&`, with the secret appended
pub(crate) fn sign_params(params: &[(&str, String)], secret: &str, algorithm: SignatureAlgorithm) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    match algorithm {
        SignatureAlgorithm::Sha1 => {
            let mut hasher = Sha1::new();
            hasher.update(to_sign.as_bytes());
            hasher.update(secret.as_bytes());
            format!("{:x}", hasher.finalize())
        }
        SignatureAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(to_sign.as_bytes());
            hasher.update(secret.as_bytes());
            format!("{:x}", hasher.finalize())
        }
    }
}

#[derive(Debug, PartialEq)]
pub(crate) struct AssetRef {
    pub resource_type: String,
    pub public_id: String,
}

/// Recover resource type and public id from a delivery URL such as
/// `https://res.cloudinary.com/<cloud>/image/upload/v1712/vidtube/abc.png`
pub(crate) fn parse_asset_url(url: &str) -> Result<AssetRef, MediaError> {
    let invalid = || MediaError::InvalidAssetUrl(url.to_string());

    let parsed = url::Url::parse(url).map_err(|_| invalid())?;
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .ok_or_else(invalid)?;

    let upload_at = segments.iter().position(|s| *s == "upload").ok_or_else(invalid)?;
    if upload_at == 0 {
        return Err(invalid());
    }
    let resource_type = segments[upload_at - 1].to_string();

    let mut rest = &segments[upload_at + 1..];
    if let Some(first) = rest.first() {
        let is_version = first.len() > 1
            && first.starts_with('v')
            && first[1..].chars().all(|c| c.is_ascii_digit());
        if is_version {
            rest = &rest[1..];
        }
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let joined = rest.join("/");
    let public_id = match joined.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem.to_string(),
        _ => joined,
    };

    Ok(AssetRef { resource_type, public_id })
}
