//! Hosted media storage.
//!
//! Uploaded files never touch local disk: handlers buffer the multipart field
//! and hand the bytes to a [`MediaStore`], which returns the public URL the
//! database keeps.

pub mod cloudinary;

use async_trait::async_trait;
use axum::body::Bytes;
use serde::Serialize;
use thiserror::Error;

pub use cloudinary::CloudinaryStore;

/// A file received from a client, ready to be uploaded
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// What the provider reports back after a successful upload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadedMedia {
    pub url: String,
    /// Seconds, present for audio and video assets
    pub duration: Option<f64>,
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("uploaded file is empty")]
    EmptyFile,

    #[error("media store is not configured")]
    NotConfigured,

    #[error("not a managed asset URL: {0}")]
    InvalidAssetUrl(String),

    #[error("provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("unexpected provider response: {0}")]
    UnexpectedResponse(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload a file and return its hosted location
    async fn upload(&self, file: UploadFile) -> Result<UploadedMedia, MediaError>;

    /// Remove a previously uploaded asset, identified by the URL `upload` returned
    async fn destroy(&self, url: &str) -> Result<(), MediaError>;
}
