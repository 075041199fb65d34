//! Remote image hosting.
//!
//! The synchronizer only needs two calls from the image host: push a local
//! file and get back a servable URL plus a handle, and delete by that handle.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::product::ImageRef;
use crate::domain::types::PublicId;

pub mod cloudinary;

/// Failures reported by an [`ImageStorage`] implementation.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The local upload file could not be read.
    #[error("failed to read upload file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Transport-level failure talking to the image service.
    #[error("image service request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The image service answered but refused the operation.
    #[error("image service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    /// The image service answered with something we cannot use.
    #[error("image service returned an unusable response: {0}")]
    InvalidResponse(String),
}

/// Remote store for product images.
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Upload the file at `path` into the configured folder.
    async fn upload(&self, path: &Path) -> Result<ImageRef, StorageError>;
    /// Delete the hosted image identified by `public_id`.
    async fn destroy(&self, public_id: &PublicId) -> Result<(), StorageError>;
}
