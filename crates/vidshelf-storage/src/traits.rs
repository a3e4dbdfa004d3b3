//! Blob store abstraction trait
//!
//! This module defines the BlobStore trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;
use vidshelf_core::AppError;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Listing failed: {0}")]
    ListFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("No base URL available to address {0}")]
    MissingBaseUrl(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::ConfigError(msg) | StorageError::MissingBaseUrl(msg) => {
                AppError::Internal(msg)
            }
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Reference to bytes written by [`BlobStore::store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Name of the stored object, without any directory or prefix.
    pub file_name: String,
    /// Backend-specific handle: a filesystem path (local) or a public URL (object store).
    pub stored_location: String,
}

/// One object found while listing a blob store.
#[derive(Debug, Clone)]
pub struct BlobEntry {
    pub file_name: String,
    pub stored_location: String,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

impl BlobEntry {
    pub fn as_stored(&self) -> StoredBlob {
        StoredBlob {
            file_name: self.file_name.clone(),
            stored_location: self.stored_location.clone(),
        }
    }

    /// Best available upload time: creation, then modification, then now.
    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.created.or(self.modified).unwrap_or_else(Utc::now)
    }
}

/// Blob store abstraction trait
///
/// Both backends (local directory, object store bucket) implement this trait so the
/// catalog can keep its records consistent with stored bytes without knowing where
/// they live.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist bytes under a collision-resistant name derived from `suggested_name`.
    ///
    /// Creates the target directory or prefix if it does not exist yet.
    async fn store(&self, suggested_name: &str, data: Bytes) -> StorageResult<StoredBlob>;

    /// Public URL for a stored blob.
    ///
    /// The local backend needs a base URL (from the request or from configuration);
    /// the object store backend issues its own URLs and ignores it.
    fn url_for(&self, blob: &StoredBlob, base_url: Option<&str>) -> StorageResult<String>;

    /// Remove the bytes behind `stored_location`. Removing a missing object succeeds.
    async fn delete(&self, stored_location: &str) -> StorageResult<()>;

    /// Enumerate stored video files (extension on the video allowlist).
    async fn list(&self) -> StorageResult<Vec<BlobEntry>>;

    /// Read a stored file by name, for serving.
    async fn read(&self, file_name: &str) -> StorageResult<Bytes>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
