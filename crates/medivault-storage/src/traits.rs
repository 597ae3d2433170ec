//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends must implement this trait. The image repository
/// works against it and never sees backend implementation details.
///
/// **Key format:** keys are owner-scoped: `images/{user_id}/{filename}`.
/// See the crate root documentation.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload a payload and return (storage_key, storage_url)
    ///
    /// The storage_key is the internal identifier used to reference the file;
    /// the storage_url is the publicly accessible URL to it.
    async fn upload(
        &self,
        user_id: Uuid,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<(String, String)>;

    /// Download a payload by its storage key
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Delete a payload by its storage key
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Public URL for a stored payload
    fn url(&self, storage_key: &str) -> String;

    /// Check if a payload exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Size in bytes of a stored payload, if it exists.
    async fn content_length(&self, storage_key: &str) -> StorageResult<u64>;
}
