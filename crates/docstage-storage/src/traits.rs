//! Object storage seam for document bytes.

use crate::StorageBackend;
use async_trait::async_trait;
use docstage_core::AppError;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Failure of a single object storage call
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Could not write object: {0}")]
    WriteFailed(String),

    #[error("Could not read object: {0}")]
    ReadFailed(String),

    #[error("Could not remove object: {0}")]
    RemoveFailed(String),

    #[error("No object stored under {0}")]
    NotFound(String),

    #[error("Rejected storage key: {0}")]
    InvalidKey(String),

    #[error("Backend failure: {0}")]
    Backend(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Storage misconfigured: {0}")]
    Misconfigured(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("Stored file {}", key)),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Backend holding uploaded document bytes.
///
/// Callers only need a unique path per file; they never depend on a backend's
/// internal layout beyond the key returned by [`Storage::upload`].
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` under a key derived from `user_id` and `path_hint`; returns (key, url)
    async fn upload(
        &self,
        user_id: Uuid,
        path_hint: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<(String, String)>;

    /// Full content stored under `storage_key`
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Delete a file by its storage key. Deleting a missing file succeeds.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Stable access URL for a stored file
    fn public_url(&self, storage_key: &str) -> StorageResult<String>;

    /// Time-limited access URL for a stored file
    async fn signed_url(&self, storage_key: &str, expires_in: Duration) -> StorageResult<String>;

    fn backend_type(&self) -> StorageBackend;
}
