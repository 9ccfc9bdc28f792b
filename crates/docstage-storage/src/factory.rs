#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use docstage_core::Config;
use std::sync::Arc;

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::Misconfigured("S3_BUCKET not configured".to_string()))?;
            let region = config.s3_region.clone().ok_or_else(|| {
                StorageError::Misconfigured("S3_REGION or AWS_REGION not configured".to_string())
            })?;

            let storage = S3Storage::new(bucket, region, config.s3_endpoint.clone()).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::Misconfigured(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::Misconfigured("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = config.local_storage_base_url.clone().ok_or_else(|| {
                StorageError::Misconfigured("LOCAL_STORAGE_BASE_URL not configured".to_string())
            })?;

            let storage = LocalStorage::new(base_path, base_url).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::Misconfigured(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;

    fn config(dir: &std::path::Path) -> Config {
        Config {
            environment: "test".to_string(),
            database_url: "postgres://localhost/docstage".to_string(),
            db_max_connections: 5,
            db_timeout_seconds: 5,
            jwt_secret: "x".repeat(32),
            storage_backend: StorageBackend::Local,
            local_storage_path: Some(dir.display().to_string()),
            local_storage_base_url: Some("http://localhost:3000/files".to_string()),
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            max_document_size_bytes: 1024,
            document_allowed_content_types: vec!["application/pdf".to_string()],
            signed_url_expiry_secs: 60,
        }
    }

    #[tokio::test]
    async fn test_creates_local_backend() {
        let dir = tempfile::tempdir().unwrap();
        let storage = create_storage(&config(dir.path())).await.unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Local);
    }

    #[tokio::test]
    async fn test_missing_local_path_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.local_storage_path = None;
        assert!(matches!(
            create_storage(&config).await,
            Err(StorageError::Misconfigured(_))
        ));
    }
}
