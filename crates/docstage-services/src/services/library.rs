use std::sync::Arc;
use std::time::Duration;

use docstage_core::models::{DocumentResponse, DocumentStatus};
use docstage_core::{AppError, UserId};
use docstage_db::DocumentStore;
use docstage_storage::Storage;
use uuid::Uuid;

/// Read access to a user's stored documents
#[derive(Clone)]
pub struct LibraryService {
    documents: Arc<dyn DocumentStore>,
    storage: Arc<dyn Storage>,
    default_expiry: Duration,
}

impl LibraryService {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        storage: Arc<dyn Storage>,
        default_expiry: Duration,
    ) -> Self {
        Self {
            documents,
            storage,
            default_expiry,
        }
    }

    pub async fn list_documents(
        &self,
        user_id: UserId,
        batch_id: Option<Uuid>,
    ) -> Result<Vec<DocumentResponse>, AppError> {
        let documents = self.documents.list_documents(user_id, batch_id).await?;
        Ok(documents.into_iter().map(DocumentResponse::from).collect())
    }

    pub async fn get_document(
        &self,
        user_id: UserId,
        id: Uuid,
    ) -> Result<DocumentResponse, AppError> {
        self.documents
            .get_document(user_id, id)
            .await?
            .map(DocumentResponse::from)
            .ok_or_else(|| AppError::NotFound(format!("Document {}", id)))
    }

    /// Time-limited URL for an uploaded document. Uses the configured expiry when
    /// `expires_in` is `None`.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, document_id = %id))]
    pub async fn access_url(
        &self,
        user_id: UserId,
        id: Uuid,
        expires_in: Option<Duration>,
    ) -> Result<String, AppError> {
        let document = self
            .documents
            .get_document(user_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Document {}", id)))?;

        if document.status != DocumentStatus::Uploaded {
            return Err(AppError::InvalidInput(format!(
                "Document {} is {}, not uploaded",
                id, document.status
            )));
        }

        let url = self
            .storage
            .signed_url(
                &document.storage_key,
                expires_in.unwrap_or(self.default_expiry),
            )
            .await?;
        Ok(url)
    }

    /// Remove a document's stored bytes and its metadata row.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, document_id = %id))]
    pub async fn delete_document(&self, user_id: UserId, id: Uuid) -> Result<(), AppError> {
        let document = self
            .documents
            .get_document(user_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Document {}", id)))?;

        self.storage.delete(&document.storage_key).await?;
        self.documents.delete_document(user_id, id).await?;

        tracing::info!(key = %document.storage_key, "Document deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::upload::UploadService;
    use crate::testing::{temp_storage, InMemoryDocumentStore};
    use docstage_core::models::CandidateFile;
    use docstage_staging::FileValidator;

    async fn seeded() -> (LibraryService, Arc<dyn Storage>, UserId, Vec<Uuid>, tempfile::TempDir) {
        let store = Arc::new(InMemoryDocumentStore::default());
        let (storage, dir) = temp_storage().await;
        let uploads = UploadService::new(
            store.clone(),
            storage.clone(),
            FileValidator::new(1024, vec!["application/pdf".to_string()]),
        );
        let user = Uuid::new_v4();
        let report = uploads
            .upload_batch(
                user,
                &[
                    CandidateFile::from_bytes("a.pdf", "application/pdf", b"a".to_vec()),
                    CandidateFile::from_bytes("b.pdf", "application/pdf", b"b".to_vec()),
                ],
            )
            .await;
        let ids = report.uploaded().map(|d| d.id).collect();
        let library = LibraryService::new(store, storage.clone(), Duration::from_secs(60));
        (library, storage, user, ids, dir)
    }

    #[tokio::test]
    async fn test_lists_only_own_documents() {
        let (library, _storage, user, ids, _dir) = seeded().await;

        let listed = library.list_documents(user, None).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|d| ids.contains(&d.id)));

        let batch = listed[0].batch_id;
        assert_eq!(library.list_documents(user, Some(batch)).await.unwrap().len(), 2);
        assert!(library
            .list_documents(user, Some(Uuid::new_v4()))
            .await
            .unwrap()
            .is_empty());
        assert!(library
            .list_documents(Uuid::new_v4(), None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_access_url_is_signed() {
        let (library, _storage, user, ids, _dir) = seeded().await;

        let url = library.access_url(user, ids[0], None).await.unwrap();
        assert!(url.contains("?expires="));

        assert!(matches!(
            library.access_url(Uuid::new_v4(), ids[0], None).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_bytes_and_row() {
        let (library, storage, user, ids, _dir) = seeded().await;
        let key = library.get_document(user, ids[0]).await.unwrap().url;
        assert!(key.starts_with("http://localhost:3000/files/"));

        library.delete_document(user, ids[0]).await.unwrap();

        assert!(matches!(
            library.get_document(user, ids[0]).await,
            Err(AppError::NotFound(_))
        ));
        let stored_key = key.trim_start_matches("http://localhost:3000/files/");
        assert!(!storage.exists(stored_key).await.unwrap());
    }
}
