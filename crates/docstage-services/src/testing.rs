//! In-memory stores and fixtures for service tests.

use async_trait::async_trait;
use chrono::Utc;
use docstage_core::models::{
    Document, DocumentStatus, DuplicateMatch, DuplicateMatchKind, NewDocument, NewTag, Tag,
    TagSummary, UpdateTag,
};
use docstage_core::{AppError, UserId};
use docstage_db::{DocumentStore, TagStore};
use docstage_storage::{LocalStorage, Storage, StorageBackend, StorageError, StorageResult};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: Mutex<Vec<Document>>,
    fail_writes: bool,
}

impl InMemoryDocumentStore {
    /// A store whose every `create_document` call fails
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Default::default()
        }
    }

    pub async fn all(&self) -> Vec<Document> {
        self.documents.lock().await.clone()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn create_document(&self, document: NewDocument) -> Result<Document, AppError> {
        if self.fail_writes {
            return Err(AppError::Persistence("store unavailable".to_string()));
        }
        let now = Utc::now();
        let row = Document {
            id: Uuid::new_v4(),
            user_id: document.user_id,
            name: document.name,
            file_size: document.file_size,
            content_type: document.content_type,
            content_hash: document.content_hash,
            storage_key: document.storage_key,
            storage_url: document.storage_url,
            batch_id: document.batch_id,
            status: document.status,
            created_at: now,
            updated_at: now,
        };
        self.documents.lock().await.push(row.clone());
        Ok(row)
    }

    async fn get_document(&self, user_id: UserId, id: Uuid) -> Result<Option<Document>, AppError> {
        Ok(self
            .documents
            .lock()
            .await
            .iter()
            .find(|d| d.user_id == user_id && d.id == id)
            .cloned())
    }

    async fn list_documents(
        &self,
        user_id: UserId,
        batch_id: Option<Uuid>,
    ) -> Result<Vec<Document>, AppError> {
        Ok(self
            .documents
            .lock()
            .await
            .iter()
            .rev()
            .filter(|d| d.user_id == user_id && batch_id.map_or(true, |b| d.batch_id == b))
            .cloned()
            .collect())
    }

    async fn check_duplicate(
        &self,
        user_id: UserId,
        content_hash: &str,
        name: &str,
        file_size: i64,
        exclude_batch: Option<Uuid>,
    ) -> Result<Option<DuplicateMatch>, AppError> {
        let documents = self.documents.lock().await;
        let live: Vec<&Document> = documents
            .iter()
            .filter(|d| d.user_id == user_id && d.status != DocumentStatus::Failed)
            .filter(|d| exclude_batch != Some(d.batch_id))
            .collect();

        if let Some(doc) = live.iter().find(|d| d.content_hash == content_hash) {
            return Ok(Some(DuplicateMatch {
                document_id: doc.id,
                match_kind: DuplicateMatchKind::Hash,
            }));
        }
        Ok(live
            .iter()
            .find(|d| d.name == name && d.file_size == file_size)
            .map(|doc| DuplicateMatch {
                document_id: doc.id,
                match_kind: DuplicateMatchKind::NameSize,
            }))
    }

    async fn update_status(
        &self,
        user_id: UserId,
        id: Uuid,
        status: DocumentStatus,
    ) -> Result<Document, AppError> {
        let mut documents = self.documents.lock().await;
        let doc = documents
            .iter_mut()
            .find(|d| d.user_id == user_id && d.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Document {}", id)))?;
        doc.status = status;
        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }

    async fn delete_document(&self, user_id: UserId, id: Uuid) -> Result<bool, AppError> {
        let mut documents = self.documents.lock().await;
        let before = documents.len();
        documents.retain(|d| !(d.user_id == user_id && d.id == id));
        Ok(documents.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryTagStore {
    tags: Mutex<Vec<Tag>>,
    links: Mutex<BTreeSet<(Uuid, Uuid)>>,
    documents: Arc<InMemoryDocumentStore>,
}

impl InMemoryTagStore {
    pub fn with_documents(documents: Arc<InMemoryDocumentStore>) -> Self {
        Self {
            documents,
            ..Default::default()
        }
    }
}

#[async_trait]
impl TagStore for InMemoryTagStore {
    async fn create_tag(&self, user_id: UserId, tag: NewTag) -> Result<Tag, AppError> {
        let mut tags = self.tags.lock().await;
        if tags.iter().any(|t| t.user_id == user_id && t.name == tag.name) {
            return Err(AppError::InvalidInput(format!(
                "A tag named '{}' already exists",
                tag.name
            )));
        }
        let now = Utc::now();
        let row = Tag {
            id: Uuid::new_v4(),
            user_id,
            name: tag.name,
            description: tag.description,
            industry: tag.industry,
            schema: tag.schema,
            sample_document_id: tag.sample_document_id,
            created_at: now,
            updated_at: now,
        };
        tags.push(row.clone());
        Ok(row)
    }

    async fn get_tag(&self, user_id: UserId, id: Uuid) -> Result<Option<Tag>, AppError> {
        Ok(self
            .tags
            .lock()
            .await
            .iter()
            .find(|t| t.user_id == user_id && t.id == id)
            .cloned())
    }

    async fn list_tags(&self, user_id: UserId) -> Result<Vec<TagSummary>, AppError> {
        let tags = self.tags.lock().await;
        let links = self.links.lock().await;
        let mut summaries: Vec<TagSummary> = tags
            .iter()
            .filter(|t| t.user_id == user_id)
            .map(|t| TagSummary {
                document_count: links.iter().filter(|(tag, _)| *tag == t.id).count() as i64,
                tag: t.clone(),
            })
            .collect();
        summaries.sort_by(|a, b| a.tag.name.cmp(&b.tag.name));
        Ok(summaries)
    }

    async fn update_tag(
        &self,
        user_id: UserId,
        id: Uuid,
        update: UpdateTag,
    ) -> Result<Tag, AppError> {
        let mut tags = self.tags.lock().await;
        let tag = tags
            .iter_mut()
            .find(|t| t.user_id == user_id && t.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Tag {}", id)))?;
        if let Some(name) = update.name {
            tag.name = name;
        }
        if let Some(description) = update.description {
            tag.description = description;
        }
        if let Some(industry) = update.industry {
            tag.industry = industry;
        }
        if let Some(schema) = update.schema {
            tag.schema = Some(schema);
        }
        if let Some(sample) = update.sample_document_id {
            tag.sample_document_id = sample;
        }
        tag.updated_at = Utc::now();
        Ok(tag.clone())
    }

    async fn delete_tag(&self, user_id: UserId, id: Uuid) -> Result<bool, AppError> {
        let mut tags = self.tags.lock().await;
        let before = tags.len();
        tags.retain(|t| !(t.user_id == user_id && t.id == id));
        self.links.lock().await.retain(|(tag, _)| *tag != id);
        Ok(tags.len() < before)
    }

    async fn attach_documents(
        &self,
        user_id: UserId,
        tag_id: Uuid,
        document_ids: &[Uuid],
    ) -> Result<u64, AppError> {
        if self.get_tag(user_id, tag_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Tag {}", tag_id)));
        }
        for id in document_ids {
            if self.documents.get_document(user_id, *id).await?.is_none() {
                return Err(AppError::NotFound(
                    "Some documents not found or do not belong to user".to_string(),
                ));
            }
        }
        let mut links = self.links.lock().await;
        Ok(document_ids
            .iter()
            .filter(|id| links.insert((tag_id, **id)))
            .count() as u64)
    }

    async fn detach_document(
        &self,
        user_id: UserId,
        tag_id: Uuid,
        document_id: Uuid,
    ) -> Result<bool, AppError> {
        if self.get_tag(user_id, tag_id).await?.is_none() {
            return Ok(false);
        }
        Ok(self.links.lock().await.remove(&(tag_id, document_id)))
    }

    async fn list_tag_documents(
        &self,
        user_id: UserId,
        tag_id: Uuid,
    ) -> Result<Vec<Document>, AppError> {
        if self.get_tag(user_id, tag_id).await?.is_none() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = self
            .links
            .lock()
            .await
            .iter()
            .filter(|(tag, _)| *tag == tag_id)
            .map(|(_, doc)| *doc)
            .collect();
        let mut documents = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(doc) = self.documents.get_document(user_id, id).await? {
                documents.push(doc);
            }
        }
        Ok(documents)
    }
}

/// Local storage rooted in a fresh temp dir; keep the dir alive for the test
pub async fn temp_storage() -> (Arc<dyn Storage>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::new(dir.path(), "http://localhost:3000/files".to_string())
        .await
        .unwrap();
    (Arc::new(storage), dir)
}

/// Storage double whose writes either fail or land under an unexpected key
pub struct BrokenStorage {
    misplace: bool,
}

impl BrokenStorage {
    pub fn failing() -> Self {
        Self { misplace: false }
    }

    /// Writes succeed but report a key other than the one requested
    pub fn misplacing() -> Self {
        Self { misplace: true }
    }
}

#[async_trait]
impl Storage for BrokenStorage {
    async fn upload(
        &self,
        user_id: Uuid,
        _path_hint: &str,
        _content_type: &str,
        _data: Vec<u8>,
    ) -> StorageResult<(String, String)> {
        if self.misplace {
            let key = format!("documents/{}/elsewhere.pdf", user_id);
            let url = self.public_url(&key)?;
            return Ok((key, url));
        }
        Err(StorageError::WriteFailed("disk full".to_string()))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        Err(StorageError::NotFound(storage_key.to_string()))
    }

    async fn delete(&self, _storage_key: &str) -> StorageResult<()> {
        Ok(())
    }

    async fn exists(&self, _storage_key: &str) -> StorageResult<bool> {
        Ok(false)
    }

    fn public_url(&self, storage_key: &str) -> StorageResult<String> {
        Ok(format!("http://localhost:3000/files/{}", storage_key))
    }

    async fn signed_url(&self, storage_key: &str, _expires_in: Duration) -> StorageResult<String> {
        self.public_url(storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
