use std::sync::Arc;

use docstage_core::models::{DocumentResponse, Tag, TagResponse, UpdateTag};
use docstage_core::{AppError, UserId};
use docstage_db::{DocumentStore, TagStore};
use docstage_staging::TagWizard;
use uuid::Uuid;
use validator::Validate;

/// Tag management for one user's document classes
#[derive(Clone)]
pub struct TagService {
    tags: Arc<dyn TagStore>,
    documents: Arc<dyn DocumentStore>,
}

impl TagService {
    pub fn new(tags: Arc<dyn TagStore>, documents: Arc<dyn DocumentStore>) -> Self {
        Self { tags, documents }
    }

    /// Persist the tag built by a wizard that reached its review step.
    #[tracing::instrument(skip(self, wizard), fields(user_id = %user_id))]
    pub async fn create_from_wizard(
        &self,
        user_id: UserId,
        wizard: TagWizard,
    ) -> Result<Tag, AppError> {
        let request = wizard.finish()?;

        if let Some(sample_id) = request.sample_document_id {
            if self.documents.get_document(user_id, sample_id).await?.is_none() {
                return Err(AppError::NotFound(format!("Sample document {}", sample_id)));
            }
        }

        let tag = self.tags.create_tag(user_id, request).await?;
        tracing::info!(tag_id = %tag.id, name = %tag.name, "Tag created");
        Ok(tag)
    }

    pub async fn list_tags(&self, user_id: UserId) -> Result<Vec<TagResponse>, AppError> {
        let tags = self.tags.list_tags(user_id).await?;
        Ok(tags.into_iter().map(TagResponse::from).collect())
    }

    pub async fn update_tag(
        &self,
        user_id: UserId,
        id: Uuid,
        update: UpdateTag,
    ) -> Result<Tag, AppError> {
        update.validate()?;
        self.tags.update_tag(user_id, id, update).await
    }

    pub async fn delete_tag(&self, user_id: UserId, id: Uuid) -> Result<(), AppError> {
        if !self.tags.delete_tag(user_id, id).await? {
            return Err(AppError::NotFound(format!("Tag {}", id)));
        }
        Ok(())
    }

    /// Attach documents to a tag; returns how many were newly attached
    #[tracing::instrument(skip(self, document_ids), fields(user_id = %user_id, tag_id = %tag_id))]
    pub async fn attach(
        &self,
        user_id: UserId,
        tag_id: Uuid,
        document_ids: &[Uuid],
    ) -> Result<u64, AppError> {
        self.tags
            .attach_documents(user_id, tag_id, document_ids)
            .await
    }

    pub async fn detach(
        &self,
        user_id: UserId,
        tag_id: Uuid,
        document_id: Uuid,
    ) -> Result<(), AppError> {
        if !self
            .tags
            .detach_document(user_id, tag_id, document_id)
            .await?
        {
            return Err(AppError::NotFound(format!(
                "Document {} is not attached to tag {}",
                document_id, tag_id
            )));
        }
        Ok(())
    }

    pub async fn tag_documents(
        &self,
        user_id: UserId,
        tag_id: Uuid,
    ) -> Result<Vec<DocumentResponse>, AppError> {
        if self.tags.get_tag(user_id, tag_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Tag {}", tag_id)));
        }
        let documents = self.tags.list_tag_documents(user_id, tag_id).await?;
        Ok(documents.into_iter().map(DocumentResponse::from).collect())
    }
}
