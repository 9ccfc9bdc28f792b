use async_trait::async_trait;
use docstage_core::models::{Document, DocumentStatus, DuplicateMatch, NewDocument};
use docstage_core::{AppError, UserId};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::{has_sqlstate, UNIQUE_VIOLATION};

const DOCUMENT_COLUMNS: &str = "id, user_id, name, file_size, content_type, content_hash, \
     storage_key, storage_url, batch_id, status, created_at, updated_at";

/// Document persistence operations
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create_document(&self, document: NewDocument) -> Result<Document, AppError>;

    async fn get_document(&self, user_id: UserId, id: Uuid) -> Result<Option<Document>, AppError>;

    /// Newest first, optionally limited to one batch
    async fn list_documents(
        &self,
        user_id: UserId,
        batch_id: Option<Uuid>,
    ) -> Result<Vec<Document>, AppError>;

    /// First stored document duplicating the file; hash matches win over name+size.
    /// Rows of `exclude_batch` are not considered.
    async fn check_duplicate(
        &self,
        user_id: UserId,
        content_hash: &str,
        name: &str,
        file_size: i64,
        exclude_batch: Option<Uuid>,
    ) -> Result<Option<DuplicateMatch>, AppError>;

    async fn update_status(
        &self,
        user_id: UserId,
        id: Uuid,
        status: DocumentStatus,
    ) -> Result<Document, AppError>;

    /// Returns false when no such document exists
    async fn delete_document(&self, user_id: UserId, id: Uuid) -> Result<bool, AppError>;
}

/// Postgres-backed document repository
#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for DocumentRepository {
    #[tracing::instrument(skip(self, document), fields(db.table = "documents", db.operation = "insert", user_id = %document.user_id, batch_id = %document.batch_id))]
    async fn create_document(&self, document: NewDocument) -> Result<Document, AppError> {
        let query = format!(
            r#"
            INSERT INTO documents
                (user_id, name, file_size, content_type, content_hash, storage_key, storage_url, batch_id, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {DOCUMENT_COLUMNS}
            "#
        );

        let result = sqlx::query_as::<Postgres, Document>(&query)
            .bind(document.user_id)
            .bind(&document.name)
            .bind(document.file_size)
            .bind(&document.content_type)
            .bind(&document.content_hash)
            .bind(&document.storage_key)
            .bind(&document.storage_url)
            .bind(document.batch_id)
            .bind(document.status)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(row) => Ok(row),
            Err(e) if has_sqlstate(&e, UNIQUE_VIOLATION) => Err(AppError::Persistence(format!(
                "Storage key already recorded: {}",
                document.storage_key
            ))),
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select", db.record_id = %id))]
    async fn get_document(&self, user_id: UserId, id: Uuid) -> Result<Option<Document>, AppError> {
        let query = format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE user_id = $1 AND id = $2");

        let document = sqlx::query_as::<Postgres, Document>(&query)
            .bind(user_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(document)
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select"))]
    async fn list_documents(
        &self,
        user_id: UserId,
        batch_id: Option<Uuid>,
    ) -> Result<Vec<Document>, AppError> {
        let query = format!("SELECT {DOCUMENT_COLUMNS} FROM get_user_documents($1, $2)");

        let documents = sqlx::query_as::<Postgres, Document>(&query)
            .bind(user_id)
            .bind(batch_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(documents)
    }

    #[tracing::instrument(skip(self, content_hash), fields(db.table = "documents", db.operation = "select"))]
    async fn check_duplicate(
        &self,
        user_id: UserId,
        content_hash: &str,
        name: &str,
        file_size: i64,
        exclude_batch: Option<Uuid>,
    ) -> Result<Option<DuplicateMatch>, AppError> {
        let found = sqlx::query_as::<Postgres, DuplicateMatch>(
            "SELECT document_id, match_kind FROM check_duplicate_document($1, $2, $3, $4, $5)",
        )
        .bind(user_id)
        .bind(content_hash)
        .bind(name)
        .bind(file_size)
        .bind(exclude_batch)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found)
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "update", db.record_id = %id))]
    async fn update_status(
        &self,
        user_id: UserId,
        id: Uuid,
        status: DocumentStatus,
    ) -> Result<Document, AppError> {
        let query = format!(
            r#"
            UPDATE documents
            SET status = $3, updated_at = NOW()
            WHERE user_id = $1 AND id = $2
            RETURNING {DOCUMENT_COLUMNS}
            "#
        );

        sqlx::query_as::<Postgres, Document>(&query)
            .bind(user_id)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Document {}", id)))
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "delete", db.record_id = %id))]
    async fn delete_document(&self, user_id: UserId, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
