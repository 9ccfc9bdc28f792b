use async_trait::async_trait;
use docstage_core::models::{Document, NewTag, Tag, TagSummary, UpdateTag};
use docstage_core::{AppError, UserId};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::transaction::TransactionGuard;
use super::{has_sqlstate, FOREIGN_KEY_VIOLATION, UNIQUE_VIOLATION};

const TAG_COLUMNS: &str =
    "id, user_id, name, description, industry, schema, sample_document_id, created_at, updated_at";

/// Tag persistence operations
#[async_trait]
pub trait TagStore: Send + Sync {
    async fn create_tag(&self, user_id: UserId, tag: NewTag) -> Result<Tag, AppError>;

    async fn get_tag(&self, user_id: UserId, id: Uuid) -> Result<Option<Tag>, AppError>;

    /// Tags ordered by name, each with its attached document count
    async fn list_tags(&self, user_id: UserId) -> Result<Vec<TagSummary>, AppError>;

    async fn update_tag(&self, user_id: UserId, id: Uuid, update: UpdateTag)
        -> Result<Tag, AppError>;

    async fn delete_tag(&self, user_id: UserId, id: Uuid) -> Result<bool, AppError>;

    /// Attach documents to a tag. Already attached documents are skipped; returns
    /// the number of new associations.
    async fn attach_documents(
        &self,
        user_id: UserId,
        tag_id: Uuid,
        document_ids: &[Uuid],
    ) -> Result<u64, AppError>;

    async fn detach_document(
        &self,
        user_id: UserId,
        tag_id: Uuid,
        document_id: Uuid,
    ) -> Result<bool, AppError>;

    async fn list_tag_documents(
        &self,
        user_id: UserId,
        tag_id: Uuid,
    ) -> Result<Vec<Document>, AppError>;
}

/// Postgres-backed tag repository
#[derive(Clone)]
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_documents_owned(
        &self,
        user_id: UserId,
        document_ids: &[Uuid],
    ) -> Result<(), AppError> {
        let owned = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(DISTINCT id) FROM documents WHERE user_id = $1 AND id = ANY($2)",
        )
        .bind(user_id)
        .bind(document_ids)
        .fetch_one(&self.pool)
        .await?;

        let mut requested = document_ids.to_vec();
        requested.sort();
        requested.dedup();

        if owned as usize != requested.len() {
            return Err(AppError::NotFound(
                "Some documents not found or do not belong to user".to_string(),
            ));
        }
        Ok(())
    }
}

fn map_write_error(err: sqlx::Error, name: &str) -> AppError {
    if has_sqlstate(&err, UNIQUE_VIOLATION) {
        AppError::InvalidInput(format!("A tag named '{}' already exists", name))
    } else if has_sqlstate(&err, FOREIGN_KEY_VIOLATION) {
        AppError::InvalidInput("Sample document not found".to_string())
    } else {
        err.into()
    }
}

#[async_trait]
impl TagStore for TagRepository {
    #[tracing::instrument(skip(self, tag), fields(db.table = "tags", db.operation = "insert", tag.name = %tag.name))]
    async fn create_tag(&self, user_id: UserId, tag: NewTag) -> Result<Tag, AppError> {
        if let Some(sample_id) = tag.sample_document_id {
            self.ensure_documents_owned(user_id, &[sample_id]).await?;
        }

        let query = format!(
            r#"
            INSERT INTO tags (user_id, name, description, industry, schema, sample_document_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TAG_COLUMNS}
            "#
        );

        sqlx::query_as::<Postgres, Tag>(&query)
            .bind(user_id)
            .bind(&tag.name)
            .bind(&tag.description)
            .bind(&tag.industry)
            .bind(&tag.schema)
            .bind(tag.sample_document_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &tag.name))
    }

    #[tracing::instrument(skip(self), fields(db.table = "tags", db.operation = "select", db.record_id = %id))]
    async fn get_tag(&self, user_id: UserId, id: Uuid) -> Result<Option<Tag>, AppError> {
        let query = format!("SELECT {TAG_COLUMNS} FROM tags WHERE user_id = $1 AND id = $2");

        let tag = sqlx::query_as::<Postgres, Tag>(&query)
            .bind(user_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(tag)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tags", db.operation = "select"))]
    async fn list_tags(&self, user_id: UserId) -> Result<Vec<TagSummary>, AppError> {
        let tags = sqlx::query_as::<Postgres, TagSummary>(
            r#"
            SELECT t.id, t.user_id, t.name, t.description, t.industry, t.schema,
                   t.sample_document_id, t.created_at, t.updated_at,
                   COUNT(td.document_id) AS document_count
            FROM tags t
            LEFT JOIN tag_documents td ON td.tag_id = t.id
            WHERE t.user_id = $1
            GROUP BY t.id
            ORDER BY t.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    #[tracing::instrument(skip(self, update), fields(db.table = "tags", db.operation = "update", db.record_id = %id))]
    async fn update_tag(
        &self,
        user_id: UserId,
        id: Uuid,
        update: UpdateTag,
    ) -> Result<Tag, AppError> {
        let current = self
            .get_tag(user_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tag {}", id)))?;

        if let Some(Some(sample_id)) = update.sample_document_id {
            self.ensure_documents_owned(user_id, &[sample_id]).await?;
        }

        let name = update.name.unwrap_or(current.name);
        let description = update.description.unwrap_or(current.description);
        let industry = update.industry.unwrap_or(current.industry);
        let schema = update.schema.or(current.schema);
        let sample_document_id = update
            .sample_document_id
            .unwrap_or(current.sample_document_id);

        let query = format!(
            r#"
            UPDATE tags
            SET name = $3, description = $4, industry = $5, schema = $6,
                sample_document_id = $7, updated_at = NOW()
            WHERE user_id = $1 AND id = $2
            RETURNING {TAG_COLUMNS}
            "#
        );

        sqlx::query_as::<Postgres, Tag>(&query)
            .bind(user_id)
            .bind(id)
            .bind(&name)
            .bind(&description)
            .bind(&industry)
            .bind(&schema)
            .bind(sample_document_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &name))?
            .ok_or_else(|| AppError::NotFound(format!("Tag {}", id)))
    }

    #[tracing::instrument(skip(self), fields(db.table = "tags", db.operation = "delete", db.record_id = %id))]
    async fn delete_tag(&self, user_id: UserId, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tags WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self, document_ids), fields(db.table = "tag_documents", db.operation = "insert", db.record_id = %tag_id, count = document_ids.len()))]
    async fn attach_documents(
        &self,
        user_id: UserId,
        tag_id: Uuid,
        document_ids: &[Uuid],
    ) -> Result<u64, AppError> {
        if document_ids.is_empty() {
            return Ok(0);
        }
        if self.get_tag(user_id, tag_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Tag {}", tag_id)));
        }
        self.ensure_documents_owned(user_id, document_ids).await?;

        let mut tx = TransactionGuard::begin(&self.pool).await?;
        let mut attached = 0;

        for document_id in document_ids {
            let result = sqlx::query(
                "INSERT INTO tag_documents (tag_id, document_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(tag_id)
            .bind(document_id)
            .execute(&mut **tx)
            .await?;
            attached += result.rows_affected();
        }

        sqlx::query("UPDATE tags SET updated_at = NOW() WHERE id = $1")
            .bind(tag_id)
            .execute(&mut **tx)
            .await?;

        tx.commit().await?;

        tracing::info!(tag_id = %tag_id, attached, "Attached documents to tag");

        Ok(attached)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tag_documents", db.operation = "delete", db.record_id = %tag_id))]
    async fn detach_document(
        &self,
        user_id: UserId,
        tag_id: Uuid,
        document_id: Uuid,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM tag_documents td
            USING tags t
            WHERE td.tag_id = t.id AND t.user_id = $1 AND td.tag_id = $2 AND td.document_id = $3
            "#,
        )
        .bind(user_id)
        .bind(tag_id)
        .bind(document_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tag_documents", db.operation = "select", db.record_id = %tag_id))]
    async fn list_tag_documents(
        &self,
        user_id: UserId,
        tag_id: Uuid,
    ) -> Result<Vec<Document>, AppError> {
        let documents = sqlx::query_as::<Postgres, Document>(
            r#"
            SELECT d.id, d.user_id, d.name, d.file_size, d.content_type, d.content_hash,
                   d.storage_key, d.storage_url, d.batch_id, d.status, d.created_at, d.updated_at
            FROM tag_documents td
            JOIN documents d ON d.id = td.document_id
            JOIN tags t ON t.id = td.tag_id
            WHERE t.user_id = $1 AND td.tag_id = $2
            ORDER BY td.created_at ASC, d.id
            "#,
        )
        .bind(user_id)
        .bind(tag_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }
}
