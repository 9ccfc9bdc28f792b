use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

use super::user::UserId;

/// Upload lifecycle of a persisted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "document_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Uploaded,
    Failed,
}

impl Display for DocumentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DocumentStatus::Pending => write!(f, "pending"),
            DocumentStatus::Uploaded => write!(f, "uploaded"),
            DocumentStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Document metadata row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Document {
    pub id: Uuid,
    pub user_id: UserId,
    pub name: String,
    pub file_size: i64,
    pub content_type: String,
    pub content_hash: String,
    pub storage_key: String,
    pub storage_url: String,
    pub batch_id: Uuid,
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for inserting a document row before its bytes are written to storage.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub user_id: UserId,
    pub name: String,
    pub file_size: i64,
    pub content_type: String,
    pub content_hash: String,
    pub storage_key: String,
    pub storage_url: String,
    pub batch_id: Uuid,
    pub status: DocumentStatus,
}

/// Which rule the server-side duplicate check matched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "duplicate_match_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateMatchKind {
    Hash,
    NameSize,
}

/// Result row of `check_duplicate_document`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DuplicateMatch {
    pub document_id: Uuid,
    pub match_kind: DuplicateMatchKind,
}

/// Document as shown to the user
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub content_type: String,
    pub file_size: i64,
    pub content_hash: String,
    pub batch_id: Uuid,
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        DocumentResponse {
            id: doc.id,
            name: doc.name,
            url: doc.storage_url,
            content_type: doc.content_type,
            file_size: doc.file_size,
            content_hash: doc.content_hash,
            batch_id: doc.batch_id,
            status: doc.status,
            created_at: doc.created_at,
        }
    }
}
