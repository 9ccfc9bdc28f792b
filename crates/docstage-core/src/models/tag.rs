use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::user::UserId;

/// Tag row: a named document class with an optional extraction schema
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Tag {
    pub id: Uuid,
    pub user_id: UserId,
    pub name: String,
    pub description: String,
    pub industry: Option<String>,
    pub schema: Option<serde_json::Value>,
    pub sample_document_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tag row joined with the number of documents attached to it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TagSummary {
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    #[serde(flatten)]
    pub tag: Tag,
    pub document_count: i64,
}

fn validate_schema_object(schema: &serde_json::Value) -> Result<(), ValidationError> {
    if schema.is_object() {
        Ok(())
    } else {
        Err(ValidationError::new("schema_not_object"))
    }
}

/// Request for creating a tag
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Validate)]
pub struct NewTag {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Tag name must be between 1 and 100 characters"
    ))]
    pub name: String,
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Tag description must be between 1 and 1000 characters"
    ))]
    pub description: String,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_schema_object"))]
    pub schema: Option<serde_json::Value>,
    #[serde(default)]
    pub sample_document_id: Option<Uuid>,
}

/// Request for updating a tag; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTag {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 1000))]
    pub description: Option<String>,
    pub industry: Option<Option<String>>,
    #[validate(custom(function = "validate_schema_object"))]
    pub schema: Option<serde_json::Value>,
    pub sample_document_id: Option<Option<Uuid>>,
}

/// Tag as shown to the user
#[derive(Debug, Serialize, Deserialize)]
pub struct TagResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub industry: Option<String>,
    pub has_schema: bool,
    pub sample_document_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_count: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        TagResponse {
            id: tag.id,
            name: tag.name,
            description: tag.description,
            industry: tag.industry,
            has_schema: tag.schema.is_some(),
            sample_document_id: tag.sample_document_id,
            document_count: None,
            created_at: tag.created_at,
        }
    }
}

impl From<TagSummary> for TagResponse {
    fn from(summary: TagSummary) -> Self {
        TagResponse {
            document_count: Some(summary.document_count),
            ..TagResponse::from(summary.tag)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_tag() -> NewTag {
        NewTag {
            name: "Invoices".to_string(),
            description: "Supplier invoices".to_string(),
            industry: Some("finance".to_string()),
            schema: Some(serde_json::json!({ "total": "number" })),
            sample_document_id: None,
        }
    }

    #[test]
    fn valid_tag_passes() {
        assert!(new_tag().validate().is_ok());
    }

    #[test]
    fn empty_name_fails() {
        let mut tag = new_tag();
        tag.name = String::new();
        assert!(tag.validate().is_err());
    }

    #[test]
    fn non_object_schema_fails() {
        let mut tag = new_tag();
        tag.schema = Some(serde_json::json!(["total"]));
        assert!(tag.validate().is_err());
    }
}
