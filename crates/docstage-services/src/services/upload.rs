//! Sequential batch upload: validate → digest → duplicate check → store → persist.
//!
//! Files are processed strictly in the order given. Each file produces exactly
//! one [`UploadOutcome`]; a failure is recorded and the loop moves on. Nothing
//! is retried here.

use std::sync::Arc;

use docstage_core::models::{
    CandidateFile, Document, DocumentStatus, DuplicateMatch, DuplicateMatchKind, NewDocument,
};
use docstage_core::{AppError, ErrorMetadata, LogLevel, UserId};
use docstage_db::DocumentStore;
use docstage_staging::{digest_bytes, read_content, FileValidator};
use docstage_storage::{generate_storage_key, Storage};
use uuid::Uuid;

/// What happened to one file of a batch
#[derive(Debug)]
pub enum UploadOutcome {
    Uploaded(Document),
    /// The user already stores identical content
    SkippedDuplicate {
        name: String,
        existing: DuplicateMatch,
    },
    Failed {
        name: String,
        error: AppError,
    },
}

impl UploadOutcome {
    pub fn name(&self) -> &str {
        match self {
            UploadOutcome::Uploaded(doc) => &doc.name,
            UploadOutcome::SkippedDuplicate { name, .. } | UploadOutcome::Failed { name, .. } => {
                name
            }
        }
    }
}

/// Per-file outcomes of one batch, in input order
#[derive(Debug)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub outcomes: Vec<UploadOutcome>,
}

impl BatchReport {
    pub fn uploaded(&self) -> impl Iterator<Item = &Document> {
        self.outcomes.iter().filter_map(|o| match o {
            UploadOutcome::Uploaded(doc) => Some(doc),
            _ => None,
        })
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, UploadOutcome::Failed { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, UploadOutcome::SkippedDuplicate { .. }))
            .count()
    }
}

fn log_failure(name: &str, batch_id: Uuid, error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(name, batch_id = %batch_id, error = %error, error_type, "Upload failed");
        }
        LogLevel::Warn => {
            tracing::warn!(name, batch_id = %batch_id, error = %error, error_type, "Upload failed");
        }
        LogLevel::Error => {
            tracing::error!(name, batch_id = %batch_id, error = %error, error_type, "Upload failed");
        }
    }
}

#[derive(Clone)]
pub struct UploadService {
    documents: Arc<dyn DocumentStore>,
    storage: Arc<dyn Storage>,
    validator: FileValidator,
}

impl UploadService {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        storage: Arc<dyn Storage>,
        validator: FileValidator,
    ) -> Self {
        Self {
            documents,
            storage,
            validator,
        }
    }

    /// Upload a resolved collection as a new batch.
    #[tracing::instrument(skip(self, files), fields(user_id = %user_id, files = files.len()))]
    pub async fn upload_batch(&self, user_id: UserId, files: &[CandidateFile]) -> BatchReport {
        let batch_id = Uuid::new_v4();
        let mut outcomes = Vec::with_capacity(files.len());

        for file in files {
            let outcome = match self.upload_one(user_id, batch_id, file).await {
                Ok(outcome) => outcome,
                Err(error) => {
                    log_failure(file.name(), batch_id, &error);
                    UploadOutcome::Failed {
                        name: file.name().to_string(),
                        error,
                    }
                }
            };
            outcomes.push(outcome);
        }

        let report = BatchReport { batch_id, outcomes };
        tracing::info!(
            batch_id = %batch_id,
            uploaded = report.uploaded().count(),
            skipped = report.skipped_count(),
            failed = report.failed_count(),
            "Batch upload finished"
        );
        report
    }

    async fn upload_one(
        &self,
        user_id: UserId,
        batch_id: Uuid,
        file: &CandidateFile,
    ) -> Result<UploadOutcome, AppError> {
        self.validator
            .validate(file)
            .map_err(docstage_staging::StagingError::from)?;

        let data = read_content(file).await?;
        let hash = digest_bytes(&data);
        let file_size = data.len() as i64;

        // Rows of this batch were already deduplicated while staging; a match there
        // is a copy the user chose to keep.
        if let Some(existing) = self
            .documents
            .check_duplicate(user_id, hash.as_str(), file.name(), file_size, Some(batch_id))
            .await?
        {
            match existing.match_kind {
                DuplicateMatchKind::Hash => {
                    tracing::info!(
                        name = %file.name(),
                        existing_id = %existing.document_id,
                        "Skipping file already stored with identical content"
                    );
                    return Ok(UploadOutcome::SkippedDuplicate {
                        name: file.name().to_string(),
                        existing,
                    });
                }
                DuplicateMatchKind::NameSize => {
                    tracing::debug!(
                        name = %file.name(),
                        existing_id = %existing.document_id,
                        "Stored document shares name and size but not content"
                    );
                }
            }
        }

        let path_hint = match file.extension() {
            ext if ext.is_empty() => format!("{}/{}", batch_id, Uuid::new_v4()),
            ext => format!("{}/{}.{}", batch_id, Uuid::new_v4(), ext),
        };
        let storage_key = generate_storage_key(user_id, &path_hint)?;
        let storage_url = self.storage.public_url(&storage_key)?;

        let pending = self
            .documents
            .create_document(NewDocument {
                user_id,
                name: file.name().to_string(),
                file_size,
                content_type: file.mime_type().to_string(),
                content_hash: hash.as_str().to_string(),
                storage_key,
                storage_url,
                batch_id,
                status: DocumentStatus::Pending,
            })
            .await?;

        let stored = self
            .storage
            .upload(user_id, &path_hint, file.mime_type(), data)
            .await
            .map_err(AppError::from)
            .and_then(|(key, _url)| {
                if key == pending.storage_key {
                    Ok(())
                } else {
                    Err(AppError::Storage(format!(
                        "Stored under {} instead of {}",
                        key, pending.storage_key
                    )))
                }
            });

        if let Err(error) = stored {
            self.mark_failed(user_id, pending.id).await;
            return Err(error);
        }

        let document = self
            .documents
            .update_status(user_id, pending.id, DocumentStatus::Uploaded)
            .await?;

        tracing::info!(
            document_id = %document.id,
            key = %document.storage_key,
            size_bytes = document.file_size,
            "Document uploaded"
        );

        Ok(UploadOutcome::Uploaded(document))
    }

    /// Flag a row whose bytes never reached storage. The caller reports the
    /// storage error, so a failure here is only logged.
    async fn mark_failed(&self, user_id: UserId, document_id: Uuid) {
        if let Err(e) = self
            .documents
            .update_status(user_id, document_id, DocumentStatus::Failed)
            .await
        {
            tracing::warn!(
                document_id = %document_id,
                error = %e,
                "Could not mark document as failed"
            );
        }
    }
}
