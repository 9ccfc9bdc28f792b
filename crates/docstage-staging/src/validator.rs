use docstage_core::models::CandidateFile;
use docstage_core::Config;

/// Reasons a candidate file is refused before it is staged
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    TypeRejected {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    SizeExceeded { size: u64, max: u64 },
}

/// Check a file's MIME type and size against the configured limits.
///
/// The type is checked first, so a file that is both oversized and of the wrong
/// type reports `TypeRejected`. MIME types compare case-insensitively. A size equal
/// to the limit is accepted.
pub fn validate(
    file: &CandidateFile,
    max_size_bytes: u64,
    allowed_mime_types: &[String],
) -> Result<(), ValidationError> {
    let normalized = file.mime_type().to_lowercase();
    if !allowed_mime_types
        .iter()
        .any(|ct| ct.to_lowercase() == normalized)
    {
        return Err(ValidationError::TypeRejected {
            content_type: file.mime_type().to_string(),
            allowed: allowed_mime_types.to_vec(),
        });
    }

    if file.byte_size() > max_size_bytes {
        return Err(ValidationError::SizeExceeded {
            size: file.byte_size(),
            max: max_size_bytes,
        });
    }

    Ok(())
}

/// Document file validator holding the configured limits
#[derive(Debug, Clone)]
pub struct FileValidator {
    max_file_size: u64,
    allowed_content_types: Vec<String>,
}

impl FileValidator {
    pub fn new(max_file_size: u64, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_content_types,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.max_document_size_bytes,
            config.document_allowed_content_types.clone(),
        )
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub fn validate(&self, file: &CandidateFile) -> Result<(), ValidationError> {
        validate(file, self.max_file_size, &self.allowed_content_types)
    }
}

/// A file refused by [`validate_batch`], with the reason shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub file: CandidateFile,
    pub reason: ValidationError,
}

/// Split a selection into accepted files and rejections, both in input order.
pub fn validate_batch(
    files: Vec<CandidateFile>,
    validator: &FileValidator,
) -> (Vec<CandidateFile>, Vec<Rejection>) {
    let mut accepted = Vec::with_capacity(files.len());
    let mut rejected = Vec::new();

    for file in files {
        match validator.validate(&file) {
            Ok(()) => accepted.push(file),
            Err(reason) => {
                tracing::warn!(
                    name = %file.name(),
                    size_bytes = file.byte_size(),
                    content_type = %file.mime_type(),
                    reason = %reason,
                    "Rejected candidate file"
                );
                rejected.push(Rejection { file, reason });
            }
        }
    }

    (accepted, rejected)
}
