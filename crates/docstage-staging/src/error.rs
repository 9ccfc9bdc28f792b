use std::io;

use docstage_core::AppError;

use crate::validator::ValidationError;

/// Failure scoped to a single staged file.
#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to read {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

pub type StagingResult<T> = Result<T, StagingError>;

impl From<StagingError> for AppError {
    fn from(err: StagingError) -> Self {
        match err {
            StagingError::Validation(ValidationError::TypeRejected {
                content_type,
                allowed,
            }) => AppError::TypeRejected {
                content_type,
                allowed,
            },
            StagingError::Validation(ValidationError::SizeExceeded { size, max }) => {
                AppError::SizeExceeded { size, max }
            }
            StagingError::Io { name, source } => AppError::Io(format!("{}: {}", name, source)),
        }
    }
}

/// Misuse of the collision-resolution state machine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("No collision is awaiting a decision (state: {state})")]
    NotAwaitingDecision { state: &'static str },

    #[error("Collision refers to index {index} but the collection has {len} entries")]
    StaleIndex { index: usize, len: usize },

    #[error("Resolution is not finished (state: {state})")]
    NotFinished { state: &'static str },
}
