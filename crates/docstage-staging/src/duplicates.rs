//! Duplicate detection between a new selection and the working collection.
//!
//! Detection is two-phase: a cheap name+size pre-check picks at most one candidate
//! per new file, and only those pairs are hashed to tell exact copies apart from
//! different files that happen to share a name and size.

use docstage_core::models::{CandidateFile, CollisionRecord, MatchType};

use crate::error::{StagingError, StagingResult};
use crate::hashing::digest;

/// Index of the first existing file sharing `file`'s name and size.
fn first_name_size_match(file: &CandidateFile, existing: &[CandidateFile]) -> Option<usize> {
    existing.iter().position(|e| e.same_name_and_size(file))
}

async fn classify(
    new_file: &CandidateFile,
    existing_file: &CandidateFile,
) -> StagingResult<MatchType> {
    let new_hash = digest(new_file).await?;
    let existing_hash = digest(existing_file).await?;

    Ok(if new_hash == existing_hash {
        MatchType::Exact
    } else {
        MatchType::NameSize
    })
}

/// Find the collisions between `new_files` and `existing`.
///
/// Output order follows `new_files`; files without a name+size match are not
/// reported. Only the first matching existing entry (lowest index) is considered
/// per new file. Files are hashed one after another, never concurrently, and the
/// first read failure aborts the call.
pub async fn find_duplicates(
    new_files: &[CandidateFile],
    existing: &[CandidateFile],
) -> StagingResult<Vec<CollisionRecord>> {
    let mut collisions = Vec::new();

    for new_file in new_files {
        let Some(existing_index) = first_name_size_match(new_file, existing) else {
            continue;
        };
        let existing_file = &existing[existing_index];
        let match_type = classify(new_file, existing_file).await?;

        tracing::debug!(
            name = %new_file.name(),
            size_bytes = new_file.byte_size(),
            existing_index,
            match_type = %match_type,
            "Detected collision"
        );

        collisions.push(CollisionRecord {
            new_file: new_file.clone(),
            existing_file: existing_file.clone(),
            existing_index,
            match_type,
        });
    }

    Ok(collisions)
}

/// A file whose content could not be read while checking for duplicates
#[derive(Debug)]
pub struct FailedFile {
    pub file: CandidateFile,
    pub error: StagingError,
}

/// A new selection split by duplicate detection
#[derive(Debug, Default)]
pub struct BatchPartition {
    /// Collisions needing a user decision, in selection order
    pub collisions: Vec<CollisionRecord>,
    /// Files with no collision, safe to add once resolution completes
    pub pending: Vec<CandidateFile>,
    /// Files whose hashing failed; the rest of the batch is unaffected
    pub failed: Vec<FailedFile>,
}

impl BatchPartition {
    pub fn has_collisions(&self) -> bool {
        !self.collisions.is_empty()
    }
}

/// Partition a new selection into colliding, pending and failed files.
///
/// Same detection rules as [`find_duplicates`], but an I/O failure while hashing
/// one file only moves that file to `failed`.
pub async fn partition_batch(
    new_files: Vec<CandidateFile>,
    existing: &[CandidateFile],
) -> BatchPartition {
    let mut partition = BatchPartition::default();

    for new_file in new_files {
        match find_duplicates(std::slice::from_ref(&new_file), existing).await {
            Ok(mut found) => match found.pop() {
                Some(collision) => partition.collisions.push(collision),
                None => partition.pending.push(new_file),
            },
            Err(error) => {
                tracing::warn!(
                    name = %new_file.name(),
                    error = %error,
                    "Could not hash file while checking for duplicates"
                );
                partition.failed.push(FailedFile {
                    file: new_file,
                    error,
                });
            }
        }
    }

    tracing::info!(
        collisions = partition.collisions.len(),
        pending = partition.pending.len(),
        failed = partition.failed.len(),
        "Partitioned selection"
    );

    partition
}
