//! Content digests for candidate files.

use docstage_core::models::{CandidateFile, ContentHash, FileContent};
use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;

use crate::error::{StagingError, StagingResult};

const READ_CHUNK_SIZE: usize = 64 * 1024;

/// SHA-256 of an in-memory buffer, lowercase hex.
pub fn digest_bytes(data: &[u8]) -> ContentHash {
    ContentHash::from_hex(hex::encode(Sha256::digest(data)))
}

/// Digest the full content of a file.
///
/// Disk-backed content is streamed in fixed-size chunks, so the whole file is read
/// before this returns but never held in memory at once.
pub async fn digest(file: &CandidateFile) -> StagingResult<ContentHash> {
    match file.content() {
        FileContent::Memory(bytes) => Ok(digest_bytes(bytes)),
        FileContent::Path(path) => {
            let io_err = |source| StagingError::Io {
                name: file.name().to_string(),
                source,
            };

            let mut reader = tokio::fs::File::open(path).await.map_err(io_err)?;
            let mut hasher = Sha256::new();
            let mut buf = vec![0u8; READ_CHUNK_SIZE];
            let mut total = 0u64;

            loop {
                let read = reader.read(&mut buf).await.map_err(io_err)?;
                if read == 0 {
                    break;
                }
                hasher.update(&buf[..read]);
                total += read as u64;
            }

            tracing::debug!(
                name = %file.name(),
                path = %path.display(),
                size_bytes = total,
                "Hashed file content"
            );

            Ok(ContentHash::from_hex(hex::encode(hasher.finalize())))
        }
    }
}

/// Load the full content of a file for upload.
pub async fn read_content(file: &CandidateFile) -> StagingResult<Vec<u8>> {
    match file.content() {
        FileContent::Memory(bytes) => Ok(bytes.to_vec()),
        FileContent::Path(path) => {
            tokio::fs::read(path)
                .await
                .map_err(|source| StagingError::Io {
                    name: file.name().to_string(),
                    source,
                })
        }
    }
}
