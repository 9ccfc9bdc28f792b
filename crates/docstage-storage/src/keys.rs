//! Shared key generation for storage backends.
//!
//! Key format: `documents/{user_id}/{path_hint}`.

use docstage_core::constants::DOCUMENT_KEY_PREFIX;
use uuid::Uuid;

use crate::traits::{StorageError, StorageResult};

/// Reject keys that could escape the storage root.
pub fn validate_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty()
        || storage_key.contains("..")
        || storage_key.starts_with('/')
        || storage_key.contains('\\')
    {
        return Err(StorageError::InvalidKey(format!(
            "Storage key contains invalid characters: {}",
            storage_key
        )));
    }
    Ok(())
}

/// Generate a storage key for the given user and path hint.
pub fn generate_storage_key(user_id: Uuid, path_hint: &str) -> StorageResult<String> {
    let hint = path_hint.trim_start_matches('/');
    let key = format!("{}/{}/{}", DOCUMENT_KEY_PREFIX, user_id, hint);
    validate_key(&key)?;
    Ok(key)
}
