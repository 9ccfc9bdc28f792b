//! Docstage Storage Library
//!
//! Object storage abstraction for uploaded documents, with local filesystem and S3
//! implementations.
//!
//! # Storage key format
//!
//! Keys are user-scoped: `documents/{user_id}/{path_hint}`, where the path hint is
//! chosen by the caller (typically `{batch_id}/{file_id}.{ext}`). Keys must not
//! contain `..` or a leading `/`. Key generation lives in the `keys` module so all
//! backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use docstage_core::StorageBackend;
pub use factory::create_storage;
pub use keys::generate_storage_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
