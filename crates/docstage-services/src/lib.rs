//! Docstage Services Layer
//!
//! Business services on top of staging, storage and the database: user
//! authentication, the sequential batch upload, the document library and tag
//! management. Binaries depend on this crate as a single facade.

pub mod services;

#[cfg(test)]
pub(crate) mod testing;

pub use docstage_storage::{create_storage, LocalStorage, Storage, StorageBackend};
pub use services::auth::{AuthProvider, Claims, JwtAuthProvider};
pub use services::library::LibraryService;
pub use services::tags::TagService;
pub use services::upload::{BatchReport, UploadOutcome, UploadService};
