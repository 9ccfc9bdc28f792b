//! Docstage Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! every Docstage component: candidate files and collision records used while
//! staging, and the persisted document and tag records.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::UserId;
pub use storage_types::StorageBackend;
