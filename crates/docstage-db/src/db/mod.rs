//! Database repositories for data access layer
//!
//! Each repository owns one domain entity and implements the matching store
//! trait, so callers can swap in another implementation (in-memory stores in
//! service tests).

pub mod document;
pub mod tag;
pub mod transaction;

pub use document::{DocumentRepository, DocumentStore};
pub use tag::{TagRepository, TagStore};
pub use transaction::TransactionGuard;

/// SQLSTATE for unique constraint violations
pub(crate) const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE for foreign key violations
pub(crate) const FOREIGN_KEY_VIOLATION: &str = "23503";

pub(crate) fn has_sqlstate(err: &sqlx::Error, code: &str) -> bool {
    err.as_database_error()
        .and_then(|e| e.code())
        .is_some_and(|c| c == code)
}
