//! Docstage Database Library
//!
//! Postgres repositories for documents and tags. Every query is scoped by the
//! owning user. Services depend on the [`DocumentStore`] and [`TagStore`] traits
//! rather than on the concrete repositories.

pub mod db;
pub mod setup;

pub use db::{DocumentRepository, DocumentStore, TagRepository, TagStore};
pub use setup::setup_database;
