//! Data models for the application
//!
//! Staging models (candidate files, collisions) live only in memory while the user
//! selects files. Document and tag models mirror the rows of the relational store.

mod candidate;
mod collision;
mod document;
mod tag;
mod user;

pub use candidate::*;
pub use collision::*;
pub use document::*;
pub use tag::*;
pub use user::*;
