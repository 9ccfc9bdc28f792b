//! Docstage Staging Library
//!
//! Client-side staging of a document batch before anything is uploaded:
//! validation → hashing → duplicate detection → one user decision per collision.
//!
//! Everything here runs sequentially. Hashing reads files one at a time in input
//! order, and the [`ResolutionSession`] holds at most one collision in flight.

pub mod duplicates;
pub mod error;
pub mod hashing;
pub mod naming;
pub mod resolution;
pub mod tag_wizard;
pub mod validator;

pub use duplicates::{find_duplicates, partition_batch, BatchPartition, FailedFile};
pub use error::{ResolutionError, StagingError, StagingResult};
pub use hashing::{digest, digest_bytes, read_content};
pub use naming::{unique_name, unique_name_excluding};
pub use resolution::{ResolutionSession, ResolutionState};
pub use tag_wizard::{TagWizard, WizardError, WizardStep};
pub use validator::{validate, validate_batch, FileValidator, Rejection, ValidationError};
