//! Shared constants.

/// Default upper bound for a single document, in megabytes.
pub const MAX_DOCUMENT_SIZE_MB: usize = 10;

/// Default lifetime of a signed access URL.
pub const SIGNED_URL_EXPIRY_SECS: u64 = 3600;

/// Content types accepted when `DOCUMENT_ALLOWED_CONTENT_TYPES` is not set.
pub const DEFAULT_DOCUMENT_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "image/png",
    "image/jpeg",
    "text/plain",
];

/// Prefix of every storage key written for a document.
pub const DOCUMENT_KEY_PREFIX: &str = "documents";
