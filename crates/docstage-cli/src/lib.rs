//! Terminal driver for Docstage: file selection, interactive collision
//! decisions and output helpers shared by the `docstage` binary.

pub mod selection;
pub mod stage;

use docstage_core::{AppError, ErrorMetadata};

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Text shown for a failed upload. Detailed output carries the raw error and its
/// source chain; otherwise only the client message is shown.
pub fn failure_message(error: &AppError, detailed: bool) -> String {
    if detailed {
        error.detailed_message()
    } else {
        error.client_message()
    }
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_string_short() {
        assert_eq!(truncate_string("invoice.pdf", 20), "invoice.pdf");
        assert_eq!(truncate_string("", 5), "");
    }

    #[test]
    fn truncate_string_long() {
        assert_eq!(truncate_string("quarterly-report.pdf", 10), "quarter...");
        assert_eq!(truncate_string("abc", 2), "...");
    }

    #[test]
    fn truncate_string_counts_chars_not_bytes() {
        assert_eq!(truncate_string("résumé-final.pdf", 9), "résumé...");
    }

    #[test]
    fn failure_message_hides_internals_unless_detailed() {
        let err = AppError::Storage("bucket docs-prod unreachable".to_string());
        assert_eq!(failure_message(&err, false), "Failed to access storage");
        assert!(failure_message(&err, true).contains("docs-prod"));

        let err = AppError::from(anyhow::anyhow!("socket closed").context("write object"));
        assert!(failure_message(&err, true).contains("Caused by: socket closed"));
    }
}
