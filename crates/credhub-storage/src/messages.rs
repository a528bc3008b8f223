//! Translation of storage failures into messages fit for end users.

/// Substring → message table. Checked in order; the first match wins.
const TRANSLATIONS: &[(&str, &str)] = &[
    (
        "storage/retry-limit-exceeded",
        "Upload timed out. Check your internet connection and try again.",
    ),
    (
        "storage/unauthorized",
        "Authorization error. Please sign in again.",
    ),
    ("storage/canceled", "The upload was canceled."),
    (
        "storage/unknown",
        "Internal server error. Please try again in a few minutes.",
    ),
    ("storage/invalid-format", "Invalid file format."),
    ("storage/invalid-event-name", "Upload configuration error."),
    ("storage/invalid-url", "Invalid upload URL."),
    ("storage/invalid-argument", "Invalid upload parameters."),
    (
        "storage/no-default-bucket",
        "Storage configuration not found.",
    ),
    (
        "storage/cannot-slice-blob",
        "Could not process the file. Try a smaller file.",
    ),
    (
        "storage/server-file-wrong-size",
        "Inconsistent file size. Please try again.",
    ),
    (
        "network",
        "Connection problem. Check your internet and try again.",
    ),
    (
        "timeout",
        "Connection problem. Check your internet and try again.",
    ),
];

const UNKNOWN: &str = "Unknown upload error";

/// Translates a rendered error into a user-facing message.
///
/// Unrecognized errors pass through unchanged; an empty message becomes a
/// generic "unknown upload error".
#[must_use]
pub fn user_message(raw: &str) -> String {
    TRANSLATIONS
        .iter()
        .find(|(needle, _)| raw.contains(needle))
        .map_or_else(
            || {
                if raw.trim().is_empty() {
                    UNKNOWN.to_owned()
                } else {
                    raw.to_owned()
                }
            },
            |(_, message)| (*message).to_owned(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;

    #[test]
    fn unauthorized_asks_to_sign_in() {
        let err = StorageError::Unauthorized {
            path: "demonstrativos/u1/a.pdf".to_owned(),
        };
        assert_eq!(
            user_message(&err.to_string()),
            "Authorization error. Please sign in again."
        );
    }

    #[test]
    fn timeout_asks_to_check_connection() {
        let err = StorageError::Timeout {
            path: "a.pdf".to_owned(),
        };
        assert!(user_message(&err.to_string()).contains("Check your internet connection"));
    }

    #[test]
    fn server_error_asks_to_try_later() {
        let err = StorageError::Unknown {
            status: 503,
            path: "a.pdf".to_owned(),
        };
        assert!(user_message(&err.to_string()).contains("try again in a few minutes"));
    }

    #[test]
    fn canceled_reports_cancellation() {
        let err = StorageError::Canceled {
            path: "a.pdf".to_owned(),
        };
        assert_eq!(user_message(&err.to_string()), "The upload was canceled.");
    }

    #[test]
    fn wrong_size_asks_to_retry() {
        let err = StorageError::ServerFileWrongSize {
            expected: 10,
            actual: 4,
        };
        assert_eq!(
            user_message(&err.to_string()),
            "Inconsistent file size. Please try again."
        );
    }

    #[test]
    fn bare_network_keyword_is_recognized() {
        assert!(user_message("network unreachable").starts_with("Connection problem"));
    }

    #[test]
    fn unknown_message_passes_through() {
        assert_eq!(user_message("disk on fire"), "disk on fire");
    }

    #[test]
    fn empty_message_becomes_generic() {
        assert_eq!(user_message(""), "Unknown upload error");
    }
}
