//! Value types shared by the file validator and the uploader.

use std::time::Duration;

/// MIME types accepted for financial statements: PDFs and scanned images.
pub const DEFAULT_ALLOWED_TYPES: &[&str] =
    &["application/pdf", "image/jpeg", "image/png", "image/jpg"];

/// Upload limits and retry policy.
///
/// Built once (usually from [`crate::AppConfig`]) and handed by reference to
/// every validation and upload call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    /// Largest accepted file, in bytes. Only the upper bound is enforced.
    pub max_file_size: u64,
    /// Total number of physical upload attempts per file.
    pub max_retries: u32,
    /// Base delay for linear backoff: the wait after attempt `n` is `retry_delay * n`.
    pub retry_delay: Duration,
    /// Exact-match allow-list of MIME types.
    pub allowed_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
            max_retries: 3,
            retry_delay: Duration::from_millis(1000),
            allowed_types: DEFAULT_ALLOWED_TYPES
                .iter()
                .map(|t| (*t).to_owned())
                .collect(),
        }
    }
}

impl UploadConfig {
    #[must_use]
    pub fn allows(&self, mime_type: &str) -> bool {
        self.allowed_types.iter().any(|t| t == mime_type)
    }
}

/// A caller-supplied file: name, declared MIME type, and raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub name: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            content,
        }
    }

    #[must_use]
    pub fn byte_size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// Result of checking one [`FileCandidate`] against an [`UploadConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl ValidationOutcome {
    #[must_use]
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(error.into()),
        }
    }
}
