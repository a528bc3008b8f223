use thiserror::Error;

/// Failure of a single object-store call.
///
/// Each variant renders with a stable `storage/...` code prefix so that
/// [`crate::messages::user_message`] can translate the rendered text.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage/unauthorized: access denied for {path}")]
    Unauthorized { path: String },

    #[error("storage/retry-limit-exceeded: request timed out for {path}")]
    Timeout { path: String },

    #[error("storage/canceled: upload of {path} was canceled")]
    Canceled { path: String },

    #[error("storage/unknown: server error {status} for {path}")]
    Unknown { status: u16, path: String },

    #[error("storage/invalid-format: {0}")]
    InvalidFormat(String),

    #[error("storage/invalid-url: {0}")]
    InvalidUrl(String),

    #[error("storage/invalid-argument: {0}")]
    InvalidArgument(String),

    #[error("storage/no-default-bucket: bucket not found at {0}")]
    NoDefaultBucket(String),

    #[error("storage/object-not-found: {path}")]
    ObjectNotFound { path: String },

    #[error("storage/server-file-wrong-size: sent {expected} bytes, server stored {actual}")]
    ServerFileWrongSize { expected: u64, actual: u64 },

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("unexpected HTTP status {status} for {path}")]
    UnexpectedStatus { status: u16, path: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Classifies a `reqwest` failure: timeouts map onto the retry-limit code,
    /// everything else is a network error.
    pub(crate) fn from_reqwest(err: reqwest::Error, path: &str) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                path: path.to_owned(),
            }
        } else {
            Self::Network(err)
        }
    }
}

/// Errors returned by [`crate::Uploader`].
#[derive(Debug, Error)]
pub enum UploadError {
    /// The file failed type/size validation; no network call was made.
    #[error("{0}")]
    Validation(String),

    /// Every attempt failed. `message` is the translated last error.
    #[error("Upload failed after {attempts} attempts: {message}")]
    Exhausted {
        attempts: u32,
        message: String,
        #[source]
        source: StorageError,
    },

    /// A file in a batch failed terminally; the rest of the batch was abandoned.
    #[error("Upload of \"{file_name}\" failed: {message}")]
    Batch {
        index: usize,
        file_name: String,
        message: String,
        #[source]
        source: Box<UploadError>,
    },
}

impl UploadError {
    /// The user-facing part of the error, without the batch framing. A batch
    /// failure caused by exhausted retries keeps the attempt count.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Validation(message)
            | Self::Exhausted { message, .. }
            | Self::Batch { message, .. } => message,
        }
    }
}
