use credhub_core::FormError;
use credhub_storage::UploadError;
use thiserror::Error;

/// Message shown to the end user whenever a webhook reply cannot be normalized.
pub const INVALID_RESPONSE_FORMAT: &str = "invalid response format";

/// Why a webhook reply could not be turned into an [`credhub_core::AnalysisRecord`]
/// or an [`credhub_core::IncomeEstimate`].
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The reply matched none of the known shapes.
    #[error("unrecognized response shape: {0}")]
    UnrecognizedShape(&'static str),

    /// A shape matched but no numeric score could be recovered.
    #[error("response carries no numeric score")]
    MissingScore,

    /// An income reply carried no income figure.
    #[error("response carries no income estimate")]
    MissingIncome,

    /// A shape matched but one of its fields has the wrong type.
    #[error("field `{field}` has an unexpected type")]
    InvalidField { field: &'static str },
}

impl NormalizeError {
    /// The user-facing text for any normalization failure. Diagnostic detail
    /// stays in the logs.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        INVALID_RESPONSE_FORMAT
    }
}

/// Errors returned by the webhook client and record stores.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The record store accepted the write but returned no usable id.
    #[error("record store returned no id for collection {collection}")]
    MissingRecordId { collection: String },

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

impl AnalysisError {
    /// Short message suitable for showing to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Normalize(err) => err.user_message().to_owned(),
            Self::Http(err) if err.is_timeout() => {
                "The analysis service took too long to respond. Please try again.".to_owned()
            }
            Self::Http(_) => "Connection problem. Check your internet and try again.".to_owned(),
            _ => "Error processing the analysis. Please try again.".to_owned(),
        }
    }
}

/// Errors from the end-to-end submission pipeline.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("invalid form: {0}")]
    Form(#[from] FormError),

    #[error("no files selected")]
    NoFiles,

    /// A file failed validation; nothing was uploaded.
    #[error("{file_name}: {message}")]
    InvalidFile { file_name: String, message: String },

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("could not serialize processing record: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl SubmitError {
    /// Short message suitable for showing to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Form(err) => err.to_string(),
            Self::NoFiles => "Select at least one file to analyze.".to_owned(),
            Self::InvalidFile { file_name, message } => format!("{file_name}: {message}"),
            Self::Upload(UploadError::Exhausted { message, .. }) => message.clone(),
            Self::Upload(err) => err.to_string(),
            Self::Serialize(_) => "Error processing the analysis. Please try again.".to_owned(),
            Self::Analysis(err) => err.user_message(),
        }
    }
}
