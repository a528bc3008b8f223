//! Shared domain types and configuration for the credit hub workspace.

mod app_config;
mod config;
pub mod form;
pub mod record;
pub mod upload;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use form::{CreditForm, FormError};
pub use record::{AnalysisRecord, IncomeEstimate, Indicators};
pub use upload::{FileCandidate, UploadConfig, ValidationOutcome};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
