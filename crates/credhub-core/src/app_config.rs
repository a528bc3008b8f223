use crate::upload::UploadConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub storage_base_url: String,
    pub storage_token: Option<String>,
    pub records_base_url: String,
    pub webhook_url: String,
    /// Income-estimate webhook; only the income flow needs it.
    pub income_webhook_url: Option<String>,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub upload: UploadConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("storage_base_url", &self.storage_base_url)
            .field(
                "storage_token",
                &self.storage_token.as_ref().map(|_| "[redacted]"),
            )
            .field("records_base_url", &self.records_base_url)
            .field("webhook_url", &self.webhook_url)
            .field("income_webhook_url", &self.income_webhook_url)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("upload", &self.upload)
            .finish()
    }
}
