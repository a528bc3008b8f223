//! HTTP client for the external analysis webhooks.
//!
//! The credit webhook receives the company data plus the uploaded document
//! URLs and answers with the analysis in one of several historical shapes,
//! which [`normalize_body`] turns into an [`AnalysisRecord`]. The income
//! webhook receives one payslip URL and answers with an [`IncomeEstimate`].
//! Calls are not retried; a failed analysis is resubmitted by the user.

use std::time::Duration;

use chrono::{DateTime, Utc};
use credhub_core::form::format_cnpj;
use credhub_core::{AnalysisRecord, CreditForm, IncomeEstimate};
use credhub_storage::UploadedFile;
use reqwest::{Client, Url};
use serde::Serialize;

use crate::error::AnalysisError;
use crate::normalize::{normalize_body, normalize_income_body};

/// Service name the webhook routes credit-score requests by.
pub const CREDIT_SCORE_SERVICE: &str = "credit-score";

/// Service name of income-estimate requests.
pub const INCOME_ESTIMATE_SERVICE: &str = "renda-presumida";

/// The authenticated user submitting a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitter {
    pub user_id: String,
    pub user_email: String,
}

/// JSON body posted to the analysis webhook.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditRequest {
    pub request_id: String,
    pub user_id: String,
    pub user_email: String,
    pub service: String,
    pub cnpj: String,
    pub company_name: String,
    pub sector: String,
    pub credit_amount: String,
    pub files: Vec<UploadedFile>,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
}

impl CreditRequest {
    #[must_use]
    pub fn new(
        request_id: &str,
        submitter: &Submitter,
        form: &CreditForm,
        files: Vec<UploadedFile>,
        session_id: &str,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            request_id: request_id.to_owned(),
            user_id: submitter.user_id.clone(),
            user_email: submitter.user_email.clone(),
            service: CREDIT_SCORE_SERVICE.to_owned(),
            cnpj: format_cnpj(&form.cnpj),
            company_name: form.company_name.trim().to_owned(),
            sector: form.sector.clone(),
            credit_amount: form.credit_amount.trim().to_owned(),
            files,
            session_id: session_id.to_owned(),
            timestamp,
        }
    }
}

/// JSON body posted to the income webhook. File fields are empty when no
/// payslip was sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeRequest {
    pub request_id: String,
    pub user_id: String,
    pub user_email: String,
    pub service: String,
    pub file_url: String,
    pub file_name: String,
    pub timestamp: DateTime<Utc>,
}

impl IncomeRequest {
    #[must_use]
    pub fn new(
        request_id: &str,
        submitter: &Submitter,
        file: Option<&UploadedFile>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            request_id: request_id.to_owned(),
            user_id: submitter.user_id.clone(),
            user_email: submitter.user_email.clone(),
            service: INCOME_ESTIMATE_SERVICE.to_owned(),
            file_url: file.map(|f| f.url.clone()).unwrap_or_default(),
            file_name: file.map(|f| f.name.clone()).unwrap_or_default(),
            timestamp,
        }
    }
}

/// Client for one analysis webhook endpoint.
pub struct WebhookClient {
    client: Client,
    url: Url,
}

impl WebhookClient {
    /// Creates a client posting to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`AnalysisError::InvalidUrl`] if `url` does
    /// not parse.
    pub fn new(url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let url = Url::parse(url).map_err(|e| AnalysisError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, url })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Posts a JSON body and returns the reply text of a 2xx response.
    async fn post<T: Serialize>(&self, request_id: &str, body: &T) -> Result<String, AnalysisError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                request_id,
                status = status.as_u16(),
                "analysis webhook rejected request"
            );
            return Err(AnalysisError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.url.to_string(),
            });
        }

        Ok(response.text().await?)
    }

    /// Posts `request` and normalizes the reply.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::Http`] on network failure.
    /// - [`AnalysisError::UnexpectedStatus`] on a non-2xx status.
    /// - [`AnalysisError::Normalize`] if the reply has no recognizable shape
    ///   or no numeric score.
    pub async fn submit(&self, request: &CreditRequest) -> Result<AnalysisRecord, AnalysisError> {
        tracing::info!(
            request_id = %request.request_id,
            files = request.files.len(),
            "submitting credit analysis request"
        );

        let body = self.post(&request.request_id, request).await?;
        let record = normalize_body(&body)?;
        tracing::info!(
            request_id = %request.request_id,
            score = record.score,
            classification = %record.classification,
            "credit analysis received"
        );
        Ok(record)
    }

    /// Posts an income-estimate request and reads the estimate.
    ///
    /// # Errors
    ///
    /// Same transport errors as [`WebhookClient::submit`];
    /// [`AnalysisError::Normalize`] if the reply carries no income figure.
    pub async fn submit_income(
        &self,
        request: &IncomeRequest,
    ) -> Result<IncomeEstimate, AnalysisError> {
        tracing::info!(
            request_id = %request.request_id,
            has_file = !request.file_url.is_empty(),
            "submitting income estimate request"
        );

        let body = self.post(&request.request_id, request).await?;
        let estimate = normalize_income_body(&body)?;
        tracing::info!(
            request_id = %request.request_id,
            income = %estimate.estimated_income,
            "income estimate received"
        );
        Ok(estimate)
    }
}
