//! Document-store boundary used to persist analysis requests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use credhub_core::form::format_cnpj;
use credhub_core::CreditForm;
use credhub_storage::UploadedFile;
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;

use crate::error::AnalysisError;
use crate::webhook::Submitter;

/// Collection that holds credit-score requests.
pub const CREDIT_SCORE_COLLECTION: &str = "creditScore";

/// Collection that holds income-estimate requests.
pub const INCOME_COLLECTION: &str = "rendaPresumida";

/// Status of a request that has been handed to the analysis webhook.
pub const STATUS_PROCESSING: &str = "processing";

/// Durable record written before the webhook is called.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingRecord {
    pub user_id: String,
    pub user_email: String,
    pub cnpj: String,
    pub company_name: String,
    pub sector: String,
    pub credit_amount: String,
    pub files: Vec<UploadedFile>,
    pub uploaded_at: DateTime<Utc>,
    pub status: String,
}

impl ProcessingRecord {
    #[must_use]
    pub fn new(
        submitter: &Submitter,
        form: &CreditForm,
        files: Vec<UploadedFile>,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: submitter.user_id.clone(),
            user_email: submitter.user_email.clone(),
            cnpj: format_cnpj(&form.cnpj),
            company_name: form.company_name.trim().to_owned(),
            sector: form.sector.clone(),
            credit_amount: form.credit_amount.trim().to_owned(),
            files,
            uploaded_at,
            status: STATUS_PROCESSING.to_owned(),
        }
    }
}

/// Durable record of an income-estimate request.
///
/// The payslip is optional; without one the file fields are empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeRecord {
    pub user_id: String,
    pub user_email: String,
    pub file_name: String,
    pub file_url: String,
    pub file_size: u64,
    pub file_type: String,
    pub uploaded_at: DateTime<Utc>,
    pub status: String,
}

impl IncomeRecord {
    #[must_use]
    pub fn new(submitter: &Submitter, file: Option<&UploadedFile>, uploaded_at: DateTime<Utc>) -> Self {
        Self {
            user_id: submitter.user_id.clone(),
            user_email: submitter.user_email.clone(),
            file_name: file.map(|f| f.name.clone()).unwrap_or_default(),
            file_url: file.map(|f| f.url.clone()).unwrap_or_default(),
            file_size: file.map_or(0, |f| f.size),
            file_type: file.map(|f| f.content_type.clone()).unwrap_or_default(),
            uploaded_at,
            status: STATUS_PROCESSING.to_owned(),
        }
    }
}

/// Append-only document store: `insert(collection, record) -> id`.
pub trait RecordStore: Send + Sync {
    fn insert(
        &self,
        collection: &str,
        record: &Value,
    ) -> impl Future<Output = Result<String, AnalysisError>> + Send;
}

/// REST document store. Records are posted as JSON to `{base}/{collection}`.
pub struct HttpRecordStore {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpRecordStore {
    /// # Errors
    ///
    /// Returns [`AnalysisError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`AnalysisError::InvalidUrl`] if `base_url` does not parse.
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `join` appends the collection.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| AnalysisError::InvalidUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn collection_url(&self, collection: &str) -> Result<Url, AnalysisError> {
        self.base_url
            .join(collection)
            .map_err(|e| AnalysisError::InvalidUrl {
                url: format!("{}{collection}", self.base_url),
                reason: e.to_string(),
            })
    }
}

/// Reads the new document id: `id`, or the last segment of a `name` path
/// such as `projects/p/databases/(default)/documents/creditScore/abc123`.
fn record_id(body: &Value) -> Option<String> {
    if let Some(id) = body.get("id").and_then(Value::as_str) {
        return Some(id.to_owned()).filter(|id| !id.is_empty());
    }
    body.get("name")
        .and_then(Value::as_str)?
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
}

impl RecordStore for HttpRecordStore {
    async fn insert(&self, collection: &str, record: &Value) -> Result<String, AnalysisError> {
        let url = self.collection_url(collection)?;
        let mut request = self.client.post(url.clone()).json(record);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let body: Value = serde_json::from_str(&body).map_err(|e| AnalysisError::Deserialize {
            context: format!("insert into {collection}"),
            source: e,
        })?;

        let id = record_id(&body).ok_or_else(|| AnalysisError::MissingRecordId {
            collection: collection.to_owned(),
        })?;
        tracing::debug!(collection, id = %id, "record inserted");
        Ok(id)
    }
}

/// In-memory [`RecordStore`] assigning random UUIDs.
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    collections: Arc<Mutex<HashMap<String, Vec<(String, Value)>>>>,
}

impl MemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records in `collection` as `(id, record)` pairs, in insertion order.
    #[must_use]
    pub fn records(&self, collection: &str) -> Vec<(String, Value)> {
        self.collections
            .lock()
            .expect("lock poisoned")
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }
}

impl RecordStore for MemoryRecordStore {
    async fn insert(&self, collection: &str, record: &Value) -> Result<String, AnalysisError> {
        let id = uuid::Uuid::new_v4().to_string();
        self.collections
            .lock()
            .expect("lock poisoned")
            .entry(collection.to_owned())
            .or_default()
            .push((id.clone(), record.clone()));
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn record_id_prefers_explicit_id() {
        assert_eq!(record_id(&json!({"id": "abc", "name": "x/y"})).as_deref(), Some("abc"));
    }

    #[test]
    fn record_id_falls_back_to_name_segment() {
        let body = json!({"name": "projects/p/databases/(default)/documents/creditScore/k9"});
        assert_eq!(record_id(&body).as_deref(), Some("k9"));
        assert_eq!(record_id(&json!({"name": "trailing/"})), None);
        assert_eq!(record_id(&json!({})), None);
    }

    #[test]
    fn collection_url_appends_to_base_path() {
        let store =
            HttpRecordStore::new("https://db.example.com/v1/documents", None, 30, "credhub-test")
                .unwrap();
        assert_eq!(
            store.collection_url("creditScore").unwrap().as_str(),
            "https://db.example.com/v1/documents/creditScore"
        );
    }

    #[tokio::test]
    async fn memory_store_keeps_records_per_collection() {
        let store = MemoryRecordStore::new();
        let id = store.insert("creditScore", &json!({"status": "processing"})).await.unwrap();
        store.insert("other", &json!({})).await.unwrap();

        let records = store.records("creditScore");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, id);
        assert_eq!(records[0].1["status"], "processing");
        assert!(store.records("missing").is_empty());
    }

    #[test]
    fn processing_record_carries_processing_status() {
        let submitter = Submitter {
            user_id: "u-1".to_owned(),
            user_email: "ana@example.com".to_owned(),
        };
        let form = CreditForm {
            cnpj: "12.345.678/0001-90".to_owned(),
            company_name: "ACME".to_owned(),
            sector: "Serviços".to_owned(),
            credit_amount: "R$ 10.000,00".to_owned(),
        };
        let record = ProcessingRecord::new(&submitter, &form, Vec::new(), Utc::now());
        let value = serde_json::to_value(record).unwrap();
        assert_eq!(value["status"], "processing");
        assert_eq!(value["userId"], "u-1");
        assert_eq!(value["companyName"], "ACME");
        assert!(value["uploadedAt"].is_string());
    }

    #[test]
    fn income_record_flattens_the_payslip() {
        let submitter = Submitter {
            user_id: "u-2".to_owned(),
            user_email: "bia@example.com".to_owned(),
        };
        let payslip = UploadedFile {
            name: "holerite.pdf".to_owned(),
            url: "https://files.example.com/holerite.pdf".to_owned(),
            size: 4096,
            content_type: "application/pdf".to_owned(),
        };
        let value =
            serde_json::to_value(IncomeRecord::new(&submitter, Some(&payslip), Utc::now())).unwrap();
        assert_eq!(value["fileName"], "holerite.pdf");
        assert_eq!(value["fileUrl"], "https://files.example.com/holerite.pdf");
        assert_eq!(value["fileSize"], 4096);
        assert_eq!(value["fileType"], "application/pdf");
        assert_eq!(value["status"], "processing");
    }

    #[test]
    fn income_record_without_payslip_has_empty_file_fields() {
        let submitter = Submitter {
            user_id: "u-2".to_owned(),
            user_email: "bia@example.com".to_owned(),
        };
        let value = serde_json::to_value(IncomeRecord::new(&submitter, None, Utc::now())).unwrap();
        assert_eq!(value["fileName"], "");
        assert_eq!(value["fileUrl"], "");
        assert_eq!(value["fileSize"], 0);
    }
}
