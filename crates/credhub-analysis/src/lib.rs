//! Credit analysis and income estimate round trips: webhook client, record
//! store and the normalizer for the webhooks' historical reply shapes.

pub mod band;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod records;
pub mod webhook;

pub use band::ScoreBand;
pub use error::{AnalysisError, NormalizeError, SubmitError, INVALID_RESPONSE_FORMAT};
pub use normalize::{normalize, normalize_body, normalize_income_body, ResponseShape};
pub use pipeline::{
    payslips_path, statements_path, submit_credit_analysis, submit_income_analysis,
    IncomeOutcome, SubmissionOutcome,
};
pub use records::{
    HttpRecordStore, IncomeRecord, MemoryRecordStore, ProcessingRecord, RecordStore,
    CREDIT_SCORE_COLLECTION, INCOME_COLLECTION,
};
pub use webhook::{
    CreditRequest, IncomeRequest, Submitter, WebhookClient, CREDIT_SCORE_SERVICE,
    INCOME_ESTIMATE_SERVICE,
};
