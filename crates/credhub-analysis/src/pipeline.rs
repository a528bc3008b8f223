//! Credit analysis and income estimate submission orchestration.

use chrono::Utc;
use credhub_core::form::new_session_id;
use credhub_core::{AnalysisRecord, CreditForm, FileCandidate, IncomeEstimate};
use credhub_storage::{object_path, validate, Delay, ObjectStore, UploadedFile, Uploader};

use crate::error::SubmitError;
use crate::records::{
    IncomeRecord, ProcessingRecord, RecordStore, CREDIT_SCORE_COLLECTION, INCOME_COLLECTION,
};
use crate::webhook::{CreditRequest, IncomeRequest, Submitter, WebhookClient};

/// Storage folder holding a user's financial statements.
#[must_use]
pub fn statements_path(user_id: &str) -> String {
    format!("demonstrativos/{user_id}")
}

/// Storage folder holding a user's payslips.
#[must_use]
pub fn payslips_path(user_id: &str) -> String {
    format!("holerites/{user_id}")
}

/// What a successful submission produced.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub request_id: String,
    pub session_id: String,
    pub files: Vec<UploadedFile>,
    pub record: AnalysisRecord,
}

/// Run one credit analysis request end to end.
///
/// 1. Validate the form and every file; nothing touches the network on failure.
/// 2. Upload the files in order under `demonstrativos/{user_id}`.
/// 3. Persist a `processing` record in the `creditScore` collection.
/// 4. Post the request to the analysis webhook and normalize its reply.
///
/// A file that fails terminally aborts the batch before any record is written.
///
/// # Errors
///
/// Returns [`SubmitError`] from whichever step failed.
#[allow(clippy::too_many_arguments)]
pub async fn submit_credit_analysis<S, D, R, F, O>(
    uploader: &Uploader<S, D>,
    records: &R,
    webhook: &WebhookClient,
    submitter: &Submitter,
    form: &CreditForm,
    files: &[FileCandidate],
    on_file_progress: F,
    on_overall_progress: O,
) -> Result<SubmissionOutcome, SubmitError>
where
    S: ObjectStore,
    D: Delay,
    R: RecordStore,
    F: FnMut(usize, u8),
    O: FnMut(u8),
{
    // Step 1: Validate everything up front.
    form.validate()?;
    if files.is_empty() {
        return Err(SubmitError::NoFiles);
    }
    for file in files {
        let outcome = validate(file, uploader.config());
        if !outcome.is_valid {
            return Err(SubmitError::InvalidFile {
                file_name: file.name.clone(),
                message: outcome.error.unwrap_or_default(),
            });
        }
    }

    // Step 2: Sequential upload.
    let urls = uploader
        .upload_multiple(
            files,
            &statements_path(&submitter.user_id),
            on_file_progress,
            on_overall_progress,
        )
        .await?;
    let uploaded = UploadedFile::describe(files, &urls);

    // Step 3: Durable processing record.
    let processing = ProcessingRecord::new(submitter, form, uploaded.clone(), Utc::now());
    let processing = serde_json::to_value(&processing).map_err(SubmitError::Serialize)?;
    let request_id = records.insert(CREDIT_SCORE_COLLECTION, &processing).await?;
    tracing::info!(request_id = %request_id, files = uploaded.len(), "processing record stored");

    // Step 4: Analysis.
    let now = Utc::now();
    let session_id = new_session_id(now, &mut rand::rng());
    let request = CreditRequest::new(
        &request_id,
        submitter,
        form,
        uploaded.clone(),
        &session_id,
        now,
    );
    let record = webhook.submit(&request).await?;

    Ok(SubmissionOutcome {
        request_id,
        session_id,
        files: uploaded,
        record,
    })
}

/// What a successful income-estimate request produced.
#[derive(Debug, Clone)]
pub struct IncomeOutcome {
    pub request_id: String,
    pub file: Option<UploadedFile>,
    pub estimate: IncomeEstimate,
}

/// Run one income-estimate request end to end.
///
/// 1. Validate the payslip, if one was given.
/// 2. Upload it under `holerites/{user_id}` with retry.
/// 3. Persist a `processing` record in the `rendaPresumida` collection.
/// 4. Post the request to the income webhook and read the estimate.
///
/// The payslip is optional; without one the request carries empty file
/// fields and nothing is uploaded.
///
/// # Errors
///
/// Returns [`SubmitError`] from whichever step failed.
pub async fn submit_income_analysis<S, D, R, P>(
    uploader: &Uploader<S, D>,
    records: &R,
    webhook: &WebhookClient,
    submitter: &Submitter,
    payslip: Option<&FileCandidate>,
    on_progress: P,
) -> Result<IncomeOutcome, SubmitError>
where
    S: ObjectStore,
    D: Delay,
    R: RecordStore,
    P: FnMut(u8),
{
    // Step 1: Validate.
    if let Some(file) = payslip {
        let outcome = validate(file, uploader.config());
        if !outcome.is_valid {
            return Err(SubmitError::InvalidFile {
                file_name: file.name.clone(),
                message: outcome.error.unwrap_or_default(),
            });
        }
    }

    // Step 2: Upload.
    let uploaded = match payslip {
        Some(file) => {
            let path = object_path(
                &payslips_path(&submitter.user_id),
                Utc::now().timestamp_millis(),
                0,
                &file.name,
            );
            let url = uploader.upload_with_retry(file, &path, on_progress).await?;
            UploadedFile::describe(std::slice::from_ref(file), &[url]).pop()
        }
        None => None,
    };

    // Step 3: Durable processing record.
    let processing = IncomeRecord::new(submitter, uploaded.as_ref(), Utc::now());
    let processing = serde_json::to_value(&processing).map_err(SubmitError::Serialize)?;
    let request_id = records.insert(INCOME_COLLECTION, &processing).await?;
    tracing::info!(request_id = %request_id, has_file = uploaded.is_some(), "income record stored");

    // Step 4: Estimate.
    let request = IncomeRequest::new(&request_id, submitter, uploaded.as_ref(), Utc::now());
    let estimate = webhook.submit_income(&request).await?;

    Ok(IncomeOutcome {
        request_id,
        file: uploaded,
        estimate,
    })
}
