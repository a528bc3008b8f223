//! The `income` command: presumed income from a payslip.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use credhub_analysis::{submit_income_analysis, HttpRecordStore, Submitter, WebhookClient};
use credhub_core::AppConfig;
use credhub_storage::{HttpObjectStore, Uploader};

use crate::files::read_candidate;
use crate::report::render_income_report;

#[derive(Debug, Args)]
pub(crate) struct IncomeArgs {
    #[arg(long, env = "CREDHUB_USER_ID")]
    pub user_id: String,
    #[arg(long, env = "CREDHUB_USER_EMAIL")]
    pub user_email: String,
    /// Payslip to upload (PDF, JPEG or PNG); the request is sent without one when omitted
    pub file: Option<PathBuf>,
}

/// Run one income-estimate request and print the result.
///
/// # Errors
///
/// Returns an error if `CREDHUB_INCOME_WEBHOOK_URL` is unset, a client cannot
/// be built, the payslip cannot be read, or any pipeline step fails.
pub(crate) async fn run_income(config: &AppConfig, args: IncomeArgs) -> anyhow::Result<()> {
    let webhook_url = config
        .income_webhook_url
        .as_deref()
        .context("CREDHUB_INCOME_WEBHOOK_URL must be set for income estimates")?;
    tracing::info!(env = %config.env, has_file = args.file.is_some(), "starting income estimate");

    let store = HttpObjectStore::new(
        &config.storage_base_url,
        config.storage_token.clone(),
        config.http_timeout_secs,
        &config.user_agent,
    )?;
    let records = HttpRecordStore::new(
        &config.records_base_url,
        config.storage_token.clone(),
        config.http_timeout_secs,
        &config.user_agent,
    )?;
    let webhook = WebhookClient::new(webhook_url, config.http_timeout_secs, &config.user_agent)?;
    let uploader = Uploader::new(store, config.upload.clone());

    let payslip = args.file.as_deref().map(read_candidate).transpose()?;
    let submitter = Submitter {
        user_id: args.user_id,
        user_email: args.user_email,
    };

    let mut last = None;
    let result = submit_income_analysis(
        &uploader,
        &records,
        &webhook,
        &submitter,
        payslip.as_ref(),
        |percent| {
            if last != Some(percent) {
                last = Some(percent);
                eprintln!("upload progress {percent:>3}%");
            }
        },
    )
    .await;

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!(error = %err, "income estimate failed");
            anyhow::bail!("{}", err.user_message());
        }
    };

    println!("request {}\n", outcome.request_id);
    print!("{}", render_income_report(&outcome.estimate));
    Ok(())
}
