//! The `submit` command: the full request pipeline against live services.

use std::path::PathBuf;

use clap::Args;
use credhub_analysis::{submit_credit_analysis, HttpRecordStore, Submitter, WebhookClient};
use credhub_core::form::{format_brl, parse_brl};
use credhub_core::{AppConfig, CreditForm};
use credhub_storage::{HttpObjectStore, Uploader};

use crate::files::read_candidate;
use crate::report::render_report;

#[derive(Debug, Args)]
pub(crate) struct SubmitArgs {
    /// Company tax id (CNPJ), formatted or digits only
    #[arg(long)]
    pub cnpj: String,
    /// Company legal name
    #[arg(long)]
    pub company: String,
    /// Business sector (e.g. "Comércio")
    #[arg(long)]
    pub sector: String,
    /// Requested credit amount, e.g. "150000" or "R$ 150.000,00"
    #[arg(long)]
    pub amount: String,
    #[arg(long, env = "CREDHUB_USER_ID")]
    pub user_id: String,
    #[arg(long, env = "CREDHUB_USER_EMAIL")]
    pub user_email: String,
    /// Financial statements to upload (PDF, JPEG or PNG)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

impl SubmitArgs {
    /// The form as the web client would send it: amount rendered as BRL.
    fn form(&self) -> CreditForm {
        let credit_amount = parse_brl(&self.amount).map_or_else(|_| self.amount.clone(), format_brl);
        CreditForm {
            cnpj: self.cnpj.clone(),
            company_name: self.company.clone(),
            sector: self.sector.clone(),
            credit_amount,
        }
    }
}

/// Run one credit analysis request and print the report.
///
/// # Errors
///
/// Returns an error if a client cannot be built, a file cannot be read, or
/// any pipeline step fails. Pipeline failures are reported with their
/// user-facing message.
pub(crate) async fn run_submit(config: &AppConfig, args: SubmitArgs) -> anyhow::Result<()> {
    tracing::info!(env = %config.env, files = args.files.len(), "starting credit analysis submission");

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
    let webhook =
        WebhookClient::new(&config.webhook_url, config.http_timeout_secs, &config.user_agent)?;
    let uploader = Uploader::new(store, config.upload.clone());

    let files = args
        .files
        .iter()
        .map(|path| read_candidate(path))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let names: Vec<String> = files.iter().map(|f| f.name.clone()).collect();
    let submitter = Submitter {
        user_id: args.user_id.clone(),
        user_email: args.user_email.clone(),
    };

    let mut last_overall = None;
    let result = submit_credit_analysis(
        &uploader,
        &records,
        &webhook,
        &submitter,
        &args.form(),
        &files,
        |index, percent| {
            if percent == 100 {
                eprintln!("uploaded {}", names[index]);
            }
        },
        |percent| {
            if last_overall != Some(percent) {
                last_overall = Some(percent);
                eprintln!("upload progress {percent:>3}%");
            }
        },
    )
    .await;

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!(error = %err, "credit analysis submission failed");
            anyhow::bail!("{}", err.user_message());
        }
    };

    println!("request {} (session {})\n", outcome.request_id, outcome.session_id);
    print!("{}", render_report(&outcome.record));
    Ok(())
}
