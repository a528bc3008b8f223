mod files;
mod income;
mod normalize;
mod report;
mod submit;
mod validate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "credhub-cli")]
#[command(about = "Credit analysis and income estimate client")]
struct Cli {
    /// Fallback log filter when `RUST_LOG` is unset
    #[arg(long, global = true, env = "CREDHUB_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check files against the upload type and size limits
    Validate {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Normalize a saved webhook reply and print the canonical record
    Normalize {
        /// File holding the raw webhook response body
        path: PathBuf,
        /// Print a text report instead of JSON
        #[arg(long)]
        report: bool,
    },
    /// Upload statements, register the request and run the credit analysis
    Submit(submit::SubmitArgs),
    /// Upload a payslip and estimate the presumed monthly income
    Income(income::IncomeArgs),
}

fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Commands::Validate { files } => validate::run_validate(&files),
        Commands::Normalize { path, report } => normalize::run_normalize(&path, report),
        Commands::Submit(args) => {
            let config = credhub_core::load_app_config()?;
            submit::run_submit(&config, args).await
        }
        Commands::Income(args) => {
            let config = credhub_core::load_app_config()?;
            income::run_income(&config, args).await
        }
    }
}
