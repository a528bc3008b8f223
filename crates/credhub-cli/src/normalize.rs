use std::path::Path;

use anyhow::Context;
use credhub_analysis::normalize_body;

use crate::report::render_report;

/// Normalize a saved webhook reply and print the canonical record.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the reply cannot be
/// normalized. Only the user-facing message is reported for the latter; the
/// raw reply goes to the log.
pub(crate) fn run_normalize(path: &Path, as_report: bool) -> anyhow::Result<()> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let record = match normalize_body(&body) {
        Ok(record) => record,
        Err(err) => {
            tracing::debug!(error = %err, path = %path.display(), "normalization failed");
            anyhow::bail!("{}", err.user_message());
        }
    };

    if as_report {
        print!("{}", render_report(&record));
    } else {
        println!("{}", serde_json::to_string_pretty(&record)?);
    }
    Ok(())
}
