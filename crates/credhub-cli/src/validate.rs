use std::path::PathBuf;

use credhub_core::UploadConfig;
use credhub_storage::validate;

use crate::files::read_candidate;

/// Upload limits from the environment, or the defaults when the service
/// configuration is incomplete (validation needs no endpoints).
fn upload_config() -> UploadConfig {
    match credhub_core::load_app_config() {
        Ok(config) => config.upload,
        Err(e) => {
            tracing::debug!(error = %e, "using default upload limits");
            UploadConfig::default()
        }
    }
}

/// Validate each file and print one line per file.
///
/// # Errors
///
/// Returns an error if a file cannot be read or any file fails validation.
pub(crate) fn run_validate(paths: &[PathBuf]) -> anyhow::Result<()> {
    let config = upload_config();
    let mut rejected = 0usize;

    for path in paths {
        let file = read_candidate(path)?;
        let outcome = validate(&file, &config);
        match outcome.error {
            None if outcome.is_valid => println!("ok       {} ({})", file.name, file.mime_type),
            error => {
                rejected += 1;
                println!(
                    "rejected {}: {}",
                    file.name,
                    error.as_deref().unwrap_or("invalid file")
                );
            }
        }
    }

    if rejected > 0 {
        anyhow::bail!("{rejected} of {} file(s) failed validation", paths.len());
    }
    Ok(())
}
