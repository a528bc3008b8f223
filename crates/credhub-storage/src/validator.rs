//! Pre-upload checks: MIME allow-list and maximum size.

use credhub_core::{FileCandidate, UploadConfig, ValidationOutcome};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[allow(clippy::cast_precision_loss)]
fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Checks `file` against the allow-list and size limit in `config`.
///
/// The type check runs first, so a disallowed type is reported even when the
/// file is also too large. Only the upper size bound is enforced; empty files
/// are accepted.
#[must_use]
pub fn validate(file: &FileCandidate, config: &UploadConfig) -> ValidationOutcome {
    if !config.allows(&file.mime_type) {
        return ValidationOutcome::invalid(format!(
            "File type not allowed ({}). Accepted: {}",
            file.mime_type,
            config.allowed_types.join(", ")
        ));
    }

    let size = file.byte_size();
    if size > config.max_file_size {
        return ValidationOutcome::invalid(format!(
            "File too large ({:.1}MB). Maximum allowed: {:.1}MB",
            megabytes(size),
            megabytes(config.max_file_size)
        ));
    }

    ValidationOutcome::valid()
}
