//! Turning paths on disk into upload candidates.

use std::path::Path;

use anyhow::Context;
use credhub_core::FileCandidate;

/// Guesses a MIME type from the file extension, the way a browser labels a
/// picked file.
pub(crate) fn mime_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

/// Reads `path` into a [`FileCandidate`] named after its file name.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub(crate) fn read_candidate(path: &Path) -> anyhow::Result<FileCandidate> {
    let content =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    Ok(FileCandidate::new(name, mime_type_for(path), content))
}
