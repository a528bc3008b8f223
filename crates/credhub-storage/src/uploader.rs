//! Sequential uploads with linear-backoff retry and progress reporting.
//!
//! A single upload runs as a small state machine: attempt counter, last
//! error, progress percent. Each attempt reports 10% at start, ramps toward
//! 90% while the transfer is pending, 95% once stored and 100% once the
//! public URL is known. A failed attempt resets progress to 0 and, unless it
//! was the last, waits `retry_delay * attempt` before trying again.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use credhub_core::{FileCandidate, UploadConfig};
use serde::Serialize;

use crate::error::{StorageError, UploadError};
use crate::messages::user_message;
use crate::store::ObjectStore;
use crate::validator::validate;

const PROGRESS_START: u8 = 10;
const PROGRESS_RAMP_CAP: f64 = 90.0;
const PROGRESS_RAMP_STEP_MIN: f64 = 1.0;
const PROGRESS_RAMP_STEP_MAX: f64 = 20.0;
const PROGRESS_STORED: u8 = 95;
const PROGRESS_DONE: u8 = 100;
const PROGRESS_TICK: Duration = Duration::from_millis(500);

/// Suspension used between retry attempts.
pub trait Delay: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Backoff delay on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

impl Delay for TokioDelay {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// Descriptor of an uploaded file, embedded into analysis requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    pub name: String,
    pub url: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
}

impl UploadedFile {
    /// Pairs each file with the URL at the same position.
    #[must_use]
    pub fn describe(files: &[FileCandidate], urls: &[String]) -> Vec<Self> {
        files
            .iter()
            .zip(urls)
            .map(|(file, url)| Self {
                name: file.name.clone(),
                url: url.clone(),
                size: file.byte_size(),
                content_type: file.mime_type.clone(),
            })
            .collect()
    }
}

/// Object path for the `index`-th file of a batch: `{base}/{ts}_{index}_{name}`.
#[must_use]
pub fn object_path(base_path: &str, timestamp_ms: i64, index: usize, name: &str) -> String {
    format!(
        "{}/{timestamp_ms}_{index}_{name}",
        base_path.trim_end_matches('/')
    )
}

/// Overall batch progress: `(completed + current / 100) / total`, as a rounded percent.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn overall_percent(completed: usize, current: u8, total: usize) -> u8 {
    if total == 0 {
        return PROGRESS_DONE;
    }
    let fraction = (completed as f64 + f64::from(current) / 100.0) / total as f64;
    (fraction * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Uploads files to an [`ObjectStore`] under an [`UploadConfig`].
pub struct Uploader<S, D = TokioDelay> {
    store: S,
    delay: D,
    config: UploadConfig,
}

impl<S: ObjectStore> Uploader<S> {
    pub fn new(store: S, config: UploadConfig) -> Self {
        Self::with_delay(store, config, TokioDelay)
    }
}

impl<S: ObjectStore, D: Delay> Uploader<S, D> {
    pub fn with_delay(store: S, config: UploadConfig, delay: D) -> Self {
        Self {
            store,
            delay,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Uploads one file to `path`, returning its public URL.
    ///
    /// The file is validated first; an invalid file fails immediately without
    /// touching the store. At most `max_retries` attempts are made (a value
    /// of 0 is treated as 1).
    ///
    /// # Errors
    ///
    /// - [`UploadError::Validation`] if the file fails type/size validation.
    /// - [`UploadError::Exhausted`] once every attempt has failed.
    pub async fn upload_with_retry<P>(
        &self,
        file: &FileCandidate,
        path: &str,
        mut on_progress: P,
    ) -> Result<String, UploadError>
    where
        P: FnMut(u8),
    {
        let outcome = validate(file, &self.config);
        if !outcome.is_valid {
            let message = outcome.error.unwrap_or_default();
            tracing::warn!(file = %file.name, error = %message, "file rejected before upload");
            return Err(UploadError::Validation(message));
        }

        let max_retries = self.config.max_retries.max(1);
        let mut attempt = 1u32;
        loop {
            tracing::debug!(file = %file.name, attempt, max_retries, path, "upload attempt");
            match self.attempt(file, path, &mut on_progress).await {
                Ok(url) => {
                    tracing::info!(file = %file.name, attempt, "upload succeeded");
                    return Ok(url);
                }
                Err(err) => {
                    tracing::warn!(
                        file = %file.name,
                        attempt,
                        max_retries,
                        error = %err,
                        "upload attempt failed"
                    );
                    on_progress(0);

                    if attempt >= max_retries {
                        let message = user_message(&err.to_string());
                        tracing::error!(
                            file = %file.name,
                            attempts = max_retries,
                            error = %err,
                            "upload retries exhausted"
                        );
                        return Err(UploadError::Exhausted {
                            attempts: max_retries,
                            message,
                            source: err,
                        });
                    }

                    let delay = self.config.retry_delay.saturating_mul(attempt);
                    tracing::warn!(
                        file = %file.name,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "waiting before next upload attempt"
                    );
                    self.delay.sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// One physical attempt: put with a progress ramp, then resolve the URL.
    async fn attempt<P>(
        &self,
        file: &FileCandidate,
        path: &str,
        on_progress: &mut P,
    ) -> Result<String, StorageError>
    where
        P: FnMut(u8),
    {
        on_progress(PROGRESS_START);

        let put = self.store.put(path, &file.content, &file.mime_type);
        tokio::pin!(put);

        let mut ticker =
            tokio::time::interval_at(tokio::time::Instant::now() + PROGRESS_TICK, PROGRESS_TICK);
        let mut current = f64::from(PROGRESS_START);

        let object = loop {
            tokio::select! {
                biased;
                result = &mut put => break result?,
                _ = ticker.tick() => {
                    current = (current
                        + rand::random_range(PROGRESS_RAMP_STEP_MIN..PROGRESS_RAMP_STEP_MAX))
                    .min(PROGRESS_RAMP_CAP);
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let percent = current as u8;
                    on_progress(percent);
                }
            }
        };

        on_progress(PROGRESS_STORED);
        let url = self.store.resolve_public_url(&object).await?;
        on_progress(PROGRESS_DONE);
        Ok(url)
    }

    /// Uploads `files` one after another under `base_path`, returning URLs in
    /// input order.
    ///
    /// Paths embed a strictly increasing millisecond timestamp and the file's
    /// index, so same-named files never collide. The batch is all-or-nothing:
    /// the first file that fails terminally aborts it, later files are never
    /// attempted and URLs already obtained are not returned.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Batch`] naming the failed file.
    pub async fn upload_multiple<F, O>(
        &self,
        files: &[FileCandidate],
        base_path: &str,
        mut on_file_progress: F,
        mut on_overall_progress: O,
    ) -> Result<Vec<String>, UploadError>
    where
        F: FnMut(usize, u8),
        O: FnMut(u8),
    {
        let total = files.len();
        let mut urls = Vec::with_capacity(total);
        let mut last_timestamp = i64::MIN;

        for (index, file) in files.iter().enumerate() {
            let timestamp = Utc::now()
                .timestamp_millis()
                .max(last_timestamp.saturating_add(1));
            last_timestamp = timestamp;
            let path = object_path(base_path, timestamp, index, &file.name);

            let result = self
                .upload_with_retry(file, &path, |percent| {
                    on_file_progress(index, percent);
                    on_overall_progress(overall_percent(index, percent, total));
                })
                .await;

            match result {
                Ok(url) => {
                    tracing::info!(index, total, file = %file.name, "file uploaded");
                    urls.push(url);
                }
                Err(err) => {
                    tracing::error!(index, file = %file.name, error = %err, "batch upload aborted");
                    let message = match &err {
                        UploadError::Exhausted { .. } => err.to_string(),
                        other => other.user_message().to_owned(),
                    };
                    return Err(UploadError::Batch {
                        index,
                        file_name: file.name.clone(),
                        message,
                        source: Box::new(err),
                    });
                }
            }
        }

        Ok(urls)
    }
}

#[cfg(test)]
#[path = "uploader_test.rs"]
mod tests;
