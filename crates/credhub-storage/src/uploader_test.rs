use std::sync::{Arc, Mutex};

use super::*;
use crate::store::{MemoryObjectStore, StoredObject};

/// Records requested backoff delays instead of sleeping.
#[derive(Clone, Default)]
struct RecordingDelay {
    waits: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingDelay {
    fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

impl Delay for RecordingDelay {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        self.waits.lock().unwrap().push(duration);
        std::future::ready(())
    }
}

fn server_unavailable(path: &str) -> StorageError {
    StorageError::Unknown {
        status: 503,
        path: path.to_owned(),
    }
}

fn config() -> UploadConfig {
    UploadConfig {
        max_retries: 3,
        retry_delay: Duration::from_millis(1000),
        ..UploadConfig::default()
    }
}

fn pdf(name: &str) -> FileCandidate {
    FileCandidate::new(name, "application/pdf", b"%PDF-1.7 demo".to_vec())
}

fn uploader(store: &MemoryObjectStore) -> (Uploader<MemoryObjectStore, RecordingDelay>, RecordingDelay) {
    let delay = RecordingDelay::default();
    (
        Uploader::with_delay(store.clone(), config(), delay.clone()),
        delay,
    )
}

// -----------------------------------------------------------------------
// upload_with_retry
// -----------------------------------------------------------------------

#[tokio::test]
async fn invalid_file_makes_no_network_attempt() {
    let store = MemoryObjectStore::new();
    let (uploader, delay) = uploader(&store);
    let file = FileCandidate::new("notes.txt", "text/plain", b"hello".to_vec());

    let result = uploader
        .upload_with_retry(&file, "docs/notes.txt", |_| {})
        .await;

    assert!(matches!(result, Err(UploadError::Validation(_))));
    assert!(store.put_attempts().is_empty());
    assert!(delay.waits().is_empty());
}

#[tokio::test]
async fn first_try_success_reports_full_progress() {
    let store = MemoryObjectStore::new();
    let (uploader, delay) = uploader(&store);
    let mut progress = Vec::new();

    let url = uploader
        .upload_with_retry(&pdf("dre.pdf"), "docs/dre.pdf", |p| progress.push(p))
        .await
        .unwrap();

    assert_eq!(url, "memory://docs/dre.pdf");
    assert_eq!(progress.first(), Some(&10));
    assert_eq!(progress.last(), Some(&100));
    assert!(progress.contains(&95));
    assert_eq!(store.put_attempts().len(), 1);
    assert!(delay.waits().is_empty());
}

#[tokio::test]
async fn transient_failure_is_retried_after_linear_delay() {
    let store = MemoryObjectStore::new();
    store.fail_puts_matching("dre.pdf", 1, server_unavailable);
    let (uploader, delay) = uploader(&store);
    let mut progress = Vec::new();

    let url = uploader
        .upload_with_retry(&pdf("dre.pdf"), "docs/dre.pdf", |p| progress.push(p))
        .await
        .unwrap();

    assert_eq!(url, "memory://docs/dre.pdf");
    assert_eq!(store.put_attempts().len(), 2);
    assert_eq!(delay.waits(), vec![Duration::from_millis(1000)]);
    assert_eq!(progress, vec![10, 0, 10, 95, 100]);
}

/// Memory store whose writes stay pending for `latency`.
#[derive(Clone)]
struct SlowStore {
    inner: MemoryObjectStore,
    latency: Duration,
}

impl ObjectStore for SlowStore {
    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        tokio::time::sleep(self.latency).await;
        self.inner.put(path, bytes, content_type).await
    }

    async fn resolve_public_url(&self, object: &StoredObject) -> Result<String, StorageError> {
        self.inner.resolve_public_url(object).await
    }
}

#[tokio::test(start_paused = true)]
async fn slow_transfer_ramps_progress_below_ninety() {
    let store = SlowStore {
        inner: MemoryObjectStore::new(),
        latency: Duration::from_secs(120),
    };
    let uploader = Uploader::with_delay(store, config(), RecordingDelay::default());
    let mut progress = Vec::new();

    uploader
        .upload_with_retry(&pdf("dre.pdf"), "docs/dre.pdf", |p| progress.push(p))
        .await
        .unwrap();

    let (head, tail) = progress.split_at(progress.len() - 2);
    assert_eq!(tail, [95, 100]);
    assert_eq!(head[0], 10);

    let ramp = &head[1..];
    assert!(ramp.len() >= 10, "expected many ticks, got {progress:?}");
    assert!(ramp.iter().all(|p| *p > 10 && *p <= 90), "{progress:?}");
    assert!(ramp.windows(2).all(|w| w[0] <= w[1]), "{progress:?}");
    assert_eq!(ramp.last(), Some(&90));
}

#[tokio::test]
async fn exhausted_retries_make_exactly_max_attempts() {
    let store = MemoryObjectStore::new();
    store.fail_puts_matching("dre.pdf", u32::MAX, server_unavailable);
    let (uploader, delay) = uploader(&store);
    let mut progress = Vec::new();

    let err = uploader
        .upload_with_retry(&pdf("dre.pdf"), "docs/dre.pdf", |p| progress.push(p))
        .await
        .unwrap_err();

    assert_eq!(store.put_attempts().len(), 3);
    assert_eq!(
        delay.waits(),
        vec![Duration::from_millis(1000), Duration::from_millis(2000)]
    );
    assert_eq!(progress.last(), Some(&0));
    match err {
        UploadError::Exhausted {
            attempts, message, ..
        } => {
            assert_eq!(attempts, 3);
            assert_eq!(
                message,
                "Internal server error. Please try again in a few minutes."
            );
        }
        other => panic!("expected Exhausted, got {other:?}"),
    }
}

#[tokio::test]
async fn exhausted_error_states_attempt_count() {
    let store = MemoryObjectStore::new();
    store.fail_puts_matching("dre.pdf", u32::MAX, server_unavailable);
    let (uploader, _) = uploader(&store);

    let err = uploader
        .upload_with_retry(&pdf("dre.pdf"), "docs/dre.pdf", |_| {})
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("Upload failed after 3 attempts: "));
}

#[tokio::test]
async fn zero_max_retries_still_attempts_once() {
    let store = MemoryObjectStore::new();
    let delay = RecordingDelay::default();
    let config = UploadConfig {
        max_retries: 0,
        ..config()
    };
    let uploader = Uploader::with_delay(store.clone(), config, delay);

    let url = uploader
        .upload_with_retry(&pdf("dre.pdf"), "docs/dre.pdf", |_| {})
        .await;

    assert!(url.is_ok());
    assert_eq!(store.put_attempts().len(), 1);
}

// -----------------------------------------------------------------------
// upload_multiple
// -----------------------------------------------------------------------

#[tokio::test]
async fn batch_returns_urls_in_input_order() {
    let store = MemoryObjectStore::new();
    let (uploader, _) = uploader(&store);
    let files = vec![pdf("a.pdf"), pdf("b.pdf"), pdf("c.pdf")];

    let urls = uploader
        .upload_multiple(&files, "demonstrativos/u1/", |_, _| {}, |_| {})
        .await
        .unwrap();

    assert_eq!(urls.len(), 3);
    assert!(urls[0].starts_with("memory://demonstrativos/u1/"));
    assert!(urls[0].ends_with("_0_a.pdf"));
    assert!(urls[1].ends_with("_1_b.pdf"));
    assert!(urls[2].ends_with("_2_c.pdf"));
}

#[tokio::test]
async fn batch_paths_never_collide_for_same_names() {
    let store = MemoryObjectStore::new();
    let (uploader, _) = uploader(&store);
    let files = vec![pdf("extrato.pdf"), pdf("extrato.pdf")];

    let urls = uploader
        .upload_multiple(&files, "demonstrativos/u1", |_, _| {}, |_| {})
        .await
        .unwrap();

    assert_ne!(urls[0], urls[1]);
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn batch_reports_sequential_file_progress_and_overall_completion() {
    let store = MemoryObjectStore::new();
    let (uploader, _) = uploader(&store);
    let files = vec![pdf("a.pdf"), pdf("b.pdf")];
    let mut per_file = Vec::new();
    let mut overall = Vec::new();

    uploader
        .upload_multiple(
            &files,
            "demonstrativos/u1",
            |index, p| per_file.push((index, p)),
            |p| overall.push(p),
        )
        .await
        .unwrap();

    let first_of_second = per_file.iter().position(|(i, _)| *i == 1).unwrap();
    assert!(per_file[..first_of_second].iter().all(|(i, _)| *i == 0));
    assert!(per_file[first_of_second..].iter().all(|(i, _)| *i == 1));
    assert_eq!(per_file[first_of_second - 1], (0, 100));
    assert_eq!(overall.first(), Some(&5));
    assert!(overall.contains(&50));
    assert_eq!(overall.last(), Some(&100));
}

#[tokio::test]
async fn batch_fails_fast_naming_the_failed_file() {
    let store = MemoryObjectStore::new();
    store.fail_puts_matching("b.pdf", u32::MAX, server_unavailable);
    let (uploader, _) = uploader(&store);
    let files = vec![pdf("a.pdf"), pdf("b.pdf"), pdf("c.pdf")];

    let err = uploader
        .upload_multiple(&files, "demonstrativos/u1", |_, _| {}, |_| {})
        .await
        .unwrap_err();

    assert!(err.to_string().contains("\"b.pdf\""), "{err}");
    assert!(matches!(err, UploadError::Batch { index: 1, .. }));
    assert_eq!(
        err.user_message(),
        "Upload failed after 3 attempts: Internal server error. Please try again in a few minutes."
    );

    let attempts = store.put_attempts();
    assert_eq!(attempts.iter().filter(|p| p.ends_with("a.pdf")).count(), 1);
    assert_eq!(attempts.iter().filter(|p| p.ends_with("b.pdf")).count(), 3);
    assert_eq!(attempts.iter().filter(|p| p.ends_with("c.pdf")).count(), 0);
}

#[tokio::test]
async fn batch_rejects_invalid_file_without_uploading_it() {
    let store = MemoryObjectStore::new();
    let (uploader, _) = uploader(&store);
    let files = vec![
        pdf("a.pdf"),
        FileCandidate::new("planilha.xlsx", "application/vnd.ms-excel", vec![1, 2, 3]),
    ];

    let err = uploader
        .upload_multiple(&files, "demonstrativos/u1", |_, _| {}, |_| {})
        .await
        .unwrap_err();

    assert!(err.to_string().contains("planilha.xlsx"));
    assert!(err.to_string().contains("File type not allowed"));
    assert!(err.user_message().starts_with("File type not allowed"));
    assert_eq!(store.put_attempts().len(), 1);
}

// -----------------------------------------------------------------------
// helpers
// -----------------------------------------------------------------------

#[test]
fn overall_percent_rounds_fractional_progress() {
    assert_eq!(overall_percent(0, 100, 2), 50);
    assert_eq!(overall_percent(1, 50, 4), 38);
    assert_eq!(overall_percent(2, 100, 3), 100);
}

#[test]
fn object_path_joins_timestamp_index_and_name() {
    assert_eq!(
        object_path("demonstrativos/u1/", 1_700_000_000_000, 2, "dre.pdf"),
        "demonstrativos/u1/1700000000000_2_dre.pdf"
    );
}

#[test]
fn describe_pairs_files_with_urls() {
    let files = vec![pdf("a.pdf"), pdf("b.pdf")];
    let urls = vec!["u-a".to_owned(), "u-b".to_owned()];
    let described = UploadedFile::describe(&files, &urls);
    assert_eq!(described[1].name, "b.pdf");
    assert_eq!(described[1].url, "u-b");
    assert_eq!(described[1].content_type, "application/pdf");
    let json = serde_json::to_value(&described[0]).unwrap();
    assert_eq!(json["type"], "application/pdf");
}
