//! In-memory object store for tests and dry runs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{ObjectStore, StoredObject};
use crate::error::StorageError;

/// Injected failure: every `put` whose path contains `pattern` fails with
/// `make_error()` until `remaining` reaches zero.
struct ScriptedFailure {
    pattern: String,
    remaining: u32,
    make_error: fn(&str) -> StorageError,
}

#[derive(Default)]
struct MemoryState {
    objects: HashMap<String, Vec<u8>>,
    put_attempts: Vec<String>,
    failures: Vec<ScriptedFailure>,
}

/// Thread-safe in-memory [`ObjectStore`].
///
/// Public URLs take the form `memory://<path>`. Failures can be scripted per
/// path pattern to exercise retry behaviour.
#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryObjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `times` puts to any path containing `pattern` fail.
    /// Pass `u32::MAX` to fail forever.
    pub fn fail_puts_matching(&self, pattern: &str, times: u32, make_error: fn(&str) -> StorageError) {
        self.lock().failures.push(ScriptedFailure {
            pattern: pattern.to_owned(),
            remaining: times,
            make_error,
        });
    }

    /// Every path passed to `put`, in call order, including failed attempts.
    #[must_use]
    pub fn put_attempts(&self) -> Vec<String> {
        self.lock().put_attempts.clone()
    }

    #[must_use]
    pub fn object(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().objects.get(path).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().expect("lock poisoned")
    }
}

impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        _content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let mut state = self.lock();
        state.put_attempts.push(path.to_owned());

        if let Some(failure) = state
            .failures
            .iter_mut()
            .find(|f| f.remaining > 0 && path.contains(&f.pattern))
        {
            failure.remaining = failure.remaining.saturating_sub(1);
            return Err((failure.make_error)(path));
        }

        state.objects.insert(path.to_owned(), bytes.to_vec());
        Ok(StoredObject {
            path: path.to_owned(),
            size: bytes.len() as u64,
        })
    }

    async fn resolve_public_url(&self, object: &StoredObject) -> Result<String, StorageError> {
        if self.lock().objects.contains_key(&object.path) {
            Ok(format!("memory://{}", object.path))
        } else {
            Err(StorageError::ObjectNotFound {
                path: object.path.clone(),
            })
        }
    }
}
