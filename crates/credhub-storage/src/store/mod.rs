//! Object-store boundary: put bytes at a path, then resolve a fetchable URL.

mod http;
mod memory;

use std::future::Future;

use crate::error::StorageError;

pub use http::HttpObjectStore;
pub use memory::MemoryObjectStore;

/// Handle for an object written by [`ObjectStore::put`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub path: String,
    pub size: u64,
}

/// Minimal blob store used by the uploader.
///
/// Writing the same path twice overwrites the previous object, which keeps
/// retried uploads idempotent at the storage level.
pub trait ObjectStore: Send + Sync {
    fn put(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> impl Future<Output = Result<StoredObject, StorageError>> + Send;

    fn resolve_public_url(
        &self,
        object: &StoredObject,
    ) -> impl Future<Output = Result<String, StorageError>> + Send;
}
