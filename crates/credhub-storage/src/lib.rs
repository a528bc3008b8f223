//! File validation and resilient uploads to an object store.
//!
//! [`validate`] checks a candidate file against an [`UploadConfig`] before any
//! network call. [`Uploader`] pushes validated files to an [`ObjectStore`],
//! retrying failed attempts with linear backoff and reporting progress.

pub mod error;
pub mod messages;
pub mod store;
pub mod uploader;
pub mod validator;

pub use credhub_core::{FileCandidate, UploadConfig, ValidationOutcome};
pub use error::{StorageError, UploadError};
pub use messages::user_message;
pub use store::{HttpObjectStore, MemoryObjectStore, ObjectStore, StoredObject};
pub use uploader::{object_path, Delay, TokioDelay, UploadedFile, Uploader};
pub use validator::validate;
