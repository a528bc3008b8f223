//! REST object store speaking the Firebase Storage `v0` protocol.
//!
//! Uploads go to `POST {base}/o?name={path}` with the raw bytes as the body.
//! The public URL is resolved from the object metadata at
//! `GET {base}/o/{encoded path}`, whose `downloadTokens` field authorizes
//! `?alt=media` downloads.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;

use super::{ObjectStore, StoredObject};
use crate::error::StorageError;

/// Object names travel as a single path segment, so `/` must be escaped too.
const OBJECT_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    name: String,
    /// Sent as a decimal string by Firebase; tolerated as a number too.
    #[serde(default)]
    size: Option<serde_json::Value>,
    #[serde(default)]
    download_tokens: Option<String>,
}

impl ObjectMetadata {
    fn size(&self) -> Option<u64> {
        match self.size.as_ref()? {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    fn first_token(&self) -> Option<&str> {
        self.download_tokens
            .as_deref()?
            .split(',')
            .map(str::trim)
            .find(|t| !t.is_empty())
    }
}

/// HTTP client for a bucket-scoped object store.
pub struct HttpObjectStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpObjectStore {
    /// Creates a store rooted at `base_url` (e.g.
    /// `https://firebasestorage.googleapis.com/v0/b/<bucket>`).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidUrl`] if `base_url` does not parse, or
    /// [`StorageError::Network`] if the `reqwest::Client` cannot be built.
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()
            .map_err(StorageError::Network)?;

        let base_url = base_url.trim_end_matches('/').to_owned();
        Url::parse(&base_url).map_err(|e| {
            StorageError::InvalidUrl(format!("invalid storage base URL '{base_url}': {e}"))
        })?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn upload_url(&self, path: &str) -> Result<Url, StorageError> {
        let mut url = Url::parse(&format!("{}/o", self.base_url))
            .map_err(|e| StorageError::InvalidUrl(format!("{}/o: {e}", self.base_url)))?;
        url.query_pairs_mut().append_pair("name", path);
        Ok(url)
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/o/{}",
            self.base_url,
            utf8_percent_encode(path, OBJECT_SEGMENT)
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read_metadata(
        response: reqwest::Response,
        path: &str,
    ) -> Result<ObjectMetadata, StorageError> {
        let body = response
            .text()
            .await
            .map_err(|e| StorageError::from_reqwest(e, path))?;
        serde_json::from_str(&body).map_err(|e| StorageError::Deserialize {
            context: format!("object metadata for {path}"),
            source: e,
        })
    }
}

/// Maps a non-2xx status onto a storage error code. `not_found` decides what
/// a 404 means for the calling operation.
fn status_error(
    status: StatusCode,
    path: &str,
    not_found: impl FnOnce() -> StorageError,
) -> StorageError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StorageError::Unauthorized {
            path: path.to_owned(),
        },
        StatusCode::BAD_REQUEST => StorageError::InvalidArgument(format!("rejected {path}")),
        StatusCode::NOT_FOUND => not_found(),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => StorageError::Timeout {
            path: path.to_owned(),
        },
        s if s.is_server_error() => StorageError::Unknown {
            status: s.as_u16(),
            path: path.to_owned(),
        },
        s => StorageError::UnexpectedStatus {
            status: s.as_u16(),
            path: path.to_owned(),
        },
    }
}

impl ObjectStore for HttpObjectStore {
    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let url = self.upload_url(path)?;
        let request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes.to_vec());

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| StorageError::from_reqwest(e, path))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, path, || {
                StorageError::NoDefaultBucket(self.base_url.clone())
            }));
        }

        let metadata = Self::read_metadata(response, path).await?;
        let expected = bytes.len() as u64;
        if let Some(actual) = metadata.size() {
            if actual != expected {
                return Err(StorageError::ServerFileWrongSize { expected, actual });
            }
        }

        tracing::debug!(object = %metadata.name, size = expected, "object stored");
        Ok(StoredObject {
            path: metadata.name,
            size: expected,
        })
    }

    async fn resolve_public_url(&self, object: &StoredObject) -> Result<String, StorageError> {
        let object_url = self.object_url(&object.path);
        let request = self.client.get(&object_url);

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| StorageError::from_reqwest(e, &object.path))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, &object.path, || {
                StorageError::ObjectNotFound {
                    path: object.path.clone(),
                }
            }));
        }

        let metadata = Self::read_metadata(response, &object.path).await?;
        let token = metadata.first_token().ok_or_else(|| {
            StorageError::InvalidUrl(format!("no download token for {}", object.path))
        })?;

        Ok(format!(
            "{object_url}?alt=media&token={}",
            utf8_percent_encode(token, OBJECT_SEGMENT)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> HttpObjectStore {
        HttpObjectStore::new(
            "https://storage.example.com/v0/b/bucket/",
            None,
            30,
            "credhub-test",
        )
        .expect("store construction should not fail")
    }

    #[test]
    fn object_url_escapes_slashes() {
        assert_eq!(
            store().object_url("demonstrativos/u1/17_0_dre 2023.pdf"),
            "https://storage.example.com/v0/b/bucket/o/demonstrativos%2Fu1%2F17_0_dre%202023.pdf"
        );
    }

    #[test]
    fn upload_url_carries_name_query() {
        let url = store().upload_url("a/b.pdf").unwrap();
        assert_eq!(url.path(), "/v0/b/bucket/o");
        assert_eq!(
            url.query_pairs().find(|(k, _)| k == "name").map(|(_, v)| v.into_owned()),
            Some("a/b.pdf".to_owned())
        );
    }

    #[test]
    fn rejects_unparsable_base_url() {
        let result = HttpObjectStore::new("not a url", None, 30, "credhub-test");
        assert!(matches!(result, Err(StorageError::InvalidUrl(_))));
    }

    #[test]
    fn status_mapping_covers_auth_and_server_errors() {
        let nf = || StorageError::ObjectNotFound {
            path: "x".to_owned(),
        };
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "x", nf),
            StorageError::Unauthorized { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, "x", nf),
            StorageError::Unknown { status: 502, .. }
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "x", nf),
            StorageError::ObjectNotFound { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::IM_A_TEAPOT, "x", nf),
            StorageError::UnexpectedStatus { status: 418, .. }
        ));
    }

    #[test]
    fn metadata_size_accepts_string_or_number() {
        let as_string: ObjectMetadata =
            serde_json::from_str(r#"{"name":"a","size":"12"}"#).unwrap();
        let as_number: ObjectMetadata = serde_json::from_str(r#"{"name":"a","size":12}"#).unwrap();
        assert_eq!(as_string.size(), Some(12));
        assert_eq!(as_number.size(), Some(12));
    }

    #[test]
    fn first_token_skips_blanks() {
        let meta: ObjectMetadata =
            serde_json::from_str(r#"{"name":"a","downloadTokens":" ,tok-1,tok-2"}"#).unwrap();
        assert_eq!(meta.first_token(), Some("tok-1"));
    }
}
