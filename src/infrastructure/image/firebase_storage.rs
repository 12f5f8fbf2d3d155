//! Firebase Storage download-URL resolution over the REST API.

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use tracing::{debug, trace};

use crate::domain::errors::ImageError;
use crate::domain::ports::StorageResolverPort;

/// Default REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://firebasestorage.googleapis.com";

/// Characters left unescaped in an object name, matching `encodeURIComponent`.
const OBJECT_NAME: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Object metadata returned by the storage API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    #[serde(default)]
    download_tokens: Option<String>,
}

/// Resolves storage paths to tokenized download URLs.
pub struct FirebaseStorageResolver {
    http_client: reqwest::Client,
    api_base: String,
    bucket: String,
}

impl std::fmt::Debug for FirebaseStorageResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseStorageResolver")
            .field("api_base", &self.api_base)
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

impl FirebaseStorageResolver {
    /// Creates a resolver for `bucket`.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(
        api_base: impl Into<String>,
        bucket: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ImageError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ImageError::storage("", format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
        })
    }

    /// Percent-encodes an object path as a single URL segment.
    #[must_use]
    pub fn encode_object_path(path: &str) -> String {
        utf8_percent_encode(path, OBJECT_NAME).to_string()
    }

    /// Returns the metadata endpoint for `path`.
    #[must_use]
    pub fn metadata_url(&self, path: &str) -> String {
        format!(
            "{}/v0/b/{}/o/{}",
            self.api_base,
            self.bucket,
            Self::encode_object_path(path)
        )
    }

    /// Builds the download URL for `path`, tokenized when a token is known.
    #[must_use]
    pub fn download_url(&self, path: &str, token: Option<&str>) -> String {
        let base = format!("{}?alt=media", self.metadata_url(path));
        match token {
            Some(token) => format!("{base}&token={token}"),
            None => base,
        }
    }
}

#[async_trait]
impl StorageResolverPort for FirebaseStorageResolver {
    async fn resolve_storage_path(&self, path: &str) -> Result<Option<String>, ImageError> {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            return Ok(None);
        }

        let url = self.metadata_url(path);
        trace!(url = %url, "Fetching object metadata");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ImageError::storage(path, format!("Request failed: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!(path = %path, "Storage object not found");
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(ImageError::storage(
                path,
                format!(
                    "HTTP {}: {}",
                    response.status(),
                    response.status().canonical_reason().unwrap_or("Unknown")
                ),
            ));
        }

        let metadata: ObjectMetadata = response
            .json()
            .await
            .map_err(|e| ImageError::storage(path, format!("Invalid metadata: {e}")))?;

        let token = metadata
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').map(str::trim).find(|t| !t.is_empty()));

        Ok(Some(self.download_url(path, token)))
    }
}
