//! HTTP layer: request building and status mapping.
//!
//! This is the ONLY place for status code handling. client/mod.rs never
//! interprets status codes.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response};
use tracing::debug;

use crate::auth::TokenProvider;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::types::{ContentMetadata, DirEntry, PutContentsRequest, PutContentsResponse};

use super::helpers::{contents_url, error_message};

/// JSON representation of the contents API.
pub(crate) const MEDIA_TYPE_JSON: &str = "application/vnd.github+json";

/// Raw bytes, regardless of file size.
pub(crate) const MEDIA_TYPE_RAW: &str = "application/vnd.github.raw";

/// Outcome of a directory GET.
#[derive(Debug)]
pub(crate) enum DirectoryOutcome {
    Missing,
    NotADirectory,
    Entries(Vec<DirEntry>),
}

/// HTTP backend for making requests (holds reqwest client, auth, config).
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
    pub(crate) token_provider: TokenProvider,
    pub(crate) config: StoreConfig,
}

impl HttpBackend {
    /// Metadata of a file; `None` on 404.
    pub(crate) async fn get_metadata(&self, path: &str) -> StoreResult<Option<ContentMetadata>> {
        let request = self.request(
            Method::GET,
            path,
            true,
            MEDIA_TYPE_JSON,
            self.config.metadata_timeout(),
        )?;

        let response = match self.send(request, path).await {
            Ok(response) => response,
            Err(StoreError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        let value: serde_json::Value = read_json(response, path).await?;
        if value.is_array() {
            return Err(StoreError::InvalidResponse {
                message: format!("{} is a directory, not a file", path),
            });
        }

        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| StoreError::InvalidResponse {
                message: format!("failed to parse metadata for {}: {}", path, e),
            })
    }

    /// Create or replace a file; 409 maps to `VersionConflict`.
    pub(crate) async fn put_contents(
        &self,
        path: &str,
        body: &PutContentsRequest<'_>,
    ) -> StoreResult<PutContentsResponse> {
        let request = self
            .request(
                Method::PUT,
                path,
                false,
                MEDIA_TYPE_JSON,
                self.config.content_timeout(),
            )?
            .json(body);

        let response = self.send(request, path).await?;
        read_json(response, path).await
    }

    /// Raw file bytes; 404 maps to `NotFound`.
    pub(crate) async fn get_raw(&self, path: &str) -> StoreResult<Vec<u8>> {
        let request = self.request(
            Method::GET,
            path,
            true,
            MEDIA_TYPE_RAW,
            self.config.content_timeout(),
        )?;

        let response = self.send(request, path).await?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// Directory entries; a 404 or a file at `path` is not an error.
    pub(crate) async fn get_directory(&self, path: &str) -> StoreResult<DirectoryOutcome> {
        let request = self.request(
            Method::GET,
            path,
            true,
            MEDIA_TYPE_JSON,
            self.config.metadata_timeout(),
        )?;

        let response = match self.send(request, path).await {
            Ok(response) => response,
            Err(StoreError::NotFound { .. }) => return Ok(DirectoryOutcome::Missing),
            Err(e) => return Err(e),
        };

        let value: serde_json::Value = read_json(response, path).await?;
        if !value.is_array() {
            return Ok(DirectoryOutcome::NotADirectory);
        }

        serde_json::from_value(value)
            .map(DirectoryOutcome::Entries)
            .map_err(|e| StoreError::InvalidResponse {
                message: format!("failed to parse listing of {}: {}", path, e),
            })
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        with_ref: bool,
        accept: &'static str,
        timeout: Duration,
    ) -> StoreResult<RequestBuilder> {
        let branch = with_ref.then_some(self.config.branch.as_str());
        let url = contents_url(
            &self.config.api_url,
            &self.config.owner,
            &self.config.repo,
            path,
            branch,
        )?;
        debug!(method = %method, url = %url, "store request");

        let mut request = self
            .client
            .request(method, url)
            .header(ACCEPT, accept)
            .timeout(timeout);

        if let Some(value) = self.token_provider.authorization()? {
            request = request.header(AUTHORIZATION, value);
        }

        Ok(request)
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> StoreResult<Response> {
        let response = request.send().await?;
        let status = response.status();

        match status.as_u16() {
            200..=299 => Ok(response),

            404 => Err(StoreError::NotFound {
                path: path.to_string(),
            }),

            409 => Err(StoreError::VersionConflict {
                path: path.to_string(),
            }),

            code => {
                let body = response.text().await.unwrap_or_default();
                Err(StoreError::Remote {
                    status: code,
                    message: error_message(&body, status.canonical_reason()),
                })
            }
        }
    }
}

async fn read_json<T>(response: Response, path: &str) -> StoreResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::InvalidResponse {
        message: format!("failed to parse response for {}: {}", path, e),
    })
}
