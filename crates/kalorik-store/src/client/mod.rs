//! Contents API client.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::auth::TokenProvider;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::retry::{ConflictRetry, TransientRetry};
use crate::store::ContentStore;
use crate::types::{DirEntry, PutContentsRequest, VersionToken};

mod helpers;
mod http;

use helpers::{encode_content, join_path};
use http::{DirectoryOutcome, HttpBackend};

/// User-Agent sent with every request.
pub const STORE_USER_AGENT: &str = concat!("kalorik-store/", env!("CARGO_PKG_VERSION"));

const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";

/// Client for a repository's contents API.
///
/// Paths are relative to the configured base path.
#[derive(Debug, Clone)]
pub struct ContentsClient {
    http: HttpBackend,
}

impl ContentsClient {
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        let token_provider = TokenProvider::from_config(config.token.as_deref());
        Self::with_token_provider(config, token_provider)
    }

    pub fn with_token_provider(
        config: StoreConfig,
        token_provider: TokenProvider,
    ) -> StoreResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(STORE_USER_AGENT));
        default_headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .build()
            .map_err(|e| StoreError::Network {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http: HttpBackend {
                client,
                token_provider,
                config,
            },
        })
    }

    pub fn from_env() -> StoreResult<Self> {
        Self::new(StoreConfig::from_env())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.http.config
    }

    pub fn is_authenticated(&self) -> bool {
        self.http.token_provider.is_authenticated()
    }

    fn full_path(&self, rel: &str) -> String {
        join_path(&self.http.config.base_path, rel)
    }
}

#[async_trait]
impl ContentStore for ContentsClient {
    async fn get_version(&self, path: &str) -> StoreResult<Option<VersionToken>> {
        let full = self.full_path(path);
        debug!(path = %full, "fetching version");

        let meta = self.http.get_metadata(&full).await?;
        Ok(meta.map(|m| VersionToken::new(m.sha)))
    }

    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        message: &str,
        version: Option<&VersionToken>,
    ) -> StoreResult<VersionToken> {
        let full = self.full_path(path);
        let config = &self.http.config;
        let committer = config.committer();
        debug!(
            path = %full,
            size = bytes.len(),
            has_version = version.is_some(),
            "putting content"
        );

        let body = PutContentsRequest {
            message,
            content: encode_content(bytes),
            branch: &config.branch,
            committer: &committer,
            sha: version.map(VersionToken::as_str),
        };

        let response = self.http.put_contents(&full, &body).await?;
        response
            .content
            .map(|meta| VersionToken::new(meta.sha))
            .ok_or_else(|| StoreError::InvalidResponse {
                message: format!("write of {} returned no content metadata", full),
            })
    }

    async fn read(&self, path: &str) -> StoreResult<Vec<u8>> {
        let full = self.full_path(path);
        debug!(path = %full, "reading content");

        self.http.get_raw(&full).await
    }

    async fn list_entries(&self, directory: &str) -> StoreResult<Vec<DirEntry>> {
        let full = self.full_path(directory);
        debug!(path = %full, "listing directory");

        match self.http.get_directory(&full).await? {
            DirectoryOutcome::Entries(entries) => Ok(entries),
            DirectoryOutcome::Missing => {
                debug!(path = %full, "directory does not exist");
                Ok(Vec::new())
            }
            DirectoryOutcome::NotADirectory => {
                debug!(path = %full, "path is not a directory");
                Ok(Vec::new())
            }
        }
    }

    fn conflict_policy(&self) -> ConflictRetry {
        ConflictRetry::new(self.http.config.conflict_retry_delay())
    }

    fn listing_policy(&self) -> TransientRetry {
        TransientRetry::new(
            self.http.config.listing_max_retries,
            self.http.config.listing_backoff(),
        )
    }
}
