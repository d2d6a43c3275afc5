//! Store and reviewer configuration.
//!
//! Values come from (highest precedence first):
//! 1. An optional YAML file with `github:` and `review:` sections
//! 2. Environment variables
//! 3. Defaults
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `GITHUB_API_URL` | `api_url` | `https://api.github.com` |
//! | `GITHUB_TOKEN` | `token` | none |
//! | `GITHUB_OWNER` | `owner` | required |
//! | `GITHUB_REPO` | `repo` | required |
//! | `GITHUB_BRANCH` | `branch` | `main` |
//! | `GITHUB_BASE_PATH` | `base_path` | `KalorikDaten` |
//! | `GITHUB_COMMITTER_NAME` | `committer_name` | `App Bot` |
//! | `GITHUB_COMMITTER_EMAIL` | `committer_email` | `bot@example.org` |
//! | `KALORIK_METADATA_TIMEOUT` | `metadata_timeout_secs` | `30` |
//! | `KALORIK_CONTENT_TIMEOUT` | `content_timeout_secs` | `60` |
//! | `KALORIK_REVIEW_PASSPHRASE` | `review.passphrase` | none |

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{StoreError, StoreResult};
use crate::types::Committer;

/// Connection and behavior settings for the contents API client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Access token sent as a bearer token.
    #[serde(default)]
    pub token: Option<String>,

    /// Repository owner.
    #[serde(default)]
    pub owner: String,

    /// Repository name.
    #[serde(default)]
    pub repo: String,

    /// Branch all reads and writes target.
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Directory inside the repository holding submissions.
    #[serde(default = "default_base_path")]
    pub base_path: String,

    #[serde(default = "default_committer_name")]
    pub committer_name: String,

    #[serde(default = "default_committer_email")]
    pub committer_email: String,

    /// Timeout for metadata and listing requests.
    #[serde(default = "default_metadata_timeout")]
    pub metadata_timeout_secs: u64,

    /// Timeout for content reads and writes.
    #[serde(default = "default_content_timeout")]
    pub content_timeout_secs: u64,

    /// Pause before re-reading the version after a conflict.
    #[serde(default = "default_conflict_delay")]
    pub conflict_retry_delay_ms: u64,

    /// Retries for listing on transient server errors.
    #[serde(default = "default_listing_retries")]
    pub listing_max_retries: u32,

    /// Base of the exponential listing backoff.
    #[serde(default = "default_listing_backoff")]
    pub listing_backoff_ms: u64,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_base_path() -> String {
    "KalorikDaten".to_string()
}

fn default_committer_name() -> String {
    "App Bot".to_string()
}

fn default_committer_email() -> String {
    "bot@example.org".to_string()
}

fn default_metadata_timeout() -> u64 {
    30
}

fn default_content_timeout() -> u64 {
    60
}

fn default_conflict_delay() -> u64 {
    300
}

fn default_listing_retries() -> u32 {
    3
}

fn default_listing_backoff() -> u64 {
    500
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            owner: String::new(),
            repo: String::new(),
            branch: default_branch(),
            base_path: default_base_path(),
            committer_name: default_committer_name(),
            committer_email: default_committer_email(),
            metadata_timeout_secs: default_metadata_timeout(),
            content_timeout_secs: default_content_timeout(),
            conflict_retry_delay_ms: default_conflict_delay(),
            listing_max_retries: default_listing_retries(),
            listing_backoff_ms: default_listing_backoff(),
        }
    }
}

impl StoreConfig {
    /// Create config from environment variables only.
    pub fn from_env() -> Self {
        AppConfig::from_env().github
    }

    /// Check that the repository is addressable.
    pub fn validate(&self) -> StoreResult<()> {
        if self.owner.trim().is_empty() {
            return Err(StoreError::Config {
                message: "repository owner is not set (GITHUB_OWNER)".to_string(),
            });
        }
        if self.repo.trim().is_empty() {
            return Err(StoreError::Config {
                message: "repository name is not set (GITHUB_REPO)".to_string(),
            });
        }
        if self.branch.trim().is_empty() {
            return Err(StoreError::Config {
                message: "branch must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn committer(&self) -> Committer {
        Committer {
            name: self.committer_name.clone(),
            email: self.committer_email.clone(),
        }
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.metadata_timeout_secs)
    }

    pub fn content_timeout(&self) -> Duration {
        Duration::from_secs(self.content_timeout_secs)
    }

    pub fn conflict_retry_delay(&self) -> Duration {
        Duration::from_millis(self.conflict_retry_delay_ms)
    }

    pub fn listing_backoff(&self) -> Duration {
        Duration::from_millis(self.listing_backoff_ms)
    }

    /// Set the API base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set owner and repository name.
    pub fn with_repository(mut self, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        self.owner = owner.into();
        self.repo = repo.into();
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Set the base path; surrounding slashes are dropped.
    pub fn with_base_path(mut self, base_path: impl AsRef<str>) -> Self {
        self.base_path = base_path.as_ref().trim_matches('/').to_string();
        self
    }

    pub fn with_conflict_retry_delay(mut self, delay: Duration) -> Self {
        self.conflict_retry_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_listing_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.listing_max_retries = max_retries;
        self.listing_backoff_ms = backoff.as_millis() as u64;
        self
    }
}

/// Shared reviewer passphrase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewConfig {
    #[serde(default)]
    pub passphrase: Option<String>,
}

impl ReviewConfig {
    /// Whether `supplied` unlocks reviewer access. Always false when unset.
    pub fn verify(&self, supplied: &str) -> bool {
        match self.passphrase.as_deref() {
            Some(expected) if !expected.is_empty() => {
                Sha256::digest(expected.as_bytes()) == Sha256::digest(supplied.as_bytes())
            }
            _ => false,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.passphrase.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// Complete process configuration, loaded once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub github: StoreConfig,
    #[serde(default)]
    pub review: ReviewConfig,
}

/// On-disk layout; every field optional so environment values can fill gaps.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    github: GithubSection,
    review: ReviewSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct GithubSection {
    api_url: Option<String>,
    token: Option<String>,
    owner: Option<String>,
    repo: Option<String>,
    branch: Option<String>,
    base_path: Option<String>,
    committer_name: Option<String>,
    committer_email: Option<String>,
    metadata_timeout_secs: Option<u64>,
    content_timeout_secs: Option<u64>,
    conflict_retry_delay_ms: Option<u64>,
    listing_max_retries: Option<u32>,
    listing_backoff_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ReviewSection {
    passphrase: Option<String>,
}

impl AppConfig {
    /// Load from an optional YAML file, falling back to the process environment.
    pub fn load(path: Option<&Path>) -> StoreResult<Self> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| StoreError::Config {
                    message: format!("failed to read {}: {}", path.display(), e),
                })?;
                Self::from_yaml_str(&text, env_var)
            }
            None => Ok(Self::from_env()),
        }
    }

    /// Configuration from the process environment and defaults.
    pub fn from_env() -> Self {
        Self::resolve(ConfigFile::default(), env_var)
    }

    /// Parse a YAML document, using `env` for any field it leaves out.
    pub fn from_yaml_str<F>(text: &str, env: F) -> StoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file: ConfigFile = if text.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(text).map_err(|e| StoreError::Config {
                message: format!("invalid config file: {}", e),
            })?
        };
        Ok(Self::resolve(file, env))
    }

    fn resolve<F>(file: ConfigFile, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let gh = file.github;
        let text = |value: Option<String>, var: &str| value.or_else(|| env(var));
        let number = |value: Option<u64>, var: &str| {
            value.or_else(|| env(var).and_then(|v| v.trim().parse().ok()))
        };

        let github = StoreConfig {
            api_url: text(gh.api_url, "GITHUB_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(default_api_url),
            token: text(gh.token, "GITHUB_TOKEN"),
            owner: text(gh.owner, "GITHUB_OWNER").unwrap_or_default(),
            repo: text(gh.repo, "GITHUB_REPO").unwrap_or_default(),
            branch: text(gh.branch, "GITHUB_BRANCH").unwrap_or_else(default_branch),
            base_path: text(gh.base_path, "GITHUB_BASE_PATH")
                .map(|p| p.trim_matches('/').to_string())
                .unwrap_or_else(default_base_path),
            committer_name: text(gh.committer_name, "GITHUB_COMMITTER_NAME")
                .unwrap_or_else(default_committer_name),
            committer_email: text(gh.committer_email, "GITHUB_COMMITTER_EMAIL")
                .unwrap_or_else(default_committer_email),
            metadata_timeout_secs: number(gh.metadata_timeout_secs, "KALORIK_METADATA_TIMEOUT")
                .unwrap_or_else(default_metadata_timeout),
            content_timeout_secs: number(gh.content_timeout_secs, "KALORIK_CONTENT_TIMEOUT")
                .unwrap_or_else(default_content_timeout),
            conflict_retry_delay_ms: gh
                .conflict_retry_delay_ms
                .unwrap_or_else(default_conflict_delay),
            listing_max_retries: gh
                .listing_max_retries
                .unwrap_or_else(default_listing_retries),
            listing_backoff_ms: gh.listing_backoff_ms.unwrap_or_else(default_listing_backoff),
        };

        let review = ReviewConfig {
            passphrase: text(file.review.passphrase, "KALORIK_REVIEW_PASSPHRASE"),
        };

        Self { github, review }
    }
}

/// Environment lookup; empty values count as unset.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn fake_env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_yaml_str("", fake_env(&[])).unwrap();
        assert_eq!(config.github.branch, "main");
        assert_eq!(config.github.base_path, "KalorikDaten");
        assert_eq!(config.github.committer_name, "App Bot");
        assert_eq!(config.github.committer_email, "bot@example.org");
        assert_eq!(config.github.metadata_timeout(), Duration::from_secs(30));
        assert_eq!(config.github.content_timeout(), Duration::from_secs(60));
        assert_eq!(config.github.conflict_retry_delay(), Duration::from_millis(300));
        assert_eq!(config.github.listing_max_retries, 3);
        assert!(config.github.token.is_none());
        assert!(!config.review.is_configured());
    }

    #[test]
    fn test_file_wins_over_env() {
        let yaml = "github:\n  owner: schule\n  branch: abgabe\n";
        let env = fake_env(&[
            ("GITHUB_OWNER", "other"),
            ("GITHUB_REPO", "physik"),
            ("GITHUB_BRANCH", "dev"),
            ("GITHUB_TOKEN", "ghp_x"),
        ]);
        let config = AppConfig::from_yaml_str(yaml, env).unwrap();
        assert_eq!(config.github.owner, "schule");
        assert_eq!(config.github.repo, "physik");
        assert_eq!(config.github.branch, "abgabe");
        assert_eq!(config.github.token.as_deref(), Some("ghp_x"));
        config.github.validate().unwrap();
    }

    #[test]
    fn test_base_path_slashes_trimmed() {
        let env = fake_env(&[("GITHUB_BASE_PATH", "/daten/2025/")]);
        let config = AppConfig::from_yaml_str("", env).unwrap();
        assert_eq!(config.github.base_path, "daten/2025");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = AppConfig::from_yaml_str("github:\n  ownr: x\n", fake_env(&[])).unwrap_err();
        assert!(matches!(err, StoreError::Config { .. }));
    }

    #[test]
    fn test_validate_requires_owner_and_repo() {
        let err = StoreConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("GITHUB_OWNER"));

        let err = StoreConfig::default()
            .with_repository("schule", "")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("GITHUB_REPO"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kalorik.yaml");
        std::fs::write(
            &path,
            "github:\n  owner: schule\n  repo: physik\nreview:\n  passphrase: geheim\n",
        )
        .unwrap();
        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.github.repo, "physik");
        assert!(config.review.verify("geheim"));
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/kalorik.yaml"))).unwrap_err();
        assert!(matches!(err, StoreError::Config { .. }));
    }

    #[test]
    fn test_review_passphrase() {
        let review = ReviewConfig {
            passphrase: Some("physik".into()),
        };
        assert!(review.verify("physik"));
        assert!(!review.verify("Physik"));
        assert!(!review.verify(""));
        assert!(!ReviewConfig::default().verify(""));
        assert!(!ReviewConfig {
            passphrase: Some(String::new())
        }
        .verify(""));
    }

    #[test]
    fn test_builder() {
        let config = StoreConfig::default()
            .with_api_url("http://localhost:9")
            .with_token("t")
            .with_repository("o", "r")
            .with_base_path("/x/")
            .with_conflict_retry_delay(Duration::from_millis(5));
        assert_eq!(config.api_url, "http://localhost:9");
        assert_eq!(config.base_path, "x");
        assert_eq!(config.conflict_retry_delay_ms, 5);
    }
}
