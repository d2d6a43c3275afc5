//! Token authentication for the contents API.

use reqwest::header::HeaderValue;

use crate::error::{StoreError, StoreResult};

/// Token provider for store authentication.
#[derive(Clone)]
pub enum TokenProvider {
    /// Static token (from config file or `GITHUB_TOKEN`).
    Static(String),

    /// No authentication (public repositories, read-only).
    None,
}

impl TokenProvider {
    /// Create a static token provider.
    pub fn static_token(token: impl Into<String>) -> Self {
        Self::Static(token.into())
    }

    /// Build from an optional configured token; blank tokens mean no auth.
    pub fn from_config(token: Option<&str>) -> Self {
        match token.map(str::trim) {
            Some(token) if !token.is_empty() => Self::Static(token.to_string()),
            _ => Self::None,
        }
    }

    /// `Authorization` header value, if authentication is configured.
    pub fn authorization(&self) -> StoreResult<Option<HeaderValue>> {
        match self {
            Self::Static(token) => {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(
                    |_| StoreError::Config {
                        message: "token contains characters not allowed in a header".to_string(),
                    },
                )?;
                value.set_sensitive(true);
                Ok(Some(value))
            }
            Self::None => Ok(None),
        }
    }

    /// Check if authentication is configured.
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(_) => f.write_str("TokenProvider::Static(***)"),
            Self::None => f.write_str("TokenProvider::None"),
        }
    }
}
