//! Error types for the submission store.

/// Store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Object does not exist in the store.
    #[error("not found: {path}")]
    NotFound { path: String },

    /// The version token supplied with a write is no longer current.
    #[error("version conflict writing {path}")]
    VersionConflict { path: String },

    /// Any other non-success status from the store.
    #[error("store error {status}: {message}")]
    Remote { status: u16, message: String },

    /// Network error.
    #[error("network error: {message}")]
    Network { message: String },

    /// Request did not complete within the configured timeout.
    #[error("timeout: {message}")]
    Timeout { message: String },

    /// Invalid response from the store.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// Submission key cannot be mapped to an object name.
    #[error("invalid submission key: {reason}")]
    InvalidKey { reason: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Table could not be encoded or decoded.
    #[error("codec error: {message}")]
    Codec { message: String },

    /// The table was written but the annotation was not.
    #[error("partial save: {saved} was written but {failed} failed: {source}")]
    PartialSave {
        saved: String,
        failed: String,
        #[source]
        source: Box<StoreError>,
    },
}

impl StoreError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            // Not found / input issues
            Self::NotFound { .. } => 1,
            Self::InvalidKey { .. } => 1,
            Self::Config { .. } => 1,

            // Store rejected the request
            Self::Remote { status, .. } if matches!(status, 401 | 403) => 2,
            Self::Remote { .. } => 3,
            Self::VersionConflict { .. } => 3,

            // Network/transient
            Self::Network { .. } => 5,
            Self::Timeout { .. } => 5,

            // Other
            Self::InvalidResponse { .. } => 6,
            Self::Codec { .. } => 6,
            Self::PartialSave { .. } => 7,
        }
    }

    /// Whether a repeated request may succeed (429, 5xx, network, timeout).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Remote { status, .. } => *status == 429 || *status >= 500,
            Self::Network { .. } | Self::Timeout { .. } => true,
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                message: err.to_string(),
            }
        } else {
            Self::Network {
                message: err.to_string(),
            }
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
