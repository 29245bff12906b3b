//! Unified error type for the skillhub workspace.

use thiserror::Error;

/// Enumerates all error kinds that can occur across skillhub crates.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Authentication or session failure outside the 401 protocol
    /// (e.g. login rejected, malformed token endpoint response).
    #[error("authentication error: {0}")]
    Auth(String),

    /// The backend answered 401 and the client could not (or must not)
    /// recover. This is always the *original* 401, never a refresh-internal
    /// failure.
    #[error("unauthorized: {path}")]
    Unauthorized {
        /// Path of the request that was denied.
        path: String,
        /// Response body returned with the 401, if any.
        body: String,
    },

    /// HTTP transport error (no response received).
    #[error("http error: {0}")]
    Http(String),

    /// The backend returned a non-success status (surfaced by the JSON
    /// convenience helpers; raw `send` passes non-401 responses through).
    #[error("upstream error: status={status}, body={body}")]
    Upstream { status: u16, body: String },

    /// JSON serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persistent token storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration loading or validation error.
    #[error("configuration error: {0}")]
    Config(String),
}

// ── Feature-gated From impls ──────────────────────────────────────────────────

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ApiError>;
