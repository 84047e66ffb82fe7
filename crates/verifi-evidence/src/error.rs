//! Evidence store error types.

use crate::config::ConfigError;

/// Errors from evidence uploads and document fetches.
#[derive(Debug, thiserror::Error)]
pub enum EvidenceError {
    /// No upload credential is configured.
    #[error("evidence store is not configured")]
    Unconfigured,
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The service returned a non-2xx status.
    #[error("{endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The response parsed but did not carry what was expected.
    #[error("invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
    /// The URI scheme cannot be resolved by this fetcher.
    #[error("unsupported document URI: {0}")]
    UnsupportedUri(String),
    /// No document exists at the URI.
    #[error("document not found: {0}")]
    NotFound(String),
    /// The store is unreachable.
    #[error("evidence store unavailable: {0}")]
    Unavailable(String),
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
