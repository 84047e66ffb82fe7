//! # Error Types
//!
//! Errors raised while constructing core values. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.

use thiserror::Error;

/// Top-level error type for `verifi-core`.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// An identifier failed validation.
    #[error("identifier error: {0}")]
    Identifier(#[from] IdentifierError),

    /// A timestamp was outside the representable range.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error constructing an identifier newtype.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// The account string was empty or whitespace-only.
    #[error("account is empty")]
    EmptyAccount,

    /// The account string contained whitespace or control characters.
    #[error("account {0:?} contains whitespace or control characters")]
    MalformedAccount(String),

    /// The content identifier was empty or contained a path separator.
    #[error("invalid content identifier {0:?}")]
    InvalidContentIdentifier(String),

    /// The content URI had an unsupported scheme or no body.
    #[error("invalid content URI {0:?}")]
    InvalidContentUri(String),
}
