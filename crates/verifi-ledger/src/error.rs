//! Ledger client error types.

use crate::config::ConfigError;

/// Errors from ledger calls.
///
/// A lookup of an absent index and a dropped connection both surface here;
/// the variant tells the operator what happened but gives the caller no
/// reliable "not found" signal.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// HTTP transport error.
    #[error("HTTP error calling {method}: {source}")]
    Transport {
        method: String,
        source: reqwest::Error,
    },
    /// The node returned a non-2xx status.
    #[error("ledger node returned {status} for {method}: {body}")]
    Http {
        method: String,
        status: u16,
        body: String,
    },
    /// The node returned a JSON-RPC error object (reverts land here).
    #[error("JSON-RPC error from {method} (code {code}): {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },
    /// The response could not be decoded.
    #[error("invalid response from {method}: {reason}")]
    InvalidResponse { method: String, reason: String },
    /// An address did not have the `0x` + 40 hex form.
    #[error("invalid ledger address: {0}")]
    InvalidAddress(String),
    /// The write was included but reverted.
    #[error("transaction {transaction_hash} reverted")]
    Reverted { transaction_hash: String },
    /// The requested item does not exist.
    #[error("{0} not found")]
    NotFound(String),
    /// The ledger is unreachable.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
