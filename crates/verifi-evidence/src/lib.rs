//! # verifi-evidence: Evidence Store and Document Fetch
//!
//! Content-addressed storage for certificate evidence files and metadata
//! documents, and retrieval of metadata documents by URI.
//!
//! ## Capabilities
//!
//! - [`EvidenceStore`]: upload raw bytes or a canonical JSON document and
//!   receive a [`ContentIdentifier`]. A store may be entirely unconfigured,
//!   in which case every call fails immediately with
//!   [`EvidenceError::Unconfigured`].
//! - [`DocumentFetcher`]: resolve a [`ContentUri`] to a parsed JSON
//!   document. Used only by the ownership scan.
//!
//! ## Implementations
//!
//! | Type | Capability | Backing |
//! |------|------------|---------|
//! | [`HttpEvidenceStore`] | store | web3.storage-compatible `POST /upload` |
//! | [`UnconfiguredEvidenceStore`] | store | none; always fails |
//! | [`GatewayDocumentFetcher`] | fetch | IPFS HTTP gateway |
//! | [`InMemoryEvidenceStore`] | both | process-local map |

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod memory;

pub use config::{ConfigError, EvidenceConfig};
pub use error::EvidenceError;
pub use gateway::GatewayDocumentFetcher;
pub use http::HttpEvidenceStore;
pub use memory::InMemoryEvidenceStore;

use std::sync::Arc;

use async_trait::async_trait;
use verifi_core::{CanonicalBytes, ContentIdentifier, ContentUri};

/// File name sent with metadata document uploads.
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// Content-addressed upload of evidence and metadata.
#[async_trait]
pub trait EvidenceStore: Send + Sync {
    /// Upload raw evidence bytes under a display `name`.
    async fn upload_bytes(
        &self,
        name: &str,
        content: &[u8],
    ) -> Result<ContentIdentifier, EvidenceError>;

    /// Upload a metadata document rendered as canonical JSON.
    async fn upload_document(
        &self,
        document: &CanonicalBytes,
    ) -> Result<ContentIdentifier, EvidenceError>;
}

/// Retrieval of metadata documents referenced by the ledger.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch and parse the JSON document at `uri`.
    async fn fetch(&self, uri: &ContentUri) -> Result<serde_json::Value, EvidenceError>;
}

/// Store used when no upload credential is configured.
///
/// Every call fails without touching the network, which the issuance
/// procedure treats as a degraded (not fatal) upload.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredEvidenceStore;

#[async_trait]
impl EvidenceStore for UnconfiguredEvidenceStore {
    async fn upload_bytes(
        &self,
        _name: &str,
        _content: &[u8],
    ) -> Result<ContentIdentifier, EvidenceError> {
        Err(EvidenceError::Unconfigured)
    }

    async fn upload_document(
        &self,
        _document: &CanonicalBytes,
    ) -> Result<ContentIdentifier, EvidenceError> {
        Err(EvidenceError::Unconfigured)
    }
}

/// Build the store described by `config`: the HTTP client when a token is
/// present, [`UnconfiguredEvidenceStore`] otherwise.
pub fn store_from_config(config: &EvidenceConfig) -> Result<Arc<dyn EvidenceStore>, EvidenceError> {
    if config.api_token.is_none() {
        tracing::warn!("no evidence store token configured; uploads will be skipped");
        return Ok(Arc::new(UnconfiguredEvidenceStore));
    }
    Ok(Arc::new(HttpEvidenceStore::new(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_store_always_fails() {
        let store = UnconfiguredEvidenceStore;
        assert!(matches!(
            store.upload_bytes("a.pdf", b"x").await,
            Err(EvidenceError::Unconfigured)
        ));
        let doc = CanonicalBytes::new(&serde_json::json!({"name": "x"})).unwrap();
        assert!(matches!(
            store.upload_document(&doc).await,
            Err(EvidenceError::Unconfigured)
        ));
    }

    #[tokio::test]
    async fn missing_token_yields_unconfigured_store() {
        let config =
            EvidenceConfig::local("http://127.0.0.1:1", "http://127.0.0.1:2", None).unwrap();
        let store = store_from_config(&config).unwrap();
        assert!(matches!(
            store.upload_bytes("a.pdf", b"x").await,
            Err(EvidenceError::Unconfigured)
        ));
    }
}
