//! In-memory evidence store for development and testing.
//!
//! Content identifiers are derived from the SHA-256 of the uploaded bytes,
//! so identical content always yields the same identifier. The store also
//! serves as a [`DocumentFetcher`] for the `ipfs://` URIs it issued, which
//! lets an issuance be followed by a scan that reads back its metadata.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use verifi_core::{CanonicalBytes, ContentIdentifier, ContentUri, Fingerprint, Sha256Fingerprint};

use crate::error::EvidenceError;
use crate::{DocumentFetcher, EvidenceStore, METADATA_FILE_NAME};

#[derive(Debug, Default)]
struct State {
    blobs: HashMap<String, Vec<u8>>,
    /// Upload log in call order: (name, cid).
    uploads: Vec<(String, ContentIdentifier)>,
    fail_all: Option<String>,
    fail_bytes: Option<String>,
    fail_fetch: Option<String>,
}

/// Process-local [`EvidenceStore`] and [`DocumentFetcher`].
#[derive(Debug, Default)]
pub struct InMemoryEvidenceStore {
    state: Mutex<State>,
    upload_bytes_calls: AtomicU64,
    upload_document_calls: AtomicU64,
    fetch_calls: AtomicU64,
}

impl InMemoryEvidenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every upload fail with `reason`.
    pub fn fail_uploads(&self, reason: &str) {
        self.state.lock().fail_all = Some(reason.to_string());
    }

    /// Make evidence uploads fail with `reason` while documents still succeed.
    pub fn fail_byte_uploads(&self, reason: &str) {
        self.state.lock().fail_bytes = Some(reason.to_string());
    }

    /// Make every fetch fail with `reason`.
    pub fn fail_fetches(&self, reason: &str) {
        self.state.lock().fail_fetch = Some(reason.to_string());
    }

    /// Store a JSON document directly and return its URI.
    pub fn put_document(&self, document: &serde_json::Value) -> Result<ContentUri, EvidenceError> {
        let bytes = serde_json::to_vec(document).map_err(|e| EvidenceError::InvalidResponse {
            endpoint: "put_document".into(),
            reason: e.to_string(),
        })?;
        let cid = self.store(METADATA_FILE_NAME, bytes)?;
        Ok(ContentUri::ipfs(&cid))
    }

    /// Bytes stored under `cid`, if any.
    pub fn get(&self, cid: &ContentIdentifier) -> Option<Vec<u8>> {
        self.state.lock().blobs.get(cid.as_str()).cloned()
    }

    /// Upload log in call order, as (name, cid).
    pub fn uploads(&self) -> Vec<(String, ContentIdentifier)> {
        self.state.lock().uploads.clone()
    }

    pub fn upload_bytes_calls(&self) -> u64 {
        self.upload_bytes_calls.load(Ordering::SeqCst)
    }

    pub fn upload_document_calls(&self) -> u64 {
        self.upload_document_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> u64 {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Total calls of any kind.
    pub fn total_calls(&self) -> u64 {
        self.upload_bytes_calls() + self.upload_document_calls() + self.fetch_calls()
    }

    fn store(&self, name: &str, bytes: Vec<u8>) -> Result<ContentIdentifier, EvidenceError> {
        let cid = ContentIdentifier::new(format!("sha256-{}", Sha256Fingerprint.digest(&bytes)))
            .map_err(|e| EvidenceError::InvalidResponse {
                endpoint: "store".into(),
                reason: e.to_string(),
            })?;
        let mut state = self.state.lock();
        state.blobs.insert(cid.as_str().to_string(), bytes);
        state.uploads.push((name.to_string(), cid.clone()));
        Ok(cid)
    }
}

#[async_trait]
impl EvidenceStore for InMemoryEvidenceStore {
    async fn upload_bytes(
        &self,
        name: &str,
        content: &[u8],
    ) -> Result<ContentIdentifier, EvidenceError> {
        self.upload_bytes_calls.fetch_add(1, Ordering::SeqCst);
        {
            let state = self.state.lock();
            if let Some(reason) = state.fail_all.as_ref().or(state.fail_bytes.as_ref()) {
                return Err(EvidenceError::Unavailable(reason.clone()));
            }
        }
        self.store(name, content.to_vec())
    }

    async fn upload_document(
        &self,
        document: &CanonicalBytes,
    ) -> Result<ContentIdentifier, EvidenceError> {
        self.upload_document_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.state.lock().fail_all {
            return Err(EvidenceError::Unavailable(reason.clone()));
        }
        self.store(METADATA_FILE_NAME, document.as_bytes().to_vec())
    }
}

#[async_trait]
impl DocumentFetcher for InMemoryEvidenceStore {
    async fn fetch(&self, uri: &ContentUri) -> Result<serde_json::Value, EvidenceError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock();
        if let Some(reason) = &state.fail_fetch {
            return Err(EvidenceError::Unavailable(reason.clone()));
        }
        let cid = uri
            .ipfs_path()
            .map(|p| p.split('/').next().unwrap_or(p))
            .ok_or_else(|| EvidenceError::UnsupportedUri(uri.to_string()))?;
        let bytes = state
            .blobs
            .get(cid)
            .ok_or_else(|| EvidenceError::NotFound(uri.to_string()))?;
        serde_json::from_slice(bytes).map_err(|e| EvidenceError::InvalidResponse {
            endpoint: format!("GET {uri}"),
            reason: e.to_string(),
        })
    }
}
