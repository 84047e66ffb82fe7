//! # Issuance Orchestrator
//!
//! Mints a certificate token whose metadata binds an evidence fingerprint
//! to the uploaded evidence.
//!
//! ## Steps
//!
//! 1. Validate the account and course name. The ledger checks the account
//!    against its own address format. Nothing touches the network before
//!    this passes.
//! 2. Draft the metadata document with the timestamp taken now, at the
//!    start of issuance.
//! 3. Fingerprint the evidence bytes, if any. The fingerprint does not
//!    depend on the upload succeeding.
//! 4. Upload the same evidence bytes. On failure, record the reason in
//!    `fileUploadError` and continue.
//! 5. Upload the metadata document as canonical JSON. On failure, continue
//!    without a metadata URI.
//! 6. Mint the token, passing the metadata URI or an empty reference.
//!
//! Steps 4 and 5 are independent degradation points. Only a failed mint is
//! fatal, and nothing uploaded before it is rolled back: the evidence and
//! metadata stay in the content-addressed store, unreferenced. A repeated
//! call redoes every step; fingerprints and identifiers are not cached.

use std::sync::Arc;

use serde::Serialize;
use verifi_core::{
    sha256_digest, Account, CanonicalBytes, CanonicalizationError, CertificateMetadata, Clock,
    ContentIdentifier, ContentUri, Fingerprint, IdentifierError, Timestamp,
};
use verifi_evidence::EvidenceStore;
use verifi_ledger::{LedgerClient, LedgerError, TransactionReceipt};

/// Evidence supplied with an issuance request.
#[derive(Debug, Clone, Copy)]
pub struct Evidence<'a> {
    /// Display name sent to the evidence store.
    pub file_name: &'a str,
    /// The evidence content. Fingerprinted and uploaded as-is.
    pub bytes: &'a [u8],
}

/// Caller input rejected before any network interaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("no account is connected")]
    NotConnected,
    #[error("invalid account: {0}")]
    InvalidAccount(String),
    #[error("course name must not be empty")]
    EmptyCourseName,
}

/// What happened to the evidence upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EvidenceOutcome {
    /// No evidence bytes were supplied.
    NotSupplied,
    Uploaded { cid: ContentIdentifier, uri: ContentUri },
    /// The upload failed; the certificate carries a fingerprint-only proof.
    Degraded { reason: String },
}

/// What happened to the metadata document upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MetadataOutcome {
    Uploaded { cid: ContentIdentifier, uri: ContentUri },
    /// The upload failed; the token was minted with an empty reference.
    Degraded { reason: String },
}

/// Which upload steps succeeded and which degraded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub evidence: EvidenceOutcome,
    pub metadata: MetadataOutcome,
}

impl Provenance {
    /// Whether either upload step degraded.
    pub fn is_degraded(&self) -> bool {
        matches!(self.evidence, EvidenceOutcome::Degraded { .. })
            || matches!(self.metadata, MetadataOutcome::Degraded { .. })
    }

    /// The metadata URI handed to the ledger, if the upload succeeded.
    pub fn metadata_uri(&self) -> Option<&ContentUri> {
        match &self.metadata {
            MetadataOutcome::Uploaded { uri, .. } => Some(uri),
            MetadataOutcome::Degraded { .. } => None,
        }
    }
}

/// A successfully minted certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedCertificate {
    pub account: Account,
    pub course_name: String,
    /// Taken at the start of issuance, not at ledger commit.
    pub timestamp: Timestamp,
    /// Fingerprint of the evidence bytes, if evidence was supplied.
    pub file_hash: Option<String>,
    /// The metadata document exactly as it was uploaded (or would have been).
    pub metadata: CertificateMetadata,
    /// The reference passed to `mint`, if any.
    pub metadata_uri: Option<ContentUri>,
    /// `sha256:<hex>` of the canonical metadata document.
    pub metadata_digest: String,
    pub receipt: TransactionReceipt,
    pub provenance: Provenance,
}

/// Fatal issuance failures.
#[derive(Debug, thiserror::Error)]
pub enum IssuanceError {
    #[error("invalid issuance request: {0}")]
    Validation(#[from] ValidationError),
    #[error("metadata document could not be canonicalized: {0}")]
    Canonicalization(#[from] CanonicalizationError),
    /// The mint failed. Uploads already performed are listed in
    /// `provenance` and are not rolled back.
    #[error("ledger write failed: {source}")]
    LedgerWrite {
        provenance: Provenance,
        file_hash: Option<String>,
        #[source]
        source: LedgerError,
    },
}

/// Issues certificates against a ledger and an evidence store.
#[derive(Clone)]
pub struct IssuanceOrchestrator {
    ledger: Arc<dyn LedgerClient>,
    store: Arc<dyn EvidenceStore>,
    fingerprint: Arc<dyn Fingerprint>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for IssuanceOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuanceOrchestrator").finish_non_exhaustive()
    }
}

impl IssuanceOrchestrator {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        store: Arc<dyn EvidenceStore>,
        fingerprint: Arc<dyn Fingerprint>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ledger,
            store,
            fingerprint,
            clock,
        }
    }

    /// Issue a certificate for `course_name` to `account`.
    ///
    /// `account` is the connected wallet address; an empty string means no
    /// wallet is connected.
    pub async fn issue(
        &self,
        account: &str,
        course_name: &str,
        evidence: Option<Evidence<'_>>,
    ) -> Result<IssuedCertificate, IssuanceError> {
        let account = validate_account(account)?;
        self.ledger
            .validate_account(&account)
            .map_err(|e| ValidationError::InvalidAccount(e.to_string()))?;
        let course_name = course_name.trim();
        if course_name.is_empty() {
            return Err(ValidationError::EmptyCourseName.into());
        }

        let timestamp = self.clock.now();
        let mut metadata = CertificateMetadata::draft(course_name, timestamp);

        let file_hash = evidence.map(|e| self.fingerprint.digest(e.bytes));
        metadata.file_hash = file_hash.clone();

        let evidence_outcome = match evidence {
            None => EvidenceOutcome::NotSupplied,
            Some(e) => match self.store.upload_bytes(e.file_name, e.bytes).await {
                Ok(cid) => {
                    let uri = ContentUri::ipfs(&cid);
                    metadata.file = Some(uri.clone());
                    EvidenceOutcome::Uploaded { cid, uri }
                }
                Err(err) => {
                    let reason = err.to_string();
                    tracing::warn!(account = %account, error = %reason, "evidence upload degraded");
                    metadata.file_upload_error = Some(reason.clone());
                    EvidenceOutcome::Degraded { reason }
                }
            },
        };

        let canonical = CanonicalBytes::new(&metadata)?;
        let metadata_digest = sha256_digest(&canonical).to_string();

        let metadata_outcome = match self.store.upload_document(&canonical).await {
            Ok(cid) => MetadataOutcome::Uploaded {
                uri: ContentUri::ipfs(&cid),
                cid,
            },
            Err(err) => {
                let reason = err.to_string();
                tracing::warn!(
                    account = %account,
                    error = %reason,
                    "metadata upload degraded; minting without reference"
                );
                MetadataOutcome::Degraded { reason }
            }
        };

        let provenance = Provenance {
            evidence: evidence_outcome,
            metadata: metadata_outcome,
        };
        let metadata_uri = provenance.metadata_uri().cloned();
        let token_uri = metadata_uri.as_ref().map_or("", ContentUri::as_str);

        let receipt = match self.ledger.mint(&account, token_uri).await {
            Ok(receipt) => receipt,
            Err(source) => {
                tracing::error!(
                    account = %account,
                    course = course_name,
                    error = %source,
                    "certificate mint failed"
                );
                return Err(IssuanceError::LedgerWrite {
                    provenance,
                    file_hash,
                    source,
                });
            }
        };

        tracing::info!(
            account = %account,
            course = course_name,
            tx_hash = %receipt.transaction_hash,
            token_id = ?receipt.token_id,
            degraded = provenance.is_degraded(),
            "certificate issued"
        );

        Ok(IssuedCertificate {
            account,
            course_name: course_name.to_string(),
            timestamp,
            file_hash,
            metadata,
            metadata_uri,
            metadata_digest,
            receipt,
            provenance,
        })
    }
}

fn validate_account(raw: &str) -> Result<Account, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::NotConnected);
    }
    Account::new(raw).map_err(|e| match e {
        IdentifierError::EmptyAccount => ValidationError::NotConnected,
        other => ValidationError::InvalidAccount(other.to_string()),
    })
}
