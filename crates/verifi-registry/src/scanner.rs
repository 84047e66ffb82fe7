//! # Record Scanner
//!
//! Discovers the records an account holds on a ledger that has no
//! enumeration primitive.
//!
//! ## Probing
//!
//! Starting at index 0, each index is looked up in turn. A successful
//! lookup yields an item and advances the index; the first failed lookup
//! ends the scan. A failure is read as "end of the set", never as a defect:
//! it is logged, not retried, and not surfaced. A transient fault therefore
//! truncates the scan, and nothing here can tell the two apart.
//!
//! ## Bounded Mode
//!
//! When the ledger reports a count (see [`LedgerClient::record_count`] and
//! [`LedgerClient::token_count`]) the cursor reads exactly `0..n` and never
//! probes past the bound. A failure inside the bound still ends the scan.
//!
//! ## Cursors
//!
//! [`AttendanceCursor`] and [`CertificateCursor`] are lazy: no ledger call
//! is made until `next()` is awaited. Every call to
//! [`RecordScanner::attendance`] or [`RecordScanner::certificates`] starts a
//! fresh cursor at index 0; nothing is cached between scans.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use verifi_core::{
    Account, AttendanceRecord, CertificateSummary, ContentUri, IdentifierError, RecordIndex,
    TokenId,
};
use verifi_evidence::{DocumentFetcher, EvidenceError};
use verifi_ledger::{LedgerClient, LedgerError};

/// What the certificate scan does when metadata cannot be read for a token
/// the account owns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataFailurePolicy {
    /// Fail the whole scan with [`ScanError::Metadata`].
    #[default]
    Abort,
    /// Leave the token out and keep scanning.
    Skip,
    /// Report the token as [`CertificateSummary::unnamed`] and keep scanning.
    Placeholder,
}

impl MetadataFailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Abort => "abort",
            Self::Skip => "skip",
            Self::Placeholder => "placeholder",
        }
    }
}

impl std::fmt::Display for MetadataFailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetadataFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            "placeholder" => Ok(Self::Placeholder),
            other => Err(format!(
                "unknown metadata failure policy '{other}' (expected abort, skip or placeholder)"
            )),
        }
    }
}

/// Why metadata for one token could not be read.
#[derive(Debug, thiserror::Error)]
pub enum MetadataFailure {
    #[error("tokenURI lookup failed: {0}")]
    TokenUri(#[source] LedgerError),
    #[error("token URI is not resolvable: {0}")]
    InvalidUri(#[source] IdentifierError),
    #[error("document fetch failed: {0}")]
    Fetch(#[source] EvidenceError),
}

/// Errors surfaced by a scan.
///
/// Lookup failures never appear here; they end the scan silently.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("metadata for token {token_id} could not be read: {source}")]
    Metadata {
        token_id: TokenId,
        #[source]
        source: MetadataFailure,
    },
}

/// Discovers attendance records and owned certificates by index probing.
#[derive(Clone)]
pub struct RecordScanner {
    ledger: Arc<dyn LedgerClient>,
    fetcher: Arc<dyn DocumentFetcher>,
    policy: MetadataFailurePolicy,
}

impl std::fmt::Debug for RecordScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordScanner")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RecordScanner {
    /// Create a scanner with the default [`MetadataFailurePolicy::Abort`].
    pub fn new(ledger: Arc<dyn LedgerClient>, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self {
            ledger,
            fetcher,
            policy: MetadataFailurePolicy::default(),
        }
    }

    /// Set the metadata failure policy.
    pub fn with_policy(mut self, policy: MetadataFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> MetadataFailurePolicy {
        self.policy
    }

    /// A fresh cursor over `account`'s attendance records.
    pub fn attendance<'a>(&'a self, account: &'a Account) -> AttendanceCursor<'a> {
        AttendanceCursor {
            scanner: self,
            account,
            next: RecordIndex::ZERO,
            bound: None,
            done: false,
        }
    }

    /// A fresh cursor over the certificates `account` owns.
    pub fn certificates<'a>(&'a self, account: &'a Account) -> CertificateCursor<'a> {
        CertificateCursor {
            scanner: self,
            account,
            next: TokenId::ZERO,
            bound: None,
            done: false,
        }
    }

    /// All attendance records for `account`, in index order.
    pub async fn scan_attendance(&self, account: &Account) -> Vec<AttendanceRecord> {
        let mut cursor = self.attendance(account);
        let mut records = Vec::new();
        while let Some(record) = cursor.next().await {
            records.push(record);
        }
        tracing::info!(account = %account, count = records.len(), "attendance scan complete");
        records
    }

    /// All certificates `account` owns, in token id order.
    pub async fn scan_certificates(
        &self,
        account: &Account,
    ) -> Result<Vec<CertificateSummary>, ScanError> {
        let mut cursor = self.certificates(account);
        let mut certificates = Vec::new();
        while let Some(summary) = cursor.next().await? {
            certificates.push(summary);
        }
        tracing::info!(
            account = %account,
            count = certificates.len(),
            probed = cursor.position().0,
            "certificate scan complete"
        );
        Ok(certificates)
    }

    /// Summary for a token the account owns.
    async fn summary(&self, token_id: TokenId) -> Result<CertificateSummary, MetadataFailure> {
        let raw = self
            .ledger
            .token_uri(token_id)
            .await
            .map_err(MetadataFailure::TokenUri)?;
        let raw = raw.trim();
        if raw.is_empty() {
            // Minted without a metadata document.
            return Ok(CertificateSummary::unnamed(token_id));
        }
        let uri = ContentUri::parse(raw).map_err(MetadataFailure::InvalidUri)?;
        let document = self
            .fetcher
            .fetch(&uri)
            .await
            .map_err(MetadataFailure::Fetch)?;
        Ok(CertificateSummary::from_document(token_id, &document))
    }
}

/// Lazy cursor over an account's attendance records.
#[derive(Debug)]
pub struct AttendanceCursor<'a> {
    scanner: &'a RecordScanner,
    account: &'a Account,
    next: RecordIndex,
    /// `None` until resolved on the first `next()`; then `Some(None)` for
    /// probing or `Some(Some(n))` for a known count.
    bound: Option<Option<u64>>,
    done: bool,
}

impl AttendanceCursor<'_> {
    /// The next record, or `None` once the scan has ended.
    pub async fn next(&mut self) -> Option<AttendanceRecord> {
        if self.done {
            return None;
        }
        let bound = match self.bound {
            Some(bound) => bound,
            None => {
                let bound = resolve_bound(
                    self.scanner.ledger.record_count(self.account).await,
                    "record_count",
                );
                self.bound = Some(bound);
                bound
            }
        };

        if bound.is_some_and(|n| self.next.0 >= n) {
            tracing::debug!(account = %self.account, index = %self.next, "record bound reached");
            self.done = true;
            return None;
        }

        match self.scanner.ledger.read_record(self.account, self.next).await {
            Ok(record) => {
                self.next = self.next.next();
                Some(record)
            }
            Err(e) => {
                self.done = true;
                if bound.is_some() {
                    tracing::warn!(
                        account = %self.account,
                        index = %self.next,
                        error = %e,
                        "record lookup failed inside known bound; ending scan"
                    );
                } else {
                    tracing::debug!(
                        account = %self.account,
                        index = %self.next,
                        error = %e,
                        "record lookup failed; end of records"
                    );
                }
                None
            }
        }
    }

    /// The index the next lookup will read.
    pub fn position(&self) -> RecordIndex {
        self.next
    }
}

/// Lazy cursor over the certificates an account owns.
///
/// Token ids are global, so the cursor walks the whole token space and
/// keeps only tokens whose owner matches the account case-insensitively.
#[derive(Debug)]
pub struct CertificateCursor<'a> {
    scanner: &'a RecordScanner,
    account: &'a Account,
    next: TokenId,
    bound: Option<Option<u64>>,
    done: bool,
}

impl CertificateCursor<'_> {
    /// The next owned certificate, `Ok(None)` once the token space is
    /// exhausted, or an error under [`MetadataFailurePolicy::Abort`].
    pub async fn next(&mut self) -> Result<Option<CertificateSummary>, ScanError> {
        loop {
            if self.done {
                return Ok(None);
            }
            let bound = match self.bound {
                Some(bound) => bound,
                None => {
                    let bound =
                        resolve_bound(self.scanner.ledger.token_count().await, "token_count");
                    self.bound = Some(bound);
                    bound
                }
            };

            let token_id = self.next;
            if bound.is_some_and(|n| token_id.0 >= n) {
                tracing::debug!(token_id = %token_id, "token bound reached");
                self.done = true;
                return Ok(None);
            }

            let owner = match self.scanner.ledger.owner_of(token_id).await {
                Ok(owner) => owner,
                Err(e) => {
                    self.done = true;
                    if bound.is_some() {
                        tracing::warn!(
                            token_id = %token_id,
                            error = %e,
                            "owner lookup failed inside known bound; ending scan"
                        );
                    } else {
                        tracing::debug!(
                            token_id = %token_id,
                            error = %e,
                            "owner lookup failed; end of tokens"
                        );
                    }
                    return Ok(None);
                }
            };
            self.next = token_id.next();

            if !owner.matches(self.account.as_str()) {
                continue;
            }

            match self.scanner.summary(token_id).await {
                Ok(summary) => return Ok(Some(summary)),
                Err(failure) => match self.scanner.policy {
                    MetadataFailurePolicy::Abort => {
                        self.done = true;
                        return Err(ScanError::Metadata {
                            token_id,
                            source: failure,
                        });
                    }
                    MetadataFailurePolicy::Skip => {
                        tracing::warn!(
                            token_id = %token_id,
                            error = %failure,
                            "skipping token with unreadable metadata"
                        );
                    }
                    MetadataFailurePolicy::Placeholder => {
                        tracing::warn!(
                            token_id = %token_id,
                            error = %failure,
                            "reporting token with unreadable metadata as unnamed"
                        );
                        return Ok(Some(CertificateSummary::unnamed(token_id)));
                    }
                },
            }
        }
    }

    /// The token id the next ownership lookup will read.
    pub fn position(&self) -> TokenId {
        self.next
    }
}

/// A count accessor that errors falls back to probing.
fn resolve_bound(count: Result<Option<u64>, LedgerError>, accessor: &str) -> Option<u64> {
    match count {
        Ok(bound) => bound,
        Err(e) => {
            tracing::warn!(accessor, error = %e, "count accessor failed; probing instead");
            None
        }
    }
}
