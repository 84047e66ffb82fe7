//! # verifi-registry: Record Discovery and Certificate Issuance
//!
//! The two procedures with real control flow, built on the ledger and
//! evidence capabilities:
//!
//! - [`RecordScanner`] discovers an account's attendance records and owned
//!   certificate tokens on a ledger that offers only single-item indexed
//!   lookups. It probes indices from 0 and treats the first failed lookup
//!   as the end of the set.
//! - [`IssuanceOrchestrator`] mints a certificate whose metadata binds a
//!   locally computed evidence fingerprint to the uploaded evidence, and
//!   keeps issuing when the evidence store is degraded.
//!
//! ## Collaborators
//!
//! Both procedures receive their collaborators at construction and hold
//! them behind `Arc`. Build one ledger client and one evidence store per
//! process and share them; nothing here keeps module-level state.
//!
//! ## Ordering
//!
//! Every step is awaited before the next begins. There is no fan-out of
//! probes or uploads, no retry, and no cancellation. Concurrent calls for
//! the same account are not coordinated.

pub mod issuance;
pub mod scanner;

pub use issuance::{
    Evidence, EvidenceOutcome, IssuanceError, IssuanceOrchestrator, IssuedCertificate,
    MetadataOutcome, Provenance, ValidationError,
};
pub use scanner::{
    AttendanceCursor, CertificateCursor, MetadataFailure, MetadataFailurePolicy, RecordScanner,
    ScanError,
};
