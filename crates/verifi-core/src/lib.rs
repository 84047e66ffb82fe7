//! # verifi-core: Foundational Types
//!
//! Leaf crate of the verifi workspace. Defines the identifiers, record shapes
//! and digest primitives shared by the ledger client, the evidence store
//! client and the registry procedures built on top of them. It depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for ledger primitives.** `Account`, `TokenId`,
//!    `RecordIndex`, `ContentIdentifier` and `ContentUri` are distinct types.
//!    No bare strings or integers cross a crate boundary.
//!
//! 2. **`CanonicalBytes` for documents.** Metadata documents are serialized
//!    through `CanonicalBytes::new()` before upload or hashing, so the same
//!    document always produces the same bytes.
//!
//! 3. **Opaque evidence is fingerprinted as-is.** Uploaded evidence files are
//!    arbitrary byte content; the [`Fingerprint`] trait digests exactly the
//!    bytes it is handed and nothing else.
//!
//! 4. **Second-precision timestamps.** [`Timestamp`] matches the ledger's
//!    integer-seconds representation and serializes as an integer.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `verifi-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod record;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_hex, ContentDigest, Fingerprint, Sha256Fingerprint};
pub use error::{CanonicalizationError, CoreError, IdentifierError};
pub use identity::{Account, ContentIdentifier, ContentUri, RecordIndex, TokenId};
pub use record::{AttendanceRecord, CertificateMetadata, CertificateSummary, UNNAMED_COURSE};
pub use temporal::{Clock, FixedClock, SystemClock, Timestamp};
