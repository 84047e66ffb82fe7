//! # Content Digests and the Fingerprint Function
//!
//! Two digest paths exist and they are deliberately separate:
//!
//! - [`sha256_digest()`] hashes a metadata document, and only accepts
//!   `&CanonicalBytes` so a document digest can never be computed over a
//!   non-canonical rendering.
//! - [`Fingerprint::digest()`] hashes opaque evidence content (a PDF, an
//!   image) exactly as supplied. The issuance procedure hands the same byte
//!   slice to the fingerprint and to the evidence store upload, which is
//!   what makes a `fileHash` verifiable against the uploaded `file`.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;

/// A SHA-256 content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl ContentDigest {
    /// Wrap a raw 32-byte digest.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

fn sha256(data: &[u8]) -> ContentDigest {
    let hash = Sha256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest::new(bytes)
}

/// Compute the SHA-256 digest of a canonical document.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    sha256(data.as_bytes())
}

/// Compute the SHA-256 hex string of a canonical document.
pub fn sha256_hex(data: &CanonicalBytes) -> String {
    sha256_digest(data).to_hex()
}

/// Deterministic cryptographic digest of arbitrary byte content.
///
/// Implementations must be pure: equal input always yields an equal hex
/// string, and the call never fails.
pub trait Fingerprint: Send + Sync {
    /// Digest `bytes`, returning a lowercase hex string.
    fn digest(&self, bytes: &[u8]) -> String;
}

/// SHA-256 fingerprint, hex-encoded.
///
/// Produces the same output as the browser `crypto.subtle.digest('SHA-256')`
/// path used by the dashboard, so a fingerprint computed here can be
/// compared against one computed client-side.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Fingerprint;

impl Fingerprint for Sha256Fingerprint {
    fn digest(&self, bytes: &[u8]) -> String {
        sha256(bytes).to_hex()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn fingerprint_deterministic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
            let fp = Sha256Fingerprint;
            let a = fp.digest(&bytes);
            prop_assert_eq!(a.len(), 64);
            prop_assert_eq!(a, fp.digest(&bytes.clone()));
        }

        #[test]
        fn fingerprint_differs_on_single_byte_flip(
            bytes in prop::collection::vec(any::<u8>(), 1..512),
            idx in any::<prop::sample::Index>(),
        ) {
            let fp = Sha256Fingerprint;
            let mut flipped = bytes.clone();
            let i = idx.index(flipped.len());
            flipped[i] = flipped[i].wrapping_add(1);
            prop_assert_ne!(fp.digest(&bytes), fp.digest(&flipped));
        }
    }
}
