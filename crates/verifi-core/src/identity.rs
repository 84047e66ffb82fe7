//! # Ledger and Content Identifiers
//!
//! Newtype wrappers for the identifiers that flow between the wallet, the
//! ledger and the evidence store. These prevent passing a token id where a
//! record index is expected, or a raw content identifier where a
//! dereferenceable URI is expected.

use serde::{Deserialize, Serialize};

use crate::error::IdentifierError;

/// An opaque ledger address identifying a record owner.
///
/// Supplied by the wallet collaborator. The core treats it as opaque apart
/// from rejecting empty or whitespace-bearing strings; ledger clients apply
/// their own address format checks. Comparison against addresses returned
/// by the ledger is case-insensitive ([`Account::matches`]), since EVM
/// nodes may return checksummed (mixed-case) addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Account(String);

impl Account {
    /// Validate and wrap an account string.
    pub fn new(raw: impl Into<String>) -> Result<Self, IdentifierError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(IdentifierError::EmptyAccount);
        }
        if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(IdentifierError::MalformedAccount(raw));
        }
        Ok(Self(raw))
    }

    /// Access the account as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against an address reported by the ledger.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl TryFrom<String> for Account {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Account> for String {
    fn from(value: Account) -> Self {
        value.0
    }
}

impl std::fmt::Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-account position of an attendance record, assigned by the ledger
/// starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordIndex(pub u64);

impl RecordIndex {
    /// The first index of every account's record set.
    pub const ZERO: Self = Self(0);

    /// The following index, saturating at `u64::MAX`.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl std::fmt::Display for RecordIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Globally monotonic certificate token id, starting at 0 across all
/// accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenId(pub u64);

impl TokenId {
    /// The first token id ever minted.
    pub const ZERO: Self = Self(0);

    /// The following token id, saturating at `u64::MAX`.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle returned by a content-addressed store for an immutable blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentIdentifier(String);

impl ContentIdentifier {
    /// Validate and wrap a content identifier.
    pub fn new(raw: impl Into<String>) -> Result<Self, IdentifierError> {
        let raw = raw.into();
        if raw.is_empty()
            || raw.contains('/')
            || raw.chars().any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(IdentifierError::InvalidContentIdentifier(raw));
        }
        Ok(Self(raw))
    }

    /// Access the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ContentIdentifier {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContentIdentifier> for String {
    fn from(value: ContentIdentifier) -> Self {
        value.0
    }
}

impl std::fmt::Display for ContentIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A dereferenceable reference to stored content: `ipfs://<cid>[/path]`
/// or an `http(s)://` URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentUri(String);

impl ContentUri {
    /// URI scheme for content-addressed references.
    pub const IPFS_SCHEME: &'static str = "ipfs://";

    /// Build the `ipfs://` reference for a content identifier.
    pub fn ipfs(cid: &ContentIdentifier) -> Self {
        Self(format!("{}{}", Self::IPFS_SCHEME, cid.as_str()))
    }

    /// Parse a URI, accepting `ipfs://`, `http://` and `https://` schemes.
    pub fn parse(raw: impl Into<String>) -> Result<Self, IdentifierError> {
        let raw = raw.into();
        let body = [Self::IPFS_SCHEME, "http://", "https://"]
            .iter()
            .find_map(|scheme| raw.strip_prefix(scheme));
        match body {
            Some(rest) if !rest.is_empty() && !rest.chars().any(char::is_whitespace) => {
                Ok(Self(raw))
            }
            _ => Err(IdentifierError::InvalidContentUri(raw)),
        }
    }

    /// Access the URI as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `<cid>[/path]` part of an `ipfs://` URI, or `None` for HTTP URIs.
    pub fn ipfs_path(&self) -> Option<&str> {
        self.0.strip_prefix(Self::IPFS_SCHEME)
    }
}

impl TryFrom<String> for ContentUri {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ContentUri> for String {
    fn from(value: ContentUri) -> Self {
        value.0
    }
}

impl std::fmt::Display for ContentUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_rejects_empty_and_whitespace() {
        assert_eq!(Account::new(""), Err(IdentifierError::EmptyAccount));
        assert_eq!(Account::new("   "), Err(IdentifierError::EmptyAccount));
        assert!(matches!(
            Account::new("0xabc def"),
            Err(IdentifierError::MalformedAccount(_))
        ));
    }

    #[test]
    fn account_matches_case_insensitively() {
        let account = Account::new("0xAbCdEf0123456789AbCdEf0123456789AbCdEf01").unwrap();
        assert!(account.matches("0xabcdef0123456789abcdef0123456789abcdef01"));
        assert!(!account.matches("0xabcdef0123456789abcdef0123456789abcdef02"));
    }

    #[test]
    fn account_deserialize_validates() {
        let ok: Result<Account, _> = serde_json::from_str(r#""0x01""#);
        assert!(ok.is_ok());
        let bad: Result<Account, _> = serde_json::from_str(r#""""#);
        assert!(bad.is_err());
    }

    #[test]
    fn index_and_token_advance() {
        assert_eq!(RecordIndex::ZERO.next(), RecordIndex(1));
        assert_eq!(TokenId(41).next(), TokenId(42));
        assert_eq!(TokenId(u64::MAX).next(), TokenId(u64::MAX));
    }

    #[test]
    fn content_identifier_rejects_paths() {
        assert!(ContentIdentifier::new("bafybeigdyr").is_ok());
        assert!(ContentIdentifier::new("").is_err());
        assert!(ContentIdentifier::new("bafy/metadata.json").is_err());
    }

    #[test]
    fn ipfs_uri_from_cid() {
        let cid = ContentIdentifier::new("bafybeigdyr").unwrap();
        let uri = ContentUri::ipfs(&cid);
        assert_eq!(uri.as_str(), "ipfs://bafybeigdyr");
        assert_eq!(uri.ipfs_path(), Some("bafybeigdyr"));
    }

    #[test]
    fn content_uri_parse_schemes() {
        assert!(ContentUri::parse("ipfs://bafy/metadata.json").is_ok());
        assert!(ContentUri::parse("https://w3s.link/ipfs/bafy").is_ok());
        assert!(ContentUri::parse("ipfs://").is_err());
        assert!(ContentUri::parse("ftp://host/file").is_err());
        assert!(ContentUri::parse("").is_err());
        assert_eq!(
            ContentUri::parse("https://host/x").unwrap().ipfs_path(),
            None
        );
    }
}
