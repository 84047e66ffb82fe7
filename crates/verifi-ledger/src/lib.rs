//! # verifi-ledger: Ledger Client Capability
//!
//! The ledger is the system of record for attendance entries and
//! certificate tokens. It exposes only single-item indexed lookups: there
//! is no "count of records" or "enumerate owned tokens" call in general,
//! which is why the registry discovers records by probing.
//!
//! ## Contract
//!
//! [`LedgerClient`] is the seam the registry procedures depend on. Every
//! method is a network round-trip that may fail, and a failure for "no
//! such record" is indistinguishable from a transport failure. Callers
//! must not assume they can tell the two apart.
//!
//! ## Implementations
//!
//! | Client | Backing |
//! |--------|---------|
//! | [`EvmLedgerClient`] | EVM JSON-RPC node (`eth_call`, `eth_sendTransaction`) |
//! | [`InMemoryLedger`] | Process-local state, for development and tests |

pub mod abi;
pub mod config;
pub mod error;
pub mod evm;
pub mod memory;

pub use config::{ConfigError, LedgerConfig};
pub use error::LedgerError;
pub use evm::EvmLedgerClient;
pub use memory::InMemoryLedger;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use verifi_core::{Account, AttendanceRecord, RecordIndex, TokenId};

/// Status of a submitted ledger write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Submitted but not yet included in a block.
    Pending,
    /// Included in a block and executed successfully.
    Confirmed,
}

/// Receipt of a ledger write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Transaction hash or ledger-specific reference.
    pub transaction_hash: String,
    /// Block containing the transaction, once included.
    pub block_number: Option<u64>,
    /// Inclusion status at the time the receipt was taken.
    pub status: TransactionStatus,
    /// The minted token id, when the ledger reported it.
    pub token_id: Option<TokenId>,
}

/// Indexed read and mint access to the ledger.
///
/// Implementations must be `Send + Sync`; one configured client is built at
/// startup and shared behind an `Arc` by every scan and issuance.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Check that `account` is an address this ledger can write to. No
    /// network call is made.
    fn validate_account(&self, _account: &Account) -> Result<(), LedgerError> {
        Ok(())
    }

    /// Read the attendance record stored at `index` for `account`.
    async fn read_record(
        &self,
        account: &Account,
        index: RecordIndex,
    ) -> Result<AttendanceRecord, LedgerError>;

    /// Current owner of a certificate token.
    async fn owner_of(&self, token_id: TokenId) -> Result<Account, LedgerError>;

    /// Metadata document reference recorded for a token. May be empty when
    /// the token was minted without one.
    async fn token_uri(&self, token_id: TokenId) -> Result<String, LedgerError>;

    /// Mint a new certificate token for `account`, pointing at `token_uri`
    /// (empty when no metadata reference is available).
    async fn mint(
        &self,
        account: &Account,
        token_uri: &str,
    ) -> Result<TransactionReceipt, LedgerError>;

    /// Number of attendance records held by `account`, if the ledger
    /// exposes a count accessor. `Ok(None)` means no such accessor.
    async fn record_count(&self, _account: &Account) -> Result<Option<u64>, LedgerError> {
        Ok(None)
    }

    /// Number of certificate tokens minted so far, if the ledger exposes a
    /// count accessor. `Ok(None)` means no such accessor.
    async fn token_count(&self) -> Result<Option<u64>, LedgerError> {
        Ok(None)
    }
}
