//! In-memory ledger for development and testing.
//!
//! Behaves like the on-chain contracts: reads past the end of an account's
//! records, or of the minted tokens, fail with [`LedgerError::NotFound`].
//! Every trait call is counted so tests can assert exactly which ledger
//! interactions a procedure performed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use verifi_core::{Account, AttendanceRecord, RecordIndex, TokenId};

use crate::error::LedgerError;
use crate::{LedgerClient, TransactionReceipt, TransactionStatus};

#[derive(Debug, Default)]
struct State {
    /// Records keyed by lowercased account.
    records: HashMap<String, Vec<AttendanceRecord>>,
    /// Token `i` is `tokens[i]`: (owner, token URI).
    tokens: Vec<(Account, String)>,
    fail_mint: Option<String>,
    fail_record_at: Option<RecordIndex>,
    fail_owner_at: Option<TokenId>,
    expose_counts: bool,
}

/// Process-local [`LedgerClient`].
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<State>,
    read_record_calls: AtomicU64,
    owner_of_calls: AtomicU64,
    token_uri_calls: AtomicU64,
    mint_calls: AtomicU64,
    record_count_calls: AtomicU64,
    token_count_calls: AtomicU64,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attendance record for `account`.
    pub fn add_record(&self, account: &Account, record: AttendanceRecord) {
        self.state
            .lock()
            .records
            .entry(account.as_str().to_ascii_lowercase())
            .or_default()
            .push(record);
    }

    /// Insert a token directly, bypassing [`LedgerClient::mint`].
    pub fn add_token(&self, owner: &Account, token_uri: &str) -> TokenId {
        let mut state = self.state.lock();
        state.tokens.push((owner.clone(), token_uri.to_string()));
        TokenId(state.tokens.len() as u64 - 1)
    }

    /// Make every subsequent mint fail as if the ledger were unreachable.
    pub fn fail_mints(&self, reason: &str) {
        self.state.lock().fail_mint = Some(reason.to_string());
    }

    /// Make reads at `index` fail as a transport error, for any account.
    pub fn fail_record_at(&self, index: RecordIndex) {
        self.state.lock().fail_record_at = Some(index);
    }

    /// Make `owner_of(token_id)` fail as a transport error.
    pub fn fail_owner_at(&self, token_id: TokenId) {
        self.state.lock().fail_owner_at = Some(token_id);
    }

    /// Answer `record_count` and `token_count` instead of returning `None`.
    pub fn expose_counts(&self, expose: bool) {
        self.state.lock().expose_counts = expose;
    }

    /// All tokens in id order, as (owner, token URI).
    pub fn tokens(&self) -> Vec<(Account, String)> {
        self.state.lock().tokens.clone()
    }

    pub fn read_record_calls(&self) -> u64 {
        self.read_record_calls.load(Ordering::SeqCst)
    }

    pub fn owner_of_calls(&self) -> u64 {
        self.owner_of_calls.load(Ordering::SeqCst)
    }

    pub fn token_uri_calls(&self) -> u64 {
        self.token_uri_calls.load(Ordering::SeqCst)
    }

    pub fn mint_calls(&self) -> u64 {
        self.mint_calls.load(Ordering::SeqCst)
    }

    pub fn count_calls(&self) -> u64 {
        self.record_count_calls.load(Ordering::SeqCst)
            + self.token_count_calls.load(Ordering::SeqCst)
    }

    /// Total trait calls of any kind.
    pub fn total_calls(&self) -> u64 {
        self.read_record_calls()
            + self.owner_of_calls()
            + self.token_uri_calls()
            + self.mint_calls()
            + self.count_calls()
    }
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    async fn read_record(
        &self,
        account: &Account,
        index: RecordIndex,
    ) -> Result<AttendanceRecord, LedgerError> {
        self.read_record_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock();
        if state.fail_record_at == Some(index) {
            return Err(LedgerError::Unavailable(format!(
                "injected failure reading record {index}"
            )));
        }
        usize::try_from(index.0)
            .ok()
            .and_then(|i| {
                state
                    .records
                    .get(&account.as_str().to_ascii_lowercase())
                    .and_then(|records| records.get(i))
            })
            .copied()
            .ok_or_else(|| LedgerError::NotFound(format!("record {index} for {account}")))
    }

    async fn owner_of(&self, token_id: TokenId) -> Result<Account, LedgerError> {
        self.owner_of_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock();
        if state.fail_owner_at == Some(token_id) {
            return Err(LedgerError::Unavailable(format!(
                "injected failure reading owner of token {token_id}"
            )));
        }
        token(&state, token_id).map(|(owner, _)| owner.clone())
    }

    async fn token_uri(&self, token_id: TokenId) -> Result<String, LedgerError> {
        self.token_uri_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock();
        token(&state, token_id).map(|(_, uri)| uri.clone())
    }

    async fn mint(
        &self,
        account: &Account,
        token_uri: &str,
    ) -> Result<TransactionReceipt, LedgerError> {
        self.mint_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        if let Some(reason) = &state.fail_mint {
            return Err(LedgerError::Unavailable(reason.clone()));
        }
        state.tokens.push((account.clone(), token_uri.to_string()));
        let id = state.tokens.len() as u64 - 1;
        Ok(TransactionReceipt {
            transaction_hash: format!("0x{:064x}", id + 1),
            block_number: Some(id + 1),
            status: TransactionStatus::Confirmed,
            token_id: Some(TokenId(id)),
        })
    }

    async fn record_count(&self, account: &Account) -> Result<Option<u64>, LedgerError> {
        self.record_count_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock();
        if !state.expose_counts {
            return Ok(None);
        }
        let n = state
            .records
            .get(&account.as_str().to_ascii_lowercase())
            .map_or(0, Vec::len);
        Ok(Some(n as u64))
    }

    async fn token_count(&self) -> Result<Option<u64>, LedgerError> {
        self.token_count_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock();
        Ok(state.expose_counts.then_some(state.tokens.len() as u64))
    }
}

fn token(state: &State, token_id: TokenId) -> Result<&(Account, String), LedgerError> {
    usize::try_from(token_id.0)
        .ok()
        .and_then(|i| state.tokens.get(i))
        .ok_or_else(|| LedgerError::NotFound(format!("token {token_id}")))
}
