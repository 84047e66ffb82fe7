//! # EVM JSON-RPC Ledger Client
//!
//! Reads attendance records and certificate tokens from, and mints
//! certificates on, an EVM-compatible chain via JSON-RPC.
//!
//! ## How It Works
//!
//! - Reads are `eth_call` against the `latest` block, with calldata built
//!   by [`crate::abi`].
//! - Mints are `eth_sendTransaction` from the recipient account. The RPC
//!   endpoint (or the wallet behind it) handles signing; this client holds
//!   no keys.
//! - After a mint the receipt is fetched once with
//!   `eth_getTransactionReceipt`. A null receipt is reported as
//!   [`TransactionStatus::Pending`]; there is no polling loop.
//!
//! ## Contract Interface
//!
//! ```solidity
//! function records(address, uint256) external view returns (uint256 timestamp, bool present);
//! function ownerOf(uint256 tokenId) external view returns (address);
//! function tokenURI(uint256 tokenId) external view returns (string memory);
//! function mint(address to, string memory uri) external;
//! function totalSupply() external view returns (uint256); // optional
//! ```

use async_trait::async_trait;
use serde_json::{json, Value};
use verifi_core::{Account, AttendanceRecord, RecordIndex, TokenId};

use crate::abi::{self, AbiError};
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::{LedgerClient, TransactionReceipt, TransactionStatus};

/// Ledger client backed by an EVM JSON-RPC node.
#[derive(Debug)]
pub struct EvmLedgerClient {
    client: reqwest::Client,
    config: LedgerConfig,
}

impl EvmLedgerClient {
    /// Create a client from configuration.
    ///
    /// Validates both contract addresses up front so a misconfigured
    /// deployment fails at startup rather than on the first call.
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerError> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LedgerError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Send a JSON-RPC request and return the `result` field.
    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let resp = self
            .client
            .post(self.config.rpc_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|source| LedgerError::Transport {
                method: method.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LedgerError::Http {
                method: method.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = resp.json().await.map_err(|e| LedgerError::InvalidResponse {
            method: method.to_string(),
            reason: format!("invalid JSON: {e}"),
        })?;

        if let Some(error) = json.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown RPC error")
                .to_string();
            return Err(LedgerError::Rpc {
                method: method.to_string(),
                code,
                message,
            });
        }

        json.get("result")
            .cloned()
            .ok_or_else(|| LedgerError::InvalidResponse {
                method: method.to_string(),
                reason: "response missing 'result' field".to_string(),
            })
    }

    /// `eth_call` against `to` and return the decoded return bytes.
    async fn eth_call(&self, label: &str, to: &str, data: String) -> Result<Vec<u8>, LedgerError> {
        let result = self
            .rpc_call("eth_call", json!([{ "to": to, "data": data }, "latest"]))
            .await?;
        let hex = result.as_str().ok_or_else(|| invalid(label, "non-string result"))?;
        let bytes = abi::decode_hex(hex).map_err(|e| abi_invalid(label, e))?;
        if bytes.is_empty() {
            // No code at the address, or a call that returned nothing.
            return Err(invalid(label, "empty return data"));
        }
        Ok(bytes)
    }

    /// Fetch a receipt once and classify it.
    async fn receipt(&self, tx_hash: &str) -> Result<TransactionReceipt, LedgerError> {
        let receipt = self
            .rpc_call("eth_getTransactionReceipt", json!([tx_hash]))
            .await?;

        if receipt.is_null() {
            return Ok(TransactionReceipt {
                transaction_hash: tx_hash.to_string(),
                block_number: None,
                status: TransactionStatus::Pending,
                token_id: None,
            });
        }

        let status_hex = receipt.get("status").and_then(Value::as_str).unwrap_or("0x0");
        if status_hex == "0x0" {
            return Err(LedgerError::Reverted {
                transaction_hash: tx_hash.to_string(),
            });
        }

        let block_number = receipt
            .get("blockNumber")
            .and_then(Value::as_str)
            .and_then(parse_quantity);

        let token_id = receipt
            .get("logs")
            .and_then(Value::as_array)
            .and_then(|logs| minted_token_id(logs, &self.config.certificate_contract));

        Ok(TransactionReceipt {
            transaction_hash: tx_hash.to_string(),
            block_number,
            status: TransactionStatus::Confirmed,
            token_id,
        })
    }
}

#[async_trait]
impl LedgerClient for EvmLedgerClient {
    fn validate_account(&self, account: &Account) -> Result<(), LedgerError> {
        if abi::is_valid_address(account.as_str()) {
            Ok(())
        } else {
            Err(LedgerError::InvalidAddress(account.to_string()))
        }
    }

    async fn read_record(
        &self,
        account: &Account,
        index: RecordIndex,
    ) -> Result<AttendanceRecord, LedgerError> {
        let data = abi::records_call(account, index).map_err(|e| match e {
            AbiError::BadInputAddress(a) => LedgerError::InvalidAddress(a),
            other => abi_invalid("records", other),
        })?;
        let bytes = self
            .eth_call("records", &self.config.attendance_contract, data)
            .await?;
        abi::decode_record_return(&bytes).map_err(|e| abi_invalid("records", e))
    }

    async fn owner_of(&self, token_id: TokenId) -> Result<Account, LedgerError> {
        let bytes = self
            .eth_call(
                "ownerOf",
                &self.config.certificate_contract,
                abi::owner_of_call(token_id),
            )
            .await?;
        let addr = abi::decode_address_return(&bytes).map_err(|e| abi_invalid("ownerOf", e))?;
        Account::new(&addr).map_err(|e| invalid("ownerOf", &e.to_string()))
    }

    async fn token_uri(&self, token_id: TokenId) -> Result<String, LedgerError> {
        let bytes = self
            .eth_call(
                "tokenURI",
                &self.config.certificate_contract,
                abi::token_uri_call(token_id),
            )
            .await?;
        abi::decode_string_return(&bytes).map_err(|e| abi_invalid("tokenURI", e))
    }

    async fn mint(
        &self,
        account: &Account,
        token_uri: &str,
    ) -> Result<TransactionReceipt, LedgerError> {
        let data = abi::mint_call(account, token_uri).map_err(|e| match e {
            AbiError::BadInputAddress(a) => LedgerError::InvalidAddress(a),
            other => abi_invalid("mint", other),
        })?;

        let tx = json!({
            "from": account.as_str(),
            "to": self.config.certificate_contract,
            "data": data,
        });

        let result = self.rpc_call("eth_sendTransaction", json!([tx])).await?;
        let tx_hash = result
            .as_str()
            .ok_or_else(|| invalid("eth_sendTransaction", "non-string result"))?
            .to_string();

        tracing::info!(tx_hash = %tx_hash, account = %account, "mint transaction submitted");

        let receipt = self.receipt(&tx_hash).await?;
        tracing::debug!(
            tx_hash = %tx_hash,
            status = ?receipt.status,
            block = ?receipt.block_number,
            token_id = ?receipt.token_id,
            "mint receipt"
        );
        Ok(receipt)
    }

    async fn token_count(&self) -> Result<Option<u64>, LedgerError> {
        if !self.config.use_total_supply {
            return Ok(None);
        }
        let bytes = self
            .eth_call(
                "totalSupply",
                &self.config.certificate_contract,
                abi::total_supply_call(),
            )
            .await?;
        abi::decode_u64_return(&bytes)
            .map(Some)
            .map_err(|e| abi_invalid("totalSupply", e))
    }
}

/// Parse a `0x`-prefixed hex quantity.
fn parse_quantity(s: &str) -> Option<u64> {
    u64::from_str_radix(s.trim_start_matches("0x"), 16).ok()
}

/// Token id from the ERC-721 `Transfer(0x0, to, id)` log emitted by a mint.
fn minted_token_id(logs: &[Value], contract: &str) -> Option<TokenId> {
    logs.iter().find_map(|log| {
        let address = log.get("address").and_then(Value::as_str)?;
        if !address.eq_ignore_ascii_case(contract) {
            return None;
        }
        let topics = log.get("topics").and_then(Value::as_array)?;
        if topics.len() != 4 {
            return None;
        }
        let topic0 = topics[0].as_str()?;
        if !topic0.eq_ignore_ascii_case(abi::TRANSFER_EVENT_TOPIC) {
            return None;
        }
        let from = abi::decode_hex(topics[1].as_str()?).ok()?;
        if from.iter().any(|b| *b != 0) {
            return None;
        }
        let id = abi::decode_hex(topics[3].as_str()?).ok()?;
        abi::decode_u64(&id).ok().map(TokenId)
    })
}

fn invalid(method: &str, reason: &str) -> LedgerError {
    LedgerError::InvalidResponse {
        method: method.to_string(),
        reason: reason.to_string(),
    }
}

fn abi_invalid(method: &str, e: AbiError) -> LedgerError {
    invalid(method, &e.to_string())
}
