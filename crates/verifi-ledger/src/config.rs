//! Ledger client configuration.
//!
//! Points the client at an EVM JSON-RPC node and the two contracts it
//! reads and writes. The node URL defaults to the Open Campus Codex RPC;
//! the contract addresses have no default and must be supplied.

use url::Url;

use crate::abi::is_valid_address;

/// Default JSON-RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "https://rpc.open-campus-codex.gelato.digital";

/// Configuration for connecting to the ledger.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint of the node.
    pub rpc_url: Url,
    /// Address of the attendance contract (`records(address,uint256)`).
    pub attendance_contract: String,
    /// Address of the certificate ERC-721 contract.
    pub certificate_contract: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Whether the certificate contract implements `totalSupply()`, letting
    /// ownership scans run over a known bound instead of probing.
    pub use_total_supply: bool,
}

impl LedgerConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `VERIFI_RPC_URL` (default: `https://rpc.open-campus-codex.gelato.digital`)
    /// - `VERIFI_ATTENDANCE_CONTRACT` (required)
    /// - `VERIFI_CERTIFICATE_CONTRACT` (required)
    /// - `VERIFI_RPC_TIMEOUT_SECS` (default: 30)
    /// - `VERIFI_USE_TOTAL_SUPPLY` (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("VERIFI_RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        let rpc_url = Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidUrl("VERIFI_RPC_URL".to_string(), e.to_string()))?;

        let attendance_contract = contract(&lookup, "VERIFI_ATTENDANCE_CONTRACT")?;
        let certificate_contract = contract(&lookup, "VERIFI_CERTIFICATE_CONTRACT")?;

        Ok(Self {
            rpc_url,
            attendance_contract,
            certificate_contract,
            timeout_secs: lookup("VERIFI_RPC_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            use_total_supply: lookup("VERIFI_USE_TOTAL_SUPPLY")
                .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }

    /// Configuration pointing at a local node (for testing).
    pub fn local(
        rpc_url: &str,
        attendance_contract: &str,
        certificate_contract: &str,
    ) -> Result<Self, ConfigError> {
        let rpc_url = Url::parse(rpc_url)
            .map_err(|e| ConfigError::InvalidUrl("rpc_url".to_string(), e.to_string()))?;
        Ok(Self {
            rpc_url,
            attendance_contract: attendance_contract.to_string(),
            certificate_contract: certificate_contract.to_string(),
            timeout_secs: 5,
            use_total_supply: false,
        })
    }

    /// Check both contract addresses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (var, addr) in [
            ("attendance_contract", &self.attendance_contract),
            ("certificate_contract", &self.certificate_contract),
        ] {
            if !is_valid_address(addr) {
                return Err(ConfigError::InvalidAddress(var.to_string(), addr.clone()));
            }
        }
        Ok(())
    }
}

fn contract<F>(lookup: &F, var: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let addr = lookup(var).ok_or_else(|| ConfigError::MissingContract(var.to_string()))?;
    let addr = addr.trim().to_string();
    if !is_valid_address(&addr) {
        return Err(ConfigError::InvalidAddress(var.to_string(), addr));
    }
    Ok(addr)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingContract(String),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid contract address for {0}: {1}")]
    InvalidAddress(String, String),
}
