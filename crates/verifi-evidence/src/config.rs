//! Evidence store configuration.
//!
//! Defaults point at web3.storage for uploads and the w3s.link gateway for
//! retrieval. The upload token is optional: without one the store is
//! unconfigured and uploads degrade rather than fail issuance.

use url::Url;

/// Default upload service.
pub const DEFAULT_UPLOAD_URL: &str = "https://api.web3.storage";
/// Default IPFS HTTP gateway.
pub const DEFAULT_GATEWAY_URL: &str = "https://w3s.link";

/// Configuration for the evidence store and document fetcher.
///
/// Custom `Debug` implementation redacts the `api_token` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct EvidenceConfig {
    /// Base URL of the upload service.
    pub upload_url: Url,
    /// Base URL of the IPFS gateway used to resolve `ipfs://` URIs.
    pub gateway_url: Url,
    /// Bearer token for uploads. `None` leaves the store unconfigured.
    pub api_token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for EvidenceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvidenceConfig")
            .field("upload_url", &self.upload_url)
            .field("gateway_url", &self.gateway_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl EvidenceConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `VERIFI_EVIDENCE_TOKEN` (optional)
    /// - `VERIFI_EVIDENCE_URL` (default: `https://api.web3.storage`)
    /// - `VERIFI_IPFS_GATEWAY` (default: `https://w3s.link`)
    /// - `VERIFI_EVIDENCE_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            upload_url: lookup_url(&lookup, "VERIFI_EVIDENCE_URL", DEFAULT_UPLOAD_URL)?,
            gateway_url: lookup_url(&lookup, "VERIFI_IPFS_GATEWAY", DEFAULT_GATEWAY_URL)?,
            api_token: lookup("VERIFI_EVIDENCE_TOKEN").filter(|t| !t.trim().is_empty()),
            timeout_secs: lookup("VERIFI_EVIDENCE_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        })
    }

    /// Create a configuration pointing to local mock servers (for testing).
    pub fn local(
        upload_url: &str,
        gateway_url: &str,
        token: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let parse = |name: &str, raw: &str| {
            Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(name.to_string(), e.to_string()))
        };
        Ok(Self {
            upload_url: parse("upload_url", upload_url)?,
            gateway_url: parse("gateway_url", gateway_url)?,
            api_token: token.map(str::to_string),
            timeout_secs: 5,
        })
    }
}

fn lookup_url<F>(lookup: &F, var: &str, default: &str) -> Result<Url, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(var).unwrap_or_else(|| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("VERIFI_EVIDENCE_TOKEN is required for uploads")]
    MissingToken,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
