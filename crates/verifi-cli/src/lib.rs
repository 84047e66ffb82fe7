//! # verifi-cli: Command-Line Interface
//!
//! Provides the `verifi` binary, the entry point standing in for the
//! dashboard actions that trigger a scan or an issuance.
//!
//! ## Subcommands
//!
//! - `verifi attendance --account <addr>`: list attendance records.
//! - `verifi certificates --account <addr>`: list owned certificates.
//! - `verifi issue --account <addr> --course <name> [--evidence <path>]`:
//!   issue a certificate.
//! - `verifi digest <path>`: print a file's evidence fingerprint.
//!
//! ## Configuration
//!
//! Ledger and evidence store settings come from `VERIFI_*` environment
//! variables (see [`verifi_ledger::LedgerConfig::from_env`] and
//! [`verifi_evidence::EvidenceConfig::from_env`]). Clients are built once
//! per invocation in [`Services`] and passed to the handlers.

pub mod attendance;
pub mod certificates;
pub mod digest;
pub mod issue;

use std::sync::Arc;

use anyhow::{Context, Result};
use verifi_evidence::{
    store_from_config, DocumentFetcher, EvidenceConfig, EvidenceStore, GatewayDocumentFetcher,
};
use verifi_ledger::{EvmLedgerClient, LedgerClient, LedgerConfig};

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// The configured collaborators, built once per invocation.
#[derive(Clone)]
pub struct Services {
    pub ledger: Arc<dyn LedgerClient>,
    pub store: Arc<dyn EvidenceStore>,
    pub fetcher: Arc<dyn DocumentFetcher>,
}

impl Services {
    /// Build the EVM ledger client, evidence store and gateway fetcher
    /// from `VERIFI_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let ledger_config = LedgerConfig::from_env().context("loading ledger configuration")?;
        let evidence_config =
            EvidenceConfig::from_env().context("loading evidence store configuration")?;
        tracing::debug!(?ledger_config, ?evidence_config, "configuration loaded");

        let ledger = EvmLedgerClient::new(ledger_config).context("building ledger client")?;
        let store = store_from_config(&evidence_config).context("building evidence store")?;
        let fetcher =
            GatewayDocumentFetcher::new(&evidence_config).context("building document fetcher")?;

        Ok(Self {
            ledger: Arc::new(ledger),
            store,
            fetcher: Arc::new(fetcher),
        })
    }
}

/// Render a serializable value as pretty JSON.
pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("serializing output")
}
