//! # Certificates Subcommand
//!
//! Lists the certificate tokens an account owns by walking the global token
//! space. `--on-metadata-error` chooses what happens when a matched token's
//! metadata document cannot be read.

use anyhow::{Context, Result};
use clap::Args;
use verifi_core::{Account, CertificateSummary};
use verifi_registry::{MetadataFailurePolicy, RecordScanner};

use crate::{OutputFormat, Services};

/// Arguments for the `verifi certificates` subcommand.
#[derive(Args, Debug)]
pub struct CertificatesArgs {
    /// Account address whose certificates to list.
    #[arg(long)]
    pub account: String,

    /// Behaviour when a certificate's metadata cannot be read:
    /// abort, skip or placeholder.
    #[arg(long, value_name = "POLICY", default_value_t = MetadataFailurePolicy::Abort)]
    pub on_metadata_error: MetadataFailurePolicy,
}

/// Execute the certificates subcommand.
pub async fn run_certificates(
    args: &CertificatesArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<u8> {
    let account = Account::new(args.account.as_str()).context("invalid --account")?;
    let scanner = RecordScanner::new(services.ledger.clone(), services.fetcher.clone())
        .with_policy(args.on_metadata_error);
    let certificates = scanner
        .scan_certificates(&account)
        .await
        .context("certificate scan failed")?;
    println!("{}", render(&certificates, format)?);
    Ok(0)
}

/// Render certificate summaries in the requested format.
pub fn render(certificates: &[CertificateSummary], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => crate::to_json(&certificates),
        OutputFormat::Text => {
            if certificates.is_empty() {
                return Ok("no certificates".to_string());
            }
            let lines: Vec<String> = certificates
                .iter()
                .map(|c| {
                    let issued = c
                        .timestamp
                        .map(|t| t.to_iso8601())
                        .unwrap_or_else(|| "-".to_string());
                    format!("token {}  {}  {}", c.id, issued, c.course_name)
                })
                .collect();
            Ok(lines.join("\n"))
        }
    }
}
