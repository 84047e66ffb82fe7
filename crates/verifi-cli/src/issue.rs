//! # Issue Subcommand
//!
//! Issues a certificate. The evidence file, if given, is read once and the
//! same bytes are handed to the orchestrator for both fingerprinting and
//! upload.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use verifi_core::{Sha256Fingerprint, SystemClock};
use verifi_registry::{Evidence, IssuanceError, IssuanceOrchestrator, IssuedCertificate};

use crate::{OutputFormat, Services};

/// Arguments for the `verifi issue` subcommand.
#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Account address receiving the certificate.
    #[arg(long)]
    pub account: String,

    /// Course name recorded in the certificate metadata.
    #[arg(long)]
    pub course: String,

    /// Evidence file to fingerprint and upload.
    #[arg(long, value_name = "FILE")]
    pub evidence: Option<PathBuf>,
}

/// Execute the issue subcommand.
pub async fn run_issue(args: &IssueArgs, services: &Services, format: OutputFormat) -> Result<u8> {
    let orchestrator = IssuanceOrchestrator::new(
        services.ledger.clone(),
        services.store.clone(),
        Arc::new(Sha256Fingerprint),
        Arc::new(SystemClock),
    );
    let issued = issue(&orchestrator, args).await?;
    println!("{}", render(&issued, format)?);
    Ok(0)
}

/// Read the evidence file (if any) and run the issuance.
pub async fn issue(
    orchestrator: &IssuanceOrchestrator,
    args: &IssueArgs,
) -> Result<IssuedCertificate> {
    let evidence_bytes = match &args.evidence {
        Some(path) => Some(
            std::fs::read(path)
                .with_context(|| format!("failed to read evidence file: {}", path.display()))?,
        ),
        None => None,
    };
    let file_name = args
        .evidence
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let evidence = evidence_bytes.as_deref().map(|bytes| Evidence {
        file_name: &file_name,
        bytes,
    });

    match orchestrator.issue(&args.account, &args.course, evidence).await {
        Ok(issued) => Ok(issued),
        Err(IssuanceError::LedgerWrite {
            provenance,
            file_hash,
            source,
        }) => {
            // Uploads are not rolled back; surface what was left behind.
            if let Ok(json) = serde_json::to_string(&provenance) {
                tracing::warn!(
                    provenance = %json,
                    file_hash = ?file_hash,
                    "uploads left unreferenced by failed mint"
                );
            }
            Err(anyhow::Error::new(source).context("certificate mint failed"))
        }
        Err(e) => Err(e.into()),
    }
}

/// Render an issued certificate in the requested format.
pub fn render(issued: &IssuedCertificate, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => crate::to_json(issued),
        OutputFormat::Text => {
            let mut lines = vec![
                format!("issued \"{}\" to {}", issued.course_name, issued.account),
                format!("  timestamp:  {}", issued.timestamp.to_iso8601()),
                format!("  tx hash:    {}", issued.receipt.transaction_hash),
            ];
            if let Some(id) = issued.receipt.token_id {
                lines.push(format!("  token id:   {id}"));
            }
            if let Some(hash) = &issued.file_hash {
                lines.push(format!("  file hash:  {hash}"));
            }
            match &issued.metadata_uri {
                Some(uri) => lines.push(format!("  metadata:   {uri}")),
                None => lines.push("  metadata:   (none, upload degraded)".to_string()),
            }
            if let Some(err) = &issued.metadata.file_upload_error {
                lines.push(format!("  evidence upload failed: {err}"));
            }
            Ok(lines.join("\n"))
        }
    }
}
