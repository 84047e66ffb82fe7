//! # Digest Subcommand
//!
//! Prints the evidence fingerprint of a file, the same value `issue` records
//! as `fileHash`, so a holder can check a document against a certificate.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use verifi_core::{Fingerprint, Sha256Fingerprint};

use crate::OutputFormat;

/// Arguments for the `verifi digest` subcommand.
#[derive(Args, Debug)]
pub struct DigestArgs {
    /// File to fingerprint.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DigestOutput<'a> {
    path: &'a str,
    file_hash: String,
}

/// Execute the digest subcommand.
pub fn run_digest(args: &DigestArgs, format: OutputFormat) -> Result<u8> {
    let file_hash = file_fingerprint(&args.file)?;
    let path = args.file.display().to_string();
    match format {
        OutputFormat::Text => println!("{file_hash}  {path}"),
        OutputFormat::Json => println!(
            "{}",
            crate::to_json(&DigestOutput {
                path: &path,
                file_hash,
            })?
        ),
    }
    Ok(0)
}

/// Fingerprint of a file's exact bytes.
pub fn file_fingerprint(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read file: {}", path.display()))?;
    Ok(Sha256Fingerprint.digest(&bytes))
}
