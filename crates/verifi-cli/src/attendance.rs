//! # Attendance Subcommand
//!
//! Lists the attendance records an account holds, in index order.

use anyhow::{Context, Result};
use clap::Args;
use verifi_core::{Account, AttendanceRecord};
use verifi_registry::RecordScanner;

use crate::{OutputFormat, Services};

/// Arguments for the `verifi attendance` subcommand.
#[derive(Args, Debug)]
pub struct AttendanceArgs {
    /// Account address whose records to list.
    #[arg(long)]
    pub account: String,
}

/// Execute the attendance subcommand.
pub async fn run_attendance(
    args: &AttendanceArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<u8> {
    let account = Account::new(args.account.as_str()).context("invalid --account")?;
    let scanner = RecordScanner::new(services.ledger.clone(), services.fetcher.clone());
    let records = scanner.scan_attendance(&account).await;
    println!("{}", render(&records, format)?);
    Ok(0)
}

/// Render records in the requested format.
pub fn render(records: &[AttendanceRecord], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => crate::to_json(&records),
        OutputFormat::Text => {
            if records.is_empty() {
                return Ok("no attendance records".to_string());
            }
            let lines: Vec<String> = records
                .iter()
                .enumerate()
                .map(|(i, r)| {
                    format!(
                        "#{i}  {}  {}",
                        r.timestamp.to_iso8601(),
                        if r.present { "present" } else { "absent" }
                    )
                })
                .collect();
            Ok(lines.join("\n"))
        }
    }
}
