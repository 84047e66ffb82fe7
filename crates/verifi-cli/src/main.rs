//! # verifi CLI entry point
//!
//! Parses command-line arguments, initializes logging, builds the
//! configured clients once and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use verifi_cli::attendance::{run_attendance, AttendanceArgs};
use verifi_cli::certificates::{run_certificates, CertificatesArgs};
use verifi_cli::digest::{run_digest, DigestArgs};
use verifi_cli::issue::{run_issue, IssueArgs};
use verifi_cli::{OutputFormat, Services};

/// verifi: attendance and certificate records on a ledger.
///
/// Discovers an account's attendance records and certificates, and issues
/// certificates bound to a fingerprint of uploaded evidence.
#[derive(Parser, Debug)]
#[command(name = "verifi", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Output format for results.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List an account's attendance records.
    Attendance(AttendanceArgs),

    /// List the certificates an account owns.
    Certificates(CertificatesArgs),

    /// Issue a certificate, optionally with an evidence file.
    Issue(IssueArgs),

    /// Print the evidence fingerprint of a file.
    Digest(DigestArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::debug!("verifi CLI starting");

    let result = dispatch(cli.command, cli.output).await;

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

/// Run a subcommand. Clients are only built for commands that use them.
async fn dispatch(command: Commands, output: OutputFormat) -> anyhow::Result<u8> {
    match command {
        Commands::Digest(args) => run_digest(&args, output),
        Commands::Attendance(args) => run_attendance(&args, &Services::from_env()?, output).await,
        Commands::Certificates(args) => {
            run_certificates(&args, &Services::from_env()?, output).await
        }
        Commands::Issue(args) => run_issue(&args, &Services::from_env()?, output).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verifi_registry::MetadataFailurePolicy;

    #[test]
    fn parses_certificates_with_policy() {
        let cli = Cli::try_parse_from([
            "verifi",
            "certificates",
            "--account",
            "0x1111111111111111111111111111111111111111",
            "--on-metadata-error",
            "skip",
        ])
        .unwrap();
        match cli.command {
            Commands::Certificates(args) => {
                assert_eq!(args.on_metadata_error, MetadataFailurePolicy::Skip)
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn metadata_policy_defaults_to_abort() {
        let cli = Cli::try_parse_from(["verifi", "certificates", "--account", "0xabc"]).unwrap();
        match cli.command {
            Commands::Certificates(args) => {
                assert_eq!(args.on_metadata_error, MetadataFailurePolicy::Abort)
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["verifi", "digest", "file.pdf", "--output", "json", "-vv"])
            .unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn issue_requires_course() {
        assert!(Cli::try_parse_from(["verifi", "issue", "--account", "0xabc"]).is_err());
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(Cli::try_parse_from([
            "verifi",
            "certificates",
            "--account",
            "0xabc",
            "--on-metadata-error",
            "retry"
        ])
        .is_err());
    }
}
