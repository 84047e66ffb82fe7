//! Subcommand handlers driven end to end against in-memory collaborators.

use std::sync::Arc;

use verifi_cli::attendance::{run_attendance, AttendanceArgs};
use verifi_cli::certificates::{run_certificates, CertificatesArgs};
use verifi_cli::issue::{run_issue, IssueArgs};
use verifi_cli::{OutputFormat, Services};
use verifi_core::{Account, AttendanceRecord, Timestamp};
use verifi_evidence::InMemoryEvidenceStore;
use verifi_ledger::InMemoryLedger;
use verifi_registry::MetadataFailurePolicy;

const ALICE: &str = "0xabcdef0123456789abcdef0123456789abcdef01";

fn services(ledger: &Arc<InMemoryLedger>, store: &Arc<InMemoryEvidenceStore>) -> Services {
    Services {
        ledger: ledger.clone(),
        store: store.clone(),
        fetcher: store.clone(),
    }
}

#[tokio::test]
async fn attendance_scans_through_injected_ledger() {
    let ledger = Arc::new(InMemoryLedger::new());
    let store = Arc::new(InMemoryEvidenceStore::new());
    ledger.add_record(
        &Account::new(ALICE).unwrap(),
        AttendanceRecord {
            timestamp: Timestamp::from_epoch_secs(1000).unwrap(),
            present: true,
        },
    );

    let args = AttendanceArgs {
        account: ALICE.into(),
    };
    let code = run_attendance(&args, &services(&ledger, &store), OutputFormat::Json)
        .await
        .unwrap();
    assert_eq!(code, 0);
    assert_eq!(ledger.read_record_calls(), 2);
}

#[tokio::test]
async fn issue_then_list_certificates() {
    let ledger = Arc::new(InMemoryLedger::new());
    let store = Arc::new(InMemoryEvidenceStore::new());
    let svc = services(&ledger, &store);

    let issue = IssueArgs {
        account: ALICE.into(),
        course: "Algorithms 101".into(),
        evidence: None,
    };
    assert_eq!(run_issue(&issue, &svc, OutputFormat::Text).await.unwrap(), 0);
    assert_eq!(ledger.mint_calls(), 1);

    let list = CertificatesArgs {
        account: ALICE.to_ascii_uppercase().replacen("0X", "0x", 1),
        on_metadata_error: MetadataFailurePolicy::Abort,
    };
    assert_eq!(run_certificates(&list, &svc, OutputFormat::Text).await.unwrap(), 0);
    assert_eq!(store.fetch_calls(), 1);
}

#[tokio::test]
async fn certificates_abort_policy_surfaces_error() {
    let ledger = Arc::new(InMemoryLedger::new());
    let store = Arc::new(InMemoryEvidenceStore::new());
    ledger.add_token(&Account::new(ALICE).unwrap(), "ipfs://sha256-missing");

    let list = CertificatesArgs {
        account: ALICE.into(),
        on_metadata_error: MetadataFailurePolicy::Abort,
    };
    let err = run_certificates(&list, &services(&ledger, &store), OutputFormat::Json)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("token 0"));

    let skip = CertificatesArgs {
        on_metadata_error: MetadataFailurePolicy::Skip,
        ..list
    };
    assert_eq!(
        run_certificates(&skip, &services(&ledger, &store), OutputFormat::Json)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn blank_account_is_rejected() {
    let ledger = Arc::new(InMemoryLedger::new());
    let store = Arc::new(InMemoryEvidenceStore::new());
    let args = AttendanceArgs {
        account: String::new(),
    };
    assert!(run_attendance(&args, &services(&ledger, &store), OutputFormat::Text)
        .await
        .is_err());
    assert_eq!(ledger.total_calls(), 0);
}
