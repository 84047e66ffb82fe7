//! Scanner behaviour against the in-memory ledger: exact-k discovery,
//! ownership scans over the global token space, and restartability.

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;
use verifi_core::{Account, AttendanceRecord, Timestamp, TokenId};
use verifi_evidence::InMemoryEvidenceStore;
use verifi_ledger::InMemoryLedger;
use verifi_registry::RecordScanner;

const ALICE: &str = "0x1111111111111111111111111111111111111111";
const BOB: &str = "0x2222222222222222222222222222222222222222";

fn acct(s: &str) -> Account {
    Account::new(s).unwrap()
}

fn rec(secs: i64, present: bool) -> AttendanceRecord {
    AttendanceRecord {
        timestamp: Timestamp::from_epoch_secs(secs).unwrap(),
        present,
    }
}

fn scanner(ledger: &Arc<InMemoryLedger>, store: &Arc<InMemoryEvidenceStore>) -> RecordScanner {
    RecordScanner::new(ledger.clone(), store.clone())
}

#[tokio::test]
async fn single_record_then_absent_index() {
    let ledger = Arc::new(InMemoryLedger::new());
    let store = Arc::new(InMemoryEvidenceStore::new());
    let alice = acct(ALICE);
    ledger.add_record(&alice, rec(1000, true));

    let records = scanner(&ledger, &store).scan_attendance(&alice).await;
    assert_eq!(records, vec![rec(1000, true)]);
    // Index 0 succeeded, index 1 terminated the scan.
    assert_eq!(ledger.read_record_calls(), 2);
}

#[tokio::test]
async fn no_records_is_empty_not_an_error() {
    let ledger = Arc::new(InMemoryLedger::new());
    let store = Arc::new(InMemoryEvidenceStore::new());

    let records = scanner(&ledger, &store).scan_attendance(&acct(ALICE)).await;
    assert!(records.is_empty());
    assert_eq!(ledger.read_record_calls(), 1);
}

#[tokio::test]
async fn scans_are_restartable_and_uncached() {
    let ledger = Arc::new(InMemoryLedger::new());
    let store = Arc::new(InMemoryEvidenceStore::new());
    let alice = acct(ALICE);
    ledger.add_record(&alice, rec(1, true));
    let scanner = scanner(&ledger, &store);

    assert_eq!(scanner.scan_attendance(&alice).await.len(), 1);
    ledger.add_record(&alice, rec(2, false));
    assert_eq!(scanner.scan_attendance(&alice).await.len(), 2);
    assert_eq!(ledger.read_record_calls(), 2 + 3);
}

#[tokio::test]
async fn records_of_other_accounts_are_not_returned() {
    let ledger = Arc::new(InMemoryLedger::new());
    let store = Arc::new(InMemoryEvidenceStore::new());
    ledger.add_record(&acct(BOB), rec(5, true));

    assert!(scanner(&ledger, &store).scan_attendance(&acct(ALICE)).await.is_empty());
}

#[tokio::test]
async fn zero_owned_tokens_probes_whole_space() {
    let ledger = Arc::new(InMemoryLedger::new());
    let store = Arc::new(InMemoryEvidenceStore::new());
    let bob = acct(BOB);
    const N: u64 = 5;
    for _ in 0..N {
        ledger.add_token(&bob, "");
    }

    let certs = scanner(&ledger, &store)
        .scan_certificates(&acct(ALICE))
        .await
        .unwrap();
    assert!(certs.is_empty());
    // Probed 0..N, failed at N.
    assert_eq!(ledger.owner_of_calls(), N + 1);
    assert_eq!(ledger.token_uri_calls(), 0);
    assert_eq!(store.fetch_calls(), 0);
}

#[tokio::test]
async fn owned_tokens_interleaved_with_others() {
    let ledger = Arc::new(InMemoryLedger::new());
    let store = Arc::new(InMemoryEvidenceStore::new());
    let alice = acct(ALICE);
    let bob = acct(BOB);

    let doc = store
        .put_document(&json!({"name": "Algorithms 101", "timestamp": 1767225600}))
        .unwrap();
    let untitled = store.put_document(&json!({"description": "no name"})).unwrap();

    ledger.add_token(&bob, "");
    ledger.add_token(&alice, doc.as_str());
    ledger.add_token(&bob, "");
    ledger.add_token(&alice, untitled.as_str());

    let certs = scanner(&ledger, &store).scan_certificates(&alice).await.unwrap();
    assert_eq!(certs.len(), 2);
    assert_eq!(certs[0].id, TokenId(1));
    assert_eq!(certs[0].course_name, "Algorithms 101");
    assert_eq!(certs[0].timestamp.map(|t| t.epoch_secs()), Some(1_767_225_600));
    assert_eq!(certs[1].id, TokenId(3));
    assert_eq!(certs[1].course_name, "Unnamed Course");
    assert_eq!(certs[1].timestamp, None);
    assert_eq!(store.fetch_calls(), 2);
}

proptest! {
    #[test]
    fn scan_returns_exactly_k_records_in_order(k in 0usize..24) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let ledger = Arc::new(InMemoryLedger::new());
        let store = Arc::new(InMemoryEvidenceStore::new());
        let alice = acct(ALICE);
        let expected: Vec<AttendanceRecord> =
            (0..k).map(|i| rec(1000 + i as i64, i % 2 == 0)).collect();
        for r in &expected {
            ledger.add_record(&alice, *r);
        }

        let records = rt.block_on(scanner(&ledger, &store).scan_attendance(&alice));
        prop_assert_eq!(records, expected);
        prop_assert_eq!(ledger.read_record_calls(), k as u64 + 1);
    }
}
