//! Contract tests for HttpEvidenceStore and GatewayDocumentFetcher.
//!
//! ## Endpoints Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | POST   | `/upload` | `upload_*` |
//! | GET    | `/ipfs/{cid}` | `fetch_*` |

use serde_json::json;
use verifi_core::{CanonicalBytes, ContentIdentifier, ContentUri};
use verifi_evidence::{
    store_from_config, DocumentFetcher, EvidenceConfig, EvidenceError, EvidenceStore,
    GatewayDocumentFetcher, HttpEvidenceStore,
};
use wiremock::matchers::{body_bytes, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(mock_server: &MockServer, token: Option<&str>) -> EvidenceConfig {
    EvidenceConfig::local(&mock_server.uri(), &mock_server.uri(), token).unwrap()
}

// ── POST /upload ─────────────────────────────────────────────────────

#[tokio::test]
async fn upload_bytes_sends_token_name_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header("authorization", "Bearer test-token"))
        .and(header("x-name", "transcript.pdf"))
        .and(body_bytes(b"%PDF-1.7 transcript".to_vec()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cid": "bafkreievidence"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = HttpEvidenceStore::new(&test_config(&mock_server, Some("test-token"))).unwrap();
    let cid = store
        .upload_bytes("transcript.pdf", b"%PDF-1.7 transcript")
        .await
        .unwrap();
    assert_eq!(cid.as_str(), "bafkreievidence");
}

#[tokio::test]
async fn upload_document_sends_canonical_json() {
    let mock_server = MockServer::start().await;
    let doc = CanonicalBytes::new(&json!({"timestamp": 1000, "name": "Algorithms 101"})).unwrap();

    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header("content-type", "application/json"))
        .and(header("x-name", "metadata.json"))
        .and(body_bytes(br#"{"name":"Algorithms 101","timestamp":1000}"#.to_vec()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cid": "bafkreimetadata"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = HttpEvidenceStore::new(&test_config(&mock_server, Some("test-token"))).unwrap();
    let cid = store.upload_document(&doc).await.unwrap();
    assert_eq!(ContentUri::ipfs(&cid).as_str(), "ipfs://bafkreimetadata");
}

#[tokio::test]
async fn upload_handles_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = HttpEvidenceStore::new(&test_config(&mock_server, Some("stale"))).unwrap();
    let err = store.upload_bytes("a.pdf", b"x").await.unwrap_err();
    match err {
        EvidenceError::Api { status, body, .. } => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid token");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn upload_rejects_response_without_cid() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let store = HttpEvidenceStore::new(&test_config(&mock_server, Some("t"))).unwrap();
    assert!(matches!(
        store.upload_bytes("a.pdf", b"x").await,
        Err(EvidenceError::Deserialization { .. })
    ));
}

#[tokio::test]
async fn upload_rejects_malformed_cid() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cid": ""})))
        .mount(&mock_server)
        .await;

    let store = HttpEvidenceStore::new(&test_config(&mock_server, Some("t"))).unwrap();
    assert!(matches!(
        store.upload_bytes("a.pdf", b"x").await,
        Err(EvidenceError::InvalidResponse { .. })
    ));
}

#[tokio::test]
async fn unconfigured_store_makes_no_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let store = store_from_config(&test_config(&mock_server, None)).unwrap();
    assert!(matches!(
        store.upload_bytes("a.pdf", b"x").await,
        Err(EvidenceError::Unconfigured)
    ));
}

// ── GET /ipfs/{cid} ──────────────────────────────────────────────────

#[tokio::test]
async fn fetch_resolves_ipfs_uri_through_gateway() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ipfs/bafkreimetadata"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Algorithms 101",
            "description": "Certificate of completion for \"Algorithms 101\"",
            "timestamp": 1767225600
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = GatewayDocumentFetcher::new(&test_config(&mock_server, None)).unwrap();
    let uri = ContentUri::ipfs(&ContentIdentifier::new("bafkreimetadata").unwrap());
    let doc = fetcher.fetch(&uri).await.unwrap();
    assert_eq!(doc["name"], "Algorithms 101");
    assert_eq!(doc["timestamp"], 1767225600);
}

#[tokio::test]
async fn fetch_missing_document_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let fetcher = GatewayDocumentFetcher::new(&test_config(&mock_server, None)).unwrap();
    let uri = ContentUri::parse("ipfs://bafkreigone").unwrap();
    assert!(matches!(fetcher.fetch(&uri).await, Err(EvidenceError::NotFound(_))));
}

#[tokio::test]
async fn fetch_rejects_non_json_document() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ipfs/bafkreitext"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let fetcher = GatewayDocumentFetcher::new(&test_config(&mock_server, None)).unwrap();
    let uri = ContentUri::parse("ipfs://bafkreitext").unwrap();
    assert!(matches!(
        fetcher.fetch(&uri).await,
        Err(EvidenceError::Deserialization { .. })
    ));
}
