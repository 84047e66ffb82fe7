//! # Ledger-Anchored Records
//!
//! Shapes of the data this workspace reads from and writes to the ledger
//! and evidence store. Records and metadata documents are created once by a
//! write and never mutated afterwards.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identity::{ContentUri, TokenId};
use crate::temporal::Timestamp;

/// Course name reported for a certificate whose metadata carries no name.
pub const UNNAMED_COURSE: &str = "Unnamed Course";

/// One attendance entry stored by the ledger for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// When the attendance was marked.
    pub timestamp: Timestamp,
    /// Whether the account was marked present.
    pub present: bool,
}

/// Metadata document describing an issued certificate.
///
/// Built locally by the issuance procedure and uploaded to the evidence
/// store; the returned URI is what the minted token points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateMetadata {
    /// Course name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Seconds since the epoch, taken when issuance started.
    pub timestamp: Timestamp,
    /// Hex fingerprint of the evidence bytes, when evidence was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_hash: Option<String>,
    /// Reference to the uploaded evidence, when the upload succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<ContentUri>,
    /// Why the evidence upload failed, when it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_upload_error: Option<String>,
}

impl CertificateMetadata {
    /// Draft metadata for a course, with the synthesized description.
    pub fn draft(course_name: &str, timestamp: Timestamp) -> Self {
        Self {
            name: course_name.to_string(),
            description: format!("Certificate of completion for \"{course_name}\""),
            timestamp,
            file_hash: None,
            file: None,
            file_upload_error: None,
        }
    }
}

/// A certificate token owned by an account, as discovered on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSummary {
    /// The token id.
    pub id: TokenId,
    /// Course name from the metadata document, or [`UNNAMED_COURSE`].
    pub course_name: String,
    /// Issuance timestamp from the metadata document, when present.
    pub timestamp: Option<Timestamp>,
}

impl CertificateSummary {
    /// Summary for a token with no readable metadata.
    pub fn unnamed(id: TokenId) -> Self {
        Self {
            id,
            course_name: UNNAMED_COURSE.to_string(),
            timestamp: None,
        }
    }

    /// Derive a summary from a fetched metadata document.
    ///
    /// Documents are external and loosely typed: `name` falls back to
    /// [`UNNAMED_COURSE`] when missing or blank, and `timestamp` is accepted
    /// as an integer or a numeric string.
    pub fn from_document(id: TokenId, document: &Value) -> Self {
        let course_name = document
            .get("name")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(UNNAMED_COURSE)
            .to_string();

        let secs = match document.get("timestamp") {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        let timestamp = secs.and_then(|s| Timestamp::from_epoch_secs(s).ok());

        Self {
            id,
            course_name,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ContentIdentifier;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::from_epoch_secs(secs).unwrap()
    }

    #[test]
    fn draft_metadata_omits_absent_fields() {
        let meta = CertificateMetadata::draft("Algorithms 101", ts(1000));
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["name"], "Algorithms 101");
        assert_eq!(json["timestamp"], 1000);
        assert!(json["description"].as_str().unwrap().contains("Algorithms 101"));
        assert!(json.get("file").is_none());
        assert!(json.get("fileHash").is_none());
        assert!(json.get("fileUploadError").is_none());
    }

    #[test]
    fn metadata_uses_camel_case_keys() {
        let mut meta = CertificateMetadata::draft("Rust", ts(5));
        meta.file_hash = Some("ab".into());
        meta.file = Some(ContentUri::ipfs(&ContentIdentifier::new("bafy").unwrap()));
        meta.file_upload_error = Some("unreachable".into());
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["fileHash"], "ab");
        assert_eq!(json["file"], "ipfs://bafy");
        assert_eq!(json["fileUploadError"], "unreachable");
    }

    #[test]
    fn attendance_record_shape() {
        let rec: AttendanceRecord =
            serde_json::from_str(r#"{"timestamp":1000,"present":true}"#).unwrap();
        assert_eq!(rec.timestamp, ts(1000));
        assert!(rec.present);
    }

    #[test]
    fn summary_from_full_document() {
        let doc = serde_json::json!({"name": "Algorithms 101", "timestamp": 1700000000});
        let s = CertificateSummary::from_document(TokenId(3), &doc);
        assert_eq!(s.id, TokenId(3));
        assert_eq!(s.course_name, "Algorithms 101");
        assert_eq!(s.timestamp, Some(ts(1_700_000_000)));
    }

    #[test]
    fn summary_falls_back_when_fields_missing() {
        let doc = serde_json::json!({"description": "x"});
        assert_eq!(
            CertificateSummary::from_document(TokenId(0), &doc),
            CertificateSummary::unnamed(TokenId(0))
        );
    }

    #[test]
    fn summary_accepts_string_timestamp() {
        let doc = serde_json::json!({"name": "Rust", "timestamp": "1000"});
        let s = CertificateSummary::from_document(TokenId(1), &doc);
        assert_eq!(s.timestamp, Some(ts(1000)));
    }
}
