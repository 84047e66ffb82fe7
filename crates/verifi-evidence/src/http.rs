//! HTTP client for a web3.storage-compatible upload service.
//!
//! Both upload kinds go to `POST {base_url}/upload` with a bearer token and
//! an `X-Name` header. The service content-addresses the body and answers
//! `{"cid": "<cid>"}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use verifi_core::{CanonicalBytes, ContentIdentifier};

use crate::config::{ConfigError, EvidenceConfig};
use crate::error::EvidenceError;
use crate::{EvidenceStore, METADATA_FILE_NAME};

/// Upload response body.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    cid: String,
}

/// Evidence store backed by an HTTP upload service.
#[derive(Debug, Clone)]
pub struct HttpEvidenceStore {
    http: reqwest::Client,
    base_url: url::Url,
}

impl HttpEvidenceStore {
    /// Create a store from configuration. Fails if no token is configured.
    pub fn new(config: &EvidenceConfig) -> Result<Self, EvidenceError> {
        let token = config.api_token.as_deref().ok_or(ConfigError::MissingToken)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = HeaderMap::new();
                let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|_| EvidenceError::Config(ConfigError::MissingToken))?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
                headers
            })
            .build()
            .map_err(|e| EvidenceError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url: config.upload_url.clone(),
        })
    }

    async fn upload(
        &self,
        name: &str,
        content_type: &'static str,
        body: Vec<u8>,
    ) -> Result<ContentIdentifier, EvidenceError> {
        let endpoint = "POST /upload";
        let url = format!("{}/upload", self.base_url.as_str().trim_end_matches('/'));

        let resp = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, content_type)
            .header("X-Name", name)
            .body(body)
            .send()
            .await
            .map_err(|e| EvidenceError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(EvidenceError::Api {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        let parsed: UploadResponse =
            resp.json().await.map_err(|e| EvidenceError::Deserialization {
                endpoint: endpoint.into(),
                source: e,
            })?;

        ContentIdentifier::new(parsed.cid).map_err(|e| EvidenceError::InvalidResponse {
            endpoint: endpoint.into(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl EvidenceStore for HttpEvidenceStore {
    async fn upload_bytes(
        &self,
        name: &str,
        content: &[u8],
    ) -> Result<ContentIdentifier, EvidenceError> {
        let cid = self
            .upload(name, "application/octet-stream", content.to_vec())
            .await?;
        tracing::debug!(cid = %cid, name, bytes = content.len(), "evidence uploaded");
        Ok(cid)
    }

    async fn upload_document(
        &self,
        document: &CanonicalBytes,
    ) -> Result<ContentIdentifier, EvidenceError> {
        let cid = self
            .upload(METADATA_FILE_NAME, "application/json", document.as_bytes().to_vec())
            .await?;
        tracing::debug!(cid = %cid, bytes = document.len(), "metadata document uploaded");
        Ok(cid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_token() {
        let config =
            EvidenceConfig::local("http://127.0.0.1:1", "http://127.0.0.1:2", None).unwrap();
        assert!(matches!(
            HttpEvidenceStore::new(&config),
            Err(EvidenceError::Config(ConfigError::MissingToken))
        ));
    }

    #[test]
    fn builds_with_token() {
        let config =
            EvidenceConfig::local("http://127.0.0.1:1", "http://127.0.0.1:2", Some("t")).unwrap();
        let store = HttpEvidenceStore::new(&config).unwrap();
        assert!(format!("{store:?}").contains("HttpEvidenceStore"));
    }

    #[test]
    fn rejects_token_with_invalid_header_chars() {
        let config =
            EvidenceConfig::local("http://127.0.0.1:1", "http://127.0.0.1:2", Some("bad\ntoken"))
                .unwrap();
        assert!(HttpEvidenceStore::new(&config).is_err());
    }
}
