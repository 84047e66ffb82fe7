//! IPFS gateway document fetcher.
//!
//! Resolves `ipfs://<cid>[/path]` to `{gateway}/ipfs/<cid>[/path]` and
//! fetches `http(s)://` URIs as-is.

use std::time::Duration;

use async_trait::async_trait;
use verifi_core::ContentUri;

use crate::config::EvidenceConfig;
use crate::error::EvidenceError;
use crate::DocumentFetcher;

/// Fetches metadata documents over HTTP through an IPFS gateway.
#[derive(Debug, Clone)]
pub struct GatewayDocumentFetcher {
    http: reqwest::Client,
    gateway_url: url::Url,
}

impl GatewayDocumentFetcher {
    pub fn new(config: &EvidenceConfig) -> Result<Self, EvidenceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EvidenceError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;
        Ok(Self {
            http,
            gateway_url: config.gateway_url.clone(),
        })
    }

    /// The HTTP URL a content URI resolves to.
    pub fn resolve(&self, uri: &ContentUri) -> Result<String, EvidenceError> {
        if let Some(path) = uri.ipfs_path() {
            return Ok(format!(
                "{}/ipfs/{path}",
                self.gateway_url.as_str().trim_end_matches('/')
            ));
        }
        let raw = uri.as_str();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Ok(raw.to_string());
        }
        Err(EvidenceError::UnsupportedUri(raw.to_string()))
    }
}

#[async_trait]
impl DocumentFetcher for GatewayDocumentFetcher {
    async fn fetch(&self, uri: &ContentUri) -> Result<serde_json::Value, EvidenceError> {
        let url = self.resolve(uri)?;
        let endpoint = format!("GET {uri}");

        let resp = self.http.get(&url).send().await.map_err(|e| EvidenceError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(EvidenceError::NotFound(uri.to_string()));
        }

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(EvidenceError::Api {
                endpoint,
                status,
                body,
            });
        }

        resp.json().await.map_err(|e| EvidenceError::Deserialization {
            endpoint,
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verifi_core::ContentIdentifier;

    fn fetcher(gateway: &str) -> GatewayDocumentFetcher {
        let config = EvidenceConfig::local("http://127.0.0.1:1", gateway, None).unwrap();
        GatewayDocumentFetcher::new(&config).unwrap()
    }

    #[test]
    fn resolves_ipfs_through_gateway() {
        let f = fetcher("https://w3s.link");
        let uri = ContentUri::ipfs(&ContentIdentifier::new("bafyabc").unwrap());
        assert_eq!(f.resolve(&uri).unwrap(), "https://w3s.link/ipfs/bafyabc");
    }

    #[test]
    fn resolves_ipfs_path_suffix() {
        let f = fetcher("https://gateway.example/");
        let uri = ContentUri::parse("ipfs://bafyabc/metadata.json").unwrap();
        assert_eq!(
            f.resolve(&uri).unwrap(),
            "https://gateway.example/ipfs/bafyabc/metadata.json"
        );
    }

    #[test]
    fn passes_http_through() {
        let f = fetcher("https://w3s.link");
        let uri = ContentUri::parse("https://example.org/doc.json").unwrap();
        assert_eq!(f.resolve(&uri).unwrap(), "https://example.org/doc.json");
    }
}
