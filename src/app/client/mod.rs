//! HTTP client for the EAIS repository
//!
//! This module provides the shared HTTP plumbing for metadata lookups and
//! image downloads.
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `download`: single-file downloads with retry and atomic writes

use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::app::identifiers::validate_identifier;
use crate::app::models::{image_url, InventoryRecord, Part};
use crate::errors::{DownloadResult, MetadataError, MetadataResult};

// Module declarations
pub mod config;
pub mod download;

pub use config::ClientConfig;
pub use download::{part_file_path, part_temp_path, DownloadOutcome, FileDownloader};

/// Client for the inventory metadata API and the image service
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    http: Client,
    metadata_base: String,
    image_base: String,
}

impl ArchiveClient {
    /// Creates a new client from configuration
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::Http` if the HTTP client cannot be built
    pub fn new(config: &ClientConfig) -> DownloadResult<Self> {
        let http = config.build_http_client()?;
        Ok(Self::with_http_client(http, config))
    }

    /// Creates a client around an existing HTTP client
    pub fn with_http_client(http: Client, config: &ClientConfig) -> Self {
        Self {
            http,
            metadata_base: config.metadata_base_url.trim_end_matches('/').to_string(),
            image_base: config.image_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The shared HTTP client (cheap to clone)
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Image service base URL
    pub fn image_base(&self) -> &str {
        &self.image_base
    }

    /// Metadata URL for one inventory
    pub fn metadata_url(&self, identifier: &str) -> String {
        format!("{}/{}", self.metadata_base, identifier)
    }

    /// Fetch and decode the inventory record for `identifier`
    ///
    /// # Errors
    ///
    /// Returns `MetadataError` if the request fails, the endpoint answers with
    /// a non-success status, or the body is not a complete inventory record
    pub async fn fetch_inventory(&self, identifier: &str) -> MetadataResult<InventoryRecord> {
        validate_identifier(identifier)?;

        let url = self.metadata_url(identifier);
        debug!(identifier, "Fetching inventory metadata from {}", url);

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(MetadataError::Status {
                status: response.status().as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let record = InventoryRecord::from_json(identifier, &body)?;

        info!(
            identifier,
            parts = record.parts.len(),
            "Fetched inventory '{}'",
            record.title
        );
        Ok(record)
    }

    /// Download URL for one part
    pub fn image_url(&self, part: &Part) -> DownloadResult<Url> {
        image_url(&self.image_base, &part.resource_uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ArchiveClient {
        let config = ClientConfig::default().with_base_url(&server.uri());
        ArchiveClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_inventory_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repo-ext-api/inventories/355857"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "title": "Metrikų knyga",
                "chronRangeFrom": "1850",
                "artifact": { "content": { "parts": [
                    { "name": "001", "resource": { "uri": "r/1" } }
                ] } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let record = client_for(&server).fetch_inventory("355857").await.unwrap();
        assert_eq!(record.title, "Metrikų knyga");
        assert_eq!(record.parts.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_inventory_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repo-ext-api/inventories/1"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_inventory("1").await.unwrap_err();
        assert!(matches!(err, MetadataError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_inventory_rejects_non_numeric_identifier() {
        let server = MockServer::start().await;
        let err = client_for(&server)
            .fetch_inventory("../admin")
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_image_url_uses_configured_base() {
        let config = ClientConfig::default().with_base_url("http://localhost:1234");
        let client = ArchiveClient::new(&config).unwrap();
        let part = Part {
            name: "001".to_string(),
            resource_uri: "a/b".to_string(),
        };

        assert_eq!(
            client.image_url(&part).unwrap().as_str(),
            "http://localhost:1234/iiif/2/a%2Fb/full/max/0/default.jpg?download=true"
        );
        assert_eq!(
            client.metadata_url("7"),
            "http://localhost:1234/repo-ext-api/inventories/7"
        );
    }
}
