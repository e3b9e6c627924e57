//! HTTP client configuration and building logic
//!
//! This module handles the configuration and construction of the shared HTTP
//! client used for both metadata requests and image downloads.

use std::time::Duration;

use reqwest::Client;

use crate::constants::{eais, http};
use crate::errors::{DownloadError, DownloadResult};

/// Configuration for the HTTP client and remote endpoints
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Inventory metadata endpoint (identifier is appended)
    pub metadata_base_url: String,
    /// IIIF image service base URL
    pub image_base_url: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Connection pool idle timeout
    pub pool_idle_timeout: Option<Duration>,
    /// Maximum idle connections per host
    pub pool_max_per_host: usize,
    /// User agent header
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            metadata_base_url: eais::METADATA_BASE_URL.to_string(),
            image_base_url: eais::IMAGE_BASE_URL.to_string(),
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
            pool_max_per_host: http::POOL_MAX_PER_HOST,
            user_agent: http::USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Point both endpoints at a single base (used against mock servers)
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.metadata_base_url = format!("{}/repo-ext-api/inventories", base);
        self.image_base_url = format!("{}/iiif/2", base);
        self
    }

    /// Builds the HTTP client with the specified configuration
    pub fn build_http_client(&self) -> DownloadResult<Client> {
        let mut client_builder = Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent.as_str())
            .pool_max_idle_per_host(self.pool_max_per_host);

        if let Some(idle_timeout) = self.pool_idle_timeout {
            client_builder = client_builder.pool_idle_timeout(idle_timeout);
        }

        client_builder.build().map_err(DownloadError::Http)
    }
}
