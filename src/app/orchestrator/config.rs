//! Configuration structures for the download orchestrator
//!
//! This module defines the explicit configuration passed to the orchestrator
//! at construction: concurrency cap, retry policy, and where inventories are
//! materialized.

use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{files, limits, workers};
use crate::errors::{DownloadError, DownloadResult};

/// Configuration for the download orchestrator
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Maximum number of files downloaded at the same time
    pub max_concurrent_downloads: usize,
    /// Maximum attempts per file
    pub max_retry_count: u32,
    /// Fixed wait between failed attempts
    pub retry_delay: Duration,
    /// Directory final and staging folders are created in
    pub download_root: PathBuf,
    /// Suffix appended to the final folder name while staging
    pub staging_suffix: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_downloads: workers::DEFAULT_MAX_CONCURRENT_DOWNLOADS,
            max_retry_count: limits::MAX_RETRY_COUNT,
            retry_delay: limits::RETRY_DELAY,
            download_root: default_download_root(),
            staging_suffix: files::STAGING_DIR_SUFFIX.to_string(),
        }
    }
}

/// Default download root under the system temp directory
pub fn default_download_root() -> PathBuf {
    std::env::temp_dir().join(files::DEFAULT_ROOT_DIR_NAME)
}

impl OrchestratorConfig {
    /// Set the concurrency cap
    pub fn with_max_concurrent_downloads(mut self, count: usize) -> Self {
        self.max_concurrent_downloads = count;
        self
    }

    /// Set the per-file retry cap
    pub fn with_max_retry_count(mut self, retries: u32) -> Self {
        self.max_retry_count = retries;
        self
    }

    /// Set the wait between failed attempts
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the download root
    pub fn with_download_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.download_root = root.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> DownloadResult<()> {
        if self.max_concurrent_downloads == 0 {
            return Err(DownloadError::ConfigurationError(
                "Concurrent download count cannot be zero".to_string(),
            ));
        }

        if self.max_concurrent_downloads > workers::MAX_CONCURRENT_DOWNLOADS_LIMIT {
            return Err(DownloadError::ConfigurationError(format!(
                "Concurrent download count ({}) exceeds maximum ({})",
                self.max_concurrent_downloads,
                workers::MAX_CONCURRENT_DOWNLOADS_LIMIT
            )));
        }

        if self.max_retry_count == 0 {
            return Err(DownloadError::ConfigurationError(
                "Retry count must be at least 1".to_string(),
            ));
        }

        if self.staging_suffix.is_empty() {
            return Err(DownloadError::ConfigurationError(
                "Staging suffix cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = OrchestratorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_concurrent_downloads, 4);
        assert_eq!(config.max_retry_count, 10);
        assert_eq!(config.retry_delay, Duration::from_secs(5));
        assert_eq!(config.staging_suffix, "~tmp");
        assert!(config.download_root.ends_with("eais"));
    }

    #[test]
    fn test_config_builder_methods() {
        let config = OrchestratorConfig::default()
            .with_max_concurrent_downloads(8)
            .with_max_retry_count(3)
            .with_retry_delay(Duration::from_millis(10))
            .with_download_root("/data/archive");

        assert_eq!(config.max_concurrent_downloads, 8);
        assert_eq!(config.max_retry_count, 3);
        assert_eq!(config.retry_delay, Duration::from_millis(10));
        assert_eq!(config.download_root, PathBuf::from("/data/archive"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = OrchestratorConfig::default().with_max_concurrent_downloads(0);
        assert!(config.validate().is_err());

        config = OrchestratorConfig::default().with_max_concurrent_downloads(1000);
        assert!(config.validate().is_err());

        config = OrchestratorConfig::default().with_max_retry_count(0);
        assert!(config.validate().is_err());

        config = OrchestratorConfig {
            staging_suffix: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
