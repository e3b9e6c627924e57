//! Configuration management for EAIS Fetcher
//!
//! This module provides the TOML configuration file, its search locations,
//! environment variable overrides, and conversion into the runtime
//! configuration structs used by the client and the orchestrator.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::client::ClientConfig;
use crate::app::naming::NamingConfig;
use crate::app::orchestrator::{default_download_root, OrchestratorConfig};
use crate::constants::{config_files, eais, env, files, http, limits, logging, workers};
use crate::errors::{AppError, ConfigError, ConfigResult, Result};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP client and endpoint settings
    pub client: ClientConfigToml,
    /// Download orchestration settings
    pub download: DownloadConfigToml,
    /// Folder name classification
    pub naming: NamingConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfigToml {
    /// Inventory metadata endpoint
    pub metadata_base_url: String,
    /// IIIF image service base URL
    pub image_base_url: String,
    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Connect timeout
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Connection pool idle timeout (absent = no timeout)
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub pool_idle_timeout: Option<Duration>,
    /// Maximum idle connections per host
    pub pool_max_per_host: usize,
    /// User agent header
    pub user_agent: String,
}

impl Default for ClientConfigToml {
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

/// TOML-friendly download configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfigToml {
    /// Download root (absent = system temp directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,
    /// Files downloaded at the same time
    pub max_concurrent_downloads: usize,
    /// Attempts per file
    pub max_retry_count: u32,
    /// Wait between failed attempts
    #[serde(with = "humantime_serde")]
    pub retry_delay: Duration,
    /// Suffix marking an unfinished folder
    pub staging_suffix: String,
}

impl Default for DownloadConfigToml {
    fn default() -> Self {
        Self {
            download_dir: None,
            max_concurrent_downloads: workers::DEFAULT_MAX_CONCURRENT_DOWNLOADS,
            max_retry_count: limits::MAX_RETRY_COUNT,
            retry_delay: limits::RETRY_DELAY,
            staging_suffix: files::STAGING_DIR_SUFFIX.to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level for the application
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: logging::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ClientConfigToml {
    /// Convert to runtime ClientConfig
    pub fn to_runtime_config(&self) -> ClientConfig {
        ClientConfig {
            metadata_base_url: self.metadata_base_url.clone(),
            image_base_url: self.image_base_url.clone(),
            request_timeout: self.request_timeout,
            connect_timeout: self.connect_timeout,
            pool_idle_timeout: self.pool_idle_timeout,
            pool_max_per_host: self.pool_max_per_host,
            user_agent: self.user_agent.clone(),
        }
    }
}

impl DownloadConfigToml {
    /// Convert to runtime OrchestratorConfig
    pub fn to_runtime_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            max_concurrent_downloads: self.max_concurrent_downloads,
            max_retry_count: self.max_retry_count,
            retry_delay: self.retry_delay,
            download_root: self
                .download_dir
                .clone()
                .unwrap_or_else(default_download_root),
            staging_suffix: self.staging_suffix.clone(),
        }
    }
}

impl AppConfig {
    /// Load configuration with multi-source precedence:
    /// 1. Default values
    /// 2. Config file (if exists)
    /// 3. Environment variables
    ///
    /// CLI arguments are applied on top by the caller.
    pub async fn load(config_file_override: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::default();

        let config_path = match config_file_override {
            Some(ref path) => Some(path.clone()),
            None => Self::find_config_file(),
        };

        if let Some(path) = config_path {
            if path.exists() {
                config = Self::load_from_file(&path).await?;
            } else if config_file_override.is_some() {
                return Err(ConfigError::NotFound { path }.into());
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Apply `EAIS_*` overrides using `lookup` to read variables
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(env::DOWNLOAD_DIR).filter(|d| !d.trim().is_empty()) {
            debug!("{} overrides download directory", env::DOWNLOAD_DIR);
            self.download.download_dir = Some(PathBuf::from(dir));
        }

        if let Some(value) = lookup(env::MAX_CONCURRENT_DOWNLOADS) {
            self.download.max_concurrent_downloads =
                parse_env(env::MAX_CONCURRENT_DOWNLOADS, &value)?;
        }

        if let Some(value) = lookup(env::MAX_RETRY_COUNT) {
            self.download.max_retry_count = parse_env(env::MAX_RETRY_COUNT, &value)?;
        }

        Ok(())
    }

    /// Check value ranges across all sections
    pub fn validate(&self) -> ConfigResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = self.download.to_runtime_config().validate() {
            errors.push(e.to_string());
        }

        if self.client.request_timeout.is_zero() {
            errors.push("Request timeout cannot be zero".to_string());
        }

        if !matches!(
            self.logging.level.to_lowercase().as_str(),
            "error" | "warn" | "info" | "debug" | "trace"
        ) {
            errors.push(format!("Unknown log level '{}'", self.logging.level));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::ValidationFailed { errors })
        }
    }

    /// Render the effective configuration as TOML
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write a commented default configuration file
    ///
    /// Uses the per-user location when `path` is `None`. An existing file is
    /// only replaced when `force` is set.
    pub async fn write_default_config(path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
        let config_path = match path {
            Some(path) => path,
            None => Self::get_default_config_path()?,
        };

        if config_path.exists() && !force {
            return Err(AppError::generic(format!(
                "Config file already exists: {} (use --force to overwrite)",
                config_path.display()
            )));
        }

        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::generic(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        tokio::fs::write(&config_path, Self::generate_default_config_content())
            .await
            .map_err(|e| {
                AppError::generic(format!(
                    "Failed to write config file {}: {}",
                    config_path.display(),
                    e
                ))
            })?;

        info!("Wrote default configuration to {}", config_path.display());
        Ok(config_path)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(config_files::LOCAL_CONFIG_FILE)];
        if let Ok(user_path) = Self::get_default_config_path() {
            search_paths.push(user_path);
        }

        let found = search_paths.into_iter().find(|path| path.exists());
        match &found {
            Some(path) => debug!("Found config file: {}", path.display()),
            None => debug!("No config file found in standard locations"),
        }
        found
    }

    /// Get the default config file path for the current user
    pub fn get_default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AppError::generic("Could not determine user config directory"))?;

        Ok(config_dir
            .join(config_files::CONFIG_DIR_NAME)
            .join(config_files::CONFIG_FILE_NAME))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::generic(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: AppConfig = toml::from_str(&content).map_err(ConfigError::from)?;

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Generate default configuration content with helpful comments
    pub fn generate_default_config_content() -> String {
        format!(
            r#"# EAIS Fetcher Configuration
# Every setting is optional; removed keys fall back to the built-in defaults.

[client]
metadata_base_url = "{}"
image_base_url = "{}"
request_timeout = "{}s"
connect_timeout = "{}s"
pool_idle_timeout = "{}s"
pool_max_per_host = {}

[download]
# Where inventory folders are created (default: system temp directory + /eais)
# download_dir = "/path/to/archive"
max_concurrent_downloads = {}
max_retry_count = {}
retry_delay = "{}s"
staging_suffix = "{}"

[naming]
# Append " g", " m" or " s" to birth, death and marriage register folders
classify_titles = true
birth_keywords = {:?}
death_keywords = {:?}
marriage_keywords = {:?}

[logging]
level = "{}"  # error, warn, info, debug, trace
"#,
            eais::METADATA_BASE_URL,
            eais::IMAGE_BASE_URL,
            http::DEFAULT_TIMEOUT.as_secs(),
            http::CONNECT_TIMEOUT.as_secs(),
            http::POOL_IDLE_TIMEOUT.as_secs(),
            http::POOL_MAX_PER_HOST,
            workers::DEFAULT_MAX_CONCURRENT_DOWNLOADS,
            limits::MAX_RETRY_COUNT,
            limits::RETRY_DELAY.as_secs(),
            files::STAGING_DIR_SUFFIX,
            crate::constants::naming::BIRTH_KEYWORDS,
            crate::constants::naming::DEATH_KEYWORDS,
            crate::constants::naming::MARRIAGE_KEYWORDS,
            logging::DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            field: key.to_string(),
            value: value.to_string(),
            reason: "Expected a non-negative integer".to_string(),
        })
}
