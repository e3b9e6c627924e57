//! Error types for EAIS Fetcher
//!
//! This module defines the error types for all components of the application.
//! Errors are designed to be actionable and provide clear context for debugging and
//! user feedback.

use std::path::PathBuf;
use thiserror::Error;

/// Download and HTTP client errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error during file operations
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Server returned error status
    #[error("Server error: HTTP {status}")]
    ServerError { status: u16 },

    /// Invalid URL provided
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// Atomic file operation failed
    #[error("Atomic file operation failed: could not rename {temp_path} to {final_path}: {source}")]
    AtomicOperationFailed {
        temp_path: PathBuf,
        final_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Maximum retries exceeded
    #[error("Maximum retry attempts ({max_retries}) exceeded for download")]
    MaxRetriesExceeded { max_retries: u32 },

    /// The final folder appeared while this run was staging
    #[error("Final folder already exists, refusing to promote staging folder: {path}")]
    FinalFolderConflict { path: PathBuf },

    /// Invalid runtime configuration
    #[error("Invalid download configuration: {0}")]
    ConfigurationError(String),
}

/// Inventory metadata retrieval and decoding errors
#[derive(Error, Debug)]
pub enum MetadataError {
    /// HTTP request failed
    #[error("Metadata request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Metadata endpoint returned a non-success status
    #[error("Metadata endpoint returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// Response body is not valid JSON
    #[error("Metadata JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Required field absent from the inventory record
    #[error("Inventory record is missing required field: {field}")]
    MissingField { field: String },

    /// Two parts resolve to the same output file
    #[error("Inventory record contains duplicate part name: {name}")]
    DuplicatePart { name: String },

    /// Identifier is not a decimal number
    #[error("Invalid inventory identifier: {input}")]
    InvalidIdentifier { input: String },
}

impl MetadataError {
    /// Shorthand for a missing field error
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    /// Configuration could not be rendered as TOML
    #[error("Configuration serialization failed: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// Configuration validation failed
    #[error("Configuration validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<String> },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Download error
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Metadata error
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error is recoverable (transient)
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Download(DownloadError::Http(_))
            | AppError::Download(DownloadError::ServerError { .. })
            | AppError::Metadata(MetadataError::Http(_)) => true,

            AppError::Metadata(MetadataError::Status { status, .. }) => *status >= 500,

            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Download(_) => "download",
            AppError::Metadata(_) => "metadata",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

/// Metadata result type alias
pub type MetadataResult<T> = std::result::Result<T, MetadataError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
