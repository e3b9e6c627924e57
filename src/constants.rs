//! Application constants for EAIS Fetcher
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Environment variable names for configuration overrides
pub mod env {
    /// Overrides the download root directory
    pub const DOWNLOAD_DIR: &str = "EAIS_DOWNLOAD_DIR";

    /// Overrides the number of concurrent file downloads
    pub const MAX_CONCURRENT_DOWNLOADS: &str = "EAIS_MAX_CONCURRENT_DOWNLOADS";

    /// Overrides the per-file retry cap
    pub const MAX_RETRY_COUNT: &str = "EAIS_MAX_RETRY_COUNT";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = "EAIS-Fetcher/0.1.0 (Archival Inventory Downloader)";

    /// Default per-request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum idle connections kept per host
    pub const POOL_MAX_PER_HOST: usize = 8;
}

/// Retry configuration
pub mod limits {
    use super::Duration;

    /// Maximum download attempts per file
    pub const MAX_RETRY_COUNT: u32 = 10;

    /// Fixed wait between failed attempts
    pub const RETRY_DELAY: Duration = Duration::from_secs(5);
}

/// EAIS service URLs and endpoints
pub mod eais {
    /// Inventory metadata endpoint, the identifier is appended as a path segment
    pub const METADATA_BASE_URL: &str = "https://eais.archyvai.lt/repo-ext-api/inventories";

    /// IIIF image service base URL
    pub const IMAGE_BASE_URL: &str = "https://eais.archyvai.lt/iiif/2";

    /// Path and query appended after the encoded resource identifier
    pub const IMAGE_PATH_SUFFIX: &str = "full/max/0/default.jpg?download=true";
}

/// File operation constants
pub mod files {
    /// Extension of every downloaded part
    pub const IMAGE_EXTENSION: &str = "jpg";

    /// Temporary file suffix for atomic writes
    pub const TEMP_FILE_SUFFIX: &str = ".tmp";

    /// Suffix marking a folder as an in-progress staging area
    pub const STAGING_DIR_SUFFIX: &str = "~tmp";

    /// Sub-directory of the system temp dir used as the default download root
    pub const DEFAULT_ROOT_DIR_NAME: &str = "eais";
}

/// Worker and concurrency configuration
pub mod workers {
    /// Default number of files downloaded at the same time
    pub const DEFAULT_MAX_CONCURRENT_DOWNLOADS: usize = 4;

    /// Upper bound accepted for the concurrency cap
    pub const MAX_CONCURRENT_DOWNLOADS_LIMIT: usize = 32;
}

/// Folder and file naming rules
pub mod naming {
    /// Characters that are not allowed in folder or file names
    pub const FORBIDDEN_CHARS: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

    /// Replacement for forbidden characters
    pub const REPLACEMENT: char = '_';

    /// Default title keywords marking a birth (or baptism) register
    pub const BIRTH_KEYWORDS: &[&str] = &["gimim", "gimus", "krikšt", "krikst"];

    /// Default title keywords marking a death (or burial) register
    pub const DEATH_KEYWORDS: &[&str] = &["mirt", "mirus", "mirim", "palaid"];

    /// Default title keywords marking a marriage register
    pub const MARRIAGE_KEYWORDS: &[&str] = &["santuok", "sutuok", "jungtuv"];
}

/// Logging constants
pub mod logging {
    /// Log level used when no verbosity flag is given
    pub const DEFAULT_LOG_LEVEL: &str = "warn";
}

/// Configuration file locations
pub mod config_files {
    /// Project-local configuration file name
    pub const LOCAL_CONFIG_FILE: &str = "eais-fetcher.toml";

    /// Directory name under the user config dir
    pub const CONFIG_DIR_NAME: &str = "eais-fetcher";

    /// Configuration file name inside the user config dir
    pub const CONFIG_FILE_NAME: &str = "config.toml";
}

// Re-export commonly used constants for convenience
pub use eais::{IMAGE_BASE_URL, METADATA_BASE_URL};
pub use files::{STAGING_DIR_SUFFIX, TEMP_FILE_SUFFIX};
pub use http::{DEFAULT_TIMEOUT as HTTP_TIMEOUT, USER_AGENT};
pub use limits::{MAX_RETRY_COUNT, RETRY_DELAY};
pub use workers::DEFAULT_MAX_CONCURRENT_DOWNLOADS;
