//! Single-file download with retry and atomic writes
//!
//! Each part is fetched with a bounded number of attempts separated by a fixed
//! delay. The body is written to `<name>.jpg.tmp` and renamed to `<name>.jpg`
//! only once fully flushed, so a file under its final name is always complete.
//! Exhausting the retries is reported as a value, never as an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, warn};
use url::Url;

use crate::app::models::DownloadTask;
use crate::constants::files;
use crate::errors::{DownloadError, DownloadResult};

/// Result of one file download
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// File is present under its final name
    Downloaded {
        name: String,
        path: PathBuf,
        attempts: u32,
    },
    /// Every attempt failed
    Failed {
        name: String,
        attempts: u32,
        last_error: String,
    },
}

impl DownloadOutcome {
    /// Logical name of the part this outcome belongs to
    pub fn name(&self) -> &str {
        match self {
            Self::Downloaded { name, .. } | Self::Failed { name, .. } => name,
        }
    }

    /// Whether the file was written
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Downloaded { .. })
    }

    /// Number of attempts made
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Downloaded { attempts, .. } | Self::Failed { attempts, .. } => *attempts,
        }
    }
}

/// Final on-disk path of a part inside a folder
pub fn part_file_path(folder: &Path, name: &str) -> PathBuf {
    folder.join(format!("{}.{}", name, files::IMAGE_EXTENSION))
}

/// Temporary path a part is written to before the rename
pub fn part_temp_path(folder: &Path, name: &str) -> PathBuf {
    folder.join(format!(
        "{}.{}{}",
        name,
        files::IMAGE_EXTENSION,
        files::TEMP_FILE_SUFFIX
    ))
}

/// Downloads individual parts with retry and atomic rename
#[derive(Debug, Clone)]
pub struct FileDownloader {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl FileDownloader {
    /// Create a downloader sharing the given HTTP client
    ///
    /// A `max_retries` of zero is treated as a single attempt.
    pub fn new(client: Client, max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            client,
            max_retries: max_retries.max(1),
            retry_delay,
        }
    }

    /// Maximum number of attempts per file
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Download one task into its staging folder
    ///
    /// Stale temporary files left by an earlier crashed run are truncated and
    /// overwritten.
    pub async fn download(&self, task: &DownloadTask) -> DownloadOutcome {
        let final_path = part_file_path(&task.staging_dir, &task.name);
        let temp_path = part_temp_path(&task.staging_dir, &task.name);

        let mut last_error = String::new();
        for attempt in 1..=self.max_retries {
            match self.attempt(&task.url, &temp_path, &final_path).await {
                Ok(()) => {
                    debug!(part = %task.name, attempt, "Downloaded {}", final_path.display());
                    return DownloadOutcome::Downloaded {
                        name: task.name.clone(),
                        path: final_path,
                        attempts: attempt,
                    };
                }
                Err(e) => {
                    warn!(
                        part = %task.name,
                        "Download failed (attempt {}/{}): {}",
                        attempt,
                        self.max_retries,
                        e
                    );
                    last_error = e.to_string();
                    if attempt < self.max_retries {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        // Leave nothing half-written behind
        if tokio::fs::try_exists(&temp_path).await.unwrap_or(false) {
            let _ = tokio::fs::remove_file(&temp_path).await;
        }
        error!(
            part = %task.name,
            "{}",
            DownloadError::MaxRetriesExceeded {
                max_retries: self.max_retries
            }
        );

        DownloadOutcome::Failed {
            name: task.name.clone(),
            attempts: self.max_retries,
            last_error,
        }
    }

    /// One GET, write to the temp path, rename into place
    async fn attempt(&self, url: &Url, temp_path: &Path, final_path: &Path) -> DownloadResult<()> {
        let response = self.client.get(url.as_str()).send().await?;

        if !response.status().is_success() {
            return Err(DownloadError::ServerError {
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().await?;

        let mut file = File::create(temp_path).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(temp_path, final_path)
            .await
            .map_err(|source| DownloadError::AtomicOperationFailed {
                temp_path: temp_path.to_path_buf(),
                final_path: final_path.to_path_buf(),
                source,
            })
    }
}
