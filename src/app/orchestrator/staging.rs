//! Staging and promotion of inventory folders
//!
//! Parts are downloaded into `<final name><suffix>` and the whole directory is
//! renamed to the final name only after every expected file has been verified
//! on disk. A final folder therefore always holds a complete inventory.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::app::client::part_file_path;
use crate::errors::{DownloadError, DownloadResult};

/// Paths of one inventory's staging and final folders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingArea {
    final_dir: PathBuf,
    staging_dir: PathBuf,
}

impl StagingArea {
    /// Describe the folders for `folder_name` under `root`
    pub fn new(root: &Path, folder_name: &str, staging_suffix: &str) -> Self {
        Self {
            final_dir: root.join(folder_name),
            staging_dir: root.join(format!("{}{}", folder_name, staging_suffix)),
        }
    }

    /// Final folder path
    pub fn final_dir(&self) -> &Path {
        &self.final_dir
    }

    /// Staging folder path
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Whether the final folder already exists
    pub async fn final_exists(&self) -> bool {
        tokio::fs::try_exists(&self.final_dir).await.unwrap_or(false)
    }

    /// Whether a staging folder exists
    pub async fn staging_exists(&self) -> bool {
        tokio::fs::try_exists(&self.staging_dir).await.unwrap_or(false)
    }

    /// Create the staging folder; succeeds if it is left over from an earlier run
    pub async fn create(&self) -> DownloadResult<()> {
        tokio::fs::create_dir_all(&self.staging_dir).await?;
        debug!("Staging folder ready: {}", self.staging_dir.display());
        Ok(())
    }

    /// Final path of a part inside the staging folder
    pub fn part_path(&self, name: &str) -> PathBuf {
        part_file_path(&self.staging_dir, name)
    }

    /// Names whose files are not present in the staging folder
    ///
    /// Re-stats every expected file rather than trusting task results.
    pub async fn missing_parts<'a, I>(&self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut missing = Vec::new();
        for name in names {
            let present = tokio::fs::metadata(self.part_path(name))
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);
            if !present {
                missing.push(name.to_string());
            }
        }
        missing
    }

    /// Rename the staging folder to the final name
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::FinalFolderConflict` if the final folder exists
    /// (another run finished first); the staging folder is left untouched.
    pub async fn promote(&self) -> DownloadResult<PathBuf> {
        if self.final_exists().await {
            return Err(DownloadError::FinalFolderConflict {
                path: self.final_dir.clone(),
            });
        }

        tokio::fs::rename(&self.staging_dir, &self.final_dir)
            .await
            .map_err(|source| DownloadError::AtomicOperationFailed {
                temp_path: self.staging_dir.clone(),
                final_path: self.final_dir.clone(),
                source,
            })?;

        info!("Promoted {}", self.final_dir.display());
        Ok(self.final_dir.clone())
    }
}
