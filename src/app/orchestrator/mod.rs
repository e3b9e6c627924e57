//! Download orchestration for a single inventory
//!
//! The orchestrator turns one inventory record into a fully materialized folder
//! of images. Parts are downloaded concurrently into a staging folder; once
//! every task has been joined the staging folder is checked against the
//! filesystem and atomically renamed to its final name. A final folder is
//! never created for an incomplete inventory.
//!
//! # Architecture
//!
//! - [`config`] - Orchestrator configuration and validation
//! - [`staging`] - Staging/final folder pair and promotion
//! - [`progress`] - Shared counters and progress observers
//!
//! # Examples
//!
//! ```rust,no_run
//! use eais_fetcher::app::client::{ArchiveClient, ClientConfig};
//! use eais_fetcher::app::naming::KeywordClassifier;
//! use eais_fetcher::app::orchestrator::{Orchestrator, OrchestratorConfig, RunOutcome};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ArchiveClient::new(&ClientConfig::default())?;
//! let orchestrator = Orchestrator::new(
//!     OrchestratorConfig::default().with_max_concurrent_downloads(4),
//!     &client,
//!     Box::new(KeywordClassifier::default()),
//! )?;
//!
//! let record = client.fetch_inventory("355857").await?;
//! if let RunOutcome::Completed { folder, files, .. } = orchestrator.run(&record).await? {
//!     println!("{} files in {}", files, folder.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod progress;
pub mod staging;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::app::client::{ArchiveClient, DownloadOutcome, FileDownloader};
use crate::app::models::{DownloadTask, InventoryRecord, Part};
use crate::app::naming::{compose_folder_name, derive_folder_name, TitleClassifier};
use crate::errors::DownloadResult;

pub use config::{default_download_root, OrchestratorConfig};
pub use progress::{NoopObserver, ProgressCounter, ProgressObserver};
pub use staging::StagingArea;

/// Statistics for one orchestrator run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStats {
    /// Parts in the inventory
    pub total: usize,
    /// Files downloaded in this run
    pub downloaded: usize,
    /// Files that exhausted their retries
    pub failed: usize,
    /// Highest number of simultaneous downloads
    pub peak_in_flight: usize,
    /// Wall time from first spawn to verification
    pub duration: Duration,
}

/// Result of processing one inventory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every part is present in the final folder
    Completed {
        folder: PathBuf,
        files: usize,
        stats: RunStats,
    },
    /// The final folder existed before the run; nothing was downloaded
    AlreadyExists { folder: PathBuf },
    /// The inventory lists no parts; nothing was created
    NoParts,
    /// Some parts are missing; the staging folder is left for inspection
    PartialFailure {
        staging: PathBuf,
        missing: Vec<String>,
        stats: RunStats,
    },
}

impl RunOutcome {
    /// Whether this outcome counts as success for the caller
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::AlreadyExists { .. } | Self::NoParts
        )
    }

    /// Statistics, when any downloads were attempted
    pub fn stats(&self) -> Option<&RunStats> {
        match self {
            Self::Completed { stats, .. } | Self::PartialFailure { stats, .. } => Some(stats),
            _ => None,
        }
    }
}

/// Downloads all parts of an inventory with a bounded number of concurrent tasks
pub struct Orchestrator {
    config: OrchestratorConfig,
    client: ArchiveClient,
    downloader: FileDownloader,
    classifier: Box<dyn TitleClassifier>,
    observer: Arc<dyn ProgressObserver>,
}

impl Orchestrator {
    /// Create an orchestrator sharing the client's HTTP connection pool
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::ConfigurationError` if the configuration is invalid
    pub fn new(
        config: OrchestratorConfig,
        client: &ArchiveClient,
        classifier: Box<dyn TitleClassifier>,
    ) -> DownloadResult<Self> {
        config.validate()?;

        let downloader = FileDownloader::new(
            client.http().clone(),
            config.max_retry_count,
            config.retry_delay,
        );

        Ok(Self {
            config,
            client: client.clone(),
            downloader,
            classifier,
            observer: Arc::new(NoopObserver),
        })
    }

    /// Attach a progress observer
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Directory inventories are materialized in
    pub fn download_root(&self) -> &Path {
        &self.config.download_root
    }

    /// Final folder name for an inventory
    pub fn folder_name(
        &self,
        identifier: &str,
        title: &str,
        chron_from: Option<&str>,
        chron_to: Option<&str>,
    ) -> String {
        derive_folder_name(title, chron_from, chron_to, identifier, self.classifier.as_ref())
    }

    /// Final folder name for a fetched record, including its range notes
    pub fn record_folder_name(&self, record: &InventoryRecord) -> String {
        compose_folder_name(
            &record.identifier,
            &record.title,
            &record.chron_label(),
            self.classifier.as_ref(),
        )
    }

    /// Materialize a fetched inventory record
    pub async fn run(&self, record: &InventoryRecord) -> DownloadResult<RunOutcome> {
        let folder_name = self.record_folder_name(record);
        self.materialize(&record.identifier, &folder_name, &record.parts).await
    }

    /// Materialize an inventory from its parts
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if an image URL cannot be built, the staging
    /// folder cannot be created, or promotion fails. File download failures
    /// are reported as `RunOutcome::PartialFailure`, not as errors.
    pub async fn run_parts(
        &self,
        identifier: &str,
        title: &str,
        chron_from: Option<&str>,
        chron_to: Option<&str>,
        parts: &[Part],
    ) -> DownloadResult<RunOutcome> {
        let folder_name = self.folder_name(identifier, title, chron_from, chron_to);
        self.materialize(identifier, &folder_name, parts).await
    }

    async fn materialize(
        &self,
        identifier: &str,
        folder_name: &str,
        parts: &[Part],
    ) -> DownloadResult<RunOutcome> {
        let area = StagingArea::new(
            &self.config.download_root,
            folder_name,
            &self.config.staging_suffix,
        );

        if area.final_exists().await {
            info!(identifier, "Already downloaded: {}", area.final_dir().display());
            return Ok(RunOutcome::AlreadyExists {
                folder: area.final_dir().to_path_buf(),
            });
        }

        if parts.is_empty() {
            warn!(identifier, "Inventory has no parts, nothing to download");
            return Ok(RunOutcome::NoParts);
        }

        let tasks = parts
            .iter()
            .map(|part| {
                Ok(DownloadTask {
                    url: self.client.image_url(part)?,
                    staging_dir: area.staging_dir().to_path_buf(),
                    name: part.name.clone(),
                })
            })
            .collect::<DownloadResult<Vec<_>>>()?;

        area.create().await?;
        info!(
            identifier,
            "Downloading {} parts into {}",
            tasks.len(),
            area.staging_dir().display()
        );

        let started = Instant::now();
        let counter = self.download_all(identifier, tasks).await;

        let missing = area
            .missing_parts(parts.iter().map(|p| p.name.as_str()))
            .await;

        let stats = RunStats {
            total: parts.len(),
            downloaded: counter.completed(),
            failed: counter.failed(),
            peak_in_flight: counter.peak_in_flight(),
            duration: started.elapsed(),
        };

        if !missing.is_empty() {
            warn!(
                identifier,
                "{} of {} parts missing, leaving {}",
                missing.len(),
                parts.len(),
                area.staging_dir().display()
            );
            return Ok(RunOutcome::PartialFailure {
                staging: area.staging_dir().to_path_buf(),
                missing,
                stats,
            });
        }

        let folder = area.promote().await?;
        info!(
            identifier,
            "Completed {} files in {:.1}s",
            parts.len(),
            stats.duration.as_secs_f64()
        );

        Ok(RunOutcome::Completed {
            folder,
            files: parts.len(),
            stats,
        })
    }

    /// Spawn one task per file and wait for all of them
    async fn download_all(&self, identifier: &str, tasks: Vec<DownloadTask>) -> Arc<ProgressCounter> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_downloads));
        let counter = Arc::new(ProgressCounter::new());
        let mut set = JoinSet::new();

        self.observer.on_start(identifier, tasks.len());

        for task in tasks {
            let downloader = self.downloader.clone();
            let semaphore = Arc::clone(&semaphore);
            let counter = Arc::clone(&counter);
            let observer = Arc::clone(&self.observer);

            set.spawn(async move {
                // Acquisition only fails once the semaphore is closed
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return DownloadOutcome::Failed {
                            name: task.name,
                            attempts: 0,
                            last_error: e.to_string(),
                        }
                    }
                };

                counter.start();
                let outcome = downloader.download(&task).await;
                counter.finish();

                if outcome.is_success() {
                    let completed = counter.record_success();
                    observer.on_file_completed(outcome.name(), completed);
                } else {
                    counter.record_failure();
                    observer.on_file_failed(outcome.name());
                }
                outcome
            });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(outcome) => debug!(part = outcome.name(), "Task finished"),
                Err(e) => warn!("Download task did not complete: {}", e),
            }
        }

        self.observer.on_finish();
        counter
    }
}
