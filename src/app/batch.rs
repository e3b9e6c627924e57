//! Processing of several inventories in one invocation
//!
//! Identifiers are handled one after another. Each identifier is isolated: a
//! metadata error, a fatal orchestration error, or a partial download is
//! recorded in the report and the batch moves on to the next identifier.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::app::client::ArchiveClient;
use crate::app::identifiers::validate_identifier;
use crate::app::orchestrator::{Orchestrator, RunOutcome};
use crate::errors::Result;

/// What happened to one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    /// The orchestrator ran (or the folder already existed)
    Finished(RunOutcome),
    /// Processing stopped with an error
    Failed { category: String, message: String },
}

/// One line of the batch report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub identifier: String,
    pub status: EntryStatus,
}

impl BatchEntry {
    /// Whether this identifier ended in a good state
    pub fn is_success(&self) -> bool {
        match &self.status {
            EntryStatus::Finished(outcome) => outcome.is_success(),
            EntryStatus::Failed { .. } => false,
        }
    }
}

/// Outcome of a whole batch
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// When processing began
    pub started_at: DateTime<Utc>,
    /// Per-identifier results in input order
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    fn new() -> Self {
        Self {
            started_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    fn count(&self, predicate: impl Fn(&EntryStatus) -> bool) -> usize {
        self.entries.iter().filter(|e| predicate(&e.status)).count()
    }

    /// Identifiers downloaded and promoted in this batch
    pub fn completed(&self) -> usize {
        self.count(|s| matches!(s, EntryStatus::Finished(RunOutcome::Completed { .. })))
    }

    /// Identifiers skipped because their folder existed
    pub fn already_existing(&self) -> usize {
        self.count(|s| matches!(s, EntryStatus::Finished(RunOutcome::AlreadyExists { .. })))
    }

    /// Identifiers without any parts
    pub fn empty(&self) -> usize {
        self.count(|s| matches!(s, EntryStatus::Finished(RunOutcome::NoParts)))
    }

    /// Identifiers left in a staging folder
    pub fn partial(&self) -> usize {
        self.count(|s| matches!(s, EntryStatus::Finished(RunOutcome::PartialFailure { .. })))
    }

    /// Identifiers that stopped with an error
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, EntryStatus::Failed { .. }))
    }

    /// True when no identifier failed or ended partially
    pub fn all_succeeded(&self) -> bool {
        self.entries.iter().all(BatchEntry::is_success)
    }
}

/// Runs metadata lookup and orchestration for each identifier
pub struct BatchRunner {
    client: ArchiveClient,
    orchestrator: Orchestrator,
}

impl BatchRunner {
    pub fn new(client: ArchiveClient, orchestrator: Orchestrator) -> Self {
        Self {
            client,
            orchestrator,
        }
    }

    /// Process one identifier end to end
    ///
    /// An existing final folder whose name starts with `"{identifier}_"` is
    /// accepted without contacting the metadata endpoint.
    ///
    /// # Errors
    ///
    /// Returns `AppError` for invalid identifiers, metadata failures, and fatal
    /// orchestration errors
    pub async fn process_identifier(&self, identifier: &str) -> Result<RunOutcome> {
        validate_identifier(identifier)?;

        if let Some(folder) = self.find_existing(identifier).await? {
            info!(identifier, "Already downloaded: {}", folder.display());
            return Ok(RunOutcome::AlreadyExists { folder });
        }

        let record = self.client.fetch_inventory(identifier).await?;
        let outcome = self.orchestrator.run(&record).await?;
        Ok(outcome)
    }

    /// Process every identifier, isolating failures
    pub async fn process_all<S: AsRef<str>>(&self, identifiers: &[S]) -> BatchReport {
        let mut report = BatchReport::new();

        for identifier in identifiers {
            let identifier = identifier.as_ref();
            let status = match self.process_identifier(identifier).await {
                Ok(outcome) => {
                    if let RunOutcome::PartialFailure { missing, .. } = &outcome {
                        warn!(identifier, "Incomplete: {} parts missing", missing.len());
                    }
                    EntryStatus::Finished(outcome)
                }
                Err(e) => {
                    error!(identifier, category = e.category(), "Failed: {}", e);
                    EntryStatus::Failed {
                        category: e.category().to_string(),
                        message: e.to_string(),
                    }
                }
            };

            report.entries.push(BatchEntry {
                identifier: identifier.to_string(),
                status,
            });
        }

        info!(
            "Batch finished: {} completed, {} existing, {} empty, {} partial, {} failed",
            report.completed(),
            report.already_existing(),
            report.empty(),
            report.partial(),
            report.failed()
        );
        report
    }

    async fn find_existing(&self, identifier: &str) -> Result<Option<PathBuf>> {
        find_final_folder(
            self.orchestrator.download_root(),
            identifier,
            &self.orchestrator.config().staging_suffix,
        )
        .await
    }
}

/// Find a final (non-staging) folder for `identifier` under `root`
pub async fn find_final_folder(
    root: &Path,
    identifier: &str,
    staging_suffix: &str,
) -> Result<Option<PathBuf>> {
    if !tokio::fs::try_exists(root).await? {
        return Ok(None);
    }

    let prefix = format!("{}_", identifier);
    let mut entries = tokio::fs::read_dir(root).await?;

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.starts_with(&prefix) || name.ends_with(staging_suffix) {
            continue;
        }
        if entry.file_type().await?.is_dir() {
            debug!(identifier, "Found existing folder {}", name);
            return Ok(Some(entry.path()));
        }
    }

    Ok(None)
}
