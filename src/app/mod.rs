//! Core application logic for EAIS Fetcher
//!
//! This module contains the main application components: identifier
//! extraction, the HTTP client, inventory models, folder naming, the download
//! orchestrator, and batch processing across identifiers.
//!
//! # Examples
//!
//! ```rust,no_run
//! use eais_fetcher::app::{
//!     ArchiveClient, BatchRunner, ClientConfig, KeywordClassifier, Orchestrator,
//!     OrchestratorConfig, extract_identifiers,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ArchiveClient::new(&ClientConfig::default())?;
//! let orchestrator = Orchestrator::new(
//!     OrchestratorConfig::default(),
//!     &client,
//!     Box::new(KeywordClassifier::default()),
//! )?;
//!
//! let runner = BatchRunner::new(client, orchestrator);
//! let report = runner
//!     .process_all(&extract_identifiers("355857, 355858"))
//!     .await;
//! println!("{} inventories completed", report.completed());
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod client;
pub mod identifiers;
pub mod models;
pub mod naming;
pub mod orchestrator;

// Re-export main public API
pub use batch::{BatchEntry, BatchReport, BatchRunner, EntryStatus};
pub use client::{ArchiveClient, ClientConfig, DownloadOutcome, FileDownloader};
pub use identifiers::{extract_from_args, extract_identifiers, validate_identifier};
pub use models::{DownloadTask, InventoryRecord, Part};
pub use naming::{
    derive_folder_name, KeywordClassifier, NamingConfig, NoClassifier, RecordKind,
    TitleClassifier,
};
pub use orchestrator::{
    NoopObserver, Orchestrator, OrchestratorConfig, ProgressObserver, RunOutcome, RunStats,
    StagingArea,
};
