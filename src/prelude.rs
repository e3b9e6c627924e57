//! Prelude module for EAIS Fetcher Library
//!
//! This module re-exports the most commonly used items from the library,
//! providing a convenient way to import everything needed for typical usage
//! with a single `use eais_fetcher::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use eais_fetcher::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = ArchiveClient::new(&ClientConfig::default())?;
//!     let record = client.fetch_inventory("355857").await?;
//!
//!     let orchestrator = Orchestrator::new(
//!         OrchestratorConfig::default(),
//!         &client,
//!         NamingConfig::default().build_classifier(),
//!     )?;
//!     let outcome = orchestrator.run(&record).await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

// Essential app components that are used in most integrations
pub use crate::app::{
    // Client and data types
    ArchiveClient,
    ClientConfig,
    InventoryRecord,
    Part,

    // Orchestration
    BatchReport,
    BatchRunner,
    Orchestrator,
    OrchestratorConfig,
    ProgressObserver,
    RunOutcome,

    // Naming
    KeywordClassifier,
    NamingConfig,
    TitleClassifier,

    // Identifier parsing
    extract_identifiers,
};

// Configuration file support
pub use crate::config::AppConfig;

// Commonly used constants
pub use crate::constants::{DEFAULT_MAX_CONCURRENT_DOWNLOADS, MAX_RETRY_COUNT, USER_AGENT};

// Standard library re-exports that are commonly needed
pub use std::path::{Path, PathBuf};
pub use std::sync::Arc;

pub use tokio;
