//! EAIS Fetcher Library
//!
//! A Rust library for downloading archival inventories from the Lithuanian
//! EAIS repository. Pages are fetched concurrently with retries, and an
//! inventory folder only appears under its final name once it is complete.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
