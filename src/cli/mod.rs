//! Command-line interface components
//!
//! This module contains CLI-specific code for the EAIS Fetcher application,
//! including argument parsing, progress display, and user interaction.

pub mod args;
pub mod commands;
pub mod progress;
pub mod startup;

pub use args::{Cli, Commands, ConfigAction, ConfigArgs, DownloadArgs, GlobalArgs};
pub use commands::{handle_config, handle_download};
pub use progress::ProgressDisplay;
pub use startup::{interactive_input, show_run_settings};
