//! Command-line argument parsing for EAIS Fetcher
//!
//! This module defines the CLI structure using clap derive macros: a download
//! command taking free-form inventory references, and configuration helpers.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

/// EAIS Fetcher - Download archival inventories from eais.archyvai.lt
#[derive(Parser, Debug)]
#[command(
    name = "eais_fetcher",
    version,
    about = "Download EAIS archival inventories as folders of page images",
    long_about = "Downloads every page image of one or more EAIS inventories.
Pages are fetched concurrently with retries; a folder only receives its final
name once every page is on disk, so an existing folder is always complete."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands (defaults to `download` with no inputs)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download one or more inventories
    Download(DownloadArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the download command
#[derive(Args, Debug, Clone, Default)]
pub struct DownloadArgs {
    /// Inventory numbers or URLs; every run of digits is an identifier.
    /// Prompts interactively when empty.
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<String>,

    /// Directory inventory folders are created in
    #[arg(short, long, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Number of files downloaded at the same time
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Attempts per file before giving up
    #[arg(short, long)]
    pub retries: Option<u32>,

    /// Wait between attempts (e.g. "5s", "500ms")
    #[arg(long, value_parser = humantime_serde::re::humantime::parse_duration)]
    pub retry_delay: Option<Duration>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for configuration management
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a commented default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    ///
    /// Without a verbosity flag the configured level is used, falling back to
    /// `WARN` when it cannot be parsed.
    pub fn log_level(&self, configured: &str) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            configured.parse().unwrap_or(tracing::Level::WARN)
        }
    }

    /// The command to run, treating a bare invocation as `download`
    pub fn command_or_default(self) -> (GlobalArgs, Commands) {
        let command = self
            .command
            .unwrap_or_else(|| Commands::Download(DownloadArgs::default()));
        (self.global, command)
    }
}

impl DownloadArgs {
    /// Reject values that can never work
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == Some(0) {
            return Err("Number of workers must be greater than 0".to_string());
        }

        if self.retries == Some(0) {
            return Err("Number of retries must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_download_args_parsing() {
        let cli = Cli::try_parse_from([
            "eais_fetcher",
            "download",
            "355857",
            "https://eais.archyvai.lt/inventories/12",
            "-w",
            "6",
            "--retries",
            "3",
            "--retry-delay",
            "250ms",
            "-d",
            "/tmp/out",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Download(args)) => {
                assert_eq!(args.inputs.len(), 2);
                assert_eq!(args.workers, Some(6));
                assert_eq!(args.retries, Some(3));
                assert_eq!(args.retry_delay, Some(Duration::from_millis(250)));
                assert_eq!(args.download_dir, Some(PathBuf::from("/tmp/out")));
                assert!(!args.no_progress);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_bare_invocation_defaults_to_download() {
        let cli = Cli::try_parse_from(["eais_fetcher", "-q"]).unwrap();
        let (global, command) = cli.command_or_default();

        assert!(global.quiet);
        assert!(matches!(command, Commands::Download(args) if args.inputs.is_empty()));
    }

    #[test]
    fn test_config_subcommand_parsing() {
        let cli = Cli::try_parse_from(["eais_fetcher", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config(ConfigArgs {
                action: ConfigAction::Init { force: true }
            }))
        ));
    }

    #[test]
    fn test_download_args_validation() {
        let mut args = DownloadArgs::default();
        assert!(args.validate().is_ok());

        args.workers = Some(0);
        assert!(args.validate().is_err());

        args.workers = Some(2);
        args.retries = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let quiet = Cli {
            global: GlobalArgs {
                quiet: true,
                ..Default::default()
            },
            command: None,
        };
        let verbose = Cli {
            global: GlobalArgs {
                verbose: true,
                ..Default::default()
            },
            command: None,
        };

        let plain = Cli {
            global: GlobalArgs::default(),
            command: None,
        };

        assert_eq!(quiet.log_level("debug"), tracing::Level::ERROR);
        assert_eq!(verbose.log_level("warn"), tracing::Level::INFO);
        assert_eq!(plain.log_level("debug"), tracing::Level::DEBUG);
        assert_eq!(plain.log_level("nonsense"), tracing::Level::WARN);
    }
}
