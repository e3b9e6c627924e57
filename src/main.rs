//! EAIS Fetcher CLI application
//!
//! Command-line interface for downloading archival inventories from the
//! EAIS repository as folders of page images.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use eais_fetcher::cli::{handle_config, handle_download, Cli, Commands};
use eais_fetcher::config::AppConfig;
use eais_fetcher::constants::logging::DEFAULT_LOG_LEVEL;
use eais_fetcher::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    // Config errors are reported by the command handlers
    let configured_level = AppConfig::load(cli.global.config.clone())
        .await
        .map(|config| config.logging.level)
        .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
    init_logging(&cli, &configured_level);

    info!("EAIS Fetcher v{} starting", env!("CARGO_PKG_VERSION"));

    let (global, command) = cli.command_or_default();
    match command {
        Commands::Download(args) => {
            info!("Executing download command");
            handle_download(&global, args).await
        }
        Commands::Config(args) => {
            info!("Executing config command");
            handle_config(&global, args).await
        }
    }
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli, configured_level: &str) {
    let log_level = cli.log_level(configured_level);

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("eais_fetcher={}", log_level).parse() {
        filter = filter.add_directive(directive);
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_level(cli.global.very_verbose) // Show levels only in very verbose mode
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
