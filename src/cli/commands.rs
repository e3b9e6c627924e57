//! Command handlers for the CLI
//!
//! Each handler loads the configuration, applies command-line overrides, and
//! drives the library components. Results are printed as one status line per
//! inventory.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::app::batch::{BatchEntry, BatchReport, BatchRunner, EntryStatus};
use crate::app::client::ArchiveClient;
use crate::app::identifiers::extract_from_args;
use crate::app::orchestrator::{Orchestrator, RunOutcome};
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

use super::args::{ConfigAction, ConfigArgs, DownloadArgs, GlobalArgs};
use super::progress::ProgressDisplay;
use super::startup::{interactive_input, show_run_settings};

/// Handle the download command
pub async fn handle_download(global: &GlobalArgs, args: DownloadArgs) -> Result<()> {
    let start_time = Instant::now();

    args.validate().map_err(AppError::generic)?;

    let mut config = AppConfig::load(global.config.clone()).await?;
    apply_download_overrides(&mut config, &args);
    config.validate()?;

    let identifiers = if args.inputs.is_empty() {
        interactive_input()?
    } else {
        extract_from_args(&args.inputs)
    };
    if identifiers.is_empty() {
        return Err(AppError::generic(
            "No inventory number found in the given input",
        ));
    }
    debug!("Identifiers to process: {:?}", identifiers);

    let client = ArchiveClient::new(&config.client.to_runtime_config())?;
    let orchestrator_config = config.download.to_runtime_config();

    if !global.quiet {
        show_run_settings(
            &identifiers,
            &orchestrator_config.download_root,
            orchestrator_config.max_concurrent_downloads,
            orchestrator_config.max_retry_count,
        );
    }

    let display = Arc::new(ProgressDisplay::new(!args.no_progress && !global.quiet));
    let orchestrator =
        Orchestrator::new(orchestrator_config, &client, config.naming.build_classifier())?
            .with_observer(display);

    let runner = BatchRunner::new(client, orchestrator);
    let report = runner.process_all(&identifiers).await;

    print_report(&report, global.quiet);
    info!("Download command finished in {:?}", start_time.elapsed());

    if report.all_succeeded() {
        Ok(())
    } else {
        Err(AppError::generic(format!(
            "{} of {} inventories did not complete",
            report.partial() + report.failed(),
            report.entries.len()
        )))
    }
}

/// Handle the config command
pub async fn handle_config(global: &GlobalArgs, args: ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Init { force } => {
            let path = AppConfig::write_default_config(global.config.clone(), force).await?;
            println!("Created configuration file:");
            println!("   {}", path.display());
            println!("   You can customize settings by editing this file.");
            Ok(())
        }
        ConfigAction::Show => {
            let config = AppConfig::load(global.config.clone()).await?;
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

/// Apply command-line values on top of file and environment settings
pub fn apply_download_overrides(config: &mut AppConfig, args: &DownloadArgs) {
    if let Some(dir) = &args.download_dir {
        config.download.download_dir = Some(dir.clone());
    }
    if let Some(workers) = args.workers {
        config.download.max_concurrent_downloads = workers;
    }
    if let Some(retries) = args.retries {
        config.download.max_retry_count = retries;
    }
    if let Some(delay) = args.retry_delay {
        config.download.retry_delay = delay;
    }
}

/// One human-readable status line
pub fn format_entry(entry: &BatchEntry) -> String {
    let id = &entry.identifier;
    match &entry.status {
        EntryStatus::Finished(RunOutcome::Completed { folder, files, stats }) => format!(
            "{}: downloaded {} files to {} in {:.1}s",
            id,
            files,
            folder.display(),
            stats.duration.as_secs_f64()
        ),
        EntryStatus::Finished(RunOutcome::AlreadyExists { folder }) => {
            format!("{}: already downloaded ({})", id, folder.display())
        }
        EntryStatus::Finished(RunOutcome::NoParts) => {
            format!("{}: inventory has no pages, nothing to download", id)
        }
        EntryStatus::Finished(RunOutcome::PartialFailure { staging, missing, .. }) => format!(
            "{}: {} files could not be downloaded ({}); partial download kept in {}",
            id,
            missing.len(),
            missing.join(", "),
            staging.display()
        ),
        EntryStatus::Failed { message, .. } => format!("{}: failed: {}", id, message),
    }
}

fn print_report(report: &BatchReport, quiet: bool) {
    for entry in &report.entries {
        let line = format_entry(entry);
        if entry.is_success() {
            if !quiet {
                println!("{}", line);
            }
        } else {
            eprintln!("{}", line);
        }
    }

    if !quiet && report.entries.len() > 1 {
        println!();
        println!(
            "Summary: {} downloaded, {} already present, {} empty, {} incomplete, {} failed",
            report.completed(),
            report.already_existing(),
            report.empty(),
            report.partial(),
            report.failed()
        );
    }
}
