//! hmm2parquet - HMMER3 profile to Parquet converter
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use hmm2parquet::config::{CliArgs, ConvertConfig};
use hmm2parquet::pipeline::Converter;
use hmm2parquet::progress::{print_header, print_summary, ProgressReporter};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every input converted cleanly
fn run() -> Result<bool> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = ConvertConfig::from_args(args).context("Invalid configuration")?;

    if config.show_progress {
        print_header(&config.inputs, &config.output_dir, config.streaming);
    }

    let progress = if config.show_progress {
        ProgressReporter::new()
    } else {
        ProgressReporter::hidden()
    };
    progress.set_status("Parsing profiles...");

    let reporter = progress.clone();
    let dry_run = config.dry_run;
    let show_summary = config.show_progress;
    let converter = Converter::new(config)
        .with_progress(Box::new(move |name, done| reporter.update(name, done)));

    let summary = converter.run().context("Conversion failed")?;
    progress.finish_and_clear();

    if show_summary {
        print_summary(&summary, dry_run);
    }

    if summary.is_success() {
        info!(
            profiles = summary.profile_count(),
            rows = summary.total_rows(),
            "Conversion completed"
        );
    } else {
        info!(failed = summary.failed_count(), "Conversion completed with errors");
    }

    Ok(summary.is_success())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("hmm2parquet=debug,warn")
    } else {
        EnvFilter::new("hmm2parquet=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
