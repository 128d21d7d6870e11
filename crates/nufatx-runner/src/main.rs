//! Command-line driver for flux-averaged total cross section accumulation.
//!
//! Reads a JSON-lines event stream, accumulates the estimate with the
//! strategy the run declares (or the configured override), and prints a
//! JSON report to stdout.
//!
//! ```text
//! nufatx-runner <events.jsonl> [config.yaml]
//! ```
//!
//! # Sequence
//!
//! 1. Load configuration (defaults when no file is given)
//! 2. Initialize structured logging (tracing)
//! 3. Read the run header, migrate it from older formats, and select the
//!    accumulator
//! 4. Process every event, logging progress periodically; the first event
//!    that cannot be accumulated aborts the run
//! 5. Check the per-target weight ledger against the total weight
//! 6. Log the accumulator state and print the report

mod error;
mod stream;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use nufatx_core::report::FatxReport;
use nufatx_core::{AccumulatorFactory, FatxConfig, reader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::error::RunnerError;
use crate::stream::EventStream;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the arguments, configuration or event stream are
/// invalid, or if no accumulation strategy applies to the run.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (events_path, config_path) = parse_args(std::env::args().skip(1))?;
    let config = load_config(config_path.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(
        events = %events_path.display(),
        cv_weight = config.accumulator.cv_weight_name,
        convention_override = ?config.accumulator.convention_override,
        "nufatx-runner starting"
    );

    let report = accumulate(&events_path, &config)?;
    let json = report.to_json_pretty().map_err(RunnerError::from)?;
    println!("{json}");
    Ok(())
}

/// Split the command line into the event stream path and optional config.
fn parse_args<I>(mut args: I) -> Result<(PathBuf, Option<PathBuf>), RunnerError>
where
    I: Iterator<Item = String>,
{
    let events = args.next().ok_or_else(|| RunnerError::Usage {
        message: "missing event stream path".to_owned(),
    })?;
    let config = args.next().map(PathBuf::from);
    if let Some(extra) = args.next() {
        return Err(RunnerError::Usage {
            message: format!("unexpected argument `{extra}`"),
        });
    }
    Ok((PathBuf::from(events), config))
}

/// Load the configuration file, or defaults with environment overrides.
fn load_config(path: Option<&Path>) -> Result<FatxConfig, RunnerError> {
    let config = match path {
        Some(path) => FatxConfig::from_file(path)?,
        None => FatxConfig::parse("")?,
    };
    Ok(config)
}

/// Run the event file through an accumulator and build the report.
fn accumulate(path: &Path, config: &FatxConfig) -> Result<FatxReport, RunnerError> {
    let file = File::open(path)?;
    accumulate_stream(BufReader::new(file), config)
}

/// Run a JSON-lines stream through an accumulator and build the report.
fn accumulate_stream<R: BufRead>(
    input: R,
    config: &FatxConfig,
) -> Result<FatxReport, RunnerError> {
    let (mut run, events) = EventStream::open(input)?;
    if reader::migrate_run(&mut run)? {
        info!(to = %reader::CURRENT_FORMAT, "run header written with an older format; migrated");
    }
    let mut acc = AccumulatorFactory::from_config(&run, &config.accumulator)?;

    let mut processed: u64 = 0;
    for event in events {
        let event = event?;
        acc.process(&run, &event)
            .map_err(|source| RunnerError::Event {
                number: event.number,
                source,
            })?;
        processed = processed.saturating_add(1);
        if processed.checked_rem(config.logging.progress_interval) == Some(0) {
            info!(
                processed,
                sum_weights = acc.sumweights(),
                "accumulation progress"
            );
        }
    }

    // An imbalance is logged by the ledger itself.
    if acc
        .verify_balance(config.accumulator.balance_tolerance)
        .is_balanced()
    {
        debug!("target weight ledger balanced");
    }

    info!(processed, "event stream finished");
    info!("accumulator state:\n{acc}");

    Ok(FatxReport::from_accumulator(
        &acc,
        &config.output.unit_systems(),
    ))
}
