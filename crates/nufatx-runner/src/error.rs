//! Error types for the runner binary.
//!
//! [`RunnerError`] wraps every failure mode between opening the event
//! stream and printing the report, so `main` can propagate with `?`.

use nufatx_core::{ConfigError, FatxError};

/// Top-level error for the runner binary.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The command line could not be interpreted.
    #[error("usage: nufatx-runner <events.jsonl> [config.yaml] ({message})")]
    Usage {
        /// What was wrong with the arguments.
        message: String,
    },

    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// Strategy selection or run header migration failed.
    #[error("fatx error: {source}")]
    Fatx {
        /// The underlying accumulation error.
        #[from]
        source: FatxError,
    },

    /// An event could not be folded into the estimate. The run's cross
    /// section is not reported past this point.
    #[error("event {number}: {source}")]
    Event {
        /// Event number as recorded in the stream.
        number: u64,
        /// The underlying accumulation error.
        source: FatxError,
    },

    /// The event stream could not be read.
    #[error("failed to read event stream: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A stream line is not a valid run header or event.
    #[error("line {line}: {source}")]
    Parse {
        /// One-based line number in the stream.
        line: usize,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// The stream ended before its run header.
    #[error("event stream is empty; expected a run header on the first line")]
    EmptyStream,

    /// Serialization of the report failed.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
