//! Crate-wide error taxonomy.
//!
//! Every failure mode the pipeline can surface is a variant here, so callers
//! can react per kind (the TUI turns `EmptyDataset` into a placeholder screen
//! while the CLI exits non-zero) and the binary can map errors to stable
//! process exit codes.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PollError {
    /// Bad flag or environment value.
    #[error("{0}")]
    Config(String),

    /// Transport failure or non-success HTTP status from the poll store.
    #[error("request to {url} failed: {detail}")]
    FetchFailure { url: String, detail: String },

    /// The response body did not have the expected shape.
    #[error("malformed payload from {endpoint}: {detail}")]
    MalformedPayload { endpoint: String, detail: String },

    /// Structurally valid response with zero usable rows.
    #[error("no polling data available for region '{region}'")]
    EmptyDataset { region: String },

    /// A date field failed to parse.
    ///
    /// On an individual poll record this is logged and the record skipped; it
    /// only aborts when the date is load-bearing (e.g. a CLI flag).
    #[error("invalid date '{value}': {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Failed to write an export file.
    #[error("failed to write '{}': {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Terminal setup or draw failure in the TUI.
    #[error("terminal error: {0}")]
    Terminal(String),
}

impl PollError {
    /// Process exit code for the binary.
    ///
    /// 2 = usage/configuration, 3 = data problems, 4 = network/terminal.
    pub fn exit_code(&self) -> u8 {
        match self {
            PollError::Config(_) | PollError::Export { .. } => 2,
            PollError::MalformedPayload { .. }
            | PollError::EmptyDataset { .. }
            | PollError::InvalidDate { .. } => 3,
            PollError::FetchFailure { .. } | PollError::Terminal(_) => 4,
        }
    }
}
