//! Command-line parsing for the polling-average viewer.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the averaging/charting code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::average::DEFAULT_ALPHA;
use crate::domain::{ViewConfig, ZoomLevel};
use crate::error::PollError;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "polls", version, about = "Election polling averages in the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive chart.
    ///
    /// This is the default: a bare `polls` (or `polls -r quebec`) behaves
    /// like `polls tui ...`.
    Tui(ViewArgs),
    /// Print the latest polling average and per-party changes.
    Latest(ViewArgs),
    /// Print the averaged series, optionally exporting it to JSON.
    Averages(AveragesArgs),
    /// List the regions the poll store serves.
    Regions(StoreArgs),
}

/// Common options for anything that displays one region's data.
#[derive(Debug, Parser, Clone)]
pub struct ViewArgs {
    /// Region to display (see `polls regions`).
    #[arg(short = 'r', long, default_value = "federal")]
    pub region: String,

    /// Poll store base URL (overrides POLLS_API_BASE).
    #[arg(long)]
    pub api_base: Option<String>,

    /// EWMA smoothing factor, in (0, 1).
    #[arg(long, default_value_t = DEFAULT_ALPHA)]
    pub alpha: f64,

    /// Lookback window.
    #[arg(short = 'z', long, value_enum, default_value_t = ZoomLevel::ThreeMonths)]
    pub zoom: ZoomLevel,
}

/// Options for the `averages` report.
#[derive(Debug, Parser, Clone)]
pub struct AveragesArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Fetch the store's precomputed averages instead of smoothing locally.
    #[arg(long)]
    pub precomputed: bool,

    /// Write the full normalized series to a JSON file.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Number of trailing rows to print.
    #[arg(long, default_value_t = 12)]
    pub tail: usize,
}

/// Options for commands that only need store access.
#[derive(Debug, Parser, Clone)]
pub struct StoreArgs {
    /// Poll store base URL (overrides POLLS_API_BASE).
    #[arg(long)]
    pub api_base: Option<String>,
}

/// Validate flags and build the pipeline configuration.
pub fn view_config(args: &ViewArgs) -> Result<ViewConfig, PollError> {
    if !(args.alpha > 0.0 && args.alpha < 1.0) {
        return Err(PollError::Config(format!(
            "--alpha must lie in (0, 1), got {}",
            args.alpha
        )));
    }
    Ok(ViewConfig {
        region: args.region.clone(),
        api_base: args.api_base.clone(),
        alpha: args.alpha,
        zoom: args.zoom,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults() {
        let cli = Cli::try_parse_from(["polls", "tui"]).unwrap();
        let Command::Tui(args) = cli.command else {
            panic!("expected tui subcommand");
        };
        assert_eq!(args.region, "federal");
        assert_eq!(args.zoom, ZoomLevel::ThreeMonths);
        assert_eq!(args.alpha, DEFAULT_ALPHA);
    }

    #[test]
    fn parses_zoom_levels_by_kebab_name() {
        let cli = Cli::try_parse_from(["polls", "tui", "--zoom", "one-month"]).unwrap();
        let Command::Tui(args) = cli.command else {
            panic!("expected tui subcommand");
        };
        assert_eq!(args.zoom, ZoomLevel::OneMonth);
    }

    #[test]
    fn view_config_rejects_out_of_range_alpha() {
        let mut args = match Cli::try_parse_from(["polls", "tui"]).unwrap().command {
            Command::Tui(args) => args,
            _ => unreachable!(),
        };
        args.alpha = 1.0;
        let err = view_config(&args).unwrap_err();
        assert!(matches!(err, PollError::Config(_)));
        assert_eq!(err.exit_code(), 2);
    }
}
