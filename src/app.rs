//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - fetches poll data from the store
//! - runs the averaging pipeline
//! - prints reports or launches the TUI
//! - writes optional exports

use chrono::Local;
use clap::Parser;

use crate::cli::{AveragesArgs, Command, StoreArgs, ViewArgs};
use crate::data::PollClient;
use crate::error::PollError;

pub mod pipeline;

/// Entry point for the `polls` binary.
pub fn run() -> Result<(), PollError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // We want `polls` and `polls -r quebec` to behave like `polls tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => crate::tui::run(crate::cli::view_config(&args)?),
        Command::Latest(args) => handle_latest(&args),
        Command::Averages(args) => handle_averages(&args),
        Command::Regions(args) => handle_regions(&args),
    }
}

fn handle_latest(args: &ViewArgs) -> Result<(), PollError> {
    let client = PollClient::from_env(args.api_base.as_deref());
    let latest = client.fetch_latest(&args.region)?;
    print!("{}", crate::report::format_latest_table(&args.region, &latest));
    Ok(())
}

fn handle_averages(args: &AveragesArgs) -> Result<(), PollError> {
    let config = crate::cli::view_config(&args.view)?;
    let client = PollClient::from_env(config.api_base.as_deref());

    let points = if args.precomputed {
        let mut points = client.fetch_averages(&config.region)?;
        // The store's series is already normalized; re-normalizing is a
        // no-op but keeps both smoothing variants on one code path.
        crate::average::normalize::normalize_series(&mut points);
        points
    } else {
        let raw = client.fetch_polls(&config.region)?;
        crate::average::average_polls(&raw, config.alpha)?
    };

    if let Some(path) = &args.export {
        crate::io::export::write_averages_json(path, &points)?;
    }

    let today = Local::now().date_naive();
    let windowed = crate::chart::window::window_points(&points, config.zoom, today);
    print!(
        "{}",
        crate::report::format_averages_table(&config.region, &windowed, args.tail)
    );
    Ok(())
}

fn handle_regions(args: &StoreArgs) -> Result<(), PollError> {
    let client = PollClient::from_env(args.api_base.as_deref());
    let regions = client.fetch_regions()?;
    print!("{}", crate::report::format_regions_list(&regions));
    Ok(())
}

/// Rewrite argv so `polls` defaults to `polls tui`.
///
/// Rules:
/// - `polls`                     -> `polls tui`
/// - `polls -r quebec ...`       -> `polls tui -r quebec ...`
/// - `polls --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "latest" | "averages" | "regions");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_becomes_tui() {
        assert_eq!(rewrite_args(argv(&["polls"])), argv(&["polls", "tui"]));
    }

    #[test]
    fn leading_flag_is_routed_to_tui() {
        assert_eq!(
            rewrite_args(argv(&["polls", "-r", "quebec"])),
            argv(&["polls", "tui", "-r", "quebec"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(argv(&["polls", "latest"])),
            argv(&["polls", "latest"])
        );
        assert_eq!(
            rewrite_args(argv(&["polls", "--help"])),
            argv(&["polls", "--help"])
        );
    }
}
