//! Shared pipeline state used by both the CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch -> collapse/smooth/normalize -> window -> extent
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).
//! Recomputation is explicit: callers invoke these builders when an input
//! changes and memoize on `ChartData::version` plus the zoom level.

use chrono::NaiveDate;

use crate::average;
use crate::chart::{scale, window};
use crate::domain::{AveragedPoint, ChartExtent, RawPoll, ZoomLevel};
use crate::error::PollError;

/// One region's fetched polls plus the averaged series derived from them.
///
/// Immutable once built; a refetch produces a new value with a bumped
/// `version` so window views know their cache is stale.
#[derive(Debug, Clone)]
pub struct ChartData {
    pub region: String,
    pub raw: Vec<RawPoll>,
    pub averaged: Vec<AveragedPoint>,
    pub version: u64,
}

/// Run the averaging pipeline over freshly fetched polls.
pub fn build_chart_data(
    region: &str,
    raw: Vec<RawPoll>,
    alpha: f64,
    version: u64,
) -> Result<ChartData, PollError> {
    let averaged = average::average_polls(&raw, alpha)?;
    Ok(ChartData {
        region: region.to_string(),
        raw,
        averaged,
        version,
    })
}

/// The zoom-filtered slice of a dataset plus its derived extent.
///
/// `extent` is `None` exactly when the averaged window is empty; the
/// renderer uses that to suppress the draw.
#[derive(Debug, Clone)]
pub struct WindowView {
    pub points: Vec<AveragedPoint>,
    pub polls: Vec<RawPoll>,
    pub extent: Option<ChartExtent>,
}

/// Filter a dataset to the zoom window as of `today`.
pub fn build_window_view(data: &ChartData, zoom: ZoomLevel, today: NaiveDate) -> WindowView {
    let points = window::window_points(&data.averaged, zoom, today);
    let polls = window::window_polls(&data.raw, zoom, today);
    let extent = scale::window_extent(&points, &polls);
    WindowView {
        points,
        polls,
        extent,
    }
}
