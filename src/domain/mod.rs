//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the tracked party set (`Party`, `PartyShares`)
//! - poll records at each pipeline stage (`RawPoll`, `DailyPoll`, `AveragedPoint`)
//! - view state (`ZoomLevel`, `ChartExtent`, `ViewConfig`)
//! - the latest-average summary (`LatestSummary`)

pub mod types;

pub use types::*;
