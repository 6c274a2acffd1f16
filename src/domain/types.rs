//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while averaging and windowing
//! - exported to JSON
//! - reloaded later for plotting or comparisons

use std::ops::{Index, IndexMut};

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A tracked federal party.
///
/// The set is fixed and closed; a poll's residual support is folded into
/// `Other`. Variant order is the display order used by tables and tooltips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    Liberal,
    Conservative,
    Ndp,
    Bloc,
    Green,
    Ppc,
    Other,
}

impl Party {
    pub const ALL: [Party; 7] = [
        Party::Liberal,
        Party::Conservative,
        Party::Ndp,
        Party::Bloc,
        Party::Green,
        Party::Ppc,
        Party::Other,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Key used by the poll store's JSON payloads.
    pub fn key(self) -> &'static str {
        match self {
            Party::Liberal => "liberal",
            Party::Conservative => "conservative",
            Party::Ndp => "ndp",
            Party::Bloc => "bloc",
            Party::Green => "green",
            Party::Ppc => "ppc",
            Party::Other => "other",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Party::Liberal => "Liberal",
            Party::Conservative => "Conservative",
            Party::Ndp => "NDP",
            Party::Bloc => "Bloc",
            Party::Green => "Green",
            Party::Ppc => "PPC",
            Party::Other => "Other",
        }
    }

    /// Compact column header for tabular output.
    pub fn short_name(self) -> &'static str {
        match self {
            Party::Liberal => "LIB",
            Party::Conservative => "CON",
            Party::Ndp => "NDP",
            Party::Bloc => "BQ",
            Party::Green => "GRN",
            Party::Ppc => "PPC",
            Party::Other => "OTH",
        }
    }

    /// Chart color (RGB), shared by the Ratatui and Plotters layers.
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            Party::Liberal => (215, 25, 32),
            Party::Conservative => (26, 71, 130),
            Party::Ndp => (243, 112, 33),
            Party::Bloc => (51, 164, 255),
            Party::Green => (61, 155, 53),
            Party::Ppc => (68, 48, 130),
            Party::Other => (128, 128, 128),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One `f64` vote share (percent) per tracked party, indexable by `Party`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PartyShares([f64; Party::COUNT]);

impl PartyShares {
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Largest single share (0 for an all-zero record).
    pub fn max_share(&self) -> f64 {
        self.0.iter().copied().fold(0.0, f64::max)
    }

    /// `(party, share)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Party, f64)> + '_ {
        Party::ALL.iter().map(|&p| (p, self[p]))
    }

    /// Party with the largest share, ties broken by display order.
    pub fn leader(&self) -> Party {
        let mut best = Party::ALL[0];
        for party in Party::ALL {
            if self[party] > self[best] {
                best = party;
            }
        }
        best
    }
}

impl Index<Party> for PartyShares {
    type Output = f64;

    fn index(&self, party: Party) -> &f64 {
        &self.0[party.index()]
    }
}

impl IndexMut<Party> for PartyShares {
    fn index_mut(&mut self, party: Party) -> &mut f64 {
        &mut self.0[party.index()]
    }
}

/// One `Option<f64>` per party; `None` means "no prior point to diff against".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PartyChanges([Option<f64>; Party::COUNT]);

impl Index<Party> for PartyChanges {
    type Output = Option<f64>;

    fn index(&self, party: Party) -> &Option<f64> {
        &self.0[party.index()]
    }
}

impl IndexMut<Party> for PartyChanges {
    fn index_mut(&mut self, party: Party) -> &mut Option<f64> {
        &mut self.0[party.index()]
    }
}

/// One published poll as fetched from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPoll {
    /// Field date (day resolution; the store sends the field period's middle).
    pub date: NaiveDate,
    pub pollster: String,
    /// Reported sample size; 0 when the pollster did not publish one.
    pub sample_size: u32,
    pub shares: PartyShares,
}

/// The same-date collapse of one or more raw polls: one observation per date.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyPoll {
    pub date: NaiveDate,
    /// Unique pollster names for the date, joined by ", ".
    pub pollster: String,
    /// Combined sample size across the date's polls.
    pub sample_size: u32,
    pub shares: PartyShares,
}

/// One smoothed, normalized, date-keyed record.
///
/// A series of these is strictly ascending by date with no duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct AveragedPoint {
    pub date: NaiveDate,
    pub shares: PartyShares,
}

/// Selectable lookback window for the chart.
///
/// Session state only; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ZoomLevel {
    All,
    OneYear,
    SixMonths,
    ThreeMonths,
    OneMonth,
}

impl ZoomLevel {
    pub const ALL: [ZoomLevel; 5] = [
        ZoomLevel::All,
        ZoomLevel::OneYear,
        ZoomLevel::SixMonths,
        ZoomLevel::ThreeMonths,
        ZoomLevel::OneMonth,
    ];

    /// Human-readable label for headers and footers.
    pub fn display_name(self) -> &'static str {
        match self {
            ZoomLevel::All => "all",
            ZoomLevel::OneYear => "1y",
            ZoomLevel::SixMonths => "6m",
            ZoomLevel::ThreeMonths => "3m",
            ZoomLevel::OneMonth => "1m",
        }
    }

    /// Calendar months of lookback; `None` means no cutoff.
    pub fn months_back(self) -> Option<u32> {
        match self {
            ZoomLevel::All => None,
            ZoomLevel::OneYear => Some(12),
            ZoomLevel::SixMonths => Some(6),
            ZoomLevel::ThreeMonths => Some(3),
            ZoomLevel::OneMonth => Some(1),
        }
    }

    /// Next-narrower window, saturating at one month.
    pub fn zoom_in(self) -> ZoomLevel {
        match self {
            ZoomLevel::All => ZoomLevel::OneYear,
            ZoomLevel::OneYear => ZoomLevel::SixMonths,
            ZoomLevel::SixMonths => ZoomLevel::ThreeMonths,
            ZoomLevel::ThreeMonths => ZoomLevel::OneMonth,
            ZoomLevel::OneMonth => ZoomLevel::OneMonth,
        }
    }

    /// Next-wider window, saturating at the full history.
    pub fn zoom_out(self) -> ZoomLevel {
        match self {
            ZoomLevel::All => ZoomLevel::All,
            ZoomLevel::OneYear => ZoomLevel::All,
            ZoomLevel::SixMonths => ZoomLevel::OneYear,
            ZoomLevel::ThreeMonths => ZoomLevel::SixMonths,
            ZoomLevel::OneMonth => ZoomLevel::ThreeMonths,
        }
    }
}

/// Derived date/value extent of the currently windowed data.
///
/// Ephemeral: recomputed whenever the window or the viewport changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartExtent {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Computed vertical ceiling (percent), per the headroom/rounding policy.
    pub ceiling: f64,
}

/// Latest normalized values plus change vs the previous averaged point.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestSummary {
    pub values: PartyShares,
    pub changes: PartyChanges,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct ViewConfig {
    pub region: String,
    /// Base URL override for the poll store; `None` falls back to the
    /// `POLLS_API_BASE` environment variable.
    pub api_base: Option<String>,
    /// EWMA smoothing factor, validated to lie in (0, 1).
    pub alpha: f64,
    pub zoom: ZoomLevel,
}
