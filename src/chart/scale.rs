//! Continuous scales, extents, and axis ticks.
//!
//! Dates map to pixels through days-since-epoch, shares map through a plain
//! linear scale with an inverted range (larger share, smaller pixel row;
//! terminals draw top-down). The vertical ceiling is computed, not fixed:
//! the windowed maximum plus proportional headroom, rounded up to a multiple
//! of five and floored at a minimum, so a trend line never touches the top
//! edge and low-share windows don't waste vertical space.

use chrono::NaiveDate;

use crate::domain::{AveragedPoint, ChartExtent, RawPoll};

/// Proportional headroom above the windowed maximum.
const CEILING_HEADROOM: f64 = 1.05;
/// Ceilings round up to a multiple of this.
const CEILING_STEP: f64 = 5.0;
/// Smallest ceiling ever used.
const CEILING_FLOOR: f64 = 30.0;

/// The 50% vote-share "majority" threshold.
pub const MAJORITY_SHARE: f64 = 50.0;

/// Fractional days since the Common Era, the chart's continuous x unit.
pub fn date_days(date: NaiveDate) -> f64 {
    use chrono::Datelike;
    f64::from(date.num_days_from_ce())
}

fn days_date(days: f64) -> Option<NaiveDate> {
    let rounded = days.round();
    if !rounded.is_finite() {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(rounded as i32)
}

/// An affine map between a value domain and a pixel range.
///
/// Both ends are inclusive; the range may be descending (used for the
/// vertical axis). A degenerate domain maps every value to the range
/// midpoint and inverts to the domain start, so single-point windows never
/// divide by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: [f64; 2],
    range: [f64; 2],
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, value: f64) -> f64 {
        let span = self.domain[1] - self.domain[0];
        if span == 0.0 {
            return (self.range[0] + self.range[1]) / 2.0;
        }
        let t = (value - self.domain[0]) / span;
        self.range[0] + t * (self.range[1] - self.range[0])
    }

    pub fn invert(&self, pixel: f64) -> f64 {
        let span = self.range[1] - self.range[0];
        if span == 0.0 {
            return self.domain[0];
        }
        let t = (pixel - self.range[0]) / span;
        self.domain[0] + t * (self.domain[1] - self.domain[0])
    }
}

/// A date-to-pixel scale over days-since-epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    inner: LinearScale,
}

impl TimeScale {
    pub fn new(start: NaiveDate, end: NaiveDate, pixel_range: [f64; 2]) -> Self {
        Self {
            inner: LinearScale::new([date_days(start), date_days(end)], pixel_range),
        }
    }

    pub fn apply(&self, date: NaiveDate) -> f64 {
        self.inner.apply(date_days(date))
    }

    /// Invert a pixel to fractional days (no rounding); the locator compares
    /// distances in this unit so midpoints tie-break deterministically.
    pub fn invert_days(&self, pixel: f64) -> f64 {
        self.inner.invert(pixel)
    }

    /// Invert a pixel to the nearest calendar date.
    pub fn invert(&self, pixel: f64) -> Option<NaiveDate> {
        days_date(self.inner.invert(pixel))
    }

    /// `count` evenly spaced tick dates across the domain, first and last
    /// pinned to the domain ends.
    pub fn ticks(&self, count: usize) -> Vec<NaiveDate> {
        if count < 2 {
            return days_date(self.inner.domain[0]).into_iter().collect();
        }
        (0..count)
            .filter_map(|i| {
                let t = i as f64 / (count as f64 - 1.0);
                let days =
                    self.inner.domain[0] + t * (self.inner.domain[1] - self.inner.domain[0]);
                days_date(days)
            })
            .collect()
    }
}

/// Vertical ceiling for a windowed maximum share.
///
/// Headroom, then round up to a multiple of five, then floor.
pub fn share_ceiling(max_share: f64) -> f64 {
    let padded = max_share.max(0.0) * CEILING_HEADROOM;
    let stepped = (padded / CEILING_STEP).ceil() * CEILING_STEP;
    stepped.max(CEILING_FLOOR)
}

/// The majority reference line is drawn only when the ceiling reaches it.
pub fn shows_majority_line(ceiling: f64) -> bool {
    ceiling >= MAJORITY_SHARE
}

/// Tick values for the share axis: multiples of 5 up to mid-range ceilings,
/// multiples of 10 above, always including 0 and the ceiling itself when it
/// lands on a step.
pub fn share_ticks(ceiling: f64) -> Vec<f64> {
    let step = if ceiling > 50.0 { 10.0 } else { 5.0 };
    let mut ticks = Vec::new();
    let mut v = 0.0;
    while v <= ceiling + 1e-9 {
        ticks.push(v);
        v += step;
    }
    ticks
}

/// Date/value extent of the current window.
///
/// Returns `None` when the averaged window is empty; the renderer uses that
/// to suppress the draw rather than building a zero-width domain. Raw polls
/// widen the date extent and participate in the ceiling so markers stay
/// inside the plot.
pub fn window_extent(points: &[AveragedPoint], polls: &[RawPoll]) -> Option<ChartExtent> {
    let first = points.first()?;
    let last = points.last()?;

    let mut start = first.date;
    let mut end = last.date;
    let mut max_share = points
        .iter()
        .map(|p| p.shares.max_share())
        .fold(0.0, f64::max);

    for poll in polls {
        start = start.min(poll.date);
        end = end.max(poll.date);
        max_share = max_share.max(poll.shares.max_share());
    }

    Some(ChartExtent {
        start,
        end,
        ceiling: share_ceiling(max_share),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Party, PartyShares};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn linear_scale_round_trips() {
        let scale = LinearScale::new([0.0, 100.0], [0.0, 500.0]);
        assert_eq!(scale.apply(0.0), 0.0);
        assert_eq!(scale.apply(100.0), 500.0);
        assert_eq!(scale.apply(50.0), 250.0);
        assert_eq!(scale.invert(250.0), 50.0);
    }

    #[test]
    fn inverted_range_maps_larger_values_to_smaller_pixels() {
        // Top-down rendering: share 0 sits at the bottom row.
        let scale = LinearScale::new([0.0, 50.0], [40.0, 0.0]);
        assert_eq!(scale.apply(0.0), 40.0);
        assert_eq!(scale.apply(50.0), 0.0);
        assert!(scale.apply(40.0) < scale.apply(10.0));
    }

    #[test]
    fn degenerate_domain_does_not_divide_by_zero() {
        let scale = LinearScale::new([10.0, 10.0], [0.0, 100.0]);
        assert_eq!(scale.apply(10.0), 50.0);
        assert_eq!(scale.invert(50.0), 10.0);
    }

    #[test]
    fn time_scale_maps_and_inverts_dates() {
        let scale = TimeScale::new(date(2024, 1, 1), date(2024, 1, 11), [0.0, 100.0]);
        assert_eq!(scale.apply(date(2024, 1, 1)), 0.0);
        assert_eq!(scale.apply(date(2024, 1, 11)), 100.0);
        assert_eq!(scale.apply(date(2024, 1, 6)), 50.0);
        assert_eq!(scale.invert(50.0), Some(date(2024, 1, 6)));
    }

    #[test]
    fn time_ticks_pin_domain_ends() {
        let scale = TimeScale::new(date(2024, 1, 1), date(2024, 1, 31), [0.0, 100.0]);
        let ticks = scale.ticks(4);
        assert_eq!(ticks.first(), Some(&date(2024, 1, 1)));
        assert_eq!(ticks.last(), Some(&date(2024, 1, 31)));
        assert_eq!(ticks.len(), 4);
    }

    #[test]
    fn ceiling_applies_headroom_rounding_and_floor() {
        // 42 * 1.05 = 44.1 -> 45
        assert_eq!(share_ceiling(42.0), 45.0);
        // 40 * 1.05 = 42 -> 45
        assert_eq!(share_ceiling(40.0), 45.0);
        // Low windows floor at 30.
        assert_eq!(share_ceiling(10.0), 30.0);
        assert_eq!(share_ceiling(0.0), 30.0);
        // 48 * 1.05 = 50.4 -> 55
        assert_eq!(share_ceiling(48.0), 55.0);
    }

    #[test]
    fn majority_line_policy_follows_ceiling() {
        assert!(!shows_majority_line(45.0));
        assert!(shows_majority_line(50.0));
        assert!(shows_majority_line(55.0));
    }

    #[test]
    fn share_ticks_step_by_ceiling() {
        assert_eq!(share_ticks(30.0), vec![0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0]);
        assert_eq!(share_ticks(60.0), vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0]);
    }

    #[test]
    fn extent_covers_raw_and_smoothed_and_is_none_when_empty() {
        let mut shares = PartyShares::default();
        shares[Party::Liberal] = 38.0;
        let points = vec![AveragedPoint {
            date: date(2024, 2, 1),
            shares,
        }];

        let mut spiky = PartyShares::default();
        spiky[Party::Conservative] = 49.0;
        let polls = vec![RawPoll {
            date: date(2024, 2, 10),
            pollster: "Abacus".to_string(),
            sample_size: 800,
            shares: spiky,
        }];

        let extent = window_extent(&points, &polls).unwrap();
        assert_eq!(extent.start, date(2024, 2, 1));
        assert_eq!(extent.end, date(2024, 2, 10));
        // 49 * 1.05 = 51.45 -> 55; the raw spike drives the ceiling.
        assert_eq!(extent.ceiling, 55.0);
        assert!(shows_majority_line(extent.ceiling));

        assert!(window_extent(&[], &polls).is_none());
    }

    #[test]
    fn single_point_extent_is_degenerate_but_valid() {
        let points = vec![AveragedPoint {
            date: date(2024, 2, 1),
            shares: PartyShares::default(),
        }];
        let extent = window_extent(&points, &[]).unwrap();
        assert_eq!(extent.start, extent.end);
        assert_eq!(extent.ceiling, 30.0);

        // A scale built over the degenerate extent still answers queries.
        let scale = TimeScale::new(extent.start, extent.end, [0.0, 80.0]);
        assert_eq!(scale.apply(extent.start), 40.0);
        assert_eq!(scale.invert(40.0), Some(extent.start));
    }
}
