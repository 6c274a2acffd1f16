//! Nearest-point lookup for cursor tracking.
//!
//! Runs on every pointer-move event, so it binary-searches the (ascending,
//! unique-date) averaged window instead of scanning it. Distances are
//! compared in fractional days: the pointer pixel inverts to a continuous
//! x position, and the two points bracketing the insertion index compete on
//! absolute distance. On an exact tie the later point wins.

use crate::chart::scale::{TimeScale, date_days};
use crate::domain::AveragedPoint;

/// Index of the point nearest to a continuous day position.
///
/// `points` must be sorted ascending by date (the window filter preserves the
/// averaged series' order; debug builds assert it). Positions before the
/// first point or after the last clamp to that endpoint. Empty input yields
/// `None`.
pub fn nearest_index(points: &[AveragedPoint], x_days: f64) -> Option<usize> {
    if points.is_empty() {
        return None;
    }
    debug_assert!(
        points.windows(2).all(|w| w[0].date < w[1].date),
        "averaged window must be strictly ascending by date"
    );

    let idx = points.partition_point(|p| date_days(p.date) < x_days);
    if idx == 0 {
        return Some(0);
    }
    if idx == points.len() {
        return Some(points.len() - 1);
    }

    let before = (x_days - date_days(points[idx - 1].date)).abs();
    let after = (date_days(points[idx].date) - x_days).abs();
    // Later point wins on an exact tie.
    if before < after { Some(idx - 1) } else { Some(idx) }
}

/// Index of the point nearest to a horizontal pixel position.
pub fn nearest_at_pixel(points: &[AveragedPoint], scale: &TimeScale, pixel_x: f64) -> Option<usize> {
    nearest_index(points, scale.invert_days(pixel_x))
}
