//! The polling-average pipeline: raw polls in, normalized trend out.
//!
//! Stages, in order:
//!
//! 1. sort by date and collapse same-date polls into one observation (`daily`)
//! 2. exponentially smooth each party's series (`ewma`)
//! 3. normalize each date's shares to sum to 100 (`normalize`)
//!
//! Normalization runs **after** smoothing; flipping the order would change the
//! recurrence's numerical behavior. All stages accept an empty input and
//! return an empty output.

use crate::domain::{AveragedPoint, LatestSummary, PartyChanges, PartyShares, Party, RawPoll};
use crate::error::PollError;

pub mod daily;
pub mod ewma;
pub mod normalize;

/// Default EWMA smoothing factor.
///
/// Larger values track new polls faster but are noisier; smaller values lag
/// more but are stabler.
pub const DEFAULT_ALPHA: f64 = 0.25;

/// Run the full averaging pipeline over a set of raw polls.
///
/// The input does not need to be sorted; sorting happens here, never in the
/// smoothing recurrence. Same-date polls are pre-averaged into a single
/// observation (sample-size weighted) before smoothing, so the output carries
/// strictly ascending, unique dates.
pub fn average_polls(polls: &[RawPoll], alpha: f64) -> Result<Vec<AveragedPoint>, PollError> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(PollError::Config(format!(
            "smoothing factor must lie in (0, 1), got {alpha}"
        )));
    }

    let collapsed = daily::collapse_by_date(polls);

    let mut points: Vec<AveragedPoint> = collapsed
        .iter()
        .map(|day| AveragedPoint {
            date: day.date,
            shares: PartyShares::default(),
        })
        .collect();

    // Seven independent scalar recurrences sharing one date axis.
    for party in Party::ALL {
        let series: Vec<f64> = collapsed.iter().map(|day| day.shares[party]).collect();
        let smoothed = ewma::smooth(&series, alpha);
        for (point, value) in points.iter_mut().zip(smoothed) {
            point.shares[party] = value;
        }
    }

    normalize::normalize_series(&mut points);
    Ok(points)
}

/// Latest normalized values plus the change against the previous point.
///
/// Returns `None` for an empty series; with a single point every change is
/// `None` (nothing to diff against).
pub fn latest_summary(points: &[AveragedPoint]) -> Option<LatestSummary> {
    let latest = points.last()?;
    let previous = points.len().checked_sub(2).map(|i| &points[i]);

    let mut changes = PartyChanges::default();
    if let Some(previous) = previous {
        for party in Party::ALL {
            changes[party] = Some(latest.shares[party] - previous.shares[party]);
        }
    }

    Some(LatestSummary {
        values: latest.shares,
        changes,
    })
}
