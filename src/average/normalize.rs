//! Vote-share normalization.
//!
//! Rescales each averaged point's party values so they sum to 100. A point
//! whose pre-normalization total is zero is left unchanged; there is nothing
//! meaningful to scale, and dividing by zero would poison the series.

use crate::domain::{AveragedPoint, Party, PartyShares};

/// Normalize one record's shares to sum to 100; zero-total records pass
/// through unchanged.
pub fn normalize_shares(shares: &mut PartyShares) {
    let total = shares.total();
    if total == 0.0 {
        return;
    }
    let scale = 100.0 / total;
    for party in Party::ALL {
        shares[party] *= scale;
    }
}

/// Normalize every point of a series, each date independently.
pub fn normalize_series(points: &mut [AveragedPoint]) {
    for point in points {
        normalize_shares(&mut point.shares);
    }
}
