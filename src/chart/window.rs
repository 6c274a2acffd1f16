//! Lookback-window ("zoom") filtering.
//!
//! A `ZoomLevel` plus an explicit `today` determine a calendar cutoff; the
//! series is filtered to dates at or after it. `today` is always injected by
//! the caller so tests can pin it; nothing here reads the wall clock.

use chrono::{Months, NaiveDate};

use crate::domain::{AveragedPoint, RawPoll, ZoomLevel};

/// Start-date cutoff for a zoom level relative to `today`.
///
/// `None` means no cutoff (the `All` level). Calendar-month arithmetic via
/// `chrono::Months` handles month-length and year rollover; when the target
/// day does not exist in the target month, the last valid day is used.
pub fn cutoff(level: ZoomLevel, today: NaiveDate) -> Option<NaiveDate> {
    let months = level.months_back()?;
    Some(
        today
            .checked_sub_months(Months::new(months))
            .unwrap_or(NaiveDate::MIN),
    )
}

/// Filter the averaged series to dates `>= cutoff`.
///
/// Pure in (series, level, today); the input series is never mutated.
pub fn window_points(
    points: &[AveragedPoint],
    level: ZoomLevel,
    today: NaiveDate,
) -> Vec<AveragedPoint> {
    match cutoff(level, today) {
        None => points.to_vec(),
        Some(cutoff) => points.iter().filter(|p| p.date >= cutoff).cloned().collect(),
    }
}

/// Filter raw polls with the same cutoff rule, for marker rendering and the
/// vertical-ceiling computation.
pub fn window_polls(polls: &[RawPoll], level: ZoomLevel, today: NaiveDate) -> Vec<RawPoll> {
    match cutoff(level, today) {
        None => polls.to_vec(),
        Some(cutoff) => polls.iter().filter(|p| p.date >= cutoff).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PartyShares;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn point(date: NaiveDate) -> AveragedPoint {
        AveragedPoint {
            date,
            shares: PartyShares::default(),
        }
    }

    #[test]
    fn three_months_before_march_15_is_december_15() {
        let today = date(2024, 3, 15);
        assert_eq!(
            cutoff(ZoomLevel::ThreeMonths, today),
            Some(date(2023, 12, 15))
        );
    }

    #[test]
    fn month_end_clamps_to_last_valid_day() {
        // One month before March 31 is February 29 in a leap year.
        assert_eq!(
            cutoff(ZoomLevel::OneMonth, date(2024, 3, 31)),
            Some(date(2024, 2, 29))
        );
    }

    #[test]
    fn all_level_has_no_cutoff() {
        assert_eq!(cutoff(ZoomLevel::All, date(2024, 3, 15)), None);
        let points = vec![point(date(1990, 1, 1)), point(date(2024, 1, 1))];
        assert_eq!(
            window_points(&points, ZoomLevel::All, date(2024, 3, 15)).len(),
            2
        );
    }

    #[test]
    fn cutoff_day_is_included_and_day_before_excluded_for_every_level() {
        let today = date(2024, 7, 20);
        for level in ZoomLevel::ALL {
            let Some(cut) = cutoff(level, today) else {
                continue;
            };
            let points = vec![point(cut.pred_opt().unwrap()), point(cut), point(today)];
            let kept = window_points(&points, level, today);
            assert_eq!(kept.len(), 2, "level {level:?}");
            assert_eq!(kept[0].date, cut, "level {level:?}");
        }
    }

    #[test]
    fn empty_series_filters_to_empty() {
        assert!(window_points(&[], ZoomLevel::OneYear, date(2024, 1, 1)).is_empty());
        assert!(window_polls(&[], ZoomLevel::OneYear, date(2024, 1, 1)).is_empty());
    }

    #[test]
    fn filtering_does_not_mutate_the_input() {
        let points = vec![point(date(2020, 1, 1)), point(date(2024, 7, 1))];
        let before = points.clone();
        let _ = window_points(&points, ZoomLevel::OneMonth, date(2024, 7, 20));
        assert_eq!(points, before);
    }
}
