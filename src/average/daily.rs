//! Same-date poll collapse.
//!
//! Several pollsters can publish a poll with the same field date. The
//! smoothing recurrence advances once per *date*, so all polls sharing a date
//! are first collapsed into a single observation using a sample-size-weighted
//! mean. When no poll in the group reports a sample size, the group falls
//! back to a uniform mean. The alternative policy (feeding same-date polls
//! through the recurrence as successive observations) would over-weight busy
//! polling days and produce a different trend line.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{DailyPoll, Party, PartyShares, RawPoll};

/// Collapse raw polls into one observation per date, sorted ascending.
///
/// The input may arrive in any order. Pollster names are deduplicated in
/// first-seen order and joined by ", "; sample sizes are summed.
pub fn collapse_by_date(polls: &[RawPoll]) -> Vec<DailyPoll> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&RawPoll>> = BTreeMap::new();
    for poll in polls {
        by_date.entry(poll.date).or_default().push(poll);
    }

    by_date
        .into_iter()
        .map(|(date, group)| collapse_group(date, &group))
        .collect()
}

fn collapse_group(date: NaiveDate, group: &[&RawPoll]) -> DailyPoll {
    let total_sample: u64 = group.iter().map(|p| u64::from(p.sample_size)).sum();

    let weight_of = |poll: &RawPoll| -> f64 {
        if total_sample == 0 {
            1.0
        } else {
            poll.sample_size as f64
        }
    };
    let total_weight: f64 = group.iter().map(|p| weight_of(p)).sum();

    let mut shares = PartyShares::default();
    for party in Party::ALL {
        let weighted: f64 = group
            .iter()
            .map(|p| p.shares[party] * weight_of(p))
            .sum();
        shares[party] = weighted / total_weight;
    }

    let mut pollsters: Vec<&str> = Vec::new();
    for poll in group {
        if !pollsters.contains(&poll.pollster.as_str()) {
            pollsters.push(&poll.pollster);
        }
    }

    DailyPoll {
        date,
        pollster: pollsters.join(", "),
        sample_size: u32::try_from(total_sample).unwrap_or(u32::MAX),
        shares,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn poll(date: NaiveDate, pollster: &str, sample: u32, liberal: f64) -> RawPoll {
        let mut shares = PartyShares::default();
        shares[Party::Liberal] = liberal;
        RawPoll {
            date,
            pollster: pollster.to_string(),
            sample_size: sample,
            shares,
        }
    }

    #[test]
    fn empty_input_collapses_to_nothing() {
        assert!(collapse_by_date(&[]).is_empty());
    }

    #[test]
    fn single_poll_per_day_passes_through() {
        let polls = vec![poll(date(1), "Abacus", 1200, 40.0)];
        let collapsed = collapse_by_date(&polls);
        assert_eq!(collapsed.len(), 1);
        assert_eq!(collapsed[0].pollster, "Abacus");
        assert_eq!(collapsed[0].sample_size, 1200);
        assert_eq!(collapsed[0].shares[Party::Liberal], 40.0);
    }

    #[test]
    fn same_date_polls_are_weighted_by_sample_size() {
        let polls = vec![
            poll(date(5), "Abacus", 3000, 40.0),
            poll(date(5), "Leger", 1000, 20.0),
        ];
        let collapsed = collapse_by_date(&polls);
        assert_eq!(collapsed.len(), 1);
        // (40*3000 + 20*1000) / 4000 = 35
        assert!((collapsed[0].shares[Party::Liberal] - 35.0).abs() < 1e-12);
        assert_eq!(collapsed[0].sample_size, 4000);
        assert_eq!(collapsed[0].pollster, "Abacus, Leger");
    }

    #[test]
    fn all_unknown_sample_sizes_fall_back_to_uniform_weights() {
        let polls = vec![
            poll(date(5), "Abacus", 0, 40.0),
            poll(date(5), "Leger", 0, 20.0),
        ];
        let collapsed = collapse_by_date(&polls);
        assert!((collapsed[0].shares[Party::Liberal] - 30.0).abs() < 1e-12);
        assert_eq!(collapsed[0].sample_size, 0);
    }

    #[test]
    fn duplicate_pollster_names_are_not_repeated() {
        let polls = vec![
            poll(date(5), "Abacus", 500, 40.0),
            poll(date(5), "Abacus", 500, 42.0),
        ];
        let collapsed = collapse_by_date(&polls);
        assert_eq!(collapsed[0].pollster, "Abacus");
    }

    #[test]
    fn output_is_sorted_by_date() {
        let polls = vec![
            poll(date(20), "A", 100, 1.0),
            poll(date(3), "B", 100, 2.0),
            poll(date(11), "C", 100, 3.0),
        ];
        let dates: Vec<NaiveDate> = collapse_by_date(&polls).iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![date(3), date(11), date(20)]);
    }
}
