//! Formatted terminal output: tables for the CLI, tooltip text for the TUI.

use chrono::NaiveDate;

use crate::domain::{AveragedPoint, LatestSummary, Party};

/// Vote share with one decimal and a trailing percent sign.
pub fn format_share(value: f64) -> String {
    format!("{value:.1}%")
}

/// Signed one-decimal change; `None` renders as "new" (no prior point).
pub fn format_change(change: Option<f64>) -> String {
    match change {
        None => "new".to_string(),
        Some(c) if c >= 0.0 => format!("+{c:.1}"),
        Some(c) => format!("{c:.1}"),
    }
}

/// Tooltip title for a hovered data point.
pub fn tooltip_title(date: NaiveDate) -> String {
    date.format("%b %e, %Y").to_string()
}

/// Per-party tooltip lines in the fixed display order.
pub fn tooltip_lines(point: &AveragedPoint) -> Vec<(Party, String)> {
    Party::ALL
        .iter()
        .map(|&party| {
            let line = format!(
                "{:<13}{:>6}",
                party.display_name(),
                format_share(point.shares[party])
            );
            (party, line)
        })
        .collect()
}

/// Latest-average table: one row per party, share plus change.
pub fn format_latest_table(region: &str, latest: &LatestSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== Polling average — {region} ===\n"));
    out.push_str(&format!("{:<14}{:>8}{:>9}\n", "Party", "Share", "Change"));
    for party in Party::ALL {
        out.push_str(&format!(
            "{:<14}{:>8}{:>9}\n",
            party.display_name(),
            format_share(latest.values[party]),
            format_change(latest.changes[party]),
        ));
    }
    out
}

/// Tail of the averaged series, one row per date.
pub fn format_averages_table(region: &str, points: &[AveragedPoint], tail: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== Averaged series — {region} ===\n"));

    if points.is_empty() {
        out.push_str("(no data in the selected window)\n");
        return out;
    }

    out.push_str(&format!("{:<12}", "Date"));
    for party in Party::ALL {
        out.push_str(&format!("{:>7}", party.short_name()));
    }
    out.push('\n');

    let start = points.len().saturating_sub(tail);
    for point in &points[start..] {
        out.push_str(&format!("{:<12}", point.date.format("%Y-%m-%d")));
        for party in Party::ALL {
            out.push_str(&format!("{:>7.1}", point.shares[party]));
        }
        out.push('\n');
    }

    if start > 0 {
        out.push_str(&format!("({start} earlier rows not shown)\n"));
    }
    out
}

/// Region identifiers, one per line.
pub fn format_regions_list(regions: &[String]) -> String {
    let mut out = String::new();
    for region in regions {
        out.push_str(region);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PartyChanges, PartyShares};

    fn sample_point() -> AveragedPoint {
        let mut shares = PartyShares::default();
        shares[Party::Liberal] = 37.456;
        shares[Party::Conservative] = 40.0;
        AveragedPoint {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            shares,
        }
    }

    #[test]
    fn share_formats_to_one_decimal_with_percent() {
        assert_eq!(format_share(37.456), "37.5%");
        assert_eq!(format_share(0.0), "0.0%");
    }

    #[test]
    fn change_formats_signed_or_new() {
        assert_eq!(format_change(Some(0.42)), "+0.4");
        assert_eq!(format_change(Some(-1.25)), "-1.2");
        assert_eq!(format_change(None), "new");
    }

    #[test]
    fn tooltip_iterates_parties_in_display_order() {
        let lines = tooltip_lines(&sample_point());
        let parties: Vec<Party> = lines.iter().map(|(p, _)| *p).collect();
        assert_eq!(parties.as_slice(), Party::ALL.as_slice());
        assert!(lines[0].1.contains("Liberal"));
        assert!(lines[0].1.contains("37.5%"));
        assert!(lines[6].1.contains("0.0%"));
    }

    #[test]
    fn latest_table_lists_every_party() {
        let mut values = PartyShares::default();
        values[Party::Liberal] = 41.2;
        let mut changes = PartyChanges::default();
        changes[Party::Liberal] = Some(0.4);
        let table = format_latest_table("federal", &LatestSummary { values, changes });

        assert!(table.contains("federal"));
        assert!(table.contains("Liberal"));
        assert!(table.contains("41.2%"));
        assert!(table.contains("+0.4"));
        // Parties with no prior point render "new".
        assert!(table.contains("new"));
    }

    #[test]
    fn averages_table_truncates_to_tail() {
        let points: Vec<AveragedPoint> = (1..=5)
            .map(|d| AveragedPoint {
                date: NaiveDate::from_ymd_opt(2024, 1, d).unwrap(),
                shares: PartyShares::default(),
            })
            .collect();
        let table = format_averages_table("federal", &points, 2);
        assert!(table.contains("2024-01-04"));
        assert!(table.contains("2024-01-05"));
        assert!(!table.contains("2024-01-03"));
        assert!(table.contains("3 earlier rows not shown"));
    }

    #[test]
    fn empty_window_renders_placeholder_line() {
        let table = format_averages_table("federal", &[], 10);
        assert!(table.contains("no data in the selected window"));
    }
}
