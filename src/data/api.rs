//! HTTP client for the poll record store.
//!
//! The store is an external collaborator that serves raw poll rows (plus a
//! few precomputed views) over four read-only endpoints. This module owns
//! the wire format: optional fields, string dates, camelCase keys. Anything
//! that reaches the rest of the crate is a fully-typed domain value.
//!
//! A record with an unparseable date is skipped with a warning rather than
//! aborting the series; one bad row must not blank the whole chart.

use std::collections::HashMap;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::domain::{AveragedPoint, LatestSummary, Party, PartyChanges, PartyShares, RawPoll};
use crate::error::PollError;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone)]
pub struct PollClient {
    client: Client,
    base_url: String,
}

impl PollClient {
    /// Build a client from an explicit base URL override, the
    /// `POLLS_API_BASE` environment variable (`.env` supported), or the
    /// default local address, in that order.
    pub fn from_env(base_override: Option<&str>) -> Self {
        dotenvy::dotenv().ok();
        let base_url = base_override
            .map(str::to_string)
            .or_else(|| std::env::var("POLLS_API_BASE").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `GET /api/regions` — the region identifiers the store serves.
    pub fn fetch_regions(&self) -> Result<Vec<String>, PollError> {
        self.get_json("/api/regions")
    }

    /// `GET /api/polls/{region}` — raw poll rows, invalid-date rows skipped.
    pub fn fetch_polls(&self, region: &str) -> Result<Vec<RawPoll>, PollError> {
        let path = format!("/api/polls/{region}");
        let rows: Vec<WirePoll> = self.get_json(&path)?;
        let polls = polls_from_wire(rows);
        if polls.is_empty() {
            return Err(PollError::EmptyDataset {
                region: region.to_string(),
            });
        }
        Ok(polls)
    }

    /// `GET /api/averages/{region}` — the store's precomputed averaged
    /// series, re-sorted defensively so downstream invariants hold.
    pub fn fetch_averages(&self, region: &str) -> Result<Vec<AveragedPoint>, PollError> {
        let path = format!("/api/averages/{region}");
        let rows: Vec<WireAverage> = self.get_json(&path)?;
        let mut points = averages_from_wire(rows);
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        if points.is_empty() {
            return Err(PollError::EmptyDataset {
                region: region.to_string(),
            });
        }
        Ok(points)
    }

    /// `GET /api/latest/{region}` — latest values plus per-party changes
    /// (`null` change means no prior point to diff against).
    pub fn fetch_latest(&self, region: &str) -> Result<LatestSummary, PollError> {
        let path = format!("/api/latest/{region}");
        let wire: WireLatest = self.get_json(&path)?;
        if wire.latest_values.is_empty() {
            return Err(PollError::EmptyDataset {
                region: region.to_string(),
            });
        }
        Ok(latest_from_wire(wire))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, PollError> {
        let url = format!("{}{path}", self.base_url);
        let resp = self
            .client
            .get(url.as_str())
            .send()
            .map_err(|e| PollError::FetchFailure {
                url: url.clone(),
                detail: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PollError::FetchFailure {
                url,
                detail: format!("status {status}"),
            });
        }

        let body = resp.text().map_err(|e| PollError::FetchFailure {
            url,
            detail: e.to_string(),
        })?;
        serde_json::from_str(&body).map_err(|e| PollError::MalformedPayload {
            endpoint: path.to_string(),
            detail: e.to_string(),
        })
    }
}

/// One poll row as the store serializes it.
///
/// Party fields are optional (regional stores omit parties that don't run
/// there); missing values count as zero support.
#[derive(Debug, Deserialize)]
struct WirePoll {
    date: String,
    pollster: String,
    #[serde(default, rename = "sampleSize")]
    sample_size: Option<u32>,
    #[serde(default)]
    liberal: Option<f64>,
    #[serde(default)]
    conservative: Option<f64>,
    #[serde(default)]
    ndp: Option<f64>,
    #[serde(default)]
    bloc: Option<f64>,
    #[serde(default)]
    green: Option<f64>,
    #[serde(default)]
    ppc: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WireAverage {
    date: String,
    #[serde(default)]
    liberal: Option<f64>,
    #[serde(default)]
    conservative: Option<f64>,
    #[serde(default)]
    ndp: Option<f64>,
    #[serde(default)]
    bloc: Option<f64>,
    #[serde(default)]
    green: Option<f64>,
    #[serde(default)]
    ppc: Option<f64>,
    #[serde(default)]
    other: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireLatest {
    latest_values: HashMap<String, f64>,
    changes: HashMap<String, Option<f64>>,
}

fn parse_date(value: &str) -> Result<NaiveDate, PollError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|source| PollError::InvalidDate {
        value: value.to_string(),
        source,
    })
}

fn polls_from_wire(rows: Vec<WirePoll>) -> Vec<RawPoll> {
    let mut polls = Vec::with_capacity(rows.len());
    for row in rows {
        match poll_from_wire(row) {
            Ok(poll) => polls.push(poll),
            Err(err) => log::warn!("skipping poll record: {err}"),
        }
    }
    polls
}

fn poll_from_wire(row: WirePoll) -> Result<RawPoll, PollError> {
    let date = parse_date(&row.date)?;

    let mut shares = PartyShares::default();
    shares[Party::Liberal] = row.liberal.unwrap_or(0.0);
    shares[Party::Conservative] = row.conservative.unwrap_or(0.0);
    shares[Party::Ndp] = row.ndp.unwrap_or(0.0);
    shares[Party::Bloc] = row.bloc.unwrap_or(0.0);
    shares[Party::Green] = row.green.unwrap_or(0.0);
    shares[Party::Ppc] = row.ppc.unwrap_or(0.0);
    // The store sends `other: 0`; fold the residual support into it so the
    // tracked set accounts for the full sample.
    shares[Party::Other] = (100.0 - shares.total()).max(0.0);

    Ok(RawPoll {
        date,
        pollster: row.pollster,
        sample_size: row.sample_size.unwrap_or(0),
        shares,
    })
}

fn averages_from_wire(rows: Vec<WireAverage>) -> Vec<AveragedPoint> {
    let mut points = Vec::with_capacity(rows.len());
    for row in rows {
        let date = match parse_date(&row.date) {
            Ok(date) => date,
            Err(err) => {
                log::warn!("skipping averaged record: {err}");
                continue;
            }
        };
        let mut shares = PartyShares::default();
        shares[Party::Liberal] = row.liberal.unwrap_or(0.0);
        shares[Party::Conservative] = row.conservative.unwrap_or(0.0);
        shares[Party::Ndp] = row.ndp.unwrap_or(0.0);
        shares[Party::Bloc] = row.bloc.unwrap_or(0.0);
        shares[Party::Green] = row.green.unwrap_or(0.0);
        shares[Party::Ppc] = row.ppc.unwrap_or(0.0);
        shares[Party::Other] = row.other.unwrap_or(0.0);
        points.push(AveragedPoint { date, shares });
    }
    points
}

fn latest_from_wire(wire: WireLatest) -> LatestSummary {
    let mut values = PartyShares::default();
    let mut changes = PartyChanges::default();
    for party in Party::ALL {
        values[party] = wire.latest_values.get(party.key()).copied().unwrap_or(0.0);
        changes[party] = wire.changes.get(party.key()).copied().flatten();
    }
    LatestSummary { values, changes }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire_poll(date: &str) -> WirePoll {
        WirePoll {
            date: date.to_string(),
            pollster: "Abacus".to_string(),
            sample_size: Some(1500),
            liberal: Some(38.0),
            conservative: Some(40.0),
            ndp: Some(15.0),
            bloc: Some(4.0),
            green: Some(2.0),
            ppc: None,
        }
    }

    #[test]
    fn residual_support_is_folded_into_other() {
        let poll = poll_from_wire(wire_poll("2024-03-01")).unwrap();
        // 100 - (38 + 40 + 15 + 4 + 2 + 0) = 1
        assert!((poll.shares[Party::Other] - 1.0).abs() < 1e-12);
        assert!((poll.shares.total() - 100.0).abs() < 1e-12);
        assert_eq!(poll.sample_size, 1500);
    }

    #[test]
    fn oversubscribed_polls_get_zero_other_not_negative() {
        let mut row = wire_poll("2024-03-01");
        row.liberal = Some(60.0);
        row.conservative = Some(45.0);
        let poll = poll_from_wire(row).unwrap();
        assert_eq!(poll.shares[Party::Other], 0.0);
    }

    #[test]
    fn invalid_date_rows_are_skipped_not_fatal() {
        let rows = vec![
            wire_poll("2024-03-01"),
            wire_poll("not-a-date"),
            wire_poll("2024-03-05"),
        ];
        let polls = polls_from_wire(rows);
        assert_eq!(polls.len(), 2);
    }

    #[test]
    fn invalid_date_surfaces_as_typed_error() {
        let err = poll_from_wire(wire_poll("03/01/2024")).unwrap_err();
        assert!(matches!(err, PollError::InvalidDate { .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn averages_rows_map_party_keys() {
        let rows = vec![WireAverage {
            date: "2024-03-01".to_string(),
            liberal: Some(39.5),
            conservative: Some(38.1),
            ndp: Some(14.2),
            bloc: Some(5.0),
            green: Some(1.8),
            ppc: Some(1.0),
            other: Some(0.4),
        }];
        let points = averages_from_wire(rows);
        assert_eq!(points.len(), 1);
        assert!((points[0].shares[Party::Liberal] - 39.5).abs() < 1e-12);
        assert!((points[0].shares[Party::Other] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn latest_conversion_preserves_null_changes() {
        let wire = WireLatest {
            latest_values: HashMap::from([
                ("liberal".to_string(), 41.2),
                ("conservative".to_string(), 38.0),
            ]),
            changes: HashMap::from([
                ("liberal".to_string(), Some(0.4)),
                ("conservative".to_string(), None),
            ]),
        };
        let latest = latest_from_wire(wire);
        assert!((latest.values[Party::Liberal] - 41.2).abs() < 1e-12);
        assert_eq!(latest.changes[Party::Liberal], Some(0.4));
        assert_eq!(latest.changes[Party::Conservative], None);
        // Parties absent from the payload read as zero support, no change.
        assert_eq!(latest.values[Party::Green], 0.0);
        assert_eq!(latest.changes[Party::Green], None);
    }
}
