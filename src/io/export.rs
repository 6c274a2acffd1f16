//! Write the averaged series to a JSON file.
//!
//! The file is shaped exactly like the store's `/api/averages/{region}`
//! payload (one object per date, flat party keys), so exports can be diffed
//! against the store or served back by it.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::domain::{AveragedPoint, Party};
use crate::error::PollError;

#[derive(Debug, Serialize)]
struct ExportRow {
    date: String,
    liberal: f64,
    conservative: f64,
    ndp: f64,
    bloc: f64,
    green: f64,
    ppc: f64,
    other: f64,
}

fn rows(points: &[AveragedPoint]) -> Vec<ExportRow> {
    points
        .iter()
        .map(|p| ExportRow {
            date: p.date.format("%Y-%m-%d").to_string(),
            liberal: p.shares[Party::Liberal],
            conservative: p.shares[Party::Conservative],
            ndp: p.shares[Party::Ndp],
            bloc: p.shares[Party::Bloc],
            green: p.shares[Party::Green],
            ppc: p.shares[Party::Ppc],
            other: p.shares[Party::Other],
        })
        .collect()
}

/// Write the full series as pretty-printed JSON.
pub fn write_averages_json(path: &Path, points: &[AveragedPoint]) -> Result<(), PollError> {
    let file = File::create(path).map_err(|source| PollError::Export {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::to_writer_pretty(file, &rows(points)).map_err(|e| PollError::Export {
        path: path.to_path_buf(),
        source: std::io::Error::other(e),
    })?;

    Ok(())
}
