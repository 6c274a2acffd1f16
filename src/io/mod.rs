//! Input/output helpers.
//!
//! - averaged-series JSON export (`export`)

pub mod export;
