//! Chart geometry, free of any rendering-surface dependency.
//!
//! Everything here is pure and unit-testable:
//!
//! - lookback-window filtering (`window`)
//! - continuous date/share scales, ceilings, and axis ticks (`scale`)
//! - pointer-to-nearest-point lookup (`locate`)
//!
//! The TUI consumes the geometry computed here and only draws.

pub mod locate;
pub mod scale;
pub mod window;
