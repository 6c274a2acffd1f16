//! Exponentially weighted moving average.
//!
//! A first-order exponential filter:
//!
//! `smoothed[0] = values[0]`
//! `smoothed[i] = smoothed[i-1] + alpha * (values[i] - smoothed[i-1])`
//!
//! The caller is responsible for feeding values in chronological order; the
//! pipeline in [`crate::average`] sorts before calling this.

/// Smooth a chronological value sequence with factor `alpha`.
///
/// Empty input yields empty output. `alpha` is assumed to lie in (0, 1);
/// the pipeline validates it once at the boundary.
pub fn smooth(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut state = match values.first() {
        Some(&first) => first,
        None => return out,
    };
    out.push(state);

    for &value in &values[1..] {
        state += alpha * (value - state);
        out.push(state);
    }

    out
}
