//! Rounding and percentage helpers.

/// Round `value` to `decimals` places (half away from zero).
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Percentage move from `from` to `to`, relative to `from`.
///
/// Returns `None` when `from` is zero.
pub fn pct_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 {
        return None;
    }
    Some((to - from) / from * 100.0)
}
