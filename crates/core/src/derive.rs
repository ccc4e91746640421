//! Derived-metric primitives.
//!
//! Every rate, ratio and average in a [`MetricsSnapshot`](crate::MetricsSnapshot)
//! is computed through [`safe_div`], so a zero denominator yields the same
//! zero default in every metric group instead of a panic or a NaN.

/// Decimal places for percentages.
pub const PCT_PLACES: u32 = 1;
/// Decimal places for token ratios.
pub const RATIO_PLACES: u32 = 3;
/// Decimal places for currency amounts.
pub const COST_PLACES: u32 = 4;
/// Decimal places for per-hour rates.
pub const RATE_PLACES: u32 = 2;
/// Decimal places for averaged durations and cycle counts.
pub const AVG_PLACES: u32 = 1;

/// Milliseconds in one hour.
pub const MS_PER_HOUR: f64 = 3_600_000.0;

/// Divide, returning `default` when the denominator is zero.
///
/// Non-finite denominators are treated the same way.
pub fn safe_div(numerator: f64, denominator: f64, default: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        default
    } else {
        numerator / denominator
    }
}

/// `part` as a percentage of `whole`, 0 when `whole` is zero.
pub fn percent(part: f64, whole: f64) -> f64 {
    safe_div(part * 100.0, whole, 0.0)
}

/// Round to a fixed number of decimal places, halves away from zero.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    let rounded = (value * factor).round() / factor;
    // Avoid reporting "-0.0".
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Exact median, averaging the two central values on an even count.
///
/// Returns 0 for an empty slice.
pub fn median(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    } else {
        sorted[mid] as f64
    }
}
