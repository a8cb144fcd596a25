//! Weighted-mean aggregation and half-to-even rounding.

/// Round `value` half-to-even ("banker's rounding") to `decimals` places.
/// `f64::round` ties away from zero, so this rolls its own via the
/// even/odd check on the scaled integer part.
pub fn round_half_even(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    let floor = scaled.floor();
    let diff = scaled - floor;
    let rounded = if (diff - 0.5).abs() < 1e-9 {
        if (floor as i64) % 2 == 0 {
            floor
        } else {
            floor + 1.0
        }
    } else {
        scaled.round()
    };
    rounded / factor
}

/// Weighted arithmetic mean over the defined `(score, weight)` pairs.
/// `None` entries are excluded from both the numerator and the
/// denominator — never treated as zero, never allowed to poison the sum
/// with a NaN.
pub fn weighted_mean(entries: &[(Option<f64>, f64)]) -> Option<f64> {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for (score, weight) in entries {
        if let Some(score) = score {
            weighted_sum += score * weight;
            weight_total += weight;
        }
    }
    if weight_total == 0.0 {
        None
    } else {
        Some(weighted_sum / weight_total)
    }
}
