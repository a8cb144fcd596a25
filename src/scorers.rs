//! Per-field similarity scorers. Each returns a similarity in
//! `[0, 1]` or `None` ("undefined") and never panics on absent input.

use std::collections::HashSet;

use chrono::NaiveDate;

/// `exp(-delta_days / DATE_DECAY_SCALE)`. Calibrated so a 1-day gap scores
/// ~0.905, a 7-day gap ~0.497, a 15-day gap ~0.223. Colocated here, as its
/// own named constant, so a future calibration pass can retune it without
/// touching the scoring logic around it.
pub const DATE_DECAY_SCALE: f64 = 10.0;

/// `exp(-HAVERSINE_DECAY_SCALE * central_angle_radians)`. Calibrated so
/// the same point scores 1 and ~100 km apart scores ~0.2.
pub const HAVERSINE_DECAY_SCALE: f64 = 100.0;

/// exact (case-insensitive). Either side empty -> undefined.
pub fn exact_ci(a: &str, b: &str) -> Option<f64> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    Some(if a.to_uppercase() == b.to_uppercase() { 1.0 } else { 0.0 })
}

/// exact-or-include: 1 if equal, 0.8 if one is a substring of the other
/// (case-insensitive), else 0. Either side empty -> undefined.
pub fn exact_or_include(a: &str, b: &str) -> Option<f64> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let (au, bu) = (a.to_uppercase(), b.to_uppercase());
    if au == bu {
        Some(1.0)
    } else if au.contains(&bu) || bu.contains(&au) {
        Some(0.8)
    } else {
        Some(0.0)
    }
}

/// Jaro-Winkler with the standard scaling factor (0.1) and max prefix
/// length (4) that `strsim::jaro_winkler` already implements. Either side
/// empty -> undefined.
pub fn jaro_winkler(a: &str, b: &str) -> Option<f64> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    Some(strsim::jaro_winkler(a, b))
}

/// `1 - |r - s| / max(|s|, |r|)`, or 1 if both are zero. Either side
/// absent -> undefined.
pub fn numeric_ratio(s: Option<f64>, r: Option<f64>) -> Option<f64> {
    let s = s?;
    let r = r?;
    let max_value = s.abs().max(r.abs());
    if max_value == 0.0 {
        return Some(1.0);
    }
    Some(1.0 - (r - s).abs() / max_value)
}

/// 1 if the two identifier sets intersect, else 0. Always defined — an
/// empty set (a missing `recordedByIDs`) scores 0 against anything, it is
/// not treated as "no information".
pub fn set_intersection_nonempty(a: &HashSet<String>, b: &HashSet<String>) -> Option<f64> {
    Some(if a.intersection(b).next().is_some() { 1.0 } else { 0.0 })
}

fn ordinal(year: i32, month: Option<i32>, day: Option<i32>) -> Option<i64> {
    let month = month.unwrap_or(6);
    let day = day.unwrap_or(15);
    NaiveDate::from_ymd_opt(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)
        .map(|d| i64::from(d.num_days_from_ce()))
}

/// `exp(-|delta_days| / DATE_DECAY_SCALE)`. Either side missing a year ->
/// undefined. A missing month/day defaults to the middle of its unit
/// (month 6, day 15) rather than forcing the whole comparison undefined.
pub fn date_decay(
    year1: Option<i32>,
    month1: Option<i32>,
    day1: Option<i32>,
    year2: Option<i32>,
    month2: Option<i32>,
    day2: Option<i32>,
) -> Option<f64> {
    let o1 = ordinal(year1?, month1, day1)?;
    let o2 = ordinal(year2?, month2, day2)?;
    Some((-(o1 - o2).abs() as f64 / DATE_DECAY_SCALE).exp())
}

/// Great-circle decay via the Haversine formula. Either pair missing ->
/// undefined. The half-angle `h` is guarded against floating-point
/// rounding pushing it outside `[0, 1]`, which would otherwise feed
/// `asin` a NaN.
pub fn haversine_decay(
    lat1: Option<f64>,
    lon1: Option<f64>,
    lat2: Option<f64>,
    lon2: Option<f64>,
) -> Option<f64> {
    let (lat1, lon1, lat2, lon2) = (lat1?, lon1?, lat2?, lon2?);
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();
    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    if !(0.0..=1.0).contains(&h) {
        return None;
    }
    let central_angle = 2.0 * h.sqrt().asin();
    Some((-HAVERSINE_DECAY_SCALE * central_angle).exp())
}
