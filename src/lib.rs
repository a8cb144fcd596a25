//! Deterministic per-field similarity scoring between two biodiversity
//! occurrence records (a "subject" and a "related" candidate).
//!
//! The pure core — [`score`] — normalizes both occurrences against the
//! [`registry::REGISTRY`], scores every registered field, and reduces the
//! result to a weighted mean. It has no `pyo3` dependency of its own; the
//! `_rust` extension module below is the seam the surrounding Python
//! curation backend calls through.

mod aggregate;
mod error;
mod normalize;
mod registry;
mod scorers;
mod value;

use std::collections::HashMap;
use std::time::Instant;

use pyo3::prelude::*;
use rayon::prelude::*;

pub use error::MatchError;
pub use normalize::{normalize_occurrence, NormalizedOccurrence};
pub use registry::{FieldEntry, REGISTRY};
pub use value::{py_to_json, Occurrence, OccurrenceDict};

use aggregate::{round_half_even, weighted_mean};

/// The reserved key the aggregate weighted mean is reported under.
pub const GLOBAL_KEY: &str = "$global";

/// Score one `(subject, related)` pair. Normalizes both sides, evaluates
/// every registry entry, and rounds every emitted score — per-field and
/// `$global` alike — half-to-even to three decimal places in a single
/// final pass.
pub fn score(subject: &Occurrence, related: &Occurrence) -> Result<HashMap<String, Option<f64>>, MatchError> {
    let subject_norm = normalize_occurrence(subject)?;
    let related_norm = normalize_occurrence(related)?;

    let mut result = HashMap::with_capacity(REGISTRY.len() + 1);
    let mut weighted_entries = Vec::with_capacity(REGISTRY.len());

    for entry in REGISTRY {
        let raw_score = (entry.score)(&subject_norm, &related_norm);
        weighted_entries.push((raw_score, entry.weight));
        result.insert(entry.key.to_string(), raw_score.map(|v| round_half_even(v, 3)));
    }

    let global = weighted_mean(&weighted_entries).map(|v| round_half_even(v, 3));
    result.insert(GLOBAL_KEY.to_string(), global);

    Ok(result)
}

/// Score a single pair, called from the surrounding Python backend with
/// two dicts shaped like GBIF/Plazi occurrence payloads.
#[pyfunction]
fn score_pair(subject: OccurrenceDict, related: OccurrenceDict) -> PyResult<HashMap<String, Option<f64>>> {
    let start = Instant::now();
    let result = score(&subject.0, &related.0);
    match &result {
        Ok(scores) => tracing::debug!(
            elapsed_us = start.elapsed().as_micros() as u64,
            global = ?scores.get(GLOBAL_KEY),
            "scored occurrence pair"
        ),
        Err(err) => tracing::warn!(error = %err, "rejected malformed occurrence pair"),
    }
    Ok(result?)
}

/// Score many independently-given pairs in parallel with `rayon`. A
/// single malformed pair aborts the whole batch call
/// rather than silently dropping just that pair.
#[pyfunction]
fn score_batch(pairs: Vec<(OccurrenceDict, OccurrenceDict)>) -> PyResult<Vec<HashMap<String, Option<f64>>>> {
    let start = Instant::now();
    let count = pairs.len();
    let results: Result<Vec<_>, MatchError> = pairs
        .into_par_iter()
        .map(|(subject, related)| score(&subject.0, &related.0))
        .collect();
    match &results {
        Ok(_) => tracing::debug!(
            pairs = count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "scored occurrence batch"
        ),
        Err(err) => tracing::warn!(pairs = count, error = %err, "batch rejected on malformed occurrence"),
    }
    Ok(results?)
}

/// A simple liveness check for the extension module.
#[pyfunction]
fn hello_rust() -> PyResult<String> {
    Ok("Hello from Rust!".to_string())
}

/// A Python module implemented in Rust.
#[pymodule]
fn _rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(hello_rust, m)?)?;
    m.add_function(wrap_pyfunction!(score_pair, m)?)?;
    m.add_function(wrap_pyfunction!(score_batch, m)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn occ(pairs: &[(&str, serde_json::Value)]) -> Occurrence {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    // Seed scenario 1: identical catalog codes after alphanumeric normalization.
    #[test]
    fn identical_catalog_codes_score_one() {
        let subject = occ(&[("catalogNumber", json!("I.42891-001"))]);
        let related = occ(&[("catalogNumber", json!("I 42891 - 001"))]);
        let result = score(&subject, &related).unwrap();
        assert_eq!(result["catalogNumber"], Some(1.0));
        assert_eq!(result[GLOBAL_KEY], Some(1.0));
    }

    // Seed scenario 2: composite catalog code substring match.
    #[test]
    fn composite_catalog_code_scores_point_eight() {
        let subject = occ(&[("catalogNumber", json!("CMNA 2015-0001"))]);
        let related = occ(&[(
            "catalogNumber",
            json!("CMNA 2015-0001, CMNA 2015-0004, CMNA 2015-0011"),
        )]);
        let result = score(&subject, &related).unwrap();
        assert_eq!(result["catalogNumber"], Some(0.8));
    }

    // Seed scenario 3: close dates.
    #[test]
    fn close_dates_score_per_calibration() {
        let subject = occ(&[("year", json!(2022)), ("month", json!(5)), ("day", json!(22))]);
        let related = occ(&[("year", json!(2022)), ("month", json!(5)), ("day", json!(23))]);
        let result = score(&subject, &related).unwrap();
        assert_eq!(result["year"], Some(0.905));
    }

    // Seed scenario 4: near-antipodal coordinates decay to ~0.
    #[test]
    fn antipodal_coordinates_score_near_zero() {
        let subject = occ(&[("decimalLatitude", json!(0)), ("decimalLongitude", json!(0.0001))]);
        let related = occ(&[("decimalLatitude", json!(0)), ("decimalLongitude", json!(180))]);
        let result = score(&subject, &related).unwrap();
        assert_eq!(result["decimalLatitude"], Some(0.0));
    }

    // Seed scenario 5: elevation inferred from depth on one side.
    #[test]
    fn elevation_inferred_from_depth_scores_one() {
        let subject = occ(&[("elevation", serde_json::Value::Null), ("depth", json!(100))]);
        let related = occ(&[("elevation", json!(-100)), ("depth", serde_json::Value::Null)]);
        let result = score(&subject, &related).unwrap();
        assert_eq!(result["elevation"], Some(1.0));
    }

    // Seed scenario 6: a single shared field drives the global score.
    #[test]
    fn missing_data_global_equals_sole_defined_field() {
        let subject = occ(&[("country", json!("France"))]);
        let related = occ(&[("country", json!("France"))]);
        let result = score(&subject, &related).unwrap();
        assert_eq!(result[GLOBAL_KEY], Some(1.0));
    }

    #[test]
    fn fully_empty_occurrences_have_undefined_global() {
        let subject = Occurrence::new();
        let related = Occurrence::new();
        let result = score(&subject, &related).unwrap();
        assert_eq!(result[GLOBAL_KEY], None);
        assert!(result.values().all(Option::is_none));
    }

    #[test]
    fn identical_occurrence_scores_global_one() {
        let subject = occ(&[
            ("typeStatus", json!("Holotype")),
            ("country", json!("France")),
            ("family", json!("Felidae")),
        ]);
        let result = score(&subject, &subject).unwrap();
        assert_eq!(result[GLOBAL_KEY], Some(1.0));
    }

    #[test]
    fn scoring_is_symmetric_for_a_mixed_occurrence() {
        let subject = occ(&[
            ("recordedBy", json!("J. Smith")),
            ("catalogNumber", json!("AB 123")),
            ("year", json!(2020)),
            ("decimalLatitude", json!(10.0)),
            ("decimalLongitude", json!(20.0)),
        ]);
        let related = occ(&[
            ("recordedBy", json!("John Smith")),
            ("catalogNumber", json!("AB-123")),
            ("year", json!(2021)),
            ("month", json!(3)),
            ("decimalLatitude", json!(10.5)),
            ("decimalLongitude", json!(20.5)),
        ]);
        let forward = score(&subject, &related).unwrap();
        let backward = score(&related, &subject).unwrap();
        for key in forward.keys() {
            assert_eq!(forward[key], backward[key], "field {key} is not symmetric");
        }
    }

    #[test]
    fn all_per_field_scores_are_in_unit_interval_or_undefined() {
        let subject = occ(&[
            ("typeStatus", json!("holotype")),
            ("recordedBy", json!("A. Gray")),
            ("recordNumber", json!("123")),
            ("collectionCode", json!("MNHN")),
            ("catalogNumber", json!("X-1")),
            ("individualCount", json!(3)),
            ("family", json!("Rosaceae")),
            ("genus", json!("Rosa")),
            ("specificEpithet", json!("canina")),
            ("country", json!("France")),
            ("city", json!("Paris")),
            ("locality", json!("Bois de Vincennes")),
            ("elevation", json!(120)),
            ("year", json!(2019)),
            ("month", json!(8)),
            ("day", json!(4)),
            ("decimalLatitude", json!(48.8)),
            ("decimalLongitude", json!(2.4)),
        ]);
        let related = occ(&[
            ("typeStatus", json!("paratype")),
            ("recordedBy", json!("A. Grey")),
            ("recordNumber", json!("124")),
            ("collectionCode", json!("MNHN")),
            ("catalogNumber", json!("X-2")),
            ("individualCount", json!(1)),
            ("family", json!("Rosaceae")),
            ("genus", json!("Rosa")),
            ("specificEpithet", json!("gallica")),
            ("country", json!("Germany")),
            ("city", json!("Berlin")),
            ("locality", json!("Tiergarten")),
            ("elevation", json!(35)),
            ("year", json!(2019)),
            ("month", json!(8)),
            ("day", json!(20)),
            ("decimalLatitude", json!(52.5)),
            ("decimalLongitude", json!(13.4)),
        ]);
        let result = score(&subject, &related).unwrap();
        for (key, value) in &result {
            if let Some(v) = value {
                assert!((0.0..=1.0).contains(v), "{key} out of range: {v}");
            }
        }
    }

    #[test]
    fn malformed_numeric_field_propagates_as_error() {
        let subject = occ(&[("decimalLatitude", json!("not-a-number")), ("decimalLongitude", json!(1))]);
        let related = Occurrence::new();
        assert!(score(&subject, &related).is_err());
    }
}
