//! The loosely-typed input representation: a mapping from Darwin
//! Core field names to JSON-shaped values, plus the conversion from a
//! Python dict at the ingestion seam.

use std::collections::HashMap;

use pyo3::types::{PyAnyMethods, PyDict, PyDictMethods, PyList, PyListMethods};
use pyo3::{Bound, FromPyObject, PyAny, PyResult};
use serde_json::Value;

/// A single occurrence: Darwin Core field name -> raw JSON-shaped value.
/// A field absent from the map is treated identically to a field present
/// with value `Value::Null`.
pub type Occurrence = HashMap<String, Value>;

/// Look up a field, collapsing "missing" and "explicitly null" into one case.
pub fn get<'a>(occ: &'a Occurrence, field: &str) -> Option<&'a Value> {
    match occ.get(field) {
        None => None,
        Some(Value::Null) => None,
        some => some,
    }
}

impl<'py> FromPyObject<'py> for OccurrenceDict {
    fn extract_bound(ob: &Bound<'py, PyAny>) -> PyResult<Self> {
        let dict = ob.downcast::<PyDict>()?;
        let mut occ = Occurrence::with_capacity(dict.len());
        for (k, v) in dict.iter() {
            let key: String = k.extract()?;
            occ.insert(key, py_to_json(&v)?);
        }
        Ok(OccurrenceDict(occ))
    }
}

/// Newtype so a bare Python dict can be extracted straight into an
/// [`Occurrence`] by pyo3's `#[pyfunction]` argument machinery.
pub struct OccurrenceDict(pub Occurrence);

/// Recursively convert a Python object into its JSON-shaped equivalent.
/// Mirrors the handful of shapes Darwin Core occurrence payloads actually
/// use: strings, numbers, bools, null, lists (for `recordedByIDs`), and
/// nested dicts (for the `{"type": ..., "value": ...}` records within it).
pub fn py_to_json(value: &Bound<'_, PyAny>) -> PyResult<Value> {
    if value.is_none() {
        return Ok(Value::Null);
    }
    if let Ok(b) = value.extract::<bool>() {
        return Ok(Value::Bool(b));
    }
    if let Ok(i) = value.extract::<i64>() {
        return Ok(Value::from(i));
    }
    if let Ok(f) = value.extract::<f64>() {
        return Ok(serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number));
    }
    if let Ok(s) = value.extract::<String>() {
        return Ok(Value::String(s));
    }
    if let Ok(list) = value.downcast::<PyList>() {
        let mut out = Vec::with_capacity(list.len());
        for item in list.iter() {
            out.push(py_to_json(&item)?);
        }
        return Ok(Value::Array(out));
    }
    if let Ok(dict) = value.downcast::<PyDict>() {
        let mut map = serde_json::Map::with_capacity(dict.len());
        for (k, v) in dict.iter() {
            let key: String = k.extract()?;
            map.insert(key, py_to_json(&v)?);
        }
        return Ok(Value::Object(map));
    }
    // Anything else (e.g. a custom object) falls back to its string form
    // rather than failing ingestion outright; numeric normalizers still
    // reject it later if it can't be parsed as the type they expect.
    Ok(Value::String(value.str()?.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_treats_null_as_missing() {
        let mut occ = Occurrence::new();
        occ.insert("country".to_string(), Value::Null);
        assert!(get(&occ, "country").is_none());
        assert!(get(&occ, "nonexistent").is_none());
    }

    #[test]
    fn get_returns_present_value() {
        let mut occ = Occurrence::new();
        occ.insert("country".to_string(), Value::String("France".into()));
        assert_eq!(get(&occ, "country").unwrap().as_str(), Some("France"));
    }
}
