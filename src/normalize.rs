//! Per-field and joint normalizers and the typed [`NormalizedOccurrence`]
//! they populate.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::error::MatchError;
use crate::value::{get, Occurrence};

/// An occurrence after normalization: one canonical field per registry
/// entry, plus an attribute bag for anything the registry doesn't know
/// about. `None` is the "absent" sentinel and is always distinct from an
/// empty string or a numeric zero.
#[derive(Debug, Clone, Default)]
pub struct NormalizedOccurrence {
    pub type_status: String,
    pub basis_of_record: String,
    pub recorded_by: String,
    pub record_number: String,
    pub recorded_by_ids: HashSet<String>,
    pub collection_code: String,
    pub catalog_number: String,
    pub individual_count: Option<i64>,
    pub family: String,
    pub genus: String,
    pub specific_epithet: String,
    pub country: String,
    pub city: Option<String>,
    pub locality: Option<String>,
    pub elevation: Option<f64>,
    pub depth: Option<f64>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Fields present on the input occurrence that the registry does not
    /// score. Kept so the surrounding system never silently loses data it
    /// might want to display or persist.
    pub attributes: HashMap<String, Value>,
}

/// "trim": null/absent/empty -> "", otherwise leading/trailing whitespace
/// stripped. Never absent.
pub fn trim(v: Option<&Value>) -> String {
    match v {
        None => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) => String::new(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

/// "trim or absent": like `trim`, but a missing/null input stays absent
/// instead of collapsing to the empty string.
pub fn trim_or_absent(v: Option<&Value>) -> Option<String> {
    v.map(|value| match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    })
}

/// Uppercase, then delete every run of characters outside `[A-Z0-9]`.
/// Never absent.
pub fn alphanumeric_code(v: Option<&Value>) -> String {
    let raw = trim(v).to_uppercase();
    raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Truthy-coerce a JSON value per the Python `if value:` convention the
/// source relies on: `None`/`null`, `false`, `0`, `""`, `[]`, `{}` are all
/// falsy and normalize to absent.
fn is_falsy(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn truthy(v: Option<&Value>) -> Option<&Value> {
    v.filter(|value| !is_falsy(value))
}

fn parse_f64(field: &'static str, v: &Value) -> Result<f64, MatchError> {
    match v {
        Value::Number(n) => n.as_f64().ok_or_else(|| malformed(field, v)),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| malformed(field, v)),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        _ => Err(malformed(field, v)),
    }
}

fn parse_i64(field: &'static str, v: &Value) -> Result<i64, MatchError> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| malformed(field, v)),
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| malformed(field, v)),
        Value::Bool(b) => Ok(if *b { 1 } else { 0 }),
        _ => Err(malformed(field, v)),
    }
}

fn malformed(field: &'static str, v: &Value) -> MatchError {
    MatchError::MalformedField {
        field,
        raw_value: v.to_string(),
    }
}

/// "Integer or absent" (individualCount, and the year/month/day group).
fn normalize_int(field: &'static str, v: Option<&Value>) -> Result<Option<i64>, MatchError> {
    match truthy(v) {
        None => Ok(None),
        Some(value) => parse_i64(field, value).map(Some),
    }
}

/// Joint elevation/depth normalizer. Downstream scoring only reads
/// `elevation`; `depth` is kept on the normalized occurrence for inspection.
pub fn normalize_elevation_depth(
    elevation_raw: Option<&Value>,
    depth_raw: Option<&Value>,
) -> Result<(Option<f64>, Option<f64>), MatchError> {
    let mut elevation = match elevation_raw {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => {
            let stripped = s.replace("ca.", "");
            let trimmed = stripped.trim();
            Some(
                trimmed
                    .parse::<f64>()
                    .map_err(|_| malformed("elevation", elevation_raw.unwrap()))?,
            )
        }
        Some(value) => Some(parse_f64("elevation", value)?),
    };
    if let Some(e) = elevation {
        if e < -6_000_000.0 {
            elevation = None;
        }
    }

    let depth = match depth_raw {
        None | Some(Value::Null) => None,
        Some(value) => Some(parse_f64("depth", value)?),
    };

    if elevation == depth {
        // Covers both-absent and both-equal-and-defined.
        return Ok((elevation, depth));
    }

    if depth.is_some() && (elevation.is_none() || elevation == Some(0.0)) {
        return Ok((depth.map(|d| -d), depth));
    }

    Ok((elevation, depth))
}

/// Joint year/month/day normalizer.
pub fn normalize_date(
    year_raw: Option<&Value>,
    month_raw: Option<&Value>,
    day_raw: Option<&Value>,
) -> Result<(Option<i32>, Option<i32>, Option<i32>), MatchError> {
    let year = normalize_int("year", year_raw)?.map(|y| y as i32);
    if year.is_none() {
        return Ok((None, None, None));
    }
    let month = normalize_int("month", month_raw)?.map(|m| m as i32);
    if month.is_none() {
        return Ok((year, None, None));
    }
    let day = normalize_int("day", day_raw)?.map(|d| d as i32);
    Ok((year, month, day))
}

/// Joint latitude/longitude normalizer. Parses straight to `f64`; the extra
/// precision a decimal staging type would add is lost the moment the value
/// passes through `to_radians` anyway (see DESIGN.md).
pub fn normalize_lat_lon(
    lat_raw: Option<&Value>,
    lon_raw: Option<&Value>,
) -> Result<(Option<f64>, Option<f64>), MatchError> {
    let lat = lat_raw.map(|v| parse_f64("decimalLatitude", v)).transpose()?;
    let lon = lon_raw.map(|v| parse_f64("decimalLongitude", v)).transpose()?;
    match (lat, lon) {
        (Some(lat), Some(lon)) => {
            if (lat == 0.0 && lon == 0.0) || (lat == 360.0 && lon == 360.0) {
                Ok((None, None))
            } else {
                Ok((Some(lat), Some(lon)))
            }
        }
        _ => Ok((None, None)),
    }
}

/// Input is a sequence of `{"type": ..., "value": ...}` records; output is
/// the set of distinct `value` strings. Missing input -> empty set. Records
/// without a usable string `value` are skipped rather than rejected.
pub fn normalize_recorded_by_ids(v: Option<&Value>) -> HashSet<String> {
    let Some(Value::Array(items)) = v else {
        return HashSet::new();
    };
    items
        .iter()
        .filter_map(|item| item.get("value").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

/// Normalize a raw occurrence into its typed form, running every
/// single-field and joint normalizer in the registry once.
pub fn normalize_occurrence(occ: &Occurrence) -> Result<NormalizedOccurrence, MatchError> {
    const REGISTERED: &[&str] = &[
        "typeStatus",
        "basisOfRecord",
        "recordedBy",
        "recordNumber",
        "recordedByIDs",
        "collectionCode",
        "catalogNumber",
        "individualCount",
        "family",
        "genus",
        "specificEpithet",
        "country",
        "city",
        "locality",
        "elevation",
        "depth",
        "year",
        "month",
        "day",
        "decimalLatitude",
        "decimalLongitude",
    ];

    let (elevation, depth) =
        normalize_elevation_depth(get(occ, "elevation"), get(occ, "depth"))?;
    let (year, month, day) =
        normalize_date(get(occ, "year"), get(occ, "month"), get(occ, "day"))?;
    let (latitude, longitude) =
        normalize_lat_lon(get(occ, "decimalLatitude"), get(occ, "decimalLongitude"))?;

    let attributes = occ
        .iter()
        .filter(|(k, _)| !REGISTERED.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Ok(NormalizedOccurrence {
        type_status: trim(get(occ, "typeStatus")),
        basis_of_record: trim(get(occ, "basisOfRecord")),
        recorded_by: trim(get(occ, "recordedBy")),
        record_number: trim(get(occ, "recordNumber")),
        recorded_by_ids: normalize_recorded_by_ids(get(occ, "recordedByIDs")),
        collection_code: alphanumeric_code(get(occ, "collectionCode")),
        catalog_number: alphanumeric_code(get(occ, "catalogNumber")),
        individual_count: normalize_int("individualCount", get(occ, "individualCount"))?,
        family: trim(get(occ, "family")),
        genus: trim(get(occ, "genus")),
        specific_epithet: trim(get(occ, "specificEpithet")),
        country: trim(get(occ, "country")),
        city: trim_or_absent(get(occ, "city")),
        locality: trim_or_absent(get(occ, "locality")),
        elevation,
        depth,
        year,
        month,
        day,
        latitude,
        longitude,
        attributes,
    })
}
