//! The Field Registry: a `'static` table of entries, each a tagged
//! variant by arity (single field vs. joint group) carrying its own
//! weight and scorer function pointer. Constructed once, at compile time;
//! read-only and safe to share across threads without synchronization.
//!
//! Normalization already ran once per occurrence (see `normalize.rs`) to
//! produce the `NormalizedOccurrence` each scorer reads from, so this
//! table only needs to carry the scoring half of each entry — the
//! normalizing half lives with the joint/single normalizer functions
//! themselves.

use crate::normalize::NormalizedOccurrence;
use crate::scorers::{
    date_decay, exact_ci, exact_or_include, haversine_decay, jaro_winkler, numeric_ratio,
    set_intersection_nonempty,
};

/// One registry entry: its output key, its weight, and the scorer that
/// reduces a pair of normalized occurrences to a similarity.
pub struct FieldEntry {
    pub key: &'static str,
    pub weight: f64,
    pub score: fn(&NormalizedOccurrence, &NormalizedOccurrence) -> Option<f64>,
}

/// The single source of truth for "what is matched and how". The
/// original source lists `basisOfRecord` twice with identical parameters;
/// it appears once here.
pub const REGISTRY: &[FieldEntry] = &[
    FieldEntry {
        key: "typeStatus",
        weight: 2.0,
        score: |s, r| exact_ci(&s.type_status, &r.type_status),
    },
    FieldEntry {
        key: "basisOfRecord",
        weight: 2.0,
        score: |s, r| exact_ci(&s.basis_of_record, &r.basis_of_record),
    },
    FieldEntry {
        key: "recordedBy",
        weight: 2.0,
        score: |s, r| jaro_winkler(&s.recorded_by, &r.recorded_by),
    },
    FieldEntry {
        key: "recordNumber",
        weight: 2.0,
        score: |s, r| exact_ci(&s.record_number, &r.record_number),
    },
    FieldEntry {
        key: "recordedByIDs",
        weight: 2.0,
        score: |s, r| set_intersection_nonempty(&s.recorded_by_ids, &r.recorded_by_ids),
    },
    FieldEntry {
        key: "collectionCode",
        weight: 2.0,
        score: |s, r| exact_or_include(&s.collection_code, &r.collection_code),
    },
    FieldEntry {
        key: "catalogNumber",
        weight: 2.0,
        score: |s, r| exact_or_include(&s.catalog_number, &r.catalog_number),
    },
    FieldEntry {
        key: "individualCount",
        weight: 1.0,
        score: |s, r| numeric_ratio(s.individual_count.map(|v| v as f64), r.individual_count.map(|v| v as f64)),
    },
    FieldEntry {
        key: "family",
        weight: 1.0,
        score: |s, r| jaro_winkler(&s.family, &r.family),
    },
    FieldEntry {
        key: "genus",
        weight: 1.0,
        score: |s, r| jaro_winkler(&s.genus, &r.genus),
    },
    FieldEntry {
        key: "specificEpithet",
        weight: 1.0,
        score: |s, r| jaro_winkler(&s.specific_epithet, &r.specific_epithet),
    },
    FieldEntry {
        key: "country",
        weight: 1.0,
        score: |s, r| exact_ci(&s.country, &r.country),
    },
    FieldEntry {
        key: "city",
        weight: 1.0,
        score: |s, r| jaro_winkler(s.city.as_deref().unwrap_or(""), r.city.as_deref().unwrap_or("")),
    },
    FieldEntry {
        key: "locality",
        weight: 0.5,
        score: |s, r| {
            jaro_winkler(
                s.locality.as_deref().unwrap_or(""),
                r.locality.as_deref().unwrap_or(""),
            )
        },
    },
    FieldEntry {
        key: "elevation",
        weight: 1.0,
        score: |s, r| numeric_ratio(s.elevation, r.elevation),
    },
    FieldEntry {
        key: "year",
        weight: 1.0,
        score: |s, r| date_decay(s.year, s.month, s.day, r.year, r.month, r.day),
    },
    FieldEntry {
        key: "decimalLatitude",
        weight: 2.0,
        score: |s, r| haversine_decay(s.latitude, s.longitude, r.latitude, r.longitude),
    },
];
