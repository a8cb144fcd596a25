use pyo3::exceptions::PyValueError;
use pyo3::PyErr;

/// Outcome classes recognized by the core.
///
/// Only the recoverable class — a registered numeric field that is neither
/// absent nor parseable — is represented here. Internal invariant violations
/// (a registry entry missing at lookup time) are not reachable: `score`
/// iterates the registry itself rather than looking values up into it, so
/// there is nothing for a third error variant to report.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("malformed value for field `{field}`: {raw_value}")]
    MalformedField { field: &'static str, raw_value: String },
}

impl From<MatchError> for PyErr {
    fn from(err: MatchError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
