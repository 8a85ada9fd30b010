use crate::errors::QueryError;
use crate::types::ParameterSet;

/// Parse a `--params` argument. Absent or blank input is an empty set.
pub fn parse_params(raw: Option<&str>) -> Result<ParameterSet, QueryError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(ParameterSet::new()),
        Some(text) => serde_json::from_str(text).map_err(|e| {
            QueryError::InvalidDefinition(format!("--params must be a JSON object: {e}"))
        }),
    }
}
