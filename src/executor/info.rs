use crate::definition::OperationKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};

/// Health report of the executor and its catalogue.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    /// `UP`, or `DEGRADED` when stored queries cannot be read.
    pub status: &'static str,
    pub service: &'static str,
    pub configuration_loaded: bool,
    pub mapping_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_stored_queries: Option<usize>,
    pub timestamp: DateTime<Utc>,
}

pub(crate) fn documentation() -> Value {
    let kinds: Vec<&str> = OperationKind::ALL.iter().map(|k| k.as_str()).collect();
    json!({
        "description": "Executes predefined queries with ${parameterName} substitution",
        "version": env!("CARGO_PKG_VERSION"),
        "operations": {
            "run": "Execute a catalogue query by entity.operation name",
            "run-stored": "Execute a stored query by id, stored parameters under caller parameters",
            "mappings": "List catalogue query mappings",
            "samples": "Show sample queries",
            "validate": "Check a query name and its required parameters"
        },
        "queryFormat": "Queries use ${parameterName} syntax for parameter substitution",
        "typeHints": {
            "String": "rendered as a single-quoted literal",
            "default": "rendered as bare text"
        },
        "supportedTypes": kinds,
        "timestamp": Utc::now().to_rfc3339(),
    })
}
