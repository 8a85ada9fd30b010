//! Uniform success/failure envelope returned by the executor.

use crate::errors::{ErrorKind, QueryError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome of a dispatched operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Count(u64),
    Documents(Vec<Value>),
    Document(Value),
}

impl Payload {
    /// 1 for a count or single document, N for a sequence.
    #[must_use]
    pub fn result_count(&self) -> u64 {
        match self {
            Self::Count(_) | Self::Document(_) => 1,
            Self::Documents(docs) => docs.len() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&QueryError> for ExecutionError {
    fn from(e: &QueryError) -> Self {
        Self { kind: e.kind(), message: e.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Payload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
    pub execution_time: DateTime<Utc>,
    pub execution_duration_ms: u64,
    pub result_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ExecutionError>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl ExecutionResult {
    #[must_use]
    pub fn success(message: impl Into<String>, data: Payload) -> Self {
        Self {
            success: true,
            message: message.into(),
            result_count: data.result_count(),
            data: Some(data),
            query_name: None,
            query_id: None,
            execution_time: Utc::now(),
            execution_duration_ms: 0,
            error: None,
            metadata: Map::new(),
        }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>, err: &QueryError) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            query_name: None,
            query_id: None,
            execution_time: Utc::now(),
            execution_duration_ms: 0,
            result_count: 0,
            error: Some(err.into()),
            metadata: Map::new(),
        }
    }

    #[must_use]
    pub fn with_query_name(mut self, name: Option<&str>) -> Self {
        self.query_name = name.map(str::to_string);
        self
    }

    #[must_use]
    pub fn with_query_id(mut self, id: Option<&str>) -> Self {
        self.query_id = id.map(str::to_string);
        self
    }

    #[must_use]
    pub fn with_duration_ms(mut self, ms: u64) -> Self {
        self.execution_duration_ms = ms;
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn result_count_by_payload() {
        assert_eq!(Payload::Documents(vec![]).result_count(), 0);
        assert_eq!(Payload::Documents(vec![json!({}), json!({})]).result_count(), 2);
        assert_eq!(Payload::Document(json!({"count": 3})).result_count(), 1);
        assert_eq!(Payload::Count(42).result_count(), 1);
    }

    #[test]
    fn failure_carries_kind_and_ids() {
        let err = QueryError::UnknownEntity("bogus".into());
        let r = ExecutionResult::failure("Query execution failed", &err).with_query_name(Some("bogus.op"));
        assert!(!r.success);
        assert_eq!(r.result_count, 0);
        assert_eq!(r.error_kind(), Some(ErrorKind::UnknownQuery));
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["queryName"], json!("bogus.op"));
        assert_eq!(v["error"]["kind"], json!("UnknownQuery"));
        assert!(v.get("data").is_none());
    }

    #[test]
    fn count_serializes_as_integer() {
        let r = ExecutionResult::success("ok", Payload::Count(7));
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["data"], json!(7));
        assert_eq!(v["resultCount"], json!(1));
        assert_eq!(v["success"], json!(true));
    }
}
