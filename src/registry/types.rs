use crate::definition::{OperationKind, QueryDefinition};
use crate::types::{ParameterSet, QueryId, TypeHints};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CACHE_TIMEOUT_SECONDS: u64 = 300;

const fn default_cache_timeout() -> u64 {
    DEFAULT_CACHE_TIMEOUT_SECONDS
}

const fn default_active() -> bool {
    true
}

/// A query definition persisted in the `query` collection.
///
/// `parameters` holds defaults merged underneath caller values;
/// `cacheable` and `cache_timeout_seconds` are advisory and only forwarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredQuery {
    #[serde(rename = "_id")]
    pub id: QueryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub query_content: String,
    pub query_type: OperationKind,
    pub collection: String,
    #[serde(default)]
    pub parameters: ParameterSet,
    #[serde(default)]
    pub variable_mappings: TypeHints,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub cacheable: bool,
    #[serde(default = "default_cache_timeout")]
    pub cache_timeout_seconds: u64,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoredQuery {
    /// Resolve into an executable definition. Own variable mappings override
    /// the shared `global_hints`; every placeholder is required.
    #[must_use]
    pub fn definition(&self, global_hints: &TypeHints) -> QueryDefinition {
        let mut hints = global_hints.clone();
        hints.extend(self.variable_mappings.iter().map(|(k, v)| (k.clone(), v.clone())));
        QueryDefinition {
            name: self.name.clone(),
            template: self.query_content.clone(),
            operation_kind: self.query_type,
            target_collection: self.collection.clone(),
            required_parameters: crate::binder::placeholders(&self.query_content),
            default_parameters: self.parameters.clone(),
            variable_type_hints: hints,
        }
    }
}

/// Input for creating a stored query. `query_type` is validated on create.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryDraft {
    pub name: String,
    pub description: Option<String>,
    pub query_content: String,
    pub query_type: String,
    pub collection: String,
    pub parameters: ParameterSet,
    pub variable_mappings: TypeHints,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub category: Option<String>,
    pub cacheable: bool,
    pub cache_timeout_seconds: Option<u64>,
    pub created_by: Option<String>,
}

impl QueryDraft {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        query_content: impl Into<String>,
        query_type: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            query_content: query_content.into(),
            query_type: query_type.into(),
            collection: collection.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }
}

/// Partial update; `None` leaves the stored field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub query_content: Option<String>,
    pub query_type: Option<String>,
    pub collection: Option<String>,
    pub parameters: Option<ParameterSet>,
    pub variable_mappings: Option<TypeHints>,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub category: Option<String>,
    pub cacheable: Option<bool>,
    pub cache_timeout_seconds: Option<u64>,
    pub last_modified_by: Option<String>,
}
