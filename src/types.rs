use serde_json::Value;
use std::collections::HashMap;

pub type CollectionName = String;
pub type QueryId = String;

/// Caller-supplied parameters, keyed by placeholder name.
pub type ParameterSet = HashMap<String, Value>;

/// Parameter name to rendering type (`"String"`, `"Integer"`, ...).
pub type TypeHints = HashMap<String, String>;

/// Catalogue definitions grouped by entity, then operation.
pub type QueryDefinitionsByEntity =
    std::collections::BTreeMap<String, std::collections::BTreeMap<String, crate::definition::QueryDefinition>>;
