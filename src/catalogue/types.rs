use crate::definition::OperationKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One named query inside the catalogue resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMapping {
    pub query: String,
    pub collection: String,
    #[serde(rename = "type")]
    pub kind: OperationKind,
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Success and error message tables keyed by short codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Messages {
    #[serde(default)]
    pub success: HashMap<String, String>,
    #[serde(default)]
    pub error: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

/// On-disk shape of the catalogue resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueFile {
    #[serde(default)]
    pub messages: Messages,
    #[serde(default)]
    pub query_mappings: BTreeMap<String, BTreeMap<String, QueryMapping>>,
    #[serde(default)]
    pub variable_mappings: HashMap<String, String>,
    #[serde(default)]
    pub sample_queries: serde_json::Value,
}
