//! The unit of work shared by the catalogue and the stored query registry.

use crate::errors::QueryError;
use crate::types::{ParameterSet, TypeHints};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of executable behaviours.
///
/// Unknown kinds are rejected when a definition is parsed, so dispatch never
/// sees anything outside these three variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", rename_all = "UPPERCASE")]
pub enum OperationKind {
    Find,
    Aggregate,
    Count,
}

impl OperationKind {
    pub const ALL: [Self; 3] = [Self::Find, Self::Aggregate, Self::Count];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Find => "FIND",
            Self::Aggregate => "AGGREGATE",
            Self::Count => "COUNT",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FIND" => Ok(Self::Find),
            "AGGREGATE" => Ok(Self::Aggregate),
            "COUNT" => Ok(Self::Count),
            _ => Err(QueryError::UnsupportedOperation(s.to_string())),
        }
    }
}

impl TryFrom<String> for OperationKind {
    type Error = QueryError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A resolved query ready for binding and dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryDefinition {
    pub name: String,
    pub template: String,
    pub operation_kind: OperationKind,
    pub target_collection: String,
    pub required_parameters: Vec<String>,
    pub default_parameters: ParameterSet,
    pub variable_type_hints: TypeHints,
}

impl QueryDefinition {
    /// Stored defaults first, caller values layered on top.
    #[must_use]
    pub fn merge_parameters(&self, caller: Option<&ParameterSet>) -> ParameterSet {
        let mut merged = self.default_parameters.clone();
        if let Some(caller) = caller {
            for (k, v) in caller {
                merged.insert(k.clone(), v.clone());
            }
        }
        merged
    }

    /// Names from `required_parameters` that are absent from `params`.
    #[must_use]
    pub fn missing_parameters(&self, params: &ParameterSet) -> Vec<&str> {
        self.required_parameters
            .iter()
            .filter(|p| !params.contains_key(p.as_str()))
            .map(String::as_str)
            .collect()
    }
}
