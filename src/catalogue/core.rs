use crate::definition::QueryDefinition;
use crate::errors::QueryError;
use crate::types::{ParameterSet, TypeHints};
use std::collections::BTreeMap;
use std::path::Path;

use super::types::{CatalogueFile, MessageKind, QueryMapping};

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Operation completed successfully";
pub const DEFAULT_ERROR_MESSAGE: &str = "Operation failed";

/// Immutable table of named queries, loaded once and shared read-only.
#[derive(Debug, Clone)]
pub struct Catalogue {
    file: CatalogueFile,
}

/// Split `entity.operation`. Anything but two non-empty parts is rejected.
pub fn split_name(name: &str) -> Result<(&str, &str), QueryError> {
    let mut parts = name.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(entity), Some(operation), None) if !entity.is_empty() && !operation.is_empty() => {
            Ok((entity, operation))
        }
        _ => Err(QueryError::InvalidQueryName(name.to_string())),
    }
}

impl Catalogue {
    /// Read and validate the catalogue resource at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, QueryError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| QueryError::CatalogueLoad(format!("{}: {e}", path.display())))?;
        let catalogue = Self::from_json_str(&text)?;
        log::info!(
            "query catalogue loaded from {}: {} mapping(s)",
            path.display(),
            catalogue.mapping_count()
        );
        Ok(catalogue)
    }

    pub fn from_json_str(text: &str) -> Result<Self, QueryError> {
        let file: CatalogueFile =
            serde_json::from_str(text).map_err(|e| QueryError::CatalogueLoad(e.to_string()))?;
        Self::from_file(file)
    }

    pub fn from_file(file: CatalogueFile) -> Result<Self, QueryError> {
        for (entity, ops) in &file.query_mappings {
            for (operation, mapping) in ops {
                let name = format!("{entity}.{operation}");
                if split_name(&name).is_err() {
                    return Err(QueryError::CatalogueLoad(format!(
                        "mapping name `{name}` is not of the form entity.operation"
                    )));
                }
                if mapping.collection.trim().is_empty() {
                    return Err(QueryError::CatalogueLoad(format!("mapping `{name}` has no collection")));
                }
            }
        }
        Ok(Self { file })
    }

    /// Resolve a dotted name to a ready-to-bind definition.
    pub fn lookup(&self, name: &str) -> Result<QueryDefinition, QueryError> {
        let (entity, operation) = split_name(name)?;
        let ops = self
            .file
            .query_mappings
            .get(entity)
            .ok_or_else(|| QueryError::UnknownEntity(entity.to_string()))?;
        let mapping = ops.get(operation).ok_or_else(|| QueryError::UnknownOperation {
            entity: entity.to_string(),
            operation: operation.to_string(),
        })?;
        Ok(self.definition(name, mapping))
    }

    fn definition(&self, name: &str, mapping: &QueryMapping) -> QueryDefinition {
        QueryDefinition {
            name: name.to_string(),
            template: mapping.query.clone(),
            operation_kind: mapping.kind,
            target_collection: mapping.collection.clone(),
            required_parameters: mapping.parameters.clone(),
            default_parameters: ParameterSet::new(),
            variable_type_hints: self.file.variable_mappings.clone(),
        }
    }

    /// Configured message, or a generic fallback when `key` is unknown.
    #[must_use]
    pub fn get_message(&self, kind: MessageKind, key: &str) -> &str {
        let (table, fallback) = match kind {
            MessageKind::Success => (&self.file.messages.success, DEFAULT_SUCCESS_MESSAGE),
            MessageKind::Error => (&self.file.messages.error, DEFAULT_ERROR_MESSAGE),
        };
        table.get(key).map_or(fallback, String::as_str)
    }

    #[must_use]
    pub fn mappings(&self) -> &BTreeMap<String, BTreeMap<String, QueryMapping>> {
        &self.file.query_mappings
    }

    /// Every mapping resolved to its definition, grouped by entity.
    #[must_use]
    pub fn definitions(&self) -> BTreeMap<String, BTreeMap<String, QueryDefinition>> {
        self.file
            .query_mappings
            .iter()
            .map(|(entity, ops)| {
                let defs = ops
                    .iter()
                    .map(|(op, m)| (op.clone(), self.definition(&format!("{entity}.{op}"), m)))
                    .collect();
                (entity.clone(), defs)
            })
            .collect()
    }

    #[must_use]
    pub fn sample_queries(&self) -> &serde_json::Value {
        &self.file.sample_queries
    }

    #[must_use]
    pub fn type_hints(&self) -> &TypeHints {
        &self.file.variable_mappings
    }

    #[must_use]
    pub fn mapping_count(&self) -> usize {
        self.file.query_mappings.values().map(BTreeMap::len).sum()
    }
}
