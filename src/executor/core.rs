use crate::binder::bind;
use crate::catalogue::{Catalogue, MessageKind};
use crate::criteria;
use crate::definition::{OperationKind, QueryDefinition};
use crate::errors::QueryError;
use crate::logger::AUDIT_TARGET;
use crate::registry::{QueryRegistry, StoredQuery};
use crate::response::{ExecutionResult, Payload};
use crate::store::{DocumentStore, MemoryStore};
use crate::types::{ParameterSet, QueryDefinitionsByEntity};
use crate::utils::json::{bson_document_to_json, json_value_to_bson_document, parse_relaxed};
use bson::Document as BsonDocument;
use log::{info, warn};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

use super::info::{ServiceStatus, documentation};

const SUCCESS_KEY: &str = "query_executed";
const FAILURE_KEY: &str = "execution_failed";

/// Stateless per call; shares only the read-only catalogue and the stores.
#[derive(Clone)]
pub struct QueryExecutor {
    catalogue: Arc<Catalogue>,
    store: Arc<dyn DocumentStore>,
    registry: QueryRegistry,
}

impl std::fmt::Debug for QueryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExecutor")
            .field("mappings", &self.catalogue.mapping_count())
            .finish_non_exhaustive()
    }
}

impl QueryExecutor {
    #[must_use]
    pub fn new(catalogue: Arc<Catalogue>, store: Arc<dyn DocumentStore>, registry: QueryRegistry) -> Self {
        Self { catalogue, store, registry }
    }

    /// Executor whose documents and stored queries both live in `store`.
    #[must_use]
    pub fn in_memory(catalogue: Arc<Catalogue>, store: Arc<MemoryStore>) -> Self {
        let registry = QueryRegistry::new(store.clone());
        Self::new(catalogue, store, registry)
    }

    #[must_use]
    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    #[must_use]
    pub fn registry(&self) -> &QueryRegistry {
        &self.registry
    }

    /// Run a catalogue query; failures come back as `success = false`.
    pub fn execute_by_name(&self, name: &str, params: &ParameterSet) -> ExecutionResult {
        let started = Instant::now();
        let result = match self.try_execute_by_name(name, params) {
            Ok(payload) => {
                ExecutionResult::success(self.catalogue.get_message(MessageKind::Success, SUCCESS_KEY), payload)
            }
            Err(e) => {
                warn!("query {name} failed: {e}");
                ExecutionResult::failure(self.catalogue.get_message(MessageKind::Error, FAILURE_KEY), &e)
            }
        };
        let result = result.with_query_name(Some(name)).with_duration_ms(elapsed_ms(started));
        audit(&result);
        result
    }

    pub fn try_execute_by_name(&self, name: &str, params: &ParameterSet) -> Result<Payload, QueryError> {
        let def = self.catalogue.lookup(name)?;
        let merged = def.merge_parameters(Some(params));
        self.run(&def, &merged)
    }

    /// Run a stored query. A stored success or error message replaces the
    /// catalogue one.
    pub fn execute_by_id(&self, id: &str, params: Option<&ParameterSet>) -> ExecutionResult {
        let started = Instant::now();
        let mut resolved: Option<StoredQuery> = None;
        let outcome = self
            .registry
            .resolve(id, self.catalogue.type_hints())
            .and_then(|(query, def)| {
                let merged = def.merge_parameters(params);
                let run = self.run(&def, &merged);
                resolved = Some(query);
                run
            });
        let result = match outcome {
            Ok(payload) => {
                let msg = resolved
                    .as_ref()
                    .and_then(|q| q.success_message.clone())
                    .unwrap_or_else(|| self.catalogue.get_message(MessageKind::Success, SUCCESS_KEY).to_string());
                ExecutionResult::success(msg, payload)
            }
            Err(e) => {
                warn!("stored query {id} failed: {e}");
                let msg = resolved
                    .as_ref()
                    .and_then(|q| q.error_message.clone())
                    .unwrap_or_else(|| self.catalogue.get_message(MessageKind::Error, FAILURE_KEY).to_string());
                ExecutionResult::failure(msg, &e)
            }
        };
        let mut result = result
            .with_query_id(Some(id))
            .with_query_name(resolved.as_ref().map(|q| q.name.as_str()))
            .with_duration_ms(elapsed_ms(started));
        if let Some(q) = &resolved {
            result = result
                .with_metadata("collection", q.collection.as_str())
                .with_metadata("cacheable", q.cacheable)
                .with_metadata("cacheTimeoutSeconds", q.cache_timeout_seconds);
        }
        audit(&result);
        result
    }

    pub fn try_execute_by_id(&self, id: &str, params: Option<&ParameterSet>) -> Result<Payload, QueryError> {
        let (_, def) = self.registry.resolve(id, self.catalogue.type_hints())?;
        let merged = def.merge_parameters(params);
        self.run(&def, &merged)
    }

    /// `false` for a bad name, an unknown query or a missing required parameter.
    #[must_use]
    pub fn validate_parameters(&self, name: &str, params: &ParameterSet) -> bool {
        match self.catalogue.lookup(name) {
            Ok(def) => {
                let missing = def.missing_parameters(params);
                if !missing.is_empty() {
                    info!("validation of {name}: missing {}", missing.join(", "));
                }
                missing.is_empty()
            }
            Err(e) => {
                info!("validation of {name}: {e}");
                false
            }
        }
    }

    #[must_use]
    pub fn list_mappings(&self) -> QueryDefinitionsByEntity {
        self.catalogue.definitions()
    }

    #[must_use]
    pub fn sample_queries(&self) -> &Value {
        self.catalogue.sample_queries()
    }

    #[must_use]
    pub fn documentation(&self) -> Value {
        documentation()
    }

    #[must_use]
    pub fn status(&self) -> ServiceStatus {
        let mapping_count = self.catalogue.mapping_count();
        let (status, active_stored_queries) = match self.registry.count_active() {
            Ok(n) => ("UP", Some(n)),
            Err(e) => {
                warn!("status: stored query registry unavailable: {e}");
                ("DEGRADED", None)
            }
        };
        ServiceStatus {
            status,
            service: "Dynamic Query Service",
            configuration_loaded: mapping_count > 0,
            mapping_count,
            active_stored_queries,
            timestamp: chrono::Utc::now(),
        }
    }

    // Bind, parse and dispatch one resolved definition.
    fn run(&self, def: &QueryDefinition, params: &ParameterSet) -> Result<Payload, QueryError> {
        let bound = bind(&def.template, params, &def.variable_type_hints)?;
        crate::devtrace!("{}: bound {}", def.name, bound);
        let parsed = parse_relaxed(&bound).map_err(|e| {
            QueryError::MalformedFilter(format!("bound query for {} is not valid JSON: {e}", def.name))
        })?;
        let collection = def.target_collection.as_str();
        let payload = match def.operation_kind {
            OperationKind::Find => {
                let filter = criteria::build(&parsed)?;
                crate::devtrace!("{}: FIND on {collection} with {} clause(s)", def.name, filter.clause_count());
                let docs = self.store.find(collection, &filter)?;
                Payload::Documents(docs.iter().map(bson_document_to_json).collect())
            }
            OperationKind::Aggregate => {
                let stages = pipeline(&parsed)?;
                crate::devtrace!("{}: AGGREGATE on {collection} with {} stage(s)", def.name, stages.len());
                let mut docs = self.store.aggregate(collection, &stages)?;
                if ends_with_count(&stages) && docs.len() == 1 {
                    Payload::Document(docs.pop().map(|d| bson_document_to_json(&d)).unwrap_or_default())
                } else {
                    Payload::Documents(docs.iter().map(bson_document_to_json).collect())
                }
            }
            OperationKind::Count => {
                let filter = criteria::build(&parsed)?;
                crate::devtrace!("{}: COUNT on {collection} with {} clause(s)", def.name, filter.clause_count());
                Payload::Count(self.store.count(collection, &filter)?)
            }
        };
        Ok(payload)
    }
}

fn pipeline(parsed: &Value) -> Result<Vec<BsonDocument>, QueryError> {
    let stages = parsed.as_array().ok_or_else(|| {
        QueryError::MalformedFilter("aggregation pipeline must be a JSON array".to_string())
    })?;
    stages
        .iter()
        .enumerate()
        .map(|(i, stage)| {
            json_value_to_bson_document(stage)
                .map_err(|e| QueryError::MalformedFilter(format!("pipeline stage {i}: {e}")))
        })
        .collect()
}

fn ends_with_count(stages: &[BsonDocument]) -> bool {
    stages.last().is_some_and(|s| s.contains_key("$count"))
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn audit(result: &ExecutionResult) {
    info!(
        target: AUDIT_TARGET,
        "query name={} id={} success={} kind={} results={} ms={}",
        result.query_name.as_deref().unwrap_or("-"),
        result.query_id.as_deref().unwrap_or("-"),
        result.success,
        result.error_kind().map_or_else(|| "-".to_string(), |k| k.to_string()),
        result.result_count,
        result.execution_duration_ms
    );
}
