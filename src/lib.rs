//! Configuration-defined, parameterized queries over a document store.
//!
//! A [`Catalogue`] of named templates is loaded once and handed to a
//! [`QueryExecutor`], which binds `${name}` placeholders, builds store
//! filters or pipelines and returns an [`ExecutionResult`]. Stored queries
//! managed through the [`QueryRegistry`] run through the same path.

pub mod binder;
pub mod catalogue;
pub mod cli;
pub mod collection;
pub mod config;
pub mod criteria;
pub mod definition;
pub mod errors;
pub mod executor;
pub mod filter;
pub mod logger;
pub mod registry;
pub mod response;
pub mod store;
pub mod types;
pub mod utils;

pub use catalogue::Catalogue;
pub use definition::{OperationKind, QueryDefinition};
pub use errors::{ErrorKind, QueryError, StoreError};
pub use executor::QueryExecutor;
pub use registry::{QueryDraft, QueryPatch, QueryRegistry, StoredQuery};
pub use response::{ExecutionResult, Payload};
pub use store::{DocumentStore, MemoryStore, QueryStore};
pub use types::ParameterSet;

use std::path::Path;
use std::sync::Arc;

/// Load the catalogue at `path` and build an executor over a fresh in-memory
/// store. Catalogue errors are returned before anything can execute.
pub fn open(path: impl AsRef<Path>) -> Result<(QueryExecutor, Arc<MemoryStore>), QueryError> {
    let catalogue = Arc::new(Catalogue::load(path)?);
    let store = Arc::new(MemoryStore::new());
    Ok((QueryExecutor::in_memory(catalogue, store.clone()), store))
}

/// Install file logging from `DYNAQUERY_LOG_*` environment variables.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    logger::configure_from_env()
}
