//! Document-store collaborators consumed by the executor and the registry.

mod aggregate;
mod memory;
mod ndjson;

pub use aggregate::run_pipeline;
pub use memory::{MemoryStore, QUERY_COLLECTION};
pub use ndjson::{load_ndjson, load_ndjson_dir};

use crate::errors::StoreError;
use crate::filter::Filter;
use crate::registry::StoredQuery;
use bson::Document as BsonDocument;

/// Read operations the executor dispatches to.
///
/// Each call is a single blocking operation; timeouts and connection
/// failures surface as `StoreError`.
pub trait DocumentStore: Send + Sync {
    fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<BsonDocument>, StoreError>;

    fn aggregate(
        &self,
        collection: &str,
        pipeline: &[BsonDocument],
    ) -> Result<Vec<BsonDocument>, StoreError>;

    fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;
}

/// Persistence for stored query definitions.
pub trait QueryStore: Send + Sync {
    fn find_by_id(&self, id: &str) -> Result<Option<StoredQuery>, StoreError>;

    fn find_by_name(&self, name: &str) -> Result<Option<StoredQuery>, StoreError>;

    fn exists_by_name(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.find_by_name(name)?.is_some())
    }

    fn insert(&self, query: &StoredQuery) -> Result<(), StoreError>;

    fn replace(&self, query: &StoredQuery) -> Result<(), StoreError>;

    fn list(&self) -> Result<Vec<StoredQuery>, StoreError>;
}
