use bson::Document as BsonDocument;
use dynaquery::filter::Filter;
use dynaquery::store::{DocumentStore, MemoryStore, load_ndjson};
use dynaquery::{Catalogue, QueryExecutor, QueryRegistry, StoreError};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

pub const USERS: &str = r#"{"_id": "u1", "name": "Ann", "age": 17, "university": "MIT", "active": true}
{"_id": "u2", "name": "Bob", "age": 18, "university": "MIT", "active": false}
{"_id": "u3", "name": "Alice", "age": 25, "university": "CMU", "active": true}
{"_id": "u4", "name": "Dan", "age": 30, "university": "MIT", "active": true}
{"_id": "u5", "name": "Eve", "age": 31, "university": "ETH", "active": false}
"#;

pub const CARTS: &str = r#"{"_id": "c1", "userId": "u1", "status": "ACTIVE", "total": 10}
{"_id": "c2", "userId": "u1", "status": "ACTIVE", "total": 15}
{"_id": "c3", "userId": "u3", "status": "ACTIVE", "total": 40}
{"_id": "c4", "userId": "u4", "status": "CANCELLED", "total": 5}
{"_id": "c5", "userId": "u4", "status": "PENDING", "total": 8}
"#;

pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/query-config.json")
}

pub fn fixture_catalogue() -> Arc<Catalogue> {
    Arc::new(Catalogue::load(fixture_path()).unwrap())
}

pub fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    load_ndjson(&store, "user", USERS.as_bytes()).unwrap();
    load_ndjson(&store, "cart", CARTS.as_bytes()).unwrap();
    store
}

pub fn executor() -> QueryExecutor {
    QueryExecutor::in_memory(fixture_catalogue(), seeded_store())
}

/// Records every dispatched call before delegating to a memory store.
#[derive(Default)]
pub struct RecordingStore {
    pub inner: MemoryStore,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl RecordingStore {
    pub fn seeded() -> Self {
        let s = Self::default();
        load_ndjson(&s.inner, "user", USERS.as_bytes()).unwrap();
        s
    }

    fn record(&self, op: &str, collection: &str) {
        self.calls.lock().push((op.to_string(), collection.to_string()));
    }
}

impl DocumentStore for RecordingStore {
    fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<BsonDocument>, StoreError> {
        self.record("find", collection);
        self.inner.find(collection, filter)
    }

    fn aggregate(&self, collection: &str, pipeline: &[BsonDocument]) -> Result<Vec<BsonDocument>, StoreError> {
        self.record("aggregate", collection);
        self.inner.aggregate(collection, pipeline)
    }

    fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        self.record("count", collection);
        self.inner.count(collection, filter)
    }
}

pub fn recording_executor() -> (QueryExecutor, Arc<RecordingStore>) {
    let store = Arc::new(RecordingStore::seeded());
    let registry = QueryRegistry::new(Arc::new(MemoryStore::new()));
    (QueryExecutor::new(fixture_catalogue(), store.clone(), registry), store)
}

pub fn params(v: serde_json::Value) -> dynaquery::ParameterSet {
    serde_json::from_value(v).unwrap()
}
