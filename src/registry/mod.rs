// Persisted, CRUD-managed query definitions
mod ndjson;
mod service;
mod types;

pub use ndjson::load_queries_ndjson;
pub use service::QueryRegistry;
pub use types::{DEFAULT_CACHE_TIMEOUT_SECONDS, QueryDraft, QueryPatch, StoredQuery};
