use crate::collection::{Collection, ID_FIELD};
use crate::errors::StoreError;
use crate::filter::Filter;
use crate::registry::StoredQuery;
use crate::types::CollectionName;
use crate::utils::json::{bson_document_to_json, json_value_to_bson_document};
use bson::{Bson, Document as BsonDocument};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::aggregate::run_pipeline;
use super::{DocumentStore, QueryStore};

/// Collection holding stored query definitions.
pub const QUERY_COLLECTION: &str = "query";

/// In-process document store. Unknown collections read as empty.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<CollectionName, Arc<Collection>>>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").field("collections", &self.list_collection_names()).finish()
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the named collection, creating it when absent.
    pub fn create_collection(&self, name: &str) -> Arc<Collection> {
        if let Some(c) = self.collections.read().get(name) {
            return c.clone();
        }
        let mut cols = self.collections.write();
        cols.entry(name.to_string()).or_insert_with(|| Arc::new(Collection::new(name))).clone()
    }

    #[must_use]
    pub fn get_collection(&self, name: &str) -> Option<Arc<Collection>> {
        self.collections.read().get(name).cloned()
    }

    #[must_use]
    pub fn list_collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn insert(&self, collection: &str, document: BsonDocument) -> Result<String, StoreError> {
        self.create_collection(collection).insert_document(document)
    }

    /// Inserts a JSON object, converting it to BSON first.
    pub fn insert_json(
        &self,
        collection: &str,
        document: &serde_json::Value,
    ) -> Result<String, StoreError> {
        let doc = json_value_to_bson_document(document).map_err(StoreError::InvalidDocument)?;
        self.insert(collection, doc)
    }
}

impl DocumentStore for MemoryStore {
    fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<BsonDocument>, StoreError> {
        let docs = self.get_collection(collection).map(|c| c.matching(filter)).unwrap_or_default();
        log::debug!("find on '{collection}' matched {} document(s)", docs.len());
        Ok(docs)
    }

    fn aggregate(
        &self,
        collection: &str,
        pipeline: &[BsonDocument],
    ) -> Result<Vec<BsonDocument>, StoreError> {
        let input = self.get_collection(collection).map(|c| c.get_all_documents()).unwrap_or_default();
        let out = run_pipeline(input, pipeline)?;
        log::debug!(
            "aggregate on '{collection}' ran {} stage(s), produced {} document(s)",
            pipeline.len(),
            out.len()
        );
        Ok(out)
    }

    fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let n = self.get_collection(collection).map_or(0, |c| c.count_matching(filter));
        Ok(u64::try_from(n).unwrap_or(u64::MAX))
    }
}

fn encode_query(query: &StoredQuery) -> Result<BsonDocument, StoreError> {
    let value = serde_json::to_value(query)?;
    json_value_to_bson_document(&value).map_err(StoreError::InvalidDocument)
}

fn decode_query(doc: &BsonDocument) -> Result<StoredQuery, StoreError> {
    let id = doc.get(ID_FIELD).map(Bson::to_string).unwrap_or_default();
    serde_json::from_value(bson_document_to_json(doc))
        .map_err(|e| StoreError::Decode(format!("stored query {id}: {e}")))
}

impl QueryStore for MemoryStore {
    fn find_by_id(&self, id: &str) -> Result<Option<StoredQuery>, StoreError> {
        self.get_collection(QUERY_COLLECTION)
            .and_then(|c| c.find_document(id))
            .map(|d| decode_query(&d))
            .transpose()
    }

    fn find_by_name(&self, name: &str) -> Result<Option<StoredQuery>, StoreError> {
        let Some(col) = self.get_collection(QUERY_COLLECTION) else {
            return Ok(None);
        };
        let filter = Filter::Cmp {
            path: "name".into(),
            op: crate::filter::CmpOp::Eq,
            value: Bson::String(name.to_string()),
        };
        col.matching(&filter).first().map(decode_query).transpose()
    }

    fn insert(&self, query: &StoredQuery) -> Result<(), StoreError> {
        self.insert(QUERY_COLLECTION, encode_query(query)?).map(|_| ())
    }

    fn replace(&self, query: &StoredQuery) -> Result<(), StoreError> {
        self.get_collection(QUERY_COLLECTION)
            .ok_or_else(|| StoreError::NoSuchDocument(query.id.clone()))?
            .replace_document(encode_query(query)?)
    }

    fn list(&self) -> Result<Vec<StoredQuery>, StoreError> {
        self.get_collection(QUERY_COLLECTION)
            .map(|c| c.get_all_documents())
            .unwrap_or_default()
            .iter()
            .map(decode_query)
            .collect()
    }
}
