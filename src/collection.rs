use crate::errors::StoreError;
use crate::filter::{Filter, eval_filter};
use bson::{Bson, Document as BsonDocument};
use parking_lot::RwLock;
use uuid::Uuid;

/// Field holding a document's identity.
pub const ID_FIELD: &str = "_id";

/// An in-memory, insertion-ordered set of BSON documents.
pub struct Collection {
    name: String,
    docs: RwLock<Vec<BsonDocument>>,
}

impl Collection {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), docs: RwLock::new(Vec::new()) }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts a document, assigning a UUID `_id` when missing. Returns the id.
    pub fn insert_document(&self, mut document: BsonDocument) -> Result<String, StoreError> {
        let id = match document.get(ID_FIELD) {
            Some(Bson::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => {
                let id = Uuid::new_v4().to_string();
                document.insert(ID_FIELD, id.clone());
                id
            }
        };
        let mut docs = self.docs.write();
        if docs.iter().any(|d| doc_id(d).as_deref() == Some(id.as_str())) {
            return Err(StoreError::DuplicateKey(format!("{}.{ID_FIELD}={id}", self.name)));
        }
        docs.push(document);
        Ok(id)
    }

    #[must_use]
    pub fn find_document(&self, id: &str) -> Option<BsonDocument> {
        self.docs.read().iter().find(|d| doc_id(d).as_deref() == Some(id)).cloned()
    }

    /// Replaces the document with the same `_id`, keeping its position.
    pub fn replace_document(&self, document: BsonDocument) -> Result<(), StoreError> {
        let id = doc_id(&document)
            .ok_or_else(|| StoreError::InvalidDocument(format!("missing {ID_FIELD}")))?;
        let mut docs = self.docs.write();
        let slot = docs
            .iter_mut()
            .find(|d| doc_id(d).as_deref() == Some(id.as_str()))
            .ok_or_else(|| StoreError::NoSuchDocument(id.clone()))?;
        *slot = document;
        Ok(())
    }

    #[must_use]
    pub fn matching(&self, filter: &Filter) -> Vec<BsonDocument> {
        self.docs.read().iter().filter(|d| eval_filter(d, filter)).cloned().collect()
    }

    #[must_use]
    pub fn count_matching(&self, filter: &Filter) -> usize {
        self.docs.read().iter().filter(|d| eval_filter(d, filter)).count()
    }

    #[must_use]
    pub fn get_all_documents(&self) -> Vec<BsonDocument> {
        self.docs.read().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }
}

fn doc_id(doc: &BsonDocument) -> Option<String> {
    match doc.get(ID_FIELD)? {
        Bson::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
