use crate::definition::{OperationKind, QueryDefinition};
use crate::errors::QueryError;
use crate::store::QueryStore;
use crate::types::TypeHints;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::types::{DEFAULT_CACHE_TIMEOUT_SECONDS, QueryDraft, QueryPatch, StoredQuery};

/// CRUD and lookup over stored query definitions.
#[derive(Clone)]
pub struct QueryRegistry {
    store: Arc<dyn QueryStore>,
}

impl std::fmt::Debug for QueryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryRegistry").finish_non_exhaustive()
    }
}

fn require(field: &str, value: &str) -> Result<(), QueryError> {
    if value.trim().is_empty() {
        return Err(QueryError::InvalidDefinition(format!("`{field}` must not be empty")));
    }
    Ok(())
}

impl QueryRegistry {
    #[must_use]
    pub fn new(store: Arc<dyn QueryStore>) -> Self {
        Self { store }
    }

    /// Persist a new active definition. Names are unique.
    pub fn create(&self, draft: QueryDraft) -> Result<StoredQuery, QueryError> {
        require("name", &draft.name)?;
        require("query_content", &draft.query_content)?;
        require("collection", &draft.collection)?;
        let query_type: OperationKind = draft.query_type.parse()?;
        if self.store.exists_by_name(&draft.name)? {
            return Err(QueryError::QueryAlreadyExists(draft.name));
        }
        let now = Utc::now();
        let query = StoredQuery {
            id: Uuid::new_v4().to_string(),
            name: draft.name,
            description: draft.description,
            query_content: draft.query_content,
            query_type,
            collection: draft.collection,
            parameters: draft.parameters,
            variable_mappings: draft.variable_mappings,
            success_message: draft.success_message,
            error_message: draft.error_message,
            category: draft.category,
            cacheable: draft.cacheable,
            cache_timeout_seconds: draft.cache_timeout_seconds.unwrap_or(DEFAULT_CACHE_TIMEOUT_SECONDS),
            active: true,
            last_modified_by: draft.created_by.clone(),
            created_by: draft.created_by,
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.store.insert(&query)?;
        log::info!("stored query created: {} ({})", query.name, query.id);
        Ok(query)
    }

    /// Persist a complete record, e.g. one read from an export. Names and ids
    /// must be unused; missing timestamps are set to now.
    pub fn import(&self, mut query: StoredQuery) -> Result<StoredQuery, QueryError> {
        require("_id", &query.id)?;
        require("name", &query.name)?;
        require("query_content", &query.query_content)?;
        require("collection", &query.collection)?;
        if self.store.exists_by_name(&query.name)? {
            return Err(QueryError::QueryAlreadyExists(query.name));
        }
        if self.store.find_by_id(&query.id)?.is_some() {
            return Err(QueryError::QueryAlreadyExists(format!("id {}", query.id)));
        }
        let now = Utc::now();
        query.created_at.get_or_insert(now);
        query.updated_at.get_or_insert(now);
        self.store.insert(&query)?;
        log::info!("stored query imported: {} ({})", query.name, query.id);
        Ok(query)
    }

    /// Fetch regardless of the active flag.
    pub fn get_by_id(&self, id: &str) -> Result<StoredQuery, QueryError> {
        self.store.find_by_id(id)?.ok_or_else(|| QueryError::QueryNotFound(id.to_string()))
    }

    pub fn get_by_name(&self, name: &str) -> Result<StoredQuery, QueryError> {
        self.store.find_by_name(name)?.ok_or_else(|| QueryError::QueryNotFound(name.to_string()))
    }

    /// Fetch for execution: soft-deleted definitions are not found.
    pub fn fetch_active_by_id(&self, id: &str) -> Result<StoredQuery, QueryError> {
        let query = self.get_by_id(id)?;
        if !query.active {
            return Err(QueryError::QueryInactive(id.to_string()));
        }
        Ok(query)
    }

    /// Resolve an active stored query into an executable definition.
    pub fn resolve(&self, id: &str, global_hints: &TypeHints) -> Result<(StoredQuery, QueryDefinition), QueryError> {
        let query = self.fetch_active_by_id(id)?;
        let def = query.definition(global_hints);
        Ok((query, def))
    }

    /// Apply the fields present in `patch`.
    pub fn update(&self, id: &str, patch: QueryPatch) -> Result<StoredQuery, QueryError> {
        let mut query = self.get_by_id(id)?;
        if let Some(name) = patch.name {
            require("name", &name)?;
            if name != query.name && self.store.exists_by_name(&name)? {
                return Err(QueryError::QueryAlreadyExists(name));
            }
            query.name = name;
        }
        if let Some(kind) = patch.query_type {
            query.query_type = kind.parse()?;
        }
        if let Some(content) = patch.query_content {
            require("query_content", &content)?;
            query.query_content = content;
        }
        if let Some(collection) = patch.collection {
            require("collection", &collection)?;
            query.collection = collection;
        }
        if let Some(v) = patch.description {
            query.description = Some(v);
        }
        if let Some(v) = patch.parameters {
            query.parameters = v;
        }
        if let Some(v) = patch.variable_mappings {
            query.variable_mappings = v;
        }
        if let Some(v) = patch.success_message {
            query.success_message = Some(v);
        }
        if let Some(v) = patch.error_message {
            query.error_message = Some(v);
        }
        if let Some(v) = patch.category {
            query.category = Some(v);
        }
        if let Some(v) = patch.cacheable {
            query.cacheable = v;
        }
        if let Some(v) = patch.cache_timeout_seconds {
            query.cache_timeout_seconds = v;
        }
        if let Some(v) = patch.last_modified_by {
            query.last_modified_by = Some(v);
        }
        query.updated_at = Some(Utc::now());
        self.store.replace(&query)?;
        Ok(query)
    }

    fn set_active(&self, id: &str, active: bool) -> Result<StoredQuery, QueryError> {
        let mut query = self.get_by_id(id)?;
        query.active = active;
        query.updated_at = Some(Utc::now());
        self.store.replace(&query)?;
        log::info!("stored query {id} active={active}");
        Ok(query)
    }

    /// Marks the definition inactive; the record is kept.
    pub fn soft_delete(&self, id: &str) -> Result<(), QueryError> {
        self.set_active(id, false).map(|_| ())
    }

    pub fn activate(&self, id: &str) -> Result<StoredQuery, QueryError> {
        self.set_active(id, true)
    }

    pub fn deactivate(&self, id: &str) -> Result<StoredQuery, QueryError> {
        self.set_active(id, false)
    }

    fn active_where(&self, pred: impl Fn(&StoredQuery) -> bool) -> Result<Vec<StoredQuery>, QueryError> {
        Ok(self.store.list()?.into_iter().filter(|q| q.active && pred(q)).collect())
    }

    pub fn list_active(&self) -> Result<Vec<StoredQuery>, QueryError> {
        self.active_where(|_| true)
    }

    pub fn by_category(&self, category: &str) -> Result<Vec<StoredQuery>, QueryError> {
        self.active_where(|q| q.category.as_deref() == Some(category))
    }

    pub fn by_type(&self, kind: OperationKind) -> Result<Vec<StoredQuery>, QueryError> {
        self.active_where(|q| q.query_type == kind)
    }

    pub fn by_collection(&self, collection: &str) -> Result<Vec<StoredQuery>, QueryError> {
        self.active_where(|q| q.collection == collection)
    }

    pub fn cacheable(&self) -> Result<Vec<StoredQuery>, QueryError> {
        self.active_where(|q| q.cacheable)
    }

    pub fn by_creator(&self, created_by: &str) -> Result<Vec<StoredQuery>, QueryError> {
        self.active_where(|q| q.created_by.as_deref() == Some(created_by))
    }

    /// Case-insensitive substring search over every stored name.
    pub fn search_by_name(&self, needle: &str) -> Result<Vec<StoredQuery>, QueryError> {
        let needle = needle.to_lowercase();
        Ok(self.store.list()?.into_iter().filter(|q| q.name.to_lowercase().contains(&needle)).collect())
    }

    pub fn search_by_description(&self, needle: &str) -> Result<Vec<StoredQuery>, QueryError> {
        let needle = needle.to_lowercase();
        Ok(self
            .store
            .list()?
            .into_iter()
            .filter(|q| q.description.as_ref().is_some_and(|d| d.to_lowercase().contains(&needle)))
            .collect())
    }

    pub fn count_active(&self) -> Result<usize, QueryError> {
        Ok(self.list_active()?.len())
    }

    pub fn count_by_category(&self, category: &str) -> Result<usize, QueryError> {
        Ok(self.by_category(category)?.len())
    }

    pub fn count_by_type(&self, kind: OperationKind) -> Result<usize, QueryError> {
        Ok(self.by_type(kind)?.len())
    }

    pub fn count_cacheable(&self) -> Result<usize, QueryError> {
        Ok(self.cacheable()?.len())
    }

    pub fn name_exists(&self, name: &str) -> Result<bool, QueryError> {
        Ok(self.store.exists_by_name(name)?)
    }
}
