use dynaquery::registry::load_queries_ndjson;
use dynaquery::store::MemoryStore;
use dynaquery::{OperationKind, QueryDraft, QueryError, QueryPatch, QueryRegistry};
use std::sync::Arc;

fn registry() -> QueryRegistry {
    QueryRegistry::new(Arc::new(MemoryStore::new()))
}

#[test]
fn lifecycle_create_update_delete() {
    let reg = registry();
    let mut draft = QueryDraft::new("usersByUni", "{\"university\": ${uni}}", "FIND", "user");
    draft.created_by = Some("admin".into());
    draft.category = Some("users".into());
    let q = reg.create(draft).unwrap();
    assert_eq!(q.created_by.as_deref(), Some("admin"));
    assert_eq!(reg.get_by_name("usersByUni").unwrap().id, q.id);

    let patched = reg
        .update(
            &q.id,
            QueryPatch {
                query_type: Some("count".into()),
                last_modified_by: Some("ops".into()),
                ..QueryPatch::default()
            },
        )
        .unwrap();
    assert_eq!(patched.query_type, OperationKind::Count);
    assert_eq!(patched.last_modified_by.as_deref(), Some("ops"));
    assert!(patched.updated_at >= q.updated_at);

    reg.soft_delete(&q.id).unwrap();
    assert!(reg.list_active().unwrap().is_empty());
    assert!(reg.name_exists("usersByUni").unwrap());
    assert!(matches!(reg.fetch_active_by_id(&q.id), Err(QueryError::QueryInactive(_))));
}

#[test]
fn update_rejects_unknown_kind_and_missing_id() {
    let reg = registry();
    let q = reg.create(QueryDraft::new("a", "{}", "FIND", "user")).unwrap();
    let bad = QueryPatch { query_type: Some("UPSERT".into()), ..QueryPatch::default() };
    assert!(matches!(reg.update(&q.id, bad), Err(QueryError::UnsupportedOperation(_))));
    assert_eq!(reg.get_by_id(&q.id).unwrap().query_type, OperationKind::Find);
    assert!(matches!(reg.update("ghost", QueryPatch::default()), Err(QueryError::QueryNotFound(_))));
}

#[test]
fn counts_follow_active_flag() {
    let reg = registry();
    for (name, kind) in [("a", "FIND"), ("b", "COUNT"), ("c", "COUNT")] {
        reg.create(QueryDraft::new(name, "{}", kind, "user")).unwrap();
    }
    assert_eq!(reg.count_by_type(OperationKind::Count).unwrap(), 2);
    let c = reg.get_by_name("c").unwrap();
    reg.deactivate(&c.id).unwrap();
    assert_eq!(reg.count_by_type(OperationKind::Count).unwrap(), 1);
    assert_eq!(reg.count_active().unwrap(), 2);
}

fn record(id: &str, name: &str, kind: &str) -> String {
    format!(
        r#"{{"_id": "{id}", "name": "{name}", "query_content": "{{}}", "query_type": "{kind}", "collection": "cart"}}"#
    )
}

#[test]
fn bulk_load_rejects_unknown_kind_and_keeps_listing_usable() {
    let reg = registry();
    let lines = [record("a", "dup", "FIND"), record("b", "dup", "COUNT"), record("c", "wipe", "DELETE")].join("\n");
    let err = load_queries_ndjson(&reg, lines.as_bytes()).unwrap_err();
    assert!(matches!(err, QueryError::InvalidDefinition(ref m) if m.contains("line 3")));
    assert!(reg.list_active().unwrap().is_empty());
    assert_eq!(reg.count_active().unwrap(), 0);
}

#[test]
fn bulk_load_rejects_duplicate_names() {
    let reg = registry();
    let lines = [record("a", "dup", "FIND"), record("b", "dup", "COUNT")].join("\n");
    let err = load_queries_ndjson(&reg, lines.as_bytes()).unwrap_err();
    assert!(matches!(err, QueryError::QueryAlreadyExists(ref n) if n == "dup"));
    let listed = reg.list_active().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, "a");
}

#[test]
fn bulk_loaded_queries_are_searchable() {
    let reg = registry();
    let lines = format!("{}\n\n{}\n", record("a", "openCarts", "find"), record("b", "countCarts", "COUNT"));
    assert_eq!(load_queries_ndjson(&reg, lines.as_bytes()).unwrap(), 2);
    assert_eq!(reg.by_type(OperationKind::Count).unwrap().len(), 1);
    assert_eq!(reg.search_by_name("carts").unwrap().len(), 2);
}
