use super::common::{CARTS, USERS, fixture_catalogue, params};
use dynaquery::filter::Filter;
use dynaquery::store::{DocumentStore, MemoryStore, QUERY_COLLECTION, load_ndjson, load_ndjson_dir};
use dynaquery::{ErrorKind, QueryExecutor};
use serde_json::json;
use std::sync::Arc;

#[test]
fn loads_collections_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("user.ndjson"), USERS).unwrap();
    std::fs::write(dir.path().join("cart.ndjson"), CARTS).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
    let store = MemoryStore::new();
    let loaded = load_ndjson_dir(&store, dir.path()).unwrap();
    assert_eq!(loaded, vec![("cart".to_string(), 5), ("user".to_string(), 5)]);
    assert_eq!(store.list_collection_names(), vec!["cart", "user"]);
    assert_eq!(store.count("user", &Filter::True).unwrap(), 5);
}

#[test]
fn stored_queries_from_ndjson_execute_by_id() {
    let store = Arc::new(MemoryStore::new());
    load_ndjson(&store, "cart", CARTS.as_bytes()).unwrap();
    let records = r#"{"_id": "q-active", "name": "activeCarts", "query_content": "{\"status\": ${status}}", "query_type": "FIND", "collection": "cart", "parameters": {"status": "ACTIVE"}, "cacheable": true}
{"_id": "q-bad", "name": "badKind", "query_content": "{}", "query_type": "DROP", "collection": "cart"}
"#;
    load_ndjson(&store, QUERY_COLLECTION, records.as_bytes()).unwrap();
    let exec = QueryExecutor::in_memory(fixture_catalogue(), store);

    let r = exec.execute_by_id("q-active", None);
    assert!(r.success, "{r:?}");
    assert_eq!(r.result_count, 3);
    assert_eq!(r.metadata["cacheable"], json!(true));

    let r = exec.execute_by_id("q-active", Some(&params(json!({"status": "PENDING"}))));
    assert_eq!(r.result_count, 1);

    let r = exec.execute_by_id("q-bad", None);
    assert_eq!(r.error_kind(), Some(ErrorKind::StoreOperation));
}
