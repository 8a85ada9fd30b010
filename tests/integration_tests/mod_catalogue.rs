use super::common::{fixture_catalogue, fixture_path};
use dynaquery::catalogue::{Catalogue, MessageKind};
use dynaquery::{OperationKind, QueryError};

#[test]
fn fixture_loads_all_mappings() {
    let cat = fixture_catalogue();
    assert_eq!(cat.mapping_count(), 10);
    assert_eq!(cat.lookup("cart.totalsByUser").unwrap().operation_kind, OperationKind::Aggregate);
    assert_eq!(cat.type_hints().get("minAge").map(String::as_str), Some("Integer"));
    assert_eq!(cat.sample_queries()["user.findByUniversity"]["university"], "MIT");
}

#[test]
fn definitions_group_by_entity() {
    let defs = fixture_catalogue().definitions();
    assert_eq!(defs.keys().collect::<Vec<_>>(), vec!["cart", "university", "user"]);
    let by_uni = &defs["user"]["findByUniversity"];
    assert_eq!(by_uni.name, "user.findByUniversity");
    assert_eq!(by_uni.required_parameters, vec!["university"]);
}

#[test]
fn messages_and_fallbacks() {
    let cat = fixture_catalogue();
    assert_eq!(cat.get_message(MessageKind::Error, "invalid_parameters"), "Invalid or missing parameters");
    assert_eq!(cat.get_message(MessageKind::Error, "unheard_of"), "Operation failed");
}

#[test]
fn load_errors_are_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, r#"{"queryMappings": {"user": {"x": {"query": "{}", "collection": "user"}}}}"#).unwrap();
    assert!(matches!(Catalogue::load(&bad), Err(QueryError::CatalogueLoad(_))));
    assert!(Catalogue::load(fixture_path()).is_ok());
}
