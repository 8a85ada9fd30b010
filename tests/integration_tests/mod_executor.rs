use super::common::{executor, params, recording_executor};
use dynaquery::{ErrorKind, ParameterSet, Payload, QueryDraft};
use serde_json::json;

#[test]
fn find_by_university_returns_all_matches() {
    let (exec, store) = recording_executor();
    let r = exec.execute_by_name("user.findByUniversity", &params(json!({"university": "MIT"})));
    assert!(r.success);
    assert_eq!(r.result_count, 3);
    let Some(Payload::Documents(docs)) = &r.data else { panic!("expected documents: {r:?}") };
    assert!(docs.iter().all(|d| d["university"] == json!("MIT")));
    assert_eq!(*store.calls.lock(), vec![("find".to_string(), "user".to_string())]);
}

#[test]
fn count_returns_integer_with_result_count_one() {
    let exec = executor();
    let r = exec.execute_by_name("user.count", &ParameterSet::new());
    assert!(r.success);
    assert_eq!(r.data, Some(Payload::Count(5)));
    assert_eq!(r.result_count, 1);
    let active = exec.try_execute_by_name("user.countActive", &ParameterSet::new()).unwrap();
    assert_eq!(active, Payload::Count(3));
}

#[test]
fn unknown_query_fails_without_store_call() {
    let (exec, store) = recording_executor();
    let r = exec.execute_by_name("bogus.op", &ParameterSet::new());
    assert!(!r.success);
    assert_eq!(r.error_kind(), Some(ErrorKind::UnknownQuery));
    assert_eq!(r.query_name.as_deref(), Some("bogus.op"));
    assert_eq!(r.message, "Query execution failed");
    assert!(store.calls.lock().is_empty());
}

#[test]
fn missing_parameter_fails_without_store_call() {
    let (exec, store) = recording_executor();
    let r = exec.execute_by_name("user.findByAgeRange", &params(json!({"minAge": 18})));
    assert_eq!(r.error_kind(), Some(ErrorKind::MissingParameter));
    assert_eq!(r.error.unwrap().message, "Missing required parameter: maxAge");
    assert!(store.calls.lock().is_empty());
}

#[test]
fn age_range_is_inclusive() {
    let exec = executor();
    let payload = exec
        .try_execute_by_name("user.findByAgeRange", &params(json!({"minAge": 18, "maxAge": 30})))
        .unwrap();
    let Payload::Documents(docs) = payload else { panic!("expected documents") };
    let mut ages: Vec<i64> = docs.iter().filter_map(|d| d["age"].as_i64()).collect();
    ages.sort_unstable();
    assert_eq!(ages, vec![18, 25, 30]);
}

#[test]
fn string_hint_quotes_regex_pattern() {
    let exec = executor();
    let payload = exec.try_execute_by_name("user.searchByName", &params(json!({"pattern": "^a"}))).unwrap();
    assert_eq!(payload.result_count(), 2);
}

#[test]
fn membership_over_array_parameter() {
    let exec = executor();
    let payload = exec
        .try_execute_by_name("cart.findByStatus", &params(json!({"statuses": ["PENDING", "CANCELLED"]})))
        .unwrap();
    assert_eq!(payload.result_count(), 2);
}

#[test]
fn aggregate_groups_and_sorts() {
    let exec = executor();
    let payload = exec.try_execute_by_name("cart.totalsByUser", &params(json!({"status": "ACTIVE"}))).unwrap();
    assert_eq!(
        payload,
        Payload::Documents(vec![
            json!({"_id": "u3", "total": 40, "carts": 1}),
            json!({"_id": "u1", "total": 25, "carts": 2}),
        ])
    );
}

#[test]
fn aggregate_count_is_single_document() {
    let exec = executor();
    let r = exec.execute_by_name("cart.countByStatus", &params(json!({"status": "ACTIVE"})));
    assert_eq!(r.data, Some(Payload::Document(json!({"carts": 3}))));
    assert_eq!(r.result_count, 1);
    let r = exec.execute_by_name("cart.countByStatus", &params(json!({"status": "LOST"})));
    assert_eq!(r.data, Some(Payload::Documents(vec![])));
    assert_eq!(r.result_count, 0);
}

#[test]
fn quote_in_parameter_is_rejected() {
    let exec = executor();
    let r = exec.execute_by_name("user.findByUniversity", &params(json!({"university": "MIT\", \"age\": 17"})));
    assert_eq!(r.error_kind(), Some(ErrorKind::MalformedFilter));
}

#[test]
fn stored_defaults_are_overridden_by_caller() {
    let exec = executor();
    let q = exec
        .registry()
        .create(
            QueryDraft::new("cartsByStatus", "{\"status\": ${status}}", "FIND", "cart")
                .with_parameter("status", json!("ACTIVE")),
        )
        .unwrap();
    let defaults = exec.try_execute_by_id(&q.id, None).unwrap();
    assert_eq!(defaults.result_count(), 3);
    let r = exec.execute_by_id(&q.id, Some(&params(json!({"status": "CANCELLED"}))));
    assert!(r.success);
    let Some(Payload::Documents(docs)) = r.data else { panic!("expected documents") };
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["status"], json!("CANCELLED"));
}

#[test]
fn validate_parameters_contract() {
    let exec = executor();
    assert!(!exec.validate_parameters("user", &ParameterSet::new()));
    assert!(!exec.validate_parameters("user.findById", &ParameterSet::new()));
    assert!(!exec.validate_parameters("user.nothing", &ParameterSet::new()));
    assert!(exec.validate_parameters("user.findById", &params(json!({"id": "u1"}))));
    assert!(exec.validate_parameters("user.count", &ParameterSet::new()));
}

#[test]
fn find_by_id_with_string_hint() {
    let exec = executor();
    let r = exec.execute_by_name("user.findById", &params(json!({"id": "u3"})));
    assert!(r.success, "{r:?}");
    assert_eq!(r.result_count, 1);
}

#[test]
fn concurrent_executions_share_catalogue() {
    let exec = executor();
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..25 {
                    let r = exec.execute_by_name("user.findByUniversity", &params(json!({"university": "MIT"})));
                    assert_eq!(r.result_count, 3);
                }
            });
        }
    });
}
