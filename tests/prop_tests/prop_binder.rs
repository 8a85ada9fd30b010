use dynaquery::binder::bind;
use dynaquery::errors::QueryError;
use dynaquery::types::{ParameterSet, TypeHints};
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #![proptest_config(proptest::test_runner::Config {
        failure_persistence: Some(Box::new(proptest::test_runner::FileFailurePersistence::WithSource("proptest-regressions"))),
        .. proptest::test_runner::Config::default()
    })]

    // Same inputs, same output.
    #[test]
    fn prop_bind_is_deterministic(name in "[a-z]{1,8}", value in "[A-Za-z0-9 ]{0,16}", quoted in any::<bool>()) {
        let template = format!("{{\"field\": ${{{name}}}, \"again\": ${{{name}}}}}");
        let params = ParameterSet::from([(name.clone(), json!(value))]);
        let hints: TypeHints = if quoted {
            TypeHints::from([(name.clone(), "String".to_string())])
        } else {
            TypeHints::new()
        };
        let a = bind(&template, &params, &hints).unwrap();
        let b = bind(&template, &params, &hints).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert!(!a.contains("${"), "output still contains an unresolved placeholder");
    }

    // A placeholder without a value always fails and names the placeholder.
    #[test]
    fn prop_missing_always_fails(name in "[a-z]{1,8}", other in "[A-Z]{1,8}") {
        let template = format!("{{\"x\": ${{{name}}}}}");
        let params = ParameterSet::from([(other, json!(1))]);
        let err = bind(&template, &params, &TypeHints::new()).unwrap_err();
        prop_assert!(matches!(err, QueryError::MissingParameter(ref n) if *n == name));
    }

    // Integer-hinted numbers render bare and parse back to the same value.
    #[test]
    fn prop_integer_renders_bare(n in any::<i64>()) {
        let params = ParameterSet::from([("n".to_string(), json!(n))]);
        let hints = TypeHints::from([("n".to_string(), "Integer".to_string())]);
        let out = bind("{\"n\": ${n}}", &params, &hints).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        prop_assert_eq!(v["n"].as_i64(), Some(n));
    }
}
