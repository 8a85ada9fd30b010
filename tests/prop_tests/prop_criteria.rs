use bson::doc;
use dynaquery::criteria::build;
use dynaquery::filter::eval_filter;
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #![proptest_config(proptest::test_runner::Config {
        failure_persistence: Some(Box::new(proptest::test_runner::FileFailurePersistence::WithSource("proptest-regressions"))),
        .. proptest::test_runner::Config::default()
    })]

    // Inclusive range matches exactly lo <= v <= hi.
    #[test]
    fn prop_range_is_inclusive(v in -1000i64..1000, lo in -1000i64..1000, hi in -1000i64..1000) {
        let f = build(&json!({"age": {"$gte": lo, "$lte": hi}})).unwrap();
        prop_assert_eq!(eval_filter(&doc! {"age": v}, &f), lo <= v && v <= hi);
    }

    // Equality on an integer field ignores the stored integer width.
    #[test]
    fn prop_eq_across_int_widths(v in any::<i32>()) {
        let f = build(&json!({"n": v})).unwrap();
        prop_assert!(eval_filter(&doc! {"n": v}, &f), "eval_filter failed for i32 value");
        prop_assert!(eval_filter(&doc! {"n": i64::from(v)}, &f), "eval_filter failed for i64 value");
    }

    // Operators outside the supported set are rejected.
    #[test]
    fn prop_unknown_operator_rejected(op in "\\$[a-z]{2,8}") {
        prop_assume!(!["$regex", "$options", "$gte", "$lte", "$in"].contains(&op.as_str()));
        prop_assert!(build(&json!({"field": {op: 1}})).is_err(), "expected build error for unknown operator");
    }
}
