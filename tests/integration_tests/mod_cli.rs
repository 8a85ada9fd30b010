use super::common::{executor, params};
use dynaquery::cli::{Command, Outcome, OutputMode, parse_params, run};
use dynaquery::ParameterSet;
use serde_json::{Value, json};

fn run_json(cmd: Command) -> (Outcome, Value) {
    let mut out = Vec::new();
    let outcome = run(&executor(), cmd, OutputMode::Compact, &mut out).unwrap();
    (outcome, serde_json::from_slice(&out).unwrap())
}

#[test]
fn run_prints_result_envelope() {
    let (outcome, v) = run_json(Command::Run {
        name: "user.findByUniversity".into(),
        params: parse_params(Some(r#"{"university": "CMU"}"#)).unwrap(),
    });
    assert_eq!(outcome, Outcome::Ok);
    assert_eq!(v["resultCount"], json!(1));
    assert_eq!(v["data"][0]["name"], json!("Alice"));
    assert_eq!(v["queryName"], json!("user.findByUniversity"));
}

#[test]
fn failed_run_still_prints() {
    let (outcome, v) = run_json(Command::Run { name: "nope".into(), params: ParameterSet::new() });
    assert_eq!(outcome, Outcome::Failed);
    assert_eq!(v["success"], json!(false));
    assert_eq!(v["error"]["kind"], json!("InvalidQueryName"));
}

#[test]
fn validate_reports_validity() {
    let (outcome, v) = run_json(Command::Validate {
        name: "user.findById".into(),
        params: params(json!({"id": "u1"})),
    });
    assert_eq!(outcome, Outcome::Ok);
    assert_eq!(v["valid"], json!(true));
}

#[test]
fn informational_commands() {
    let (_, mappings) = run_json(Command::Mappings);
    assert_eq!(mappings["user"]["count"]["type"], json!("COUNT"));
    let (_, samples) = run_json(Command::Samples);
    assert!(samples.get("cart.totalsByUser").is_some());
    let (_, docs) = run_json(Command::Docs);
    assert_eq!(docs["supportedTypes"], json!(["FIND", "AGGREGATE", "COUNT"]));
    let (_, status) = run_json(Command::Status);
    assert_eq!(status["status"], json!("UP"));
    assert_eq!(status["configurationLoaded"], json!(true));
    assert_eq!(status["mappingCount"], json!(10));
}
