use crate::executor::QueryExecutor;
use serde::Serialize;
use std::io::Write;

use super::command::Command;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputMode {
    Pretty,
    Compact,
}

/// Whether the command reported success. Failed executions and invalid
/// parameters still print their JSON body.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    Ok,
    Failed,
}

fn emit<W: Write, T: Serialize + ?Sized>(out: &mut W, mode: OutputMode, value: &T) -> std::io::Result<()> {
    let text = match mode {
        OutputMode::Pretty => serde_json::to_string_pretty(value)?,
        OutputMode::Compact => serde_json::to_string(value)?,
    };
    writeln!(out, "{text}")
}

pub fn run<W: Write>(
    exec: &QueryExecutor,
    cmd: Command,
    mode: OutputMode,
    out: &mut W,
) -> Result<Outcome, Box<dyn std::error::Error>> {
    let outcome = match cmd {
        Command::Run { name, params } => {
            let result = exec.execute_by_name(&name, &params);
            emit(out, mode, &result)?;
            if result.success { Outcome::Ok } else { Outcome::Failed }
        }
        Command::RunStored { id, params } => {
            let result = exec.execute_by_id(&id, params.as_ref());
            emit(out, mode, &result)?;
            if result.success { Outcome::Ok } else { Outcome::Failed }
        }
        Command::Validate { name, params } => {
            let valid = exec.validate_parameters(&name, &params);
            let message = if valid { "Query parameters are valid" } else { "Invalid or missing parameters" };
            emit(
                out,
                mode,
                &serde_json::json!({"valid": valid, "queryName": name, "message": message}),
            )?;
            if valid { Outcome::Ok } else { Outcome::Failed }
        }
        Command::Mappings => {
            emit(out, mode, &exec.catalogue().mappings())?;
            Outcome::Ok
        }
        Command::Samples => {
            emit(out, mode, exec.sample_queries())?;
            Outcome::Ok
        }
        Command::Docs => {
            emit(out, mode, &exec.documentation())?;
            Outcome::Ok
        }
        Command::Status => {
            emit(out, mode, &exec.status())?;
            Outcome::Ok
        }
    };
    Ok(outcome)
}
