//! Builds store filters from parsed JSON filter documents.
//!
//! Every field becomes one constraint and all constraints are AND-ed in
//! document order. Recognised operator objects, in priority order:
//! `$regex` (with optional `$options`), `$gte`/`$lte`, `$in`. Any other
//! operator is an error rather than a match-all.

use crate::errors::QueryError;
use crate::filter::{CmpOp, Filter, MAX_IN_SET};
use crate::utils::json::{json_to_bson, scalar_text};
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};

const KNOWN_OPERATORS: [&str; 5] = ["$regex", "$options", "$gte", "$lte", "$in"];

pub fn build(filter: &Value) -> Result<Filter, QueryError> {
    let obj = filter.as_object().ok_or_else(|| {
        QueryError::MalformedFilter(format!("filter must be a JSON object, got {filter}"))
    })?;
    let mut clauses = Vec::with_capacity(obj.len());
    for (field, value) in obj {
        if field.starts_with('$') {
            return Err(QueryError::MalformedFilter(format!(
                "unsupported top-level operator `{field}`"
            )));
        }
        match value {
            Value::Object(ops) => clauses.extend(complex_criteria(field, ops)?),
            scalar => clauses.push(Filter::Cmp {
                path: field.clone(),
                op: CmpOp::Eq,
                value: json_to_bson(scalar),
            }),
        }
    }
    Ok(match clauses.len() {
        0 => Filter::True,
        1 => clauses.pop().unwrap_or(Filter::True),
        _ => Filter::And(clauses),
    })
}

fn complex_criteria(field: &str, ops: &Map<String, Value>) -> Result<Vec<Filter>, QueryError> {
    if let Some(op) = ops.keys().find(|k| !KNOWN_OPERATORS.contains(&k.as_str())) {
        return Err(QueryError::MalformedFilter(format!(
            "unsupported operator `{op}` on field `{field}`"
        )));
    }

    if let Some(pattern) = ops.get("$regex") {
        let options = ops.get("$options").map(text_of).unwrap_or_default();
        let regex = compile_regex(field, &text_of(pattern), &options)?;
        return Ok(vec![Filter::Regex { path: field.to_string(), regex }]);
    }

    let gte = ops.get("$gte");
    let lte = ops.get("$lte");
    if gte.is_some() || lte.is_some() {
        let bounds = [(CmpOp::Gte, gte), (CmpOp::Lte, lte)];
        return Ok(bounds
            .into_iter()
            .filter_map(|(op, bound)| {
                bound.map(|b| Filter::Cmp { path: field.to_string(), op, value: json_to_bson(b) })
            })
            .collect());
    }

    if let Some(items) = ops.get("$in") {
        let items = items.as_array().ok_or_else(|| {
            QueryError::MalformedFilter(format!("`$in` on field `{field}` requires an array"))
        })?;
        if items.len() > MAX_IN_SET {
            return Err(QueryError::MalformedFilter(format!(
                "`$in` on field `{field}` exceeds {MAX_IN_SET} values"
            )));
        }
        let values = items
            .iter()
            .map(|item| {
                scalar_text(&json_to_bson(item)).ok_or_else(|| {
                    QueryError::MalformedFilter(format!(
                        "`$in` on field `{field}` accepts scalar values only"
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(vec![Filter::In { path: field.to_string(), values }]);
    }

    Err(QueryError::MalformedFilter(format!(
        "no supported operator on field `{field}` (expected $regex, $gte, $lte or $in)"
    )))
}

fn text_of(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compile_regex(field: &str, pattern: &str, options: &str) -> Result<Regex, QueryError> {
    let mut builder = RegexBuilder::new(pattern);
    for flag in options.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            other => {
                return Err(QueryError::MalformedFilter(format!(
                    "unsupported regex option `{other}` on field `{field}`"
                )));
            }
        };
    }
    builder.build().map_err(|e| {
        QueryError::MalformedFilter(format!("invalid regex on field `{field}`: {e}"))
    })
}
