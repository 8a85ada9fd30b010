//! A small aggregation pipeline over in-memory documents.
//!
//! Stages: `$match`, `$sort`, `$skip`, `$limit`, `$project`, `$group`,
//! `$count`. Anything else is rejected.

use crate::criteria;
use crate::errors::StoreError;
use crate::filter::{compare_bson, eval_filter, get_path};
use crate::utils::json::bson_to_json;
use bson::{Bson, Document as BsonDocument};
use std::cmp::Ordering;

use crate::collection::ID_FIELD;

pub fn run_pipeline(
    mut docs: Vec<BsonDocument>,
    pipeline: &[BsonDocument],
) -> Result<Vec<BsonDocument>, StoreError> {
    for stage in pipeline {
        let mut it = stage.iter();
        let (Some((name, body)), None) = (it.next(), it.next()) else {
            return Err(StoreError::InvalidStage(format!(
                "a stage must have exactly one operator, got {stage}"
            )));
        };
        docs = match name.as_str() {
            "$match" => match_stage(docs, body)?,
            "$sort" => sort_stage(docs, body)?,
            "$skip" => {
                let n = as_count(name, body)?;
                docs.into_iter().skip(n).collect()
            }
            "$limit" => {
                let n = as_count(name, body)?;
                docs.into_iter().take(n).collect()
            }
            "$project" => project_stage(docs, body)?,
            "$group" => group_stage(&docs, body)?,
            "$count" => count_stage(&docs, body)?,
            other => return Err(StoreError::UnsupportedStage(other.to_string())),
        };
    }
    Ok(docs)
}

fn stage_doc<'a>(name: &str, body: &'a Bson) -> Result<&'a BsonDocument, StoreError> {
    match body {
        Bson::Document(d) => Ok(d),
        other => Err(StoreError::InvalidStage(format!("{name} expects a document, got {other}"))),
    }
}

fn as_count(name: &str, body: &Bson) -> Result<usize, StoreError> {
    let n = match body {
        Bson::Int32(i) => i64::from(*i),
        Bson::Int64(i) => *i,
        #[allow(clippy::cast_possible_truncation)]
        Bson::Double(d) if d.fract() == 0.0 => *d as i64,
        other => {
            return Err(StoreError::InvalidStage(format!("{name} expects an integer, got {other}")));
        }
    };
    usize::try_from(n)
        .map_err(|_| StoreError::InvalidStage(format!("{name} must not be negative, got {n}")))
}

fn match_stage(docs: Vec<BsonDocument>, body: &Bson) -> Result<Vec<BsonDocument>, StoreError> {
    let filter = criteria::build(&bson_to_json(body))
        .map_err(|e| StoreError::InvalidStage(format!("$match: {e}")))?;
    Ok(docs.into_iter().filter(|d| eval_filter(d, &filter)).collect())
}

fn sort_stage(mut docs: Vec<BsonDocument>, body: &Bson) -> Result<Vec<BsonDocument>, StoreError> {
    let body = stage_doc("$sort", body)?;
    let mut keys = Vec::with_capacity(body.len());
    for (field, dir) in body {
        let desc = match dir {
            Bson::Int32(-1) | Bson::Int64(-1) => true,
            Bson::Int32(1) | Bson::Int64(1) => false,
            Bson::Double(d) if *d == -1.0 => true,
            Bson::Double(d) if *d == 1.0 => false,
            other => {
                return Err(StoreError::InvalidStage(format!(
                    "$sort direction for '{field}' must be 1 or -1, got {other}"
                )));
            }
        };
        keys.push((field.as_str(), desc));
    }
    docs.sort_by(|a, b| {
        for (field, desc) in &keys {
            let ord = match (get_path(a, field), get_path(b, field)) {
                (Some(x), Some(y)) => compare_bson(x, y),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => Ordering::Equal,
            };
            if ord != Ordering::Equal {
                return if *desc { ord.reverse() } else { ord };
            }
        }
        Ordering::Equal
    });
    Ok(docs)
}

fn truthy(v: &Bson) -> Option<bool> {
    match v {
        Bson::Boolean(b) => Some(*b),
        Bson::Int32(i) => Some(*i != 0),
        Bson::Int64(i) => Some(*i != 0),
        Bson::Double(d) => Some(*d != 0.0),
        _ => None,
    }
}

fn project_stage(docs: Vec<BsonDocument>, body: &Bson) -> Result<Vec<BsonDocument>, StoreError> {
    let body = stage_doc("$project", body)?;
    let mut include_id = true;
    let mut included = Vec::new();
    let mut excluded = Vec::new();
    for (field, flag) in body {
        let on = truthy(flag).ok_or_else(|| {
            StoreError::InvalidStage(format!("$project flag for '{field}' must be 0/1 or a bool"))
        })?;
        if field == ID_FIELD {
            include_id = on;
        } else if on {
            included.push(field.clone());
        } else {
            excluded.push(field.clone());
        }
    }
    if !included.is_empty() && !excluded.is_empty() {
        return Err(StoreError::InvalidStage(
            "$project cannot mix inclusion and exclusion".to_string(),
        ));
    }
    Ok(docs
        .into_iter()
        .map(|d| {
            if included.is_empty() {
                let mut out = d;
                for f in &excluded {
                    remove_path(&mut out, f);
                }
                if !include_id {
                    out.remove(ID_FIELD);
                }
                out
            } else {
                let mut out = BsonDocument::new();
                if include_id && let Some(id) = d.get(ID_FIELD) {
                    out.insert(ID_FIELD, id.clone());
                }
                for f in &included {
                    if let Some(v) = get_path(&d, f) {
                        set_path(&mut out, f, v.clone());
                    }
                }
                out
            }
        })
        .collect())
}

// Dotted paths write into nested documents, replacing non-document parents.
fn set_path(doc: &mut BsonDocument, path: &str, value: Bson) {
    match path.split_once('.') {
        None => {
            doc.insert(path, value);
        }
        Some((head, rest)) => {
            if !matches!(doc.get(head), Some(Bson::Document(_))) {
                doc.insert(head, BsonDocument::new());
            }
            if let Some(Bson::Document(child)) = doc.get_mut(head) {
                set_path(child, rest, value);
            }
        }
    }
}

fn remove_path(doc: &mut BsonDocument, path: &str) {
    match path.split_once('.') {
        None => {
            doc.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Bson::Document(child)) = doc.get_mut(head) {
                remove_path(child, rest);
            }
        }
    }
}

/// Resolve an expression: `"$path"` reads a field, anything else is a literal.
fn eval_expr(doc: &BsonDocument, expr: &Bson) -> Bson {
    match expr {
        Bson::String(s) if s.starts_with('$') => get_path(doc, &s[1..]).cloned().unwrap_or(Bson::Null),
        Bson::Document(d) => {
            let mut out = BsonDocument::new();
            for (k, v) in d {
                out.insert(k.clone(), eval_expr(doc, v));
            }
            Bson::Document(out)
        }
        other => other.clone(),
    }
}

enum Acc {
    Sum { int: i64, float: f64, is_float: bool },
    Avg { total: f64, n: u64 },
    Min(Option<Bson>),
    Max(Option<Bson>),
    Push(Vec<Bson>),
    First(Option<Bson>),
}

impl Acc {
    fn new(op: &str) -> Result<Self, StoreError> {
        Ok(match op {
            "$sum" => Self::Sum { int: 0, float: 0.0, is_float: false },
            "$avg" => Self::Avg { total: 0.0, n: 0 },
            "$min" => Self::Min(None),
            "$max" => Self::Max(None),
            "$push" => Self::Push(Vec::new()),
            "$first" => Self::First(None),
            other => {
                return Err(StoreError::UnsupportedStage(format!("$group accumulator {other}")));
            }
        })
    }

    #[allow(clippy::cast_precision_loss)]
    fn feed(&mut self, v: Bson) {
        match self {
            Self::Sum { int, float, is_float } => match v {
                Bson::Int32(i) => *int = int.saturating_add(i64::from(i)),
                Bson::Int64(i) => *int = int.saturating_add(i),
                Bson::Double(d) => {
                    *float += d;
                    *is_float = true;
                }
                _ => {}
            },
            Self::Avg { total, n } => match v {
                Bson::Int32(i) => {
                    *total += f64::from(i);
                    *n += 1;
                }
                Bson::Int64(i) => {
                    *total += i as f64;
                    *n += 1;
                }
                Bson::Double(d) => {
                    *total += d;
                    *n += 1;
                }
                _ => {}
            },
            Self::Min(cur) => {
                if !matches!(v, Bson::Null)
                    && cur.as_ref().is_none_or(|c| compare_bson(&v, c) == Ordering::Less)
                {
                    *cur = Some(v);
                }
            }
            Self::Max(cur) => {
                if !matches!(v, Bson::Null)
                    && cur.as_ref().is_none_or(|c| compare_bson(&v, c) == Ordering::Greater)
                {
                    *cur = Some(v);
                }
            }
            Self::Push(items) => items.push(v),
            Self::First(cur) => {
                if cur.is_none() {
                    *cur = Some(v);
                }
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(self) -> Bson {
        match self {
            Self::Sum { int, float, is_float } => {
                if is_float {
                    Bson::Double(float + int as f64)
                } else {
                    Bson::Int64(int)
                }
            }
            Self::Avg { total, n } => {
                if n == 0 {
                    Bson::Null
                } else {
                    Bson::Double(total / n as f64)
                }
            }
            Self::Min(v) | Self::Max(v) | Self::First(v) => v.unwrap_or(Bson::Null),
            Self::Push(items) => Bson::Array(items),
        }
    }
}

fn group_stage(docs: &[BsonDocument], body: &Bson) -> Result<Vec<BsonDocument>, StoreError> {
    let body = stage_doc("$group", body)?;
    let key_expr = body
        .get(ID_FIELD)
        .ok_or_else(|| StoreError::InvalidStage("$group requires an _id expression".to_string()))?;
    let mut fields: Vec<(&str, &str, &Bson)> = Vec::new();
    for (out_field, acc_body) in body {
        if out_field == ID_FIELD {
            continue;
        }
        let acc_doc = stage_doc("$group accumulator", acc_body)?;
        let mut it = acc_doc.iter();
        let (Some((op, expr)), None) = (it.next(), it.next()) else {
            return Err(StoreError::InvalidStage(format!(
                "$group field '{out_field}' needs exactly one accumulator"
            )));
        };
        Acc::new(op)?;
        fields.push((out_field.as_str(), op.as_str(), expr));
    }

    // Groups keep first-seen order.
    let mut groups: Vec<(Bson, Vec<Acc>)> = Vec::new();
    for doc in docs {
        let key = eval_expr(doc, key_expr);
        let idx = if let Some(i) = groups.iter().position(|(k, _)| *k == key) {
            i
        } else {
            let accs = fields.iter().map(|(_, op, _)| Acc::new(op)).collect::<Result<_, _>>()?;
            groups.push((key, accs));
            groups.len() - 1
        };
        for ((_, _, expr), acc) in fields.iter().zip(groups[idx].1.iter_mut()) {
            acc.feed(eval_expr(doc, expr));
        }
    }

    Ok(groups
        .into_iter()
        .map(|(key, accs)| {
            let mut out = BsonDocument::new();
            out.insert(ID_FIELD, key);
            for ((field, _, _), acc) in fields.iter().zip(accs) {
                out.insert(*field, acc.finish());
            }
            out
        })
        .collect())
}

fn count_stage(docs: &[BsonDocument], body: &Bson) -> Result<Vec<BsonDocument>, StoreError> {
    let Bson::String(field) = body else {
        return Err(StoreError::InvalidStage(format!("$count expects a field name, got {body}")));
    };
    if field.is_empty() || field.starts_with('$') {
        return Err(StoreError::InvalidStage(format!("invalid $count field '{field}'")));
    }
    if docs.is_empty() {
        return Ok(Vec::new());
    }
    let mut out = BsonDocument::new();
    out.insert(field.clone(), Bson::Int64(i64::try_from(docs.len()).unwrap_or(i64::MAX)));
    Ok(vec![out])
}
