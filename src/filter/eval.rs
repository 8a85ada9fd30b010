use bson::{Bson, Document as BsonDocument};
use std::cmp::Ordering;

use super::types::{CmpOp, Filter, MAX_PATH_DEPTH};
use crate::utils::json::scalar_text;

pub fn eval_filter(doc: &BsonDocument, filter: &Filter) -> bool {
    match filter {
        Filter::True => true,
        Filter::And(fs) => fs.iter().all(|f| eval_filter(doc, f)),
        Filter::Cmp { path, op, value } => get_path(doc, path).is_some_and(|v| match op {
            CmpOp::Eq => matches_any(v, |x| bson_eq(x, value)),
            CmpOp::Gte => matches_any(v, |x| {
                comparable(x, value) && compare_bson(x, value) != Ordering::Less
            }),
            CmpOp::Lte => matches_any(v, |x| {
                comparable(x, value) && compare_bson(x, value) != Ordering::Greater
            }),
        }),
        Filter::In { path, values } => {
            get_path(doc, path).is_some_and(|v| matches_any(v, |x| is_in_set(x, values)))
        }
        Filter::Regex { path, regex } => get_path(doc, path).is_some_and(|v| {
            matches_any(v, |x| matches!(x, Bson::String(s) if regex.is_match(s)))
        }),
    }
}

// Arrays match when the whole value or any element satisfies the predicate.
fn matches_any(v: &Bson, pred: impl Fn(&Bson) -> bool) -> bool {
    if pred(v) {
        return true;
    }
    match v {
        Bson::Array(items) => items.iter().any(pred),
        _ => false,
    }
}

fn is_in_set(v: &Bson, set: &[String]) -> bool {
    scalar_text(v).is_some_and(|t| set.iter().any(|x| *x == t))
}

fn bson_eq(a: &Bson, b: &Bson) -> bool {
    if is_num(a) && is_num(b) {
        return compare_bson(a, b) == Ordering::Equal;
    }
    a == b
}

// Range bounds only apply between values of the same family.
fn comparable(a: &Bson, b: &Bson) -> bool {
    (is_num(a) && is_num(b)) || type_rank(a) == type_rank(b)
}

/// Resolve a dotted path inside a document.
pub fn get_path<'a>(doc: &'a BsonDocument, path: &str) -> Option<&'a Bson> {
    if path.is_empty() || path.len() > 1024 {
        return None;
    }
    let mut cur = doc;
    let mut parts = path.split('.').peekable();
    let mut segs = 0usize;
    while let Some(part) = parts.next() {
        segs += 1;
        if segs > MAX_PATH_DEPTH {
            return None;
        }
        let v = cur.get(part)?;
        if parts.peek().is_none() {
            return Some(v);
        }
        match v {
            Bson::Document(d) => cur = d,
            _ => return None,
        }
    }
    None
}

fn is_num(x: &Bson) -> bool {
    matches!(x, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_))
}

#[allow(clippy::cast_precision_loss)]
fn as_f64_num(x: &Bson) -> f64 {
    match x {
        Bson::Int32(i) => f64::from(*i),
        Bson::Int64(i) => *i as f64,
        Bson::Double(f) => *f,
        _ => f64::NAN,
    }
}

/// Total order over BSON values: numbers compare numerically across widths,
/// strings and booleans compare naturally, anything else by type rank.
pub fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    if is_num(a) && is_num(b) {
        if let (Bson::Int64(x), Bson::Int64(y)) = (a, b) {
            return x.cmp(y);
        }
        return as_f64_num(a).total_cmp(&as_f64_num(b));
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => x.cmp(y),
        (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

const fn type_rank(v: &Bson) -> u8 {
    match v {
        Bson::Null => 0,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 1,
        Bson::String(_) | Bson::Symbol(_) => 2,
        Bson::Document(_) => 3,
        Bson::Array(_) => 4,
        Bson::Binary(_) => 5,
        Bson::ObjectId(_) => 6,
        Bson::Boolean(_) => 7,
        Bson::DateTime(_) => 8,
        Bson::Timestamp(_) => 9,
        Bson::RegularExpression(_) => 10,
        _ => 11,
    }
}
