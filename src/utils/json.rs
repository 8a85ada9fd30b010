//! Conversions between `serde_json` values and BSON, plus the tolerant parser
//! used for bound query templates.

use bson::{Bson, Document as BsonDocument};
use serde_json::{Map, Number, Value};

/// Convert a JSON value into BSON. Integral numbers widen to `Int64`.
#[must_use]
pub fn json_to_bson(val: &Value) -> Bson {
    match val {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Bson::Int64(i)
            } else {
                Bson::Double(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => Bson::String(s.clone()),
        Value::Array(items) => Bson::Array(items.iter().map(json_to_bson).collect()),
        Value::Object(obj) => Bson::Document(json_object_to_bson(obj)),
    }
}

fn json_object_to_bson(obj: &Map<String, Value>) -> BsonDocument {
    let mut out = BsonDocument::new();
    for (k, v) in obj {
        out.insert(k.clone(), json_to_bson(v));
    }
    out
}

/// Convert a JSON value that must be an object into a BSON document.
pub fn json_value_to_bson_document(val: &Value) -> Result<BsonDocument, String> {
    val.as_object().map(json_object_to_bson).ok_or_else(|| format!("expected JSON object, got {val}"))
}

/// Convert BSON into relaxed JSON. Types without a JSON counterpart become strings.
#[must_use]
pub fn bson_to_json(val: &Bson) -> Value {
    match val {
        Bson::Null => Value::Null,
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(i) => Value::from(*i),
        Bson::Int64(i) => Value::from(*i),
        Bson::Double(d) => Number::from_f64(*d).map_or(Value::Null, Value::Number),
        Bson::String(s) => Value::String(s.clone()),
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
        Bson::Document(d) => bson_document_to_json(d),
        other => Value::String(other.to_string()),
    }
}

#[must_use]
pub fn bson_document_to_json(doc: &BsonDocument) -> Value {
    let mut out = Map::with_capacity(doc.len());
    for (k, v) in doc {
        out.insert(k.clone(), bson_to_json(v));
    }
    Value::Object(out)
}

/// Textual form of a scalar used for set-membership comparison.
/// Returns `None` for arrays, documents and binary types.
#[must_use]
pub fn scalar_text(val: &Bson) -> Option<String> {
    match val {
        Bson::String(s) => Some(s.clone()),
        Bson::Int32(i) => Some(i.to_string()),
        Bson::Int64(i) => Some(i.to_string()),
        Bson::Double(d) => Some(d.to_string()),
        Bson::Boolean(b) => Some(b.to_string()),
        Bson::Null => Some("null".to_string()),
        _ => None,
    }
}

/// Parse JSON text, accepting single-quoted string literals as a fallback.
///
/// `String`-hinted parameters render as `'value'`, so a bound template may
/// contain them. Strict parsing is tried first; the strict error is returned
/// when the relaxed pass fails too.
pub fn parse_relaxed(text: &str) -> Result<Value, serde_json::Error> {
    match serde_json::from_str(text) {
        Ok(v) => Ok(v),
        Err(strict) if text.contains('\'') => {
            serde_json::from_str(&requote_single_quoted(text)).map_err(|_| strict)
        }
        Err(strict) => Err(strict),
    }
}

fn requote_single_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut in_double = false;
    let mut in_single = false;
    let mut escaped = false;
    for c in text.chars() {
        if in_double {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_double = false;
            }
        } else if in_single {
            if escaped {
                if c == '\'' {
                    // `\'` is not a JSON escape; keep the bare quote
                    out.pop();
                }
                out.push(c);
                escaped = false;
            } else {
                match c {
                    '\\' => {
                        out.push(c);
                        escaped = true;
                    }
                    '\'' => {
                        out.push('"');
                        in_single = false;
                    }
                    '"' => out.push_str("\\\""),
                    _ => out.push(c),
                }
            }
        } else {
            match c {
                '"' => {
                    in_double = true;
                    out.push(c);
                }
                '\'' => {
                    in_single = true;
                    out.push('"');
                }
                _ => out.push(c),
            }
        }
    }
    out
}
