//! `${name}` placeholder substitution for query templates.

use crate::errors::QueryError;
use crate::types::{ParameterSet, TypeHints};
use serde_json::Value;

/// Type hint that renders a value as a quoted literal.
pub const STRING_HINT: &str = "String";

/// Substitute every placeholder in `template`.
///
/// Output is assembled in one pass, so substituted text is never scanned
/// again. Any placeholder without a non-null value fails the whole bind.
pub fn bind(template: &str, params: &ParameterSet, hints: &TypeHints) -> Result<String, QueryError> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    let mut in_string = false;
    for (start, end, key) in scan(template) {
        let value = params
            .get(key)
            .filter(|v| !v.is_null())
            .ok_or_else(|| QueryError::MissingParameter(key.to_string()))?;
        let literal = &template[last..start];
        in_string = inside_string_after(literal, in_string);
        out.push_str(literal);
        out.push_str(&render(key, value, hints.get(key).map(String::as_str), in_string)?);
        last = end;
    }
    out.push_str(&template[last..]);
    Ok(out)
}

/// Placeholder names in order of first appearance.
#[must_use]
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for (_, _, key) in scan(template) {
        if !names.iter().any(|n| n == key) {
            names.push(key.to_string());
        }
    }
    names
}

// Yields (start, end, name) for each `${name}`; the name runs to the first `}`
// and must be non-empty.
fn scan(template: &str) -> impl Iterator<Item = (usize, usize, &str)> {
    let mut pos = 0;
    std::iter::from_fn(move || {
        while let Some(rel) = template[pos..].find("${") {
            let start = pos + rel;
            let name_start = start + 2;
            let Some(close) = template[name_start..].find('}') else {
                pos = template.len();
                return None;
            };
            if close == 0 {
                pos = start + 1;
                continue;
            }
            let end = name_start + close + 1;
            pos = end;
            return Some((start, end, &template[name_start..name_start + close]));
        }
        pos = template.len();
        None
    })
}

// Whether a double-quoted JSON string is still open after `literal`.
fn inside_string_after(literal: &str, mut open: bool) -> bool {
    let mut escaped = false;
    for c in literal.chars() {
        if escaped {
            escaped = false;
        } else if open && c == '\\' {
            escaped = true;
        } else if c == '"' {
            open = !open;
        }
    }
    open
}

// An apostrophe is plain text inside a double-quoted string, but would end or
// start a literal anywhere else.
fn render(key: &str, value: &Value, hint: Option<&str>, in_string: bool) -> Result<String, QueryError> {
    let quoted = hint == Some(STRING_HINT);
    let text = match value {
        Value::String(s) => {
            let apostrophe_breaks = quoted || !in_string;
            if s.contains(['"', '\\']) || s.contains("${") || (apostrophe_breaks && s.contains('\'')) {
                return Err(QueryError::MalformedFilter(format!(
                    "parameter `{key}` contains template-breaking characters"
                )));
            }
            s.clone()
        }
        other => other.to_string(),
    };
    Ok(if quoted { format!("'{text}'") } else { text })
}
