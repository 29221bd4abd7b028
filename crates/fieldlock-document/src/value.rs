//! Value resolution, emptiness and equality over JSON documents
//!
//! All functions here are total: a path that does not fit the document shape
//! resolves to `None` instead of failing.

use crate::path::{FieldPath, Segment};
use serde_json::Value;

/// Resolve the value at `path`
///
/// Key segments look up records; index segments look up lists. A numeric
/// key against a list, or an index against a record (as its decimal key), is
/// also followed. Returns `None` for a missing key, an out-of-range index, or
/// any attempt to descend into a scalar.
#[must_use]
pub fn resolve<'a>(document: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(document, |current, segment| step(current, segment))
}

/// Resolve using a rendered path string
///
/// A malformed path resolves as not found.
#[must_use]
pub fn resolve_str<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    let path: FieldPath = path.parse().ok()?;
    resolve(document, &path)
}

fn step<'a>(current: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match (current, segment) {
        (Value::Object(map), Segment::Key(key)) => map.get(key),
        (Value::Object(map), Segment::Index(index)) => map.get(&index.to_string()),
        (Value::Array(items), Segment::Index(index)) => items.get(*index),
        (Value::Array(items), Segment::Key(key)) => {
            if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            items.get(key.parse::<usize>().ok()?)
        }
        _ => None,
    }
}

/// Whether a value counts as "unset"
///
/// Empty: `null`, blank or whitespace-only string, empty list, record with no
/// keys. `0` and `false` are values.
#[must_use]
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Whether the value at `path` is absent or empty
#[must_use]
pub fn is_empty_at(document: &Value, path: &FieldPath) -> bool {
    resolve(document, path).map_or(true, is_empty_value)
}

/// Structural equality with numeric comparison of numbers
///
/// `1` and `1.0` are equal; records compare regardless of key order.
#[must_use]
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            x == y || matches!((x.as_f64(), y.as_f64()), (Some(p), Some(q)) if p == q)
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xm), Value::Object(ym)) => {
            xm.len() == ym.len()
                && xm
                    .iter()
                    .all(|(k, x)| ym.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}
