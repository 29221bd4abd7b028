//! Leaf path enumeration
//!
//! Walks a document down to its scalar leaves. Reserved bookkeeping keys
//! (leading `_`) are metadata and never produce paths.

use crate::path::{FieldPath, Segment};
use serde_json::Value;
use std::collections::BTreeSet;

/// Marker character for internal bookkeeping keys
pub const RESERVED_PREFIX: char = '_';

/// Whether a record key is internal bookkeeping
#[inline]
#[must_use]
pub fn is_reserved_key(key: &str) -> bool {
    key.starts_with(RESERVED_PREFIX)
}

/// Every path from the root to a scalar leaf
///
/// - Records contribute `.key` for each non-reserved key.
/// - Lists contribute `[index]` for each element.
/// - Empty records and lists contribute nothing.
/// - `null` under a key is a leaf; a bare scalar root has no path.
#[must_use]
pub fn enumerate_paths(document: &Value) -> BTreeSet<FieldPath> {
    let mut out = BTreeSet::new();
    let mut current = FieldPath::root();
    collect(document, &mut current, &mut out);
    out
}

fn collect(value: &Value, current: &mut FieldPath, out: &mut BTreeSet<FieldPath>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if is_reserved_key(key) {
                    continue;
                }
                current.push(Segment::Key(key.clone()));
                collect(child, current, out);
                current.pop();
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                current.push(Segment::Index(index));
                collect(child, current, out);
                current.pop();
            }
        }
        _ => {
            if !current.is_empty() {
                out.insert(current.clone());
            }
        }
    }
}
