//! Ownership metadata embedded in persisted documents
//!
//! The ownership map travels inside the stored document under
//! [`FIELD_EDITORS_KEY`]. These helpers move it in and out so that nothing
//! above the store ever sees it.

use crate::ownership::{ClaimSet, OwnershipMap, UserId};
use fieldlock_document::is_reserved_key;
use serde_json::{Map, Value};

/// Reserved top-level key holding the ownership map
pub const FIELD_EDITORS_KEY: &str = "_fieldEditors";

/// A persisted document split into content and ownership
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    /// Document with the metadata key removed
    pub content: Value,

    /// Ownership map found under the metadata key
    ///
    /// `None` when the document has no metadata key at all, which is distinct
    /// from a present but empty map.
    pub ownership: Option<OwnershipMap>,
}

impl Extracted {
    /// Ownership map, empty if the document had none
    #[must_use]
    pub fn owners(&self) -> OwnershipMap {
        self.ownership.clone().unwrap_or_default()
    }
}

/// Split a persisted document into content and ownership map
///
/// Malformed metadata is tolerated: a non-object value yields an empty map,
/// and entries whose owner is not a string are dropped.
#[must_use]
pub fn extract_metadata(mut document: Value) -> Extracted {
    let raw = document
        .as_object_mut()
        .and_then(|map| map.remove(FIELD_EDITORS_KEY));

    let ownership = raw.map(|raw| match raw {
        Value::Object(entries) => entries
            .into_iter()
            .filter_map(|(path, owner)| match owner {
                Value::String(owner) => Some((path, UserId::from(owner))),
                other => {
                    tracing::warn!(%path, value = %other, "dropping malformed field editor entry");
                    None
                }
            })
            .collect(),
        other => {
            tracing::warn!(value = %other, "ignoring malformed field editor metadata");
            OwnershipMap::new()
        }
    });

    Extracted {
        content: document,
        ownership,
    }
}

/// Build the document to persist: content plus `existing` overlaid with `claims`
///
/// Inputs are not modified. Non-record content is returned as is. The
/// metadata key is written whenever `existing` is present or a claim adds an
/// entry, so a document round-trips through [`extract_metadata`] unchanged.
#[must_use]
pub fn merge_metadata(
    content: &Value,
    existing: Option<&OwnershipMap>,
    claims: &ClaimSet,
) -> Value {
    let mut merged = content.clone();

    let Value::Object(map) = &mut merged else {
        return merged;
    };

    if existing.is_none() && claims.is_empty() {
        map.remove(FIELD_EDITORS_KEY);
        return merged;
    }

    let mut ownership = existing.cloned().unwrap_or_default();
    ownership.overlay(claims);

    let entries: Map<String, Value> = ownership
        .iter()
        .map(|(path, owner)| (path.clone(), Value::String(owner.to_string())))
        .collect();
    map.insert(FIELD_EDITORS_KEY.to_string(), Value::Object(entries));

    merged
}

/// Remove caller-supplied top-level bookkeeping keys
///
/// Clients must not be able to write ownership or other internal metadata.
/// Returns the removed key names.
pub fn strip_reserved_keys(content: &mut Value) -> Vec<String> {
    let Value::Object(map) = content else {
        return Vec::new();
    };

    let reserved: Vec<String> = map.keys().filter(|k| is_reserved_key(k)).cloned().collect();
    for key in &reserved {
        map.remove(key);
    }
    reserved
}
