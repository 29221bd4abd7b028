//! Change detection between two document versions
//!
//! Reports which leaf fields an edit fills in or modifies, and who is making
//! the edit. Performs no authorization.

use crate::ownership::{ClaimSet, UserId};
use fieldlock_document::{enumerate_paths, is_empty_value, resolve, values_equal, FieldPath};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// What happened to one field between two versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldChange {
    /// Same value, or empty in both
    Unchanged,

    /// Empty before, non-empty after
    Filled,

    /// Non-empty before and after, different values
    Modified,

    /// Non-empty before, empty after
    Cleared,
}

impl FieldChange {
    /// Whether this change produces an ownership claim
    ///
    /// Clearing never claims: ownership survives the field being emptied.
    #[inline]
    #[must_use]
    pub fn is_claim(self) -> bool {
        matches!(self, Self::Filled | Self::Modified)
    }
}

/// Field-level change detector
///
/// # Characteristics
/// - Pure and stateless
/// - Union of leaf paths of both versions (fields may appear or vanish)
/// - Lists compared positionally
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeDetector;

impl ChangeDetector {
    /// Create new detector
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Claims made by `user` going from `old` to `new`
    #[must_use]
    pub fn detect(&self, old: &Value, new: &Value, user: &UserId) -> ClaimSet {
        self.changes(old, new)
            .into_iter()
            .filter(|(_, change)| change.is_claim())
            .map(|(path, _)| (path, user.clone()))
            .collect()
    }

    /// Every field that differs between the versions
    #[must_use]
    pub fn changes(&self, old: &Value, new: &Value) -> BTreeMap<FieldPath, FieldChange> {
        let mut paths = enumerate_paths(old);
        paths.extend(enumerate_paths(new));

        paths
            .into_iter()
            .filter_map(|path| {
                let change = Self::classify(old, new, &path);
                (change != FieldChange::Unchanged).then_some((path, change))
            })
            .collect()
    }

    /// Classify a single path
    #[must_use]
    pub fn classify(old: &Value, new: &Value, path: &FieldPath) -> FieldChange {
        let before = resolve(old, path).filter(|v| !is_empty_value(v));
        let after = resolve(new, path).filter(|v| !is_empty_value(v));

        match (before, after) {
            (None, None) => FieldChange::Unchanged,
            (None, Some(_)) => FieldChange::Filled,
            (Some(_), None) => FieldChange::Cleared,
            (Some(a), Some(b)) if values_equal(a, b) => FieldChange::Unchanged,
            (Some(_), Some(_)) => FieldChange::Modified,
        }
    }
}
