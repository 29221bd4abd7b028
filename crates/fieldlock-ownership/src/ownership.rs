//! Ownership map and claim set types

use fieldlock_document::FieldPath;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt::{self, Display, Formatter};

/// Opaque user identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a user id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Persisted record of which user owns each field
///
/// Keyed by the rendered path string so entries written under any path
/// spelling survive a load/save cycle untouched. Serialized as a plain JSON
/// object.
///
/// # Invariants
/// - Entries are only added or overwritten, never removed while the document
///   exists.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnershipMap(BTreeMap<String, UserId>);

impl OwnershipMap {
    /// Create empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Owner of a field, if claimed
    #[must_use]
    pub fn owner_of(&self, path: &FieldPath) -> Option<&UserId> {
        self.0.get(&path.to_string())
    }

    /// Owner by rendered path string
    #[inline]
    #[must_use]
    pub fn owner_of_str(&self, path: &str) -> Option<&UserId> {
        self.0.get(path)
    }

    /// Record an owner, replacing any previous one
    #[inline]
    pub fn insert(&mut self, path: impl Into<String>, owner: UserId) -> Option<UserId> {
        self.0.insert(path.into(), owner)
    }

    /// Lay claims over this map; claims win on collision
    pub fn overlay(&mut self, claims: &ClaimSet) {
        for (path, owner) in claims.iter() {
            self.0.insert(path.to_string(), owner.clone());
        }
    }

    /// Number of owned fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no field is owned
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(path, owner)` in path order
    #[inline]
    pub fn iter(&self) -> btree_map::Iter<'_, String, UserId> {
        self.0.iter()
    }
}

impl FromIterator<(String, UserId)> for OwnershipMap {
    fn from_iter<I: IntoIterator<Item = (String, UserId)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a OwnershipMap {
    type Item = (&'a String, &'a UserId);
    type IntoIter = btree_map::Iter<'a, String, UserId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Proposed ownership assertions from one edit
///
/// Every entry names the acting user; claims only become ownership once the
/// permission gate accepts all of them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct ClaimSet(BTreeMap<FieldPath, UserId>);

impl ClaimSet {
    /// Create empty claim set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a claim
    #[inline]
    pub fn insert(&mut self, path: FieldPath, user: UserId) {
        self.0.insert(path, user);
    }

    /// Claimant for a path
    #[inline]
    #[must_use]
    pub fn get(&self, path: &FieldPath) -> Option<&UserId> {
        self.0.get(path)
    }

    /// Number of claims
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the edit claimed nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate claims in path order
    #[inline]
    pub fn iter(&self) -> btree_map::Iter<'_, FieldPath, UserId> {
        self.0.iter()
    }

    /// Claimed paths in order
    #[inline]
    pub fn paths(&self) -> impl Iterator<Item = &FieldPath> {
        self.0.keys()
    }

    /// Claims keyed by rendered path
    #[must_use]
    pub fn to_ownership(&self) -> OwnershipMap {
        self.0
            .iter()
            .map(|(path, user)| (path.to_string(), user.clone()))
            .collect()
    }
}

impl FromIterator<(FieldPath, UserId)> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = (FieldPath, UserId)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
