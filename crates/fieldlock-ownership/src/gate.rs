//! Permission gate for field writes
//!
//! Decides whether a user may write a field given the current document and
//! its ownership map.

use crate::ownership::{ClaimSet, OwnershipMap, UserId};
use fieldlock_document::{is_empty_at, FieldPath};
use serde::Serialize;
use serde_json::Value;

/// Outcome of a single gate check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "owner", rename_all = "snake_case")]
pub enum Decision {
    /// Field is currently empty; anyone may fill it
    EmptyField,

    /// Field has a value but no recorded owner
    ///
    /// Documents written before ownership tracking carry no entries. Treating
    /// them as open keeps those documents editable; this is a compatibility
    /// rule, not an access policy.
    Unowned,

    /// Acting user owns the field
    Owner,

    /// Another user owns the field
    OwnedBy(UserId),
}

impl Decision {
    /// Whether the write may proceed
    #[inline]
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Self::OwnedBy(_))
    }
}

/// A rejected claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Denial {
    /// Field that may not be written
    pub path: FieldPath,

    /// Current owner of the field
    pub owner: UserId,

    /// User that attempted the write
    pub attempted_by: UserId,
}

/// Field-level write gate
///
/// # Rules
/// 1. Empty in the current document → allow
/// 2. No ownership entry → allow
/// 3. Otherwise allow only the recorded owner
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionGate;

impl PermissionGate {
    /// Create new gate
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Decide whether `user` may write `path` right now
    #[must_use]
    pub fn decide(
        &self,
        path: &FieldPath,
        ownership: &OwnershipMap,
        user: &UserId,
        current: &Value,
    ) -> Decision {
        if is_empty_at(current, path) {
            return Decision::EmptyField;
        }

        match ownership.owner_of(path) {
            None => Decision::Unowned,
            Some(owner) if owner == user => Decision::Owner,
            Some(owner) => Decision::OwnedBy(owner.clone()),
        }
    }

    /// Boolean form of [`decide`](Self::decide)
    #[inline]
    #[must_use]
    pub fn allows(
        &self,
        path: &FieldPath,
        ownership: &OwnershipMap,
        user: &UserId,
        current: &Value,
    ) -> bool {
        self.decide(path, ownership, user, current).is_allowed()
    }

    /// Check every claim of an edit
    ///
    /// # Returns
    /// All denials in path order; empty means the whole edit may be applied.
    #[must_use]
    pub fn check_claims(
        &self,
        claims: &ClaimSet,
        ownership: &OwnershipMap,
        current: &Value,
    ) -> Vec<Denial> {
        claims
            .iter()
            .filter_map(|(path, user)| match self.decide(path, ownership, user, current) {
                Decision::OwnedBy(owner) => Some(Denial {
                    path: path.clone(),
                    owner,
                    attempted_by: user.clone(),
                }),
                _ => None,
            })
            .collect()
    }
}
