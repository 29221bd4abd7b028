//! Core types for the document store

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use fieldlock_ownership::{ClaimSet, FieldLabeler, OwnershipMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Identity of one step document: project + step number
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StepKey {
    /// Owning project
    pub project_id: String,
    /// Step number within the project's workbook
    pub step: u32,
}

impl StepKey {
    /// Create new key
    #[inline]
    #[must_use]
    pub fn new(project_id: impl Into<String>, step: u32) -> Self {
        Self {
            project_id: project_id.into(),
            step,
        }
    }
}

impl Display for StepKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/step-{}", self.project_id, self.step)
    }
}

/// A step as held by the repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredStep {
    /// Persisted document, ownership metadata included
    pub document: Value,
    /// Monotonic version, 1 for the first write
    pub version: u64,
    /// Step has been submitted
    pub completed: bool,
    /// Time of the last write
    pub updated_at: DateTime<Utc>,
}

/// A write request handed to the repository
#[derive(Debug, Clone, PartialEq)]
pub struct StepWrite {
    /// Document to persist
    pub document: Value,
    /// Version the writer read; `None` when it saw no document
    pub expected_version: Option<u64>,
    /// Completion flag to store
    pub completed: bool,
}

/// A step as returned to callers: content without bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepSnapshot {
    /// User-visible content
    pub content: Value,
    /// Field owners
    pub ownership: OwnershipMap,
    /// Version to pass back as `expected_version` on the next write
    pub version: u64,
    /// Step has been submitted
    pub completed: bool,
    /// Time of the last write
    pub updated_at: DateTime<Utc>,
}

/// Result of an accepted save
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveOutcome {
    /// New stored version
    pub version: u64,
    /// Ownership claims recorded by this save
    pub claims: ClaimSet,
    /// Step completion after this save
    pub completed: bool,
}

/// Saved and completed steps of a project
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ProjectProgress {
    /// Project
    pub project_id: String,
    /// Step numbers with a stored document, ascending
    pub saved_steps: Vec<u32>,
    /// Step numbers that have been submitted, ascending
    pub completed_steps: Vec<u32>,
}

impl ProjectProgress {
    /// Whether a given step has been submitted
    #[inline]
    #[must_use]
    pub fn is_completed(&self, step: u32) -> bool {
        self.completed_steps.binary_search(&step).is_ok()
    }
}

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Field label overrides (`items[].amount` → `Line amount`)
    pub field_labels: BTreeMap<String, String>,
    /// Drop `_`-prefixed top-level keys from incoming content
    pub strip_client_metadata: bool,
}

impl StoreConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML
    ///
    /// # Errors
    /// Returns [`StoreError::Config`] if the text is not valid configuration
    pub fn from_toml_str(text: &str) -> Result<Self, StoreError> {
        toml::from_str(text).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// With one field label override
    #[inline]
    #[must_use]
    pub fn with_field_label(mut self, pattern: impl Into<String>, label: impl Into<String>) -> Self {
        self.field_labels.insert(pattern.into(), label.into());
        self
    }

    /// Labeler built from the overrides
    #[must_use]
    pub fn labeler(&self) -> FieldLabeler {
        FieldLabeler::with_overrides(self.field_labels.clone())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            field_labels: BTreeMap::new(),
            strip_client_metadata: true,
        }
    }
}
