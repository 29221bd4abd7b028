//! fieldlock CLI - operator tooling over JSON files
//!
//! Each subcommand is a plain function here so it can be tested without
//! spawning the binary:
//! - [`diff_documents`] lists the fields an edit would claim
//! - [`check_field`] answers whether a user may write one field
//! - [`strip_document`] splits a persisted document into content and owners

#![warn(missing_docs)]

use anyhow::{Context, Result};
use fieldlock_document::FieldPath;
use fieldlock_ownership::{
    extract_metadata, ChangeDetector, Decision, Extracted, FieldLabeler, OwnershipMap,
    PermissionGate, UserId,
};
use fieldlock_store::StoreConfig;
use serde::Serialize;
use serde_json::Value;
use std::fmt::{self, Display, Formatter};
use std::path::Path;

/// Read and parse a JSON file
pub fn read_document(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Field labeler from an optional TOML config file
pub fn load_labeler(config: Option<&Path>) -> Result<FieldLabeler> {
    let Some(path) = config else {
        return Ok(FieldLabeler::new());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = StoreConfig::from_toml_str(&text)
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!(labels = config.field_labels.len(), "loaded field labels");
    Ok(config.labeler())
}

/// Claims `user` would record by turning `old` into `new`, as a JSON object
#[must_use]
pub fn diff_documents(old: Value, new: Value, user: &UserId) -> Value {
    let old = extract_metadata(old).content;
    let new = extract_metadata(new).content;
    let claims = ChangeDetector::new().detect(&old, &new, user);
    tracing::debug!(claims = claims.len(), "diff complete");

    let entries = claims
        .iter()
        .map(|(path, owner)| (path.to_string(), Value::String(owner.to_string())))
        .collect();
    Value::Object(entries)
}

/// Answer of the `check` subcommand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckVerdict {
    /// The user may write the field
    Allowed,
    /// Another user owns the field
    Denied {
        /// Label of the field
        field: String,
        /// Current owner
        owner: UserId,
    },
}

impl CheckVerdict {
    /// Process exit code for this verdict
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Allowed => 0,
            Self::Denied { .. } => 1,
        }
    }
}

impl Display for CheckVerdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allowed => write!(f, "allowed"),
            Self::Denied { field, owner } => write!(f, "denied: {field} owned by {owner}"),
        }
    }
}

/// Whether `user` may write `path` in a persisted document
///
/// Ownership comes from the document's own metadata key.
pub fn check_field(
    document: Value,
    path: &str,
    user: &UserId,
    labeler: &FieldLabeler,
) -> Result<CheckVerdict> {
    let path: FieldPath = path
        .parse()
        .with_context(|| format!("invalid field path '{path}'"))?;
    let extracted = extract_metadata(document);

    let decision =
        PermissionGate::new().decide(&path, &extracted.owners(), user, &extracted.content);
    tracing::debug!(%path, ?decision, "gate decision");

    Ok(match decision {
        Decision::OwnedBy(owner) => CheckVerdict::Denied {
            field: labeler.label(&path),
            owner,
        },
        _ => CheckVerdict::Allowed,
    })
}

/// Output of the `strip` subcommand
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrippedDocument {
    /// Document without bookkeeping keys
    pub content: Value,
    /// Field owners, empty if the document carried none
    pub ownership: OwnershipMap,
}

/// Split a persisted document into content and field owners
#[must_use]
pub fn strip_document(document: Value) -> StrippedDocument {
    let Extracted { content, ownership } = extract_metadata(document);
    StrippedDocument {
        content,
        ownership: ownership.unwrap_or_default(),
    }
}
