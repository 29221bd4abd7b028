//! Error types for the document store
//!
//! Provides error handling for:
//! - Repository failures and version conflicts
//! - Project membership checks
//! - Field ownership rejections
//! - Configuration loading

use crate::types::StepKey;
use fieldlock_document::FieldPath;
use fieldlock_ownership::UserId;

/// Persistence backend errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// Stored version moved since it was read (optimistic concurrency failure)
    #[error("version conflict on {key}: expected {expected:?}, found {actual:?}")]
    VersionConflict {
        /// Step being written
        key: StepKey,
        /// Version the writer read (`None` = expected no document)
        expected: Option<u64>,
        /// Version actually stored (`None` = no document)
        actual: Option<u64>,
    },

    /// Backend-specific failure
    #[error("backend error: {0}")]
    Backend(String),
}

/// Main store error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// User is neither author nor team member of the project
    #[error("user {user} is not a member of project {project}")]
    AccessDenied {
        /// Acting user
        user: UserId,
        /// Project they tried to reach
        project: String,
    },

    /// Operation reserved to the project author
    #[error("only the author of project {project} may do this (attempted by {user})")]
    AuthorOnly {
        /// Acting user
        user: UserId,
        /// Project whose author is required
        project: String,
    },

    /// Project unknown to the access directory
    #[error("unknown project: {0}")]
    UnknownProject(String),

    /// Edit touches fields owned by other users; nothing was written
    #[error("'{field}' was filled in by {owner} and can only be changed by them")]
    PermissionDenied {
        /// Human-readable name of the first rejected field
        field: String,
        /// Path of the first rejected field
        path: FieldPath,
        /// Owner of the first rejected field
        owner: UserId,
        /// Every rejected path, in path order
        denied: Vec<FieldPath>,
    },

    /// The step changed since the caller loaded it; nothing was written
    #[error("{key} changed since it was loaded (expected version {expected:?}, found {actual:?})")]
    VersionConflict {
        /// Step being written
        key: StepKey,
        /// Version the caller loaded (`None` = saw no document)
        expected: Option<u64>,
        /// Version currently stored (`None` = no document)
        actual: Option<u64>,
    },

    /// Step content is not a JSON object
    #[error("invalid content: {0}")]
    InvalidContent(String),

    /// Repository failure
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Check if reloading the step and repeating the edit may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::VersionConflict { .. }
                | Self::Repository(RepositoryError::Backend(_))
                | Self::Repository(RepositoryError::VersionConflict { .. })
        )
    }

    /// Check if the user lacks permission (document or field level)
    #[inline]
    #[must_use]
    pub fn is_permission_error(&self) -> bool {
        matches!(
            self,
            Self::AccessDenied { .. } | Self::AuthorOnly { .. } | Self::PermissionDenied { .. }
        )
    }
}
