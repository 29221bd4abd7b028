//! fieldlock Store - Workbook step persistence with field ownership
//!
//! The store that sits between editors and persistence:
//! - Checks that the acting user belongs to the project
//! - Detects which fields a save fills or modifies
//! - Rejects saves touching fields owned by other team members
//! - Persists content and ownership together under a version token
//! - Tracks submitted steps for progress reporting
//!
//! # Example
//!
//! ```rust
//! use fieldlock_ownership::UserId;
//! use fieldlock_store::{
//!     DocumentStore, InMemoryRepository, ProjectMembers, StaticAccessDirectory, StepKey,
//!     StoreConfig, StoreError,
//! };
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), StoreError> {
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let access = StaticAccessDirectory::new();
//! access.register("p1", ProjectMembers::new("ada").with_member("grace"));
//!
//! let store = DocumentStore::new(
//!     Arc::new(InMemoryRepository::new()),
//!     Arc::new(access),
//!     StoreConfig::new(),
//! );
//!
//! let key = StepKey::new("p1", 1);
//! let ada = UserId::from("ada");
//! let grace = UserId::from("grace");
//!
//! // first save: nothing stored yet
//! let saved = store.save_step(&key, &ada, json!({"title": "Plan"}), None).await?;
//!
//! // grace may not rewrite ada's title
//! let err = store
//!     .save_step(&key, &grace, json!({"title": "Mine"}), Some(saved.version))
//!     .await
//!     .unwrap_err();
//! assert!(err.is_permission_error());
//! # Ok(())
//! # })
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod access;
pub mod error;
pub mod repository;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use access::{AccessDirectory, ProjectMembers, StaticAccessDirectory};
pub use error::{RepositoryError, StoreError};
pub use repository::{InMemoryRepository, StepRepository};
pub use store::DocumentStore;
pub use types::{
    ProjectProgress, SaveOutcome, StepKey, StepSnapshot, StepWrite, StoreConfig, StoredStep,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the store
    pub use crate::{
        AccessDirectory, DocumentStore, InMemoryRepository, ProjectMembers,
        StaticAccessDirectory, StepKey, StepRepository, StoreConfig, StoreError,
    };
    pub use fieldlock_ownership::{OwnershipMap, UserId};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
