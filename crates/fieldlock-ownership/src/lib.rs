//! fieldlock Ownership Tracker
//!
//! Field-level edit ownership for a JSON document shared by a team. Once a
//! field is filled in, only the user who filled it may change it to another
//! value.
//!
//! # Core Concepts
//!
//! - [`ChangeDetector`]: Which fields an edit fills or modifies ([`ClaimSet`])
//! - [`PermissionGate`]: Whether a user may write a field now ([`Decision`])
//! - [`OwnershipMap`]: Persisted path → owner record
//! - [`extract_metadata`] / [`merge_metadata`]: Move the map out of and back into
//!   the stored document under [`FIELD_EDITORS_KEY`]
//! - [`FieldLabeler`]: Names for fields in rejection messages
//!
//! Everything here is pure and synchronous.
//!
//! # Example
//!
//! ```rust
//! use fieldlock_ownership::{ChangeDetector, PermissionGate, UserId};
//! use serde_json::json;
//!
//! let old = json!({"name": "", "notes": {"a": 1}});
//! let new = json!({"name": "Alice", "notes": {"a": 1}});
//! let alice = UserId::from("u1");
//!
//! let claims = ChangeDetector::new().detect(&old, &new, &alice);
//! assert_eq!(claims.len(), 1);
//!
//! let ownership = claims.to_ownership();
//! let denied = PermissionGate::new().allows(
//!     &"name".parse().unwrap(),
//!     &ownership,
//!     &UserId::from("u2"),
//!     &new,
//! );
//! assert!(!denied);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod detect;
mod gate;
mod label;
mod metadata;
mod ownership;

// Re-exports
pub use detect::{ChangeDetector, FieldChange};
pub use gate::{Decision, Denial, PermissionGate};
pub use label::FieldLabeler;
pub use metadata::{
    extract_metadata, merge_metadata, strip_reserved_keys, Extracted, FIELD_EDITORS_KEY,
};
pub use ownership::{ClaimSet, OwnershipMap, UserId};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
