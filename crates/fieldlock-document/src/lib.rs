//! fieldlock Document Model
//!
//! Addressing and inspection helpers for semi-structured JSON documents.
//!
//! # Core Concepts
//!
//! - [`FieldPath`]: Dot/bracket addressing (`items[2].amount`)
//! - [`resolve`]: Total value lookup (malformed or mismatched paths are "not found")
//! - [`is_empty_at`]: The "unset" classification used for ownership
//! - [`enumerate_paths`]: Every leaf path, skipping reserved `_` keys
//! - [`values_equal`]: Structural equality with numeric number comparison
//!
//! # Example
//!
//! ```rust
//! use fieldlock_document::{enumerate_paths, is_empty_at, FieldPath};
//! use serde_json::json;
//!
//! let doc = json!({"name": "", "items": [{"v": 1}]});
//! let paths: Vec<String> = enumerate_paths(&doc).iter().map(ToString::to_string).collect();
//! assert_eq!(paths, vec!["items[0].v", "name"]);
//!
//! let name: FieldPath = "name".parse().unwrap();
//! assert!(is_empty_at(&doc, &name));
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

// Core modules
mod enumerate;
mod path;
mod value;

// Re-exports
pub use enumerate::{enumerate_paths, is_reserved_key, RESERVED_PREFIX};
pub use path::{FieldPath, PathError, Segment};
pub use value::{is_empty_at, is_empty_value, resolve, resolve_str, values_equal};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
