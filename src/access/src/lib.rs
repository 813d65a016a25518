//! # CretoAI Access Control
//!
//! Role and user based access control with attribute-level filtering.
//!
//! ## Features
//!
//! - **Grant store** binding (role, resource) pairs to `verb:scope` policies
//! - **Policy resolution** with `:any` and `*` wildcard subsumption
//! - **Attribute filtering** projecting objects to the fields a grant allows
//! - **Data synchronization** with single-flight reads and optimistic,
//!   rollback-capable updates against an external provider
//! - **User evaluation** through a pluggable role mapper
//!
//! ## Example
//!
//! ```rust
//! use cretoai_access::{filter, AccessControl, PolicyMetadata};
//! use serde_json::json;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut ac = AccessControl::new();
//!     ac.grant("admin")
//!         .read_any("video", PolicyMetadata::new(["*", "!password"]))?;
//!
//!     let permission = ac.can("admin").read_own("video");
//!     assert!(permission.granted);
//!
//!     let video = json!({"title": "x", "password": "y"});
//!     let view = filter::filter_value(&video, permission.attributes());
//!     assert_eq!(view, json!({"title": "x"}));
//!
//!     Ok(())
//! }
//! ```

pub mod types;
pub mod error;
pub mod config;
pub mod store;
pub mod resolver;
pub mod filter;
pub mod roles;
pub mod sync;
pub mod controller;

// Re-export commonly used types
pub use types::{
    Grant, GrantAction, GrantAttribute, PermissionResult, Policy, PolicyMetadata,
    Possession, ResourceId, RoleId, Verb,
};
pub use config::AccessConfig;
pub use controller::{AccessControl, GrantBuilder, Permission, UserAccessControl};
pub use error::{AccessError, Result};
pub use roles::{RoleAssignments, RoleMapper};
pub use store::{GrantStore, NestedGrants};
pub use sync::{DataSynchronizer, GrantProvider, MemoryProvider, SharedGrants, SyncStats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
