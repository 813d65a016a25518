//! Error types for the access controller

use thiserror::Error;

/// Access control errors
///
/// Denial is not an error: an unknown role, resource, or action resolves to
/// a `PermissionResult` with `granted == false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// Mutation attempted after the grant store was locked
    #[error("Grant store is locked: grants cannot be modified after locking")]
    StoreLocked,

    /// The persistence provider failed to read grants
    #[error("Persistence read failed: {0}")]
    PersistenceRead(String),

    /// The persistence provider rejected an update
    #[error("Persistence write failed: {0}")]
    PersistenceWrite(String),

    /// The role mapper failed to read or store role assignments
    #[error("Role mapper error: {0}")]
    RoleMapper(String),

    /// Action tag outside the fixed `verb:scope` vocabulary
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Commit or refresh requested without a persistence provider
    #[error("No data synchronizer attached")]
    NoSynchronizer,

    /// A typed value could not be projected through serde
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AccessError {
    fn from(err: serde_json::Error) -> Self {
        AccessError::Serialization(err.to_string())
    }
}

/// Result type for access control operations
pub type Result<T> = std::result::Result<T, AccessError>;
