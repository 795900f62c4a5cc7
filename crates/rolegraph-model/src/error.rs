//! Error types for role, user and hierarchy operations
//!
//! Every failure the core can produce is listed here. None of them is fatal:
//! services hand them back to the caller, and a failed mutation leaves the
//! stored state exactly as it was.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::roles::RoleId;

/// The kind of record an error or event refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A role record
    Role,
    /// A user record
    User,
}

impl EntityKind {
    /// Get string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Role => "role",
            Self::User => "user",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access management error types.
///
/// These errors cover unknown ids, hierarchy violations, protected-role
/// rules, name validation and the deadline outcomes a real backend may
/// report in place of the mock store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    /// No record with this id exists
    #[error("{kind} {id} not found")]
    NotFound {
        /// Kind of record that was looked up
        kind: EntityKind,
        /// The id that was looked up
        id: String,
    },

    /// The change would introduce (or the data already contains) a cycle
    #[error("Cycle detected: role {role} cannot have {parent} as an ancestor")]
    CycleDetected {
        /// The role whose ancestry is cyclic
        role: RoleId,
        /// The parent that closes the cycle
        parent: RoleId,
    },

    /// The built-in role cannot be deleted or renamed
    #[error("Role '{0}' is protected")]
    Protected(String),

    /// Deletion blocked because other roles still use this one as parent
    #[error("Role {role} still has child roles: {children:?}")]
    HasDescendants {
        /// The role that was to be deleted
        role: RoleId,
        /// Roles that name it as their parent
        children: Vec<RoleId>,
    },

    /// A user was bound to a role name that does not exist
    #[error("Role named '{0}' not found")]
    RoleNotFound(String),

    /// Empty or duplicate name
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The backend did not answer within the configured deadline
    #[error("Operation timed out")]
    Timeout,

    /// The backend abandoned the request
    #[error("Operation cancelled")]
    Cancelled,
}

/// Result type for access management operations.
pub type AccessResult<T> = Result<T, AccessError>;

impl AccessError {
    /// Shorthand for a missing role.
    pub fn role_not_found(id: RoleId) -> Self {
        AccessError::NotFound {
            kind: EntityKind::Role,
            id: id.to_string(),
        }
    }

    /// Shorthand for a missing record of any kind.
    pub fn not_found(kind: EntityKind, id: impl fmt::Display) -> Self {
        AccessError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Check if this error reports a structural hierarchy violation.
    pub fn is_hierarchy_violation(&self) -> bool {
        matches!(
            self,
            AccessError::CycleDetected { .. }
                | AccessError::HasDescendants { .. }
                | AccessError::Protected(_)
        )
    }

    /// Get error code for presentation layers.
    pub fn error_code(&self) -> &'static str {
        match self {
            AccessError::NotFound { .. } => "NOT_FOUND",
            AccessError::CycleDetected { .. } => "CYCLE_DETECTED",
            AccessError::Protected(_) => "PROTECTED",
            AccessError::HasDescendants { .. } => "HAS_DESCENDANTS",
            AccessError::RoleNotFound(_) => "ROLE_NOT_FOUND",
            AccessError::ValidationError(_) => "VALIDATION_ERROR",
            AccessError::Timeout => "TIMEOUT",
            AccessError::Cancelled => "CANCELLED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AccessError::role_not_found(RoleId::new(7)).error_code(), "NOT_FOUND");
        assert_eq!(AccessError::Protected("Guest".into()).error_code(), "PROTECTED");
        assert_eq!(AccessError::Timeout.error_code(), "TIMEOUT");
    }

    #[test]
    fn test_error_display() {
        let err = AccessError::not_found(EntityKind::User, 42);
        assert_eq!(err.to_string(), "user 42 not found");

        let err = AccessError::HasDescendants {
            role: RoleId::new(1),
            children: vec![RoleId::new(2)],
        };
        assert!(err.is_hierarchy_violation());
        assert!(!AccessError::RoleNotFound("Nobody".into()).is_hierarchy_violation());
    }
}
