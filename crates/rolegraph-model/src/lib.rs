//! # Rolegraph Model
//!
//! This crate holds the records and rules behind the user/role admin
//! console: roles with direct permission sets and single-parent links, users
//! bound to roles by name, and the resolver that turns a role snapshot into
//! effective permissions while keeping the hierarchy a forest.
//!
//! ## Overview
//!
//! - **Permissions**: opaque permission strings and ordered permission sets
//! - **Roles**: role records, drafts for creation and patches for updates
//! - **Users**: user records bound to a role name
//! - **Hierarchy**: effective permissions plus reparent/delete/rename checks
//! - **Errors**: the single error taxonomy shared by store and services
//!
//! ## Architecture
//!
//! ```text
//! effective(R) = permissions(R) ∪ effective(parent(R))
//!
//! Roles are indexed by id; parents are plain ids, never references.
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use rolegraph_model::{hierarchy, Permission, Role, RoleDraft, RoleId};
//!
//! let roles = vec![
//!     Role::from_draft(RoleId::new(1), RoleDraft::new("Admin").with_permission(Permission::DELETE)),
//!     Role::from_draft(RoleId::new(2), RoleDraft::new("User").with_parent(RoleId::new(1))),
//! ];
//!
//! let effective = hierarchy::effective_permissions(RoleId::new(2), &roles).unwrap();
//! assert!(effective.has(&Permission::DELETE));
//!
//! // Admin now has a child, so it cannot be deleted
//! assert!(hierarchy::validate_delete(RoleId::new(1), &roles).is_err());
//! ```

pub mod error;
pub mod hierarchy;
pub mod permissions;
pub mod roles;
pub mod users;

// Re-export main types for convenience
pub use error::{AccessError, AccessResult, EntityKind};
pub use hierarchy::RoleGraph;
pub use permissions::{Permission, PermissionSet};
pub use roles::{Role, RoleDraft, RoleId, RolePatch, GUEST_ROLE_NAME};
pub use users::{User, UserDraft, UserId, UserPatch, UserStatus};
