//! Role records
//!
//! A role carries a direct permission set and an optional parent reference.
//! Parents are plain ids into the role collection; the hierarchy is only
//! ever walked through [`crate::hierarchy::RoleGraph`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::permissions::{Permission, PermissionSet};

/// Name of the built-in role that can be neither deleted nor renamed.
pub const GUEST_ROLE_NAME: &str = "Guest";

/// Opaque role identifier assigned by the store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct RoleId(u64);

impl RoleId {
    /// Wrap a raw id.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric value.
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for RoleId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<RoleId> for u64 {
    fn from(id: RoleId) -> Self {
        id.0
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored role.
///
/// # Examples
///
/// ```
/// use rolegraph_model::{Permission, Role, RoleDraft, RoleId};
///
/// let role = Role::from_draft(RoleId::new(1), RoleDraft::new("Admin").with_permission(Permission::READ));
/// assert!(role.is_root());
/// assert!(!role.is_protected());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Unique role ID
    pub id: RoleId,

    /// Display name, unique among roles
    pub name: String,

    /// Direct grants only; inherited grants are resolved on demand
    #[serde(default)]
    pub permissions: PermissionSet,

    /// Parent role, `None` for a root
    #[serde(default)]
    pub parent_role: Option<RoleId>,

    /// Free-form attributes the core never interprets
    #[serde(default)]
    pub custom_attributes: String,
}

impl Role {
    /// Build a stored role from a draft and its assigned id.
    pub fn from_draft(id: RoleId, draft: RoleDraft) -> Self {
        Self {
            id,
            name: draft.name,
            permissions: draft.permissions,
            parent_role: draft.parent_role,
            custom_attributes: draft.custom_attributes,
        }
    }

    /// Check if this is the built-in Guest role.
    pub fn is_protected(&self) -> bool {
        self.name == GUEST_ROLE_NAME
    }

    /// Check if this role has no parent.
    pub fn is_root(&self) -> bool {
        self.parent_role.is_none()
    }

    /// Merge a patch into this role. Fields absent from the patch are kept.
    pub fn apply(&mut self, patch: RolePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(permissions) = patch.permissions {
            self.permissions = permissions;
        }
        if let Some(parent_role) = patch.parent_role {
            self.parent_role = parent_role;
        }
        if let Some(custom_attributes) = patch.custom_attributes {
            self.custom_attributes = custom_attributes;
        }
    }
}

/// Fields for a new role. Anything not set falls back to the role defaults:
/// no permissions, no parent, empty attributes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct RoleDraft {
    /// Role name
    pub name: String,
    /// Direct permissions
    pub permissions: PermissionSet,
    /// Parent role
    pub parent_role: Option<RoleId>,
    /// Free-form attributes
    pub custom_attributes: String,
}

impl RoleDraft {
    /// Start a draft with just a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Grant a direct permission.
    pub fn with_permission(mut self, permission: impl Into<Permission>) -> Self {
        self.permissions.add(permission);
        self
    }

    /// Replace the direct permission set.
    pub fn with_permissions(mut self, permissions: PermissionSet) -> Self {
        self.permissions = permissions;
        self
    }

    /// Set the parent role.
    pub fn with_parent(mut self, parent: RoleId) -> Self {
        self.parent_role = Some(parent);
        self
    }

    /// Set the custom attributes.
    pub fn with_custom_attributes(mut self, attributes: impl Into<String>) -> Self {
        self.custom_attributes = attributes.into();
        self
    }
}

/// Partial update for a role.
///
/// `parent_role` is doubly optional: `None` leaves the parent alone,
/// `Some(None)` detaches the role into a root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolePatch {
    /// New name
    pub name: Option<String>,
    /// New direct permission set (replaces the old one)
    pub permissions: Option<PermissionSet>,
    /// New parent
    pub parent_role: Option<Option<RoleId>>,
    /// New custom attributes
    pub custom_attributes: Option<String>,
}

impl RolePatch {
    /// An empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename the role.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replace the direct permissions.
    pub fn permissions(mut self, permissions: PermissionSet) -> Self {
        self.permissions = Some(permissions);
        self
    }

    /// Move the role under another parent, or to the root with `None`.
    pub fn parent_role(mut self, parent: Option<RoleId>) -> Self {
        self.parent_role = Some(parent);
        self
    }

    /// Replace the custom attributes.
    pub fn custom_attributes(mut self, attributes: impl Into<String>) -> Self {
        self.custom_attributes = Some(attributes.into());
        self
    }

    /// Check whether the patch touches the hierarchy or the name.
    pub fn is_structural(&self) -> bool {
        self.name.is_some() || self.parent_role.is_some()
    }

    /// Check whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.permissions.is_none()
            && self.parent_role.is_none()
            && self.custom_attributes.is_none()
    }
}
