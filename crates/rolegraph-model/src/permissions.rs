//! # Permissions
//!
//! Permission strings and the sets roles carry. Permissions are opaque to the
//! engine: any string is a valid grant, and the `Read` / `Write` /
//! `Delete` vocabulary the console shows is only a default.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A single permission grant.
///
/// # Example
///
/// ```
/// use rolegraph_model::permissions::Permission;
///
/// let perm = Permission::new("Read");
/// assert_eq!(perm.as_str(), "Read");
/// assert_eq!(perm, Permission::READ);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Permission(std::borrow::Cow<'static, str>);

impl Permission {
    /// Read access.
    pub const READ: Permission = Permission(std::borrow::Cow::Borrowed("Read"));
    /// Write access.
    pub const WRITE: Permission = Permission(std::borrow::Cow::Borrowed("Write"));
    /// Delete access.
    pub const DELETE: Permission = Permission(std::borrow::Cow::Borrowed("Delete"));

    /// Create a permission from any string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(std::borrow::Cow::Owned(name.into()))
    }

    /// Get the permission name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The vocabulary offered by the admin console.
    pub fn standard() -> Vec<Permission> {
        vec![Self::READ, Self::WRITE, Self::DELETE]
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Permission {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Permission {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A set of permissions held directly by a role, or resolved for it.
///
/// Iteration, serialization and display are always in lexicographic order,
/// so two equal sets render identically.
///
/// # Example
///
/// ```
/// use rolegraph_model::permissions::{Permission, PermissionSet};
///
/// let mut set = PermissionSet::new();
/// set.add(Permission::WRITE);
/// set.add(Permission::READ);
///
/// assert!(set.has(&Permission::READ));
/// assert_eq!(set.to_string(), "Read, Write");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PermissionSet {
    permissions: BTreeSet<Permission>,
}

impl PermissionSet {
    /// An empty set.
    pub fn new() -> Self {
        Self {
            permissions: BTreeSet::new(),
        }
    }

    /// Grant a permission.
    ///
    /// # Returns
    ///
    /// `true` if the permission was not already present
    pub fn add(&mut self, permission: impl Into<Permission>) -> bool {
        self.permissions.insert(permission.into())
    }

    /// Revoke a permission.
    ///
    /// # Returns
    ///
    /// `true` if the permission was present, `false` otherwise
    pub fn remove(&mut self, permission: &Permission) -> bool {
        self.permissions.remove(permission)
    }

    /// Flip membership of a permission.
    ///
    /// # Returns
    ///
    /// `true` if the permission is granted after the call
    pub fn toggle(&mut self, permission: Permission) -> bool {
        if self.permissions.remove(&permission) {
            false
        } else {
            self.permissions.insert(permission);
            true
        }
    }

    /// Whether the permission is granted.
    pub fn has(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
    }

    /// Union `other` into this set.
    pub fn merge(&mut self, other: &PermissionSet) {
        self.permissions.extend(other.permissions.iter().cloned());
    }

    /// Iterate in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.iter()
    }

    /// Permission names in lexicographic order.
    pub fn names(&self) -> Vec<&str> {
        self.permissions.iter().map(Permission::as_str).collect()
    }

    /// Build a set from raw names. Repeats collapse.
    ///
    /// ```
    /// use rolegraph_model::permissions::PermissionSet;
    ///
    /// let set = PermissionSet::from_strings(&["Read", "Write", "Read"]);
    /// assert_eq!(set.len(), 2);
    /// ```
    pub fn from_strings(perms: &[&str]) -> Self {
        perms.iter().map(|p| Permission::new(*p)).collect()
    }

    /// Number of distinct permissions.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Whether every permission in `other` is granted here.
    pub fn contains_all(&self, other: &PermissionSet) -> bool {
        self.permissions.is_superset(&other.permissions)
    }

    /// Whether the two sets share at least one permission.
    pub fn contains_any(&self, other: &PermissionSet) -> bool {
        !self.permissions.is_disjoint(&other.permissions)
    }
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join(", "))
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        Self {
            permissions: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PermissionSet {
    type Item = &'a Permission;
    type IntoIter = std::collections::btree_set::Iter<'a, Permission>;

    fn into_iter(self) -> Self::IntoIter {
        self.permissions.iter()
    }
}
