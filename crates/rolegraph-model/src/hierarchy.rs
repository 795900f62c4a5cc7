//! # Role hierarchy resolution
//!
//! Roles form a forest through their `parent_role` ids. [`RoleGraph`] indexes
//! a snapshot of the role collection and answers every structural question
//! the services ask: effective permissions, ancestry, and whether a proposed
//! reparent, rename or delete keeps the forest intact.
//!
//! The walk is synchronous and never caches. Effective permissions depend on
//! every ancestor, so any edit upstream changes the answer for the whole
//! subtree below it.
//!
//! ```text
//! Admin {Read, Write, Delete}
//!   └─ User {Read}
//!        └─ Guest {}            effective(Guest) = {Delete, Read, Write}
//! ```

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::{AccessError, AccessResult, EntityKind};
use crate::permissions::PermissionSet;
use crate::roles::{Role, RoleId};
use crate::users::{User, UserId};

/// Read-only index over a snapshot of roles.
///
/// # Example
///
/// ```
/// use rolegraph_model::{Permission, Role, RoleDraft, RoleGraph, RoleId};
///
/// let roles = vec![
///     Role::from_draft(RoleId::new(1), RoleDraft::new("Admin").with_permission(Permission::WRITE)),
///     Role::from_draft(
///         RoleId::new(2),
///         RoleDraft::new("User").with_permission(Permission::READ).with_parent(RoleId::new(1)),
///     ),
/// ];
///
/// let graph = RoleGraph::new(&roles);
/// let effective = graph.effective_permissions(RoleId::new(2)).unwrap();
/// assert_eq!(effective.to_string(), "Read, Write");
/// ```
#[derive(Debug)]
pub struct RoleGraph<'a> {
    roles: &'a [Role],
    by_id: HashMap<RoleId, &'a Role>,
    children: HashMap<RoleId, Vec<RoleId>>,
}

impl<'a> RoleGraph<'a> {
    /// Index a role snapshot.
    pub fn new(roles: &'a [Role]) -> Self {
        let mut by_id = HashMap::with_capacity(roles.len());
        let mut children: HashMap<RoleId, Vec<RoleId>> = HashMap::new();

        for role in roles {
            by_id.insert(role.id, role);
            if let Some(parent) = role.parent_role {
                children.entry(parent).or_default().push(role.id);
            }
        }
        for siblings in children.values_mut() {
            siblings.sort_unstable();
        }

        Self {
            roles,
            by_id,
            children,
        }
    }

    /// Look up a role by id.
    pub fn get(&self, id: RoleId) -> AccessResult<&'a Role> {
        self.by_id
            .get(&id)
            .copied()
            .ok_or_else(|| AccessError::role_not_found(id))
    }

    /// Look up a role by exact name.
    pub fn find_by_name(&self, name: &str) -> Option<&'a Role> {
        self.roles.iter().find(|role| role.name == name)
    }

    /// Ancestor ids of a role, nearest parent first.
    ///
    /// A parent id that is not in the snapshot ends the chain as if the role
    /// above it were a root.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `id` is unknown
    /// - `CycleDetected` if the chain revisits a role
    pub fn ancestors(&self, id: RoleId) -> AccessResult<Vec<RoleId>> {
        let mut chain = Vec::new();
        let mut visited = HashSet::from([id]);
        let mut current = self.get(id)?;

        while let Some(parent_id) = current.parent_role {
            if !visited.insert(parent_id) {
                return Err(AccessError::CycleDetected {
                    role: current.id,
                    parent: parent_id,
                });
            }
            match self.by_id.get(&parent_id) {
                Some(&parent) => {
                    chain.push(parent_id);
                    current = parent;
                }
                None => break,
            }
        }

        Ok(chain)
    }

    /// Direct permissions of a role unioned with those of every ancestor.
    pub fn effective_permissions(&self, id: RoleId) -> AccessResult<PermissionSet> {
        let mut effective = self.get(id)?.permissions.clone();
        for ancestor in self.ancestors(id)? {
            effective.merge(&self.get(ancestor)?.permissions);
        }
        Ok(effective)
    }

    /// Roles whose parent is `id`, ordered by id.
    pub fn children(&self, id: RoleId) -> &[RoleId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every role below `id`, breadth-first. Stops on revisits, so a
    /// corrupt cyclic snapshot still terminates.
    pub fn descendants(&self, id: RoleId) -> Vec<RoleId> {
        let mut seen = HashSet::from([id]);
        let mut queue: VecDeque<RoleId> = self.children(id).iter().copied().collect();
        let mut result = Vec::new();

        while let Some(next) = queue.pop_front() {
            if !seen.insert(next) {
                continue;
            }
            result.push(next);
            queue.extend(self.children(next).iter().copied());
        }

        result
    }

    /// Check that `id` may take `proposed_parent` as its parent.
    ///
    /// # Errors
    ///
    /// - `NotFound` if either role is unknown
    /// - `CycleDetected` if `proposed_parent` is `id` itself, has `id` among
    ///   its ancestors, or already sits on a cyclic chain
    pub fn validate_reparent(&self, id: RoleId, proposed_parent: RoleId) -> AccessResult<()> {
        self.get(id)?;
        self.get(proposed_parent)?;

        let cycle = AccessError::CycleDetected {
            role: id,
            parent: proposed_parent,
        };
        if proposed_parent == id {
            return Err(cycle);
        }

        let chain = self.ancestors(proposed_parent).map_err(|err| match err {
            AccessError::CycleDetected { .. } => cycle.clone(),
            other => other,
        })?;
        if chain.contains(&id) {
            return Err(cycle);
        }

        Ok(())
    }

    /// Check that `id` may be deleted.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the role is unknown
    /// - `Protected` for the built-in Guest role
    /// - `HasDescendants` if other roles still name it as parent
    pub fn validate_delete(&self, id: RoleId) -> AccessResult<()> {
        let role = self.get(id)?;
        if role.is_protected() {
            return Err(AccessError::Protected(role.name.clone()));
        }

        let children = self.children(id);
        if !children.is_empty() {
            return Err(AccessError::HasDescendants {
                role: id,
                children: children.to_vec(),
            });
        }

        Ok(())
    }

    /// Validate the name for a new role.
    ///
    /// # Returns
    ///
    /// The trimmed name to store
    pub fn validate_new_name(&self, name: &str) -> AccessResult<String> {
        self.validate_name(name, None)
    }

    /// Validate renaming `id` to `name`.
    ///
    /// Guest keeps its name; every other role must end up with a non-empty
    /// name no other role uses.
    pub fn validate_rename(&self, id: RoleId, name: &str) -> AccessResult<String> {
        let role = self.get(id)?;
        let trimmed = name.trim();
        if role.is_protected() && trimmed != role.name {
            return Err(AccessError::Protected(role.name.clone()));
        }
        self.validate_name(trimmed, Some(id))
    }

    fn validate_name(&self, name: &str, except: Option<RoleId>) -> AccessResult<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(AccessError::ValidationError(
                "role name cannot be empty".to_string(),
            ));
        }

        let taken = self
            .roles
            .iter()
            .any(|role| role.name == trimmed && Some(role.id) != except);
        if taken {
            return Err(AccessError::ValidationError(format!(
                "role name '{}' is already taken",
                trimmed
            )));
        }

        Ok(trimmed.to_string())
    }

    /// Check that the whole snapshot is a forest.
    pub fn validate_forest(&self) -> AccessResult<()> {
        for role in self.roles {
            self.ancestors(role.id)?;
        }
        Ok(())
    }
}

/// Effective permissions of `role_id` within `roles`.
pub fn effective_permissions(role_id: RoleId, roles: &[Role]) -> AccessResult<PermissionSet> {
    RoleGraph::new(roles).effective_permissions(role_id)
}

/// Check a proposed reparent of `role_id` under `proposed_parent`.
pub fn validate_reparent(role_id: RoleId, proposed_parent: RoleId, roles: &[Role]) -> AccessResult<()> {
    RoleGraph::new(roles).validate_reparent(role_id, proposed_parent)
}

/// Check a proposed deletion of `role_id`.
pub fn validate_delete(role_id: RoleId, roles: &[Role]) -> AccessResult<()> {
    RoleGraph::new(roles).validate_delete(role_id)
}

/// Effective permissions of a user through the role their name points at.
///
/// A role name that matches nothing yields an empty set rather than an error.
///
/// # Errors
///
/// - `NotFound` if `user_id` is unknown
/// - `CycleDetected` if the bound role sits on a corrupt chain
pub fn effective_permissions_for_user(
    user_id: UserId,
    roles: &[Role],
    users: &[User],
) -> AccessResult<PermissionSet> {
    let user = users
        .iter()
        .find(|user| user.id == user_id)
        .ok_or_else(|| AccessError::not_found(EntityKind::User, user_id))?;

    let graph = RoleGraph::new(roles);
    match graph.find_by_name(&user.role) {
        Some(role) => graph.effective_permissions(role.id),
        None => Ok(PermissionSet::new()),
    }
}
