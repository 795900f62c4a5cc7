//! Direct permission edits.
//!
//! Only a role's own grants are ever written. Inherited grants are derived,
//! so a toggle on one role changes the effective view of every role below
//! it; [`PermissionService::recompute_subtree`] produces that view.

use rolegraph_model::{AccessResult, Permission, PermissionSet, Role, RoleGraph, RoleId, RolePatch};
use rolegraph_store::{EntityStore, Modifier, WriteQueue};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Toggle and replace the direct permissions of roles.
#[derive(Clone)]
pub struct PermissionService {
    roles: Arc<dyn EntityStore<Role>>,
    writes: Arc<WriteQueue<RoleId>>,
}

impl PermissionService {
    /// Create a standalone permission service over a role store.
    ///
    /// Use [`RoleService::permission_service`](crate::RoleService::permission_service)
    /// when role edits go through a [`RoleService`](crate::RoleService) on the
    /// same store.
    pub fn new(roles: Arc<dyn EntityStore<Role>>) -> Self {
        Self::with_writes(roles, Arc::new(WriteQueue::new()))
    }

    pub(crate) fn with_writes(
        roles: Arc<dyn EntityStore<Role>>,
        writes: Arc<WriteQueue<RoleId>>,
    ) -> Self {
        Self { roles, writes }
    }

    /// Flip one direct permission of a role.
    ///
    /// The flip is computed from the record as it stands when this call's
    /// turn comes, so two concurrent toggles of different permissions on the
    /// same role both land.
    ///
    /// # Errors
    ///
    /// `NotFound` if the role does not exist.
    #[instrument(skip(self, permission), fields(permission = %permission))]
    pub async fn toggle(&self, role_id: RoleId, permission: Permission) -> AccessResult<Role> {
        let _turn = self.writes.turn(role_id).await;
        let modifier: Modifier<Role> = Box::new(move |role: &Role| {
            let mut permissions = role.permissions.clone();
            permissions.toggle(permission);
            Ok(RolePatch::new().permissions(permissions))
        });

        let role = self.roles.modify(role_id, modifier).await?;
        debug!(role_id = %role_id, permissions = %role.permissions, "Permission toggled");
        Ok(role)
    }

    /// Replace the direct permissions of a role.
    #[instrument(skip(self, permissions))]
    pub async fn bulk_set(&self, role_id: RoleId, permissions: PermissionSet) -> AccessResult<Role> {
        let _turn = self.writes.turn(role_id).await;
        let role = self
            .roles
            .update(role_id, RolePatch::new().permissions(permissions))
            .await?;
        debug!(role_id = %role_id, permissions = %role.permissions, "Permissions replaced");
        Ok(role)
    }

    /// Effective permissions of `role_id` and every role below it, from one
    /// snapshot.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the role does not exist
    /// - `CycleDetected` if the snapshot is corrupt
    pub async fn recompute_subtree(
        &self,
        role_id: RoleId,
    ) -> AccessResult<BTreeMap<RoleId, PermissionSet>> {
        let snapshot = self.roles.list().await?;
        let graph = RoleGraph::new(&snapshot);

        let mut views = BTreeMap::new();
        views.insert(role_id, graph.effective_permissions(role_id)?);
        for descendant in graph.descendants(role_id) {
            views.insert(descendant, graph.effective_permissions(descendant)?);
        }
        Ok(views)
    }
}

impl std::fmt::Debug for PermissionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionService").finish_non_exhaustive()
    }
}
