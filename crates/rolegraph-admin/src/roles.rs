//! Role lifecycle.
//!
//! Every write to an existing role first takes that role's turn in a
//! per-id queue, so writes to one role apply in call order even when some
//! of them stop to validate first. Structural changes (create, rename,
//! reparent, delete) then validate against a fresh snapshot and commit while
//! holding the hierarchy guard, so two reparents can never each pass
//! validation and then close a cycle together. Permission and attribute
//! edits skip the guard; they cannot break the forest.

use rolegraph_model::{
    AccessError, AccessResult, PermissionSet, Role, RoleDraft, RoleGraph, RoleId, RolePatch,
};
use rolegraph_store::{EntityStore, WriteQueue};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::permissions::PermissionService;

/// Role CRUD with hierarchy validation.
#[derive(Clone)]
pub struct RoleService {
    roles: Arc<dyn EntityStore<Role>>,
    writes: Arc<WriteQueue<RoleId>>,
    hierarchy_guard: Arc<Mutex<()>>,
}

impl RoleService {
    /// Create a role service over a role store.
    pub fn new(roles: Arc<dyn EntityStore<Role>>) -> Self {
        Self {
            roles,
            writes: Arc::new(WriteQueue::new()),
            hierarchy_guard: Arc::new(Mutex::new(())),
        }
    }

    /// A permission service that queues its writes with this service's, so
    /// toggles and role edits on one role apply in call order.
    pub fn permission_service(&self) -> PermissionService {
        PermissionService::with_writes(self.roles.clone(), self.writes.clone())
    }

    /// Every role, in store order.
    pub async fn list_roles(&self) -> AccessResult<Vec<Role>> {
        self.roles.list().await
    }

    /// A single role.
    pub async fn get_role(&self, id: RoleId) -> AccessResult<Role> {
        self.roles.get(id).await
    }

    /// Create a role.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if the name is empty or taken
    /// - `NotFound` if the draft names a parent that does not exist
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_role(&self, draft: RoleDraft) -> AccessResult<Role> {
        let _guard = self.hierarchy_guard.lock().await;
        let snapshot = self.roles.list().await?;
        let graph = RoleGraph::new(&snapshot);

        let name = graph.validate_new_name(&draft.name).map_err(rejected)?;
        if let Some(parent) = draft.parent_role {
            graph.get(parent).map_err(rejected)?;
        }

        let role = self.roles.create(RoleDraft { name, ..draft }).await?;
        info!(role_id = %role.id, parent = ?role.parent_role, "Role created");
        Ok(role)
    }

    /// Merge `patch` into a role.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the role (or a new parent) does not exist
    /// - `Protected` when renaming Guest
    /// - `ValidationError` if a new name is empty or taken
    /// - `CycleDetected` if the new parent would close a loop
    #[instrument(skip(self, patch))]
    pub async fn update_role(&self, id: RoleId, patch: RolePatch) -> AccessResult<Role> {
        let _turn = self.writes.turn(id).await;
        if !patch.is_structural() {
            return self.roles.update(id, patch).await;
        }

        let _guard = self.hierarchy_guard.lock().await;
        let snapshot = self.roles.list().await?;
        let graph = RoleGraph::new(&snapshot);
        graph.get(id)?;

        let mut patch = patch;
        if let Some(name) = patch.name.take() {
            patch.name = Some(graph.validate_rename(id, &name).map_err(rejected)?);
        }
        if let Some(Some(parent)) = patch.parent_role {
            graph.validate_reparent(id, parent).map_err(rejected)?;
        }

        let role = self.roles.update(id, patch).await?;
        info!(role_id = %id, name = %role.name, parent = ?role.parent_role, "Role updated");
        Ok(role)
    }

    /// Move a role under `parent`, or make it a root with `None`.
    pub async fn reparent(&self, id: RoleId, parent: Option<RoleId>) -> AccessResult<Role> {
        self.update_role(id, RolePatch::new().parent_role(parent)).await
    }

    /// Delete a role. Users bound to it are left in place with a dangling
    /// role name.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the role does not exist
    /// - `Protected` for Guest
    /// - `HasDescendants` while other roles name it as parent
    #[instrument(skip(self))]
    pub async fn delete_role(&self, id: RoleId) -> AccessResult<RoleId> {
        let _turn = self.writes.turn(id).await;
        let _guard = self.hierarchy_guard.lock().await;
        let snapshot = self.roles.list().await?;
        RoleGraph::new(&snapshot)
            .validate_delete(id)
            .map_err(rejected)?;

        let deleted = self.roles.delete(id).await?;
        info!(role_id = %deleted, "Role deleted");
        Ok(deleted)
    }

    /// Effective permissions of a role, resolved from a fresh snapshot.
    pub async fn effective_permissions(&self, id: RoleId) -> AccessResult<PermissionSet> {
        let snapshot = self.roles.list().await?;
        RoleGraph::new(&snapshot).effective_permissions(id)
    }
}

impl std::fmt::Debug for RoleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleService").finish_non_exhaustive()
    }
}

/// Log a rule violation before handing it back to the caller.
pub(crate) fn rejected(err: AccessError) -> AccessError {
    warn!(code = err.error_code(), error = %err, "Change rejected");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolegraph_model::{EntityKind, Permission};
    use rolegraph_store::{MemoryStore, StoreConfig};
    use std::time::Duration;

    fn service() -> RoleService {
        let store = Arc::new(MemoryStore::seeded(StoreConfig::instant()));
        RoleService::new(store)
    }

    fn slow_service() -> RoleService {
        let store = Arc::new(MemoryStore::seeded(StoreConfig::fixed(
            Duration::from_millis(500),
        )));
        RoleService::new(store)
    }

    #[tokio::test]
    async fn test_create_role_trims_name() {
        let service = service();
        let role = service
            .create_role(RoleDraft::new("  Auditor ").with_parent(RoleId::new(2)))
            .await
            .unwrap();

        assert_eq!(role.id, RoleId::new(4));
        assert_eq!(role.name, "Auditor");
        assert_eq!(role.parent_role, Some(RoleId::new(2)));
    }

    #[tokio::test]
    async fn test_create_role_rejects_bad_names() {
        let service = service();

        let err = service.create_role(RoleDraft::new("   ")).await.unwrap_err();
        assert!(matches!(err, AccessError::ValidationError(_)));

        let err = service.create_role(RoleDraft::new("Admin")).await.unwrap_err();
        assert!(matches!(err, AccessError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_create_role_unknown_parent() {
        let service = service();
        let err = service
            .create_role(RoleDraft::new("Orphan").with_parent(RoleId::new(99)))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            AccessError::NotFound {
                kind: EntityKind::Role,
                id: "99".to_string()
            }
        );
        assert_eq!(service.list_roles().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_reparent_rejects_cycle() {
        let service = service();
        service.reparent(RoleId::new(2), Some(RoleId::new(1))).await.unwrap();

        let err = service
            .reparent(RoleId::new(1), Some(RoleId::new(2)))
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::CycleDetected { .. }));

        let admin = service.get_role(RoleId::new(1)).await.unwrap();
        assert_eq!(admin.parent_role, None);
    }

    #[tokio::test]
    async fn test_reparent_to_root() {
        let service = service();
        service.reparent(RoleId::new(3), Some(RoleId::new(2))).await.unwrap();
        let guest = service.reparent(RoleId::new(3), None).await.unwrap();
        assert!(guest.is_root());
    }

    #[tokio::test]
    async fn test_guest_cannot_be_renamed() {
        let service = service();
        let err = service
            .update_role(RoleId::new(3), RolePatch::new().name("Visitor"))
            .await
            .unwrap_err();
        assert_eq!(err, AccessError::Protected("Guest".to_string()));

        // Same name and other fields are fine
        let guest = service
            .update_role(
                RoleId::new(3),
                RolePatch::new().name("Guest").custom_attributes("public"),
            )
            .await
            .unwrap();
        assert_eq!(guest.custom_attributes, "public");
    }

    #[tokio::test]
    async fn test_non_structural_update_missing_role() {
        let service = service();
        let err = service
            .update_role(RoleId::new(42), RolePatch::new().custom_attributes("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_role_rules() {
        let service = service();

        let err = service.delete_role(RoleId::new(3)).await.unwrap_err();
        assert_eq!(err, AccessError::Protected("Guest".to_string()));

        service.reparent(RoleId::new(2), Some(RoleId::new(1))).await.unwrap();
        let err = service.delete_role(RoleId::new(1)).await.unwrap_err();
        assert_eq!(
            err,
            AccessError::HasDescendants {
                role: RoleId::new(1),
                children: vec![RoleId::new(2)]
            }
        );

        service.delete_role(RoleId::new(2)).await.unwrap();
        assert_eq!(service.delete_role(RoleId::new(1)).await, Ok(RoleId::new(1)));
        assert_eq!(service.list_roles().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_effective_permissions_follow_chain() {
        let service = service();
        service.reparent(RoleId::new(2), Some(RoleId::new(1))).await.unwrap();
        service.reparent(RoleId::new(3), Some(RoleId::new(2))).await.unwrap();

        let effective = service.effective_permissions(RoleId::new(3)).await.unwrap();
        assert_eq!(effective.to_string(), "Delete, Read, Write");
    }

    #[tokio::test]
    async fn test_concurrent_reparents_cannot_close_cycle() {
        let service = service();
        let a = service.clone();
        let b = service.clone();

        let (first, second) = tokio::join!(
            a.reparent(RoleId::new(1), Some(RoleId::new(2))),
            b.reparent(RoleId::new(2), Some(RoleId::new(1))),
        );

        assert!(first.is_ok() != second.is_ok());
        let roles = service.list_roles().await.unwrap();
        assert!(RoleGraph::new(&roles).validate_forest().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_after_rename_sees_new_name() {
        let service = slow_service();
        let user = RoleId::new(2);

        let (renamed, edited) = tokio::join!(
            service.update_role(user, RolePatch::new().name("X")),
            service.update_role(
                user,
                RolePatch::new().permissions(PermissionSet::from_strings(&["Read", "Write"]))
            ),
        );

        assert_eq!(renamed.unwrap().name, "X");
        let edited = edited.unwrap();
        assert_eq!(edited.name, "X");
        assert_eq!(edited.permissions.to_string(), "Read, Write");
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_attribute_edit_wins_over_rename() {
        let service = slow_service();
        let user = RoleId::new(2);

        let (renamed, edited) = tokio::join!(
            service.update_role(user, RolePatch::new().name("X").custom_attributes("a")),
            service.update_role(user, RolePatch::new().custom_attributes("b")),
        );

        let renamed = renamed.unwrap();
        assert_eq!(renamed.custom_attributes, "a");
        let edited = edited.unwrap();
        assert_eq!(edited.name, "X");
        assert_eq!(edited.custom_attributes, "b");

        let stored = service.get_role(user).await.unwrap();
        assert_eq!(stored.custom_attributes, "b");
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_after_reparent_sees_new_parent() {
        let service = slow_service();
        let permissions = service.permission_service();
        let user = RoleId::new(2);

        let (moved, toggled) = tokio::join!(
            service.reparent(user, Some(RoleId::new(1))),
            permissions.toggle(user, Permission::WRITE),
        );

        assert_eq!(moved.unwrap().parent_role, Some(RoleId::new(1)));
        let toggled = toggled.unwrap();
        assert_eq!(toggled.parent_role, Some(RoleId::new(1)));
        assert!(toggled.permissions.has(&Permission::WRITE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_then_delete_apply_in_call_order() {
        let service = slow_service();
        let admin = RoleId::new(1);

        let (updated, deleted) = tokio::join!(
            service.update_role(admin, RolePatch::new().name("Root")),
            service.delete_role(admin),
        );
        assert_eq!(updated.unwrap().name, "Root");
        assert_eq!(deleted, Ok(admin));

        let user = RoleId::new(2);
        let (deleted, updated) = tokio::join!(
            service.delete_role(user),
            service.update_role(user, RolePatch::new().name("Late")),
        );
        assert_eq!(deleted, Ok(user));
        assert!(matches!(updated, Err(AccessError::NotFound { .. })));
        assert_eq!(service.writes.active_keys(), 0);
    }
}
