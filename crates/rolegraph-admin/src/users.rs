//! User records and their role binding.
//!
//! A user points at a role by name. The binding is checked when it is made,
//! but later renames or deletes of the role are not propagated: the user is
//! left dangling and resolves to no permissions until rebound.
//!
//! Writes to an existing user take that user's turn before looking up the
//! role, so they apply in call order.

use rolegraph_model::{
    hierarchy, AccessError, AccessResult, PermissionSet, Role, User, UserDraft, UserId, UserPatch,
};
use rolegraph_store::{EntityStore, WriteQueue};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::roles::rejected;

/// User CRUD and role assignment.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn EntityStore<User>>,
    roles: Arc<dyn EntityStore<Role>>,
    writes: Arc<WriteQueue<UserId>>,
}

impl UserService {
    /// Create a user service over a user store and the role store it binds to.
    pub fn new(users: Arc<dyn EntityStore<User>>, roles: Arc<dyn EntityStore<Role>>) -> Self {
        Self {
            users,
            roles,
            writes: Arc::new(WriteQueue::new()),
        }
    }

    /// Every user, in store order.
    pub async fn list_users(&self) -> AccessResult<Vec<User>> {
        self.users.list().await
    }

    /// A single user.
    pub async fn get_user(&self, id: UserId) -> AccessResult<User> {
        self.users.get(id).await
    }

    /// Create a user bound to an existing role.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if the name is empty
    /// - `RoleNotFound` if no role has the given name
    #[instrument(skip(self, draft), fields(name = %draft.name, role = %draft.role))]
    pub async fn create_user(&self, draft: UserDraft) -> AccessResult<User> {
        let name = validate_user_name(&draft.name).map_err(rejected)?;
        let role = self.require_role(&draft.role).await.map_err(rejected)?;

        let user = self
            .users
            .create(UserDraft { name, role, ..draft })
            .await?;
        info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    /// Merge `patch` into a user.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the user does not exist
    /// - `ValidationError` if a new name is empty
    /// - `RoleNotFound` if a new role name matches no role
    #[instrument(skip(self, patch))]
    pub async fn update_user(&self, id: UserId, patch: UserPatch) -> AccessResult<User> {
        let _turn = self.writes.turn(id).await;
        let mut patch = patch;
        if let Some(name) = patch.name.take() {
            patch.name = Some(validate_user_name(&name).map_err(rejected)?);
        }
        if let Some(role) = patch.role.take() {
            patch.role = Some(self.require_role(&role).await.map_err(rejected)?);
        }

        self.users.update(id, patch).await
    }

    /// Remove a user.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: UserId) -> AccessResult<UserId> {
        let _turn = self.writes.turn(id).await;
        let deleted = self.users.delete(id).await?;
        info!(user_id = %deleted, "User deleted");
        Ok(deleted)
    }

    /// Bind a user to the role called `role_name`.
    ///
    /// # Errors
    ///
    /// - `RoleNotFound` if no role has that name
    /// - `NotFound` if the user does not exist
    #[instrument(skip(self))]
    pub async fn assign_role(&self, user_id: UserId, role_name: &str) -> AccessResult<User> {
        let _turn = self.writes.turn(user_id).await;
        let role = self.require_role(role_name).await.map_err(rejected)?;
        let user = self.users.update(user_id, UserPatch::new().role(role)).await?;
        info!(user_id = %user_id, role = %user.role, "Role assigned");
        Ok(user)
    }

    /// Effective permissions of a user through their bound role. A dangling
    /// binding yields an empty set.
    pub async fn effective_permissions_for_user(
        &self,
        user_id: UserId,
    ) -> AccessResult<PermissionSet> {
        let (roles, users) = tokio::join!(self.roles.list(), self.users.list());
        hierarchy::effective_permissions_for_user(user_id, &roles?, &users?)
    }

    async fn require_role(&self, role_name: &str) -> AccessResult<String> {
        let wanted = role_name.trim();
        let roles = self.roles.list().await?;
        roles
            .into_iter()
            .find(|role| role.name == wanted)
            .map(|role| role.name)
            .ok_or_else(|| AccessError::RoleNotFound(wanted.to_string()))
    }
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish_non_exhaustive()
    }
}

fn validate_user_name(name: &str) -> AccessResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AccessError::ValidationError(
            "user name cannot be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolegraph_model::{RoleId, RolePatch, UserStatus};
    use rolegraph_store::{MemoryStore, StoreConfig};
    use std::time::Duration;

    fn setup() -> (Arc<MemoryStore>, UserService) {
        setup_with(StoreConfig::instant())
    }

    fn setup_with(config: StoreConfig) -> (Arc<MemoryStore>, UserService) {
        let store = Arc::new(MemoryStore::seeded(config));
        let service = UserService::new(store.clone(), store.clone());
        (store, service)
    }

    #[tokio::test]
    async fn test_create_user() {
        let (_, service) = setup();
        let user = service
            .create_user(UserDraft::new(" Ada Lovelace ", "User"))
            .await
            .unwrap();

        assert_eq!(user.id, UserId::new(3));
        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(user.status, UserStatus::Active);
    }

    #[tokio::test]
    async fn test_create_user_validation() {
        let (_, service) = setup();

        let err = service
            .create_user(UserDraft::new("", "User"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::ValidationError(_)));

        let err = service
            .create_user(UserDraft::new("Ada", "Owner"))
            .await
            .unwrap_err();
        assert_eq!(err, AccessError::RoleNotFound("Owner".to_string()));
        assert_eq!(service.list_users().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_assign_role() {
        let (_, service) = setup();
        let user = service.assign_role(UserId::new(2), "Admin").await.unwrap();
        assert_eq!(user.role, "Admin");
        assert_eq!(user.name, "Jane Smith");

        let err = service
            .assign_role(UserId::new(2), "Nobody")
            .await
            .unwrap_err();
        assert_eq!(err, AccessError::RoleNotFound("Nobody".to_string()));
        assert_eq!(service.get_user(UserId::new(2)).await.unwrap().role, "Admin");
    }

    #[tokio::test]
    async fn test_assign_role_missing_user() {
        let (_, service) = setup();
        let err = service
            .assign_role(UserId::new(77), "Guest")
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_user_checks_role() {
        let (_, service) = setup();
        let user = service
            .update_user(UserId::new(1), UserPatch::new().status(UserStatus::Inactive))
            .await
            .unwrap();
        assert!(!user.is_active());

        let err = service
            .update_user(UserId::new(1), UserPatch::new().role("Ghost"))
            .await
            .unwrap_err();
        assert_eq!(err, AccessError::RoleNotFound("Ghost".to_string()));
    }

    #[tokio::test]
    async fn test_effective_permissions_for_user() {
        let (store, service) = setup();
        let effective = service
            .effective_permissions_for_user(UserId::new(1))
            .await
            .unwrap();
        assert_eq!(effective.to_string(), "Delete, Read, Write");

        // Renaming the role leaves John dangling
        store
            .roles()
            .update(RoleId::new(1), RolePatch::new().name("Root"))
            .await
            .unwrap();
        let effective = service
            .effective_permissions_for_user(UserId::new(1))
            .await
            .unwrap();
        assert!(effective.is_empty());
    }

    #[tokio::test]
    async fn test_delete_user() {
        let (_, service) = setup();
        assert_eq!(service.delete_user(UserId::new(2)).await, Ok(UserId::new(2)));
        assert!(service.get_user(UserId::new(2)).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_after_assign_sees_new_role() {
        let (_, service) = setup_with(StoreConfig::fixed(Duration::from_millis(500)));
        let jane = UserId::new(2);

        let (assigned, edited) = tokio::join!(
            service.assign_role(jane, "Admin"),
            service.update_user(jane, UserPatch::new().status(UserStatus::Active)),
        );

        assert_eq!(assigned.unwrap().role, "Admin");
        let edited = edited.unwrap();
        assert_eq!(edited.role, "Admin");
        assert!(edited.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_after_delete_is_not_found() {
        let (_, service) = setup_with(StoreConfig::fixed(Duration::from_millis(500)));
        let john = UserId::new(1);

        let (deleted, updated) = tokio::join!(
            service.delete_user(john),
            service.update_user(john, UserPatch::new().role("Guest")),
        );

        assert_eq!(deleted, Ok(john));
        assert!(matches!(updated, Err(AccessError::NotFound { .. })));
        assert_eq!(service.writes.active_keys(), 0);
    }
}
