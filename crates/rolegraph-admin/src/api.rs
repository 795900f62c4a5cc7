//! The call surface the admin console drives.

use rolegraph_model::{
    AccessResult, Permission, PermissionSet, Role, RoleDraft, RoleId, RolePatch, User, UserDraft,
    UserId, UserPatch,
};
use rolegraph_store::{ConfigError, MemoryStore, Subscription};
use std::future::Future;
use std::sync::Arc;

use crate::config::AdminConfig;
use crate::deadline::with_deadline;
use crate::permissions::PermissionService;
use crate::roles::RoleService;
use crate::users::UserService;

/// Admin facade over one store.
///
/// Every call is bounded by the configured deadline, if any. Subscribe to
/// learn when cached views need refreshing; effective permissions are never
/// cached here.
///
/// # Example
///
/// ```rust,no_run
/// use rolegraph_admin::{AdminApi, AdminConfig};
/// use rolegraph_model::{Permission, RoleId, RolePatch};
///
/// async fn example() {
///     let api = AdminApi::new(AdminConfig::default());
///
///     api.update_role(RoleId::new(2), RolePatch::new().parent_role(Some(RoleId::new(1))))
///         .await
///         .unwrap();
///     api.toggle_permission(RoleId::new(1), Permission::WRITE).await.unwrap();
///
///     let effective = api.effective_permissions(RoleId::new(2)).await.unwrap();
///     assert_eq!(effective.to_string(), "Delete, Read");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AdminApi {
    store: Arc<MemoryStore>,
    roles: RoleService,
    permissions: PermissionService,
    users: UserService,
    config: AdminConfig,
}

impl AdminApi {
    /// Create an API over a freshly seeded store.
    pub fn new(config: AdminConfig) -> Self {
        let store = Arc::new(MemoryStore::seeded(config.store.clone()));
        Self::with_store(store, config)
    }

    /// Create an API over an existing store. `config.store` is ignored.
    pub fn with_store(store: Arc<MemoryStore>, config: AdminConfig) -> Self {
        let roles = RoleService::new(store.clone());
        Self {
            permissions: roles.permission_service(),
            roles,
            users: UserService::new(store.clone(), store.clone()),
            store,
            config,
        }
    }

    /// Create an API configured from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(AdminConfig::from_env()?))
    }

    /// The configuration this API was built with.
    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    /// The backing store, for lifecycle control such as [`MemoryStore::reset`].
    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    /// Role service, without the per-call deadline.
    pub fn roles(&self) -> &RoleService {
        &self.roles
    }

    /// Permission service, without the per-call deadline.
    pub fn permissions(&self) -> &PermissionService {
        &self.permissions
    }

    /// User service, without the per-call deadline.
    pub fn users(&self) -> &UserService {
        &self.users
    }

    async fn bounded<T>(
        &self,
        operation: impl Future<Output = AccessResult<T>>,
    ) -> AccessResult<T> {
        with_deadline(self.config.operation_timeout(), operation).await
    }

    // Roles

    /// Every role, in store order.
    pub async fn list_roles(&self) -> AccessResult<Vec<Role>> {
        self.bounded(self.roles.list_roles()).await
    }

    /// Create a role. See [`RoleService::create_role`].
    pub async fn create_role(&self, draft: RoleDraft) -> AccessResult<Role> {
        self.bounded(self.roles.create_role(draft)).await
    }

    /// Merge a patch into a role. See [`RoleService::update_role`].
    pub async fn update_role(&self, id: RoleId, patch: RolePatch) -> AccessResult<Role> {
        self.bounded(self.roles.update_role(id, patch)).await
    }

    /// Delete a role. See [`RoleService::delete_role`].
    pub async fn delete_role(&self, id: RoleId) -> AccessResult<RoleId> {
        self.bounded(self.roles.delete_role(id)).await
    }

    /// Direct and inherited permissions of a role.
    pub async fn effective_permissions(&self, role_id: RoleId) -> AccessResult<PermissionSet> {
        self.bounded(self.roles.effective_permissions(role_id)).await
    }

    // Permissions

    /// Flip one direct permission of a role.
    pub async fn toggle_permission(
        &self,
        role_id: RoleId,
        permission: Permission,
    ) -> AccessResult<Role> {
        self.bounded(self.permissions.toggle(role_id, permission)).await
    }

    /// Replace the direct permissions of a role.
    pub async fn bulk_set_permissions(
        &self,
        role_id: RoleId,
        permissions: PermissionSet,
    ) -> AccessResult<Role> {
        self.bounded(self.permissions.bulk_set(role_id, permissions)).await
    }

    /// Permissions offered for assignment.
    pub fn permission_vocabulary(&self) -> &[Permission] {
        &self.config.permission_vocabulary
    }

    // Users

    /// Every user, in store order.
    pub async fn list_users(&self) -> AccessResult<Vec<User>> {
        self.bounded(self.users.list_users()).await
    }

    /// Create a user bound to an existing role.
    pub async fn create_user(&self, draft: UserDraft) -> AccessResult<User> {
        self.bounded(self.users.create_user(draft)).await
    }

    /// Merge a patch into a user. See [`UserService::update_user`].
    pub async fn update_user(&self, id: UserId, patch: UserPatch) -> AccessResult<User> {
        self.bounded(self.users.update_user(id, patch)).await
    }

    /// Remove a user.
    pub async fn delete_user(&self, id: UserId) -> AccessResult<UserId> {
        self.bounded(self.users.delete_user(id)).await
    }

    /// Bind a user to the role with the given name.
    pub async fn assign_role(&self, user_id: UserId, role_name: &str) -> AccessResult<User> {
        self.bounded(self.users.assign_role(user_id, role_name)).await
    }

    /// Permissions a user holds through their bound role.
    pub async fn effective_permissions_for_user(
        &self,
        user_id: UserId,
    ) -> AccessResult<PermissionSet> {
        self.bounded(self.users.effective_permissions_for_user(user_id)).await
    }

    /// Subscribe to committed store changes.
    pub fn subscribe(&self) -> Subscription {
        self.store.subscribe()
    }
}
