//! Seed data for the mock store.
//!
//! The same three roles and two users the admin console ships with.

use rolegraph_model::{Permission, Role, RoleDraft, RoleId};
use rolegraph_model::{User, UserDraft, UserId, UserStatus, GUEST_ROLE_NAME};

/// Admin, User and Guest, all roots.
pub fn seed_roles() -> Vec<Role> {
    vec![
        Role::from_draft(
            RoleId::new(1),
            RoleDraft::new("Admin")
                .with_permission(Permission::READ)
                .with_permission(Permission::WRITE)
                .with_permission(Permission::DELETE),
        ),
        Role::from_draft(
            RoleId::new(2),
            RoleDraft::new("User").with_permission(Permission::READ),
        ),
        Role::from_draft(RoleId::new(3), RoleDraft::new(GUEST_ROLE_NAME)),
    ]
}

/// One active admin and one inactive regular user.
pub fn seed_users() -> Vec<User> {
    vec![
        User::from_draft(UserId::new(1), UserDraft::new("John Doe", "Admin")),
        User::from_draft(
            UserId::new(2),
            UserDraft::new("Jane Smith", "User").with_status(UserStatus::Inactive),
        ),
    ]
}
