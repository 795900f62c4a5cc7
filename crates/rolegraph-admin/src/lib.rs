//! # Rolegraph Admin
//!
//! Services behind the role administration console: role lifecycle,
//! direct permission edits, and user-to-role binding, all over an
//! [`EntityStore`](rolegraph_store::EntityStore).
//!
//! ## Overview
//!
//! - **RoleService**: create, rename, reparent and delete roles without
//!   breaking the hierarchy
//! - **PermissionService**: toggle or replace a role's direct grants
//! - **UserService**: user CRUD and role assignment by name
//! - **AdminApi**: the facade the console calls, with optional deadlines
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rolegraph_admin::{AdminApi, AdminConfig};
//! use rolegraph_model::{RoleDraft, RoleId, UserId};
//!
//! async fn example() {
//!     let api = AdminApi::new(AdminConfig::from_env().unwrap());
//!
//!     let auditor = api
//!         .create_role(RoleDraft::new("Auditor").with_parent(RoleId::new(2)))
//!         .await
//!         .unwrap();
//!     api.assign_role(UserId::new(2), &auditor.name).await.unwrap();
//!
//!     let effective = api.effective_permissions_for_user(UserId::new(2)).await.unwrap();
//!     assert_eq!(effective.to_string(), "Read");
//! }
//! ```
//!
//! ## Configuration
//!
//! - `ROLEGRAPH_OPERATION_TIMEOUT_MS`: per-call deadline (default none)
//! - `ROLEGRAPH_PERMISSIONS`: permission vocabulary (default `Read,Write,Delete`)
//! - plus the store variables documented in `rolegraph_store`

pub mod api;
pub mod config;
pub mod deadline;
pub mod permissions;
pub mod roles;
pub mod users;

// Re-export main types
pub use api::AdminApi;
pub use config::AdminConfig;
pub use permissions::PermissionService;
pub use roles::RoleService;
pub use users::UserService;
