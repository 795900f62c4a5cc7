//! # Rolegraph Store
//!
//! This crate provides the asynchronous entity store the rolegraph services
//! run against, with an in-memory implementation that stands in for a real
//! backend.
//!
//! ## Overview
//!
//! - **EntityStore**: list/get/create/update/modify/delete per entity kind
//! - **MemoryStore**: in-process collections with simulated latency
//! - **Per-id ordering**: writes to one record apply one at a time, in call order
//! - **WriteQueue**: the same FIFO ordering for callers that validate before writing
//! - **Change events**: every committed write is broadcast to subscribers
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rolegraph_model::{RoleId, RolePatch};
//! use rolegraph_store::{MemoryStore, StoreConfig};
//!
//! async fn example() {
//!     let store = MemoryStore::seeded(StoreConfig::default());
//!     let mut sub = store.subscribe();
//!
//!     // Fields left out of the patch are kept
//!     let role = store
//!         .roles()
//!         .update(RoleId::new(2), RolePatch::new().name("Member"))
//!         .await
//!         .unwrap();
//!     assert_eq!(role.name, "Member");
//!
//!     // Derived views of role 2 and everything below it are now stale
//!     let event = sub.recv().await.unwrap();
//!     assert_eq!(event.topic(), "role.updated");
//! }
//! ```
//!
//! ## Configuration
//!
//! - `ROLEGRAPH_STORE_LATENCY_MS`: simulated latency (default 500)
//! - `ROLEGRAPH_STORE_LATENCY_MAX_MS`: upper bound for a jittered window
//! - `ROLEGRAPH_EVENT_CAPACITY`: change event channel capacity

pub mod config;
pub mod entity;
pub mod events;
pub mod memory;
pub mod queue;
pub mod seed;
pub mod store;

// Re-export main types
pub use config::{ConfigError, StoreConfig};
pub use entity::Entity;
pub use events::{ChangeKind, StoreEvent, Subscription, SubscriptionError};
pub use memory::MemoryStore;
pub use queue::{WriteQueue, WriteTurn};
pub use store::{EntityStore, Modifier};
