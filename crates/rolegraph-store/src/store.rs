//! Store abstraction
//!
//! The contract every backend satisfies, per entity kind. Every call is
//! asynchronous; callers must never assume it completes synchronously.

use async_trait::async_trait;
use rolegraph_model::AccessResult;

use crate::entity::Entity;

/// Read-modify-write step run by [`EntityStore::modify`].
///
/// Receives the current record and returns the patch to merge, or an error
/// that aborts the write and leaves the record untouched.
pub type Modifier<E> = Box<dyn FnOnce(&E) -> AccessResult<<E as Entity>::Patch> + Send>;

/// Store trait for one entity kind.
///
/// Writes to the same id (`update`, `modify`, `delete`) apply one at a time
/// in call order. Writes to different ids are independent. A write either
/// fully applies or not at all.
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Snapshot of every record, in insertion order.
    async fn list(&self) -> AccessResult<Vec<E>>;

    /// A single record.
    ///
    /// # Errors
    ///
    /// `NotFound` if the id is absent.
    async fn get(&self, id: E::Id) -> AccessResult<E>;

    /// Assign a fresh id, store the record built from `draft` and return it.
    async fn create(&self, draft: E::Draft) -> AccessResult<E>;

    /// Merge `patch` over the existing record and return the result.
    ///
    /// # Errors
    ///
    /// `NotFound` if the id is absent.
    async fn update(&self, id: E::Id, patch: E::Patch) -> AccessResult<E>;

    /// Compute a patch from the current record and merge it, without any
    /// other write to the same id slipping in between.
    ///
    /// # Errors
    ///
    /// `NotFound` if the id is absent, or whatever `modifier` returns.
    async fn modify(&self, id: E::Id, modifier: Modifier<E>) -> AccessResult<E>;

    /// Remove a record and return its id.
    ///
    /// # Errors
    ///
    /// `NotFound` if the id is absent.
    async fn delete(&self, id: E::Id) -> AccessResult<E::Id>;
}
