//! Entity kinds the store can hold.
//!
//! Each kind names its id type, the draft it is created from and the patch
//! it is updated with. The store itself stays generic over the kind.

use std::fmt::{Debug, Display};
use std::hash::Hash;

use rolegraph_model::{EntityKind, Role, RoleDraft, RoleId, RolePatch};
use rolegraph_model::{User, UserDraft, UserId, UserPatch};

/// A record type managed by an [`crate::EntityStore`].
pub trait Entity: Clone + Send + Sync + 'static {
    /// Store-assigned identifier.
    type Id: Copy + Eq + Hash + Debug + Display + From<u64> + Into<u64> + Send + Sync + 'static;

    /// Creation payload; omitted fields carry kind-specific defaults.
    type Draft: Send + 'static;

    /// Partial update; omitted fields are left untouched.
    type Patch: Send + 'static;

    /// The kind tag used in errors and events.
    const KIND: EntityKind;

    /// The record's id.
    fn id(&self) -> Self::Id;

    /// Build the stored record once an id has been assigned.
    fn build(id: Self::Id, draft: Self::Draft) -> Self;

    /// Merge a patch into the record.
    fn merge(&mut self, patch: Self::Patch);
}

impl Entity for Role {
    type Id = RoleId;
    type Draft = RoleDraft;
    type Patch = RolePatch;

    const KIND: EntityKind = EntityKind::Role;

    fn id(&self) -> RoleId {
        self.id
    }

    fn build(id: RoleId, draft: RoleDraft) -> Self {
        Role::from_draft(id, draft)
    }

    fn merge(&mut self, patch: RolePatch) {
        self.apply(patch);
    }
}

impl Entity for User {
    type Id = UserId;
    type Draft = UserDraft;
    type Patch = UserPatch;

    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> UserId {
        self.id
    }

    fn build(id: UserId, draft: UserDraft) -> Self {
        User::from_draft(id, draft)
    }

    fn merge(&mut self, patch: UserPatch) {
        self.apply(patch);
    }
}
