//! User records
//!
//! Users reference their role by *name*, not id. The binding is loose: a
//! user whose role name matches nothing simply has no effective permissions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque user identifier assigned by the store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// Wrap a raw id.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric value.
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for UserId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<UserId> for u64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum UserStatus {
    /// Account in use
    #[default]
    Active,
    /// Account disabled
    Inactive,
}

impl UserStatus {
    /// Parse status from string representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use rolegraph_model::UserStatus;
    ///
    /// assert_eq!(UserStatus::parse("inactive"), Some(UserStatus::Inactive));
    /// assert_eq!(UserStatus::parse("ACTIVE"), Some(UserStatus::Active));
    /// assert_eq!(UserStatus::parse("banned"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }

    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

/// A stored user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Unique user ID
    pub id: UserId,

    /// Display name
    pub name: String,

    /// Name of the bound role
    pub role: String,

    /// Account status
    #[serde(default)]
    pub status: UserStatus,
}

impl User {
    /// Build a stored user from a draft and its assigned id.
    pub fn from_draft(id: UserId, draft: UserDraft) -> Self {
        Self {
            id,
            name: draft.name,
            role: draft.role,
            status: draft.status,
        }
    }

    /// Check if the account is active.
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    /// Merge a patch into this user. Fields absent from the patch are kept.
    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

/// Fields for a new user. Status defaults to [`UserStatus::Active`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UserDraft {
    /// Display name
    pub name: String,
    /// Name of the bound role
    pub role: String,
    /// Account status
    pub status: UserStatus,
}

impl UserDraft {
    /// Start a draft for an active user.
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            status: UserStatus::Active,
        }
    }

    /// Set the status.
    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = status;
        self
    }
}

/// Partial update for a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    /// New display name
    pub name: Option<String>,
    /// New role name
    pub role: Option<String>,
    /// New status
    pub status: Option<UserStatus>,
}

impl UserPatch {
    /// An empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename the user.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Rebind the user to another role name.
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Change the status.
    pub fn status(mut self, status: UserStatus) -> Self {
        self.status = Some(status);
        self
    }
}
