//! Change events
//!
//! Every committed mutation is broadcast so callers holding derived views
//! (effective permission sets, cached tables) know to drop them. Views are
//! never patched in place: an edit to one role can change the effective
//! permissions of its whole subtree.

use chrono::{DateTime, Utc};
use rolegraph_model::EntityKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

/// What happened to a record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// A record was added
    Created,
    /// A record was merged with a patch
    Updated,
    /// A record was removed
    Deleted,
    /// The whole collection was replaced
    Reset,
}

impl ChangeKind {
    /// Get string representation of the change.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Reset => "reset",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A committed store mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreEvent {
    /// Event ID
    pub id: Uuid,
    /// Kind of record touched
    pub entity: EntityKind,
    /// Raw id of the record, `None` for collection-wide changes
    pub entity_id: Option<u64>,
    /// What happened
    pub change: ChangeKind,
    /// When the change was committed
    pub timestamp: DateTime<Utc>,
}

impl StoreEvent {
    /// Create an event for a single record.
    pub fn record(entity: EntityKind, entity_id: u64, change: ChangeKind) -> Self {
        Self {
            id: Uuid::now_v7(),
            entity,
            entity_id: Some(entity_id),
            change,
            timestamp: Utc::now(),
        }
    }

    /// Create an event for a collection-wide reset.
    pub fn reset(entity: EntityKind) -> Self {
        Self {
            id: Uuid::now_v7(),
            entity,
            entity_id: None,
            change: ChangeKind::Reset,
            timestamp: Utc::now(),
        }
    }

    /// Topic string, e.g. `role.updated`.
    pub fn topic(&self) -> String {
        format!("{}.{}", self.entity, self.change)
    }
}

/// Subscription errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The store was dropped
    #[error("Channel closed")]
    ChannelClosed,

    /// The receiver fell behind and missed events; treat every view as stale
    #[error("Subscriber lagged, {0} events skipped")]
    Lagged(u64),
}

/// Subscription handle for receiving store events.
#[derive(Debug)]
pub struct Subscription {
    /// Subscription ID
    pub id: String,
    /// Event receiver
    pub receiver: broadcast::Receiver<StoreEvent>,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<StoreEvent>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            receiver,
        }
    }

    /// Receive the next event.
    pub async fn recv(&mut self) -> Result<StoreEvent, SubscriptionError> {
        self.receiver.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => SubscriptionError::ChannelClosed,
            broadcast::error::RecvError::Lagged(n) => SubscriptionError::Lagged(n),
        })
    }

    /// Receive an event if one is already queued.
    pub fn try_recv(&mut self) -> Option<StoreEvent> {
        self.receiver.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_topic() {
        let event = StoreEvent::record(EntityKind::Role, 3, ChangeKind::Updated);
        assert_eq!(event.topic(), "role.updated");
        assert_eq!(event.entity_id, Some(3));

        let event = StoreEvent::reset(EntityKind::User);
        assert_eq!(event.topic(), "user.reset");
        assert_eq!(event.entity_id, None);
    }

    #[tokio::test]
    async fn test_subscription_receives() {
        let (sender, receiver) = broadcast::channel(4);
        let mut sub = Subscription::new(receiver);

        sender
            .send(StoreEvent::record(EntityKind::User, 1, ChangeKind::Deleted))
            .unwrap();
        let event = sub.recv().await.unwrap();
        assert_eq!(event.change, ChangeKind::Deleted);
        assert!(sub.try_recv().is_none());

        drop(sender);
        assert_eq!(sub.recv().await.unwrap_err(), SubscriptionError::ChannelClosed);
    }
}
