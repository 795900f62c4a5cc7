//! In-memory store implementation
//!
//! Holds the role and user collections for a single process, simulates
//! backend latency on every call, and orders writes per record id.

use async_trait::async_trait;
use rolegraph_model::{AccessError, AccessResult, EntityKind, Role, RoleId, User, UserId};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{broadcast, RwLock};

use crate::config::StoreConfig;
use crate::entity::Entity;
use crate::events::{ChangeKind, StoreEvent, Subscription};
use crate::queue::WriteQueue;
use crate::seed::{seed_roles, seed_users};
use crate::store::{EntityStore, Modifier};

/// One entity collection plus its per-id write queues.
struct Collection<E: Entity> {
    /// Records in insertion order
    records: RwLock<Vec<E>>,
    /// FIFO write order per record id
    writes: WriteQueue<E::Id>,
    /// Next id to hand out
    next_id: AtomicU64,
}

impl<E: Entity> Collection<E> {
    fn new(records: Vec<E>) -> Self {
        let next_id = Self::next_free_id(&records);
        Self {
            records: RwLock::new(records),
            writes: WriteQueue::new(),
            next_id: AtomicU64::new(next_id),
        }
    }

    fn next_free_id(records: &[E]) -> u64 {
        records
            .iter()
            .map(|record| Into::<u64>::into(record.id()))
            .max()
            .unwrap_or(0)
            + 1
    }

    fn allocate_id(&self) -> E::Id {
        E::Id::from(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn replace(&self, records: Vec<E>) {
        // Ids stay monotonic across resets.
        self.next_id
            .fetch_max(Self::next_free_id(&records), Ordering::SeqCst);
        *self.records.write().await = records;
    }
}

/// In-memory store for roles and users.
///
/// Suitable for the admin console's mock backend and for tests. Construct
/// it explicitly and share it behind an `Arc`; there is no global instance.
///
/// # Example
///
/// ```rust,no_run
/// use rolegraph_model::RoleDraft;
/// use rolegraph_store::{MemoryStore, StoreConfig};
///
/// async fn example() {
///     let store = MemoryStore::seeded(StoreConfig::default());
///
///     let auditor = store.roles().create(RoleDraft::new("Auditor")).await.unwrap();
///     let roles = store.roles().list().await.unwrap();
///     assert_eq!(roles.len(), 4);
///     assert_eq!(roles[3].id, auditor.id);
/// }
/// ```
pub struct MemoryStore {
    roles: Collection<Role>,
    users: Collection<User>,
    config: StoreConfig,
    events: broadcast::Sender<StoreEvent>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("config", &self.config)
            .finish()
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new(config: StoreConfig) -> Self {
        Self::with_records(config, Vec::new(), Vec::new())
    }

    /// Create a store holding the console's seed roles and users.
    pub fn seeded(config: StoreConfig) -> Self {
        Self::with_records(config, seed_roles(), seed_users())
    }

    /// Create a store holding the given records.
    pub fn with_records(config: StoreConfig, roles: Vec<Role>, users: Vec<User>) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            roles: Collection::new(roles),
            users: Collection::new(users),
            config,
            events,
        }
    }

    /// The role collection as a trait object.
    pub fn roles(&self) -> &dyn EntityStore<Role> {
        self
    }

    /// The user collection as a trait object.
    pub fn users(&self) -> &dyn EntityStore<User> {
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Subscribe to committed changes.
    pub fn subscribe(&self) -> Subscription {
        Subscription::new(self.events.subscribe())
    }

    /// Restore the seed data. Meant for tests that share one store.
    pub async fn reset(&self) {
        self.roles.replace(seed_roles()).await;
        self.users.replace(seed_users()).await;

        tracing::debug!("Store reset to seed data");
        self.publish(StoreEvent::reset(EntityKind::Role));
        self.publish(StoreEvent::reset(EntityKind::User));
    }

    async fn simulate_latency(&self) {
        let latency = self.config.sample_latency();
        if latency.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(latency).await;
        }
    }

    fn publish(&self, event: StoreEvent) {
        tracing::debug!(topic = %event.topic(), event_id = %event.id, "Store event published");
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    async fn list_in<E: Entity>(&self, collection: &Collection<E>) -> AccessResult<Vec<E>> {
        self.simulate_latency().await;
        Ok(collection.records.read().await.clone())
    }

    async fn get_in<E: Entity>(&self, collection: &Collection<E>, id: E::Id) -> AccessResult<E> {
        self.simulate_latency().await;
        collection
            .records
            .read()
            .await
            .iter()
            .find(|record| record.id() == id)
            .cloned()
            .ok_or_else(|| AccessError::not_found(E::KIND, id))
    }

    async fn create_in<E: Entity>(
        &self,
        collection: &Collection<E>,
        draft: E::Draft,
    ) -> AccessResult<E> {
        self.simulate_latency().await;

        let record = {
            let mut records = collection.records.write().await;
            let record = E::build(collection.allocate_id(), draft);
            records.push(record.clone());
            record
        };

        tracing::debug!(entity = %E::KIND, id = %record.id(), "Record created");
        self.publish(StoreEvent::record(E::KIND, record.id().into(), ChangeKind::Created));
        Ok(record)
    }

    async fn modify_in<E: Entity>(
        &self,
        collection: &Collection<E>,
        id: E::Id,
        modifier: Modifier<E>,
    ) -> AccessResult<E> {
        let _turn = collection.writes.turn(id).await;
        self.simulate_latency().await;

        let updated = {
            let mut records = collection.records.write().await;
            let current = records
                .iter_mut()
                .find(|record| record.id() == id)
                .ok_or_else(|| AccessError::not_found(E::KIND, id))?;

            // Merge into a copy so a failed modifier never leaves a half-applied record.
            let patch = modifier(current)?;
            let mut next = current.clone();
            next.merge(patch);
            *current = next.clone();
            next
        };

        tracing::debug!(entity = %E::KIND, id = %id, "Record updated");
        self.publish(StoreEvent::record(E::KIND, id.into(), ChangeKind::Updated));
        Ok(updated)
    }

    async fn delete_in<E: Entity>(&self, collection: &Collection<E>, id: E::Id) -> AccessResult<E::Id> {
        let _turn = collection.writes.turn(id).await;
        self.simulate_latency().await;

        {
            let mut records = collection.records.write().await;
            let position = records
                .iter()
                .position(|record| record.id() == id)
                .ok_or_else(|| AccessError::not_found(E::KIND, id))?;
            records.remove(position);
        }

        tracing::debug!(entity = %E::KIND, id = %id, "Record deleted");
        self.publish(StoreEvent::record(E::KIND, id.into(), ChangeKind::Deleted));
        Ok(id)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::seeded(StoreConfig::default())
    }
}

#[async_trait]
impl EntityStore<Role> for MemoryStore {
    async fn list(&self) -> AccessResult<Vec<Role>> {
        self.list_in(&self.roles).await
    }

    async fn get(&self, id: RoleId) -> AccessResult<Role> {
        self.get_in(&self.roles, id).await
    }

    async fn create(&self, draft: <Role as Entity>::Draft) -> AccessResult<Role> {
        self.create_in(&self.roles, draft).await
    }

    async fn update(&self, id: RoleId, patch: <Role as Entity>::Patch) -> AccessResult<Role> {
        self.modify_in(&self.roles, id, Box::new(move |_| Ok(patch)))
            .await
    }

    async fn modify(&self, id: RoleId, modifier: Modifier<Role>) -> AccessResult<Role> {
        self.modify_in(&self.roles, id, modifier).await
    }

    async fn delete(&self, id: RoleId) -> AccessResult<RoleId> {
        self.delete_in(&self.roles, id).await
    }
}

#[async_trait]
impl EntityStore<User> for MemoryStore {
    async fn list(&self) -> AccessResult<Vec<User>> {
        self.list_in(&self.users).await
    }

    async fn get(&self, id: UserId) -> AccessResult<User> {
        self.get_in(&self.users, id).await
    }

    async fn create(&self, draft: <User as Entity>::Draft) -> AccessResult<User> {
        self.create_in(&self.users, draft).await
    }

    async fn update(&self, id: UserId, patch: <User as Entity>::Patch) -> AccessResult<User> {
        self.modify_in(&self.users, id, Box::new(move |_| Ok(patch)))
            .await
    }

    async fn modify(&self, id: UserId, modifier: Modifier<User>) -> AccessResult<User> {
        self.modify_in(&self.users, id, modifier).await
    }

    async fn delete(&self, id: UserId) -> AccessResult<UserId> {
        self.delete_in(&self.users, id).await
    }
}
