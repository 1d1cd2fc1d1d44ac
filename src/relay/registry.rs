//! Authoritative registry of live connections and room memberships.
//!
//! Two maps — connection → entry and room → member set — live behind a
//! single [`tokio::sync::RwLock`] so a fan-out read can never observe a
//! membership change half-applied. All state is in-memory only: a process
//! restart drops every connection, and clients re-join from their own
//! held identity on reconnect.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::sync::mpsc;

use crate::domain::{ConnectionId, RoomKey};
use crate::error::RealtimeError;
use crate::ws::messages::ServerEvent;

/// Outbound queue handle for one connection.
///
/// The router pushes typed events here; the connection's own task drains
/// the queue onto the socket. Because the queue is unbounded and `send`
/// never blocks, one stalled socket can never hold up fan-out to its
/// siblings.
pub type EventSink = mpsc::UnboundedSender<ServerEvent>;

/// Per-connection bookkeeping.
#[derive(Debug)]
struct ConnectionEntry {
    sink: EventSink,
    rooms: HashSet<RoomKey>,
    connected_at: DateTime<Utc>,
    last_seen: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    rooms: HashMap<RoomKey, HashSet<ConnectionId>>,
}

/// Tracks which connections exist and which rooms each has joined.
///
/// Owned by the composition root and shared (via `Arc`) between the ws
/// transport, the [`crate::relay::RoomRouter`], and the system surface.
/// Rooms have no independent lifecycle: the key vanishes when its last
/// member leaves and re-forms when someone joins it again.
///
/// ```
/// use courier_gateway::domain::{ConnectionId, RoomKey};
/// use courier_gateway::relay::ConnectionRegistry;
///
/// tokio_test::block_on(async {
///     let registry = ConnectionRegistry::new();
///     let (sink, _rx) = tokio::sync::mpsc::unbounded_channel();
///     let id = ConnectionId::new();
///     registry.register(id, sink).await;
///     let _ = registry.join(id, RoomKey::parcel("p-42")).await;
///     assert_eq!(registry.members_of(&RoomKey::parcel("p-42")).await.len(), 1);
/// });
/// ```
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    inner: RwLock<RegistryInner>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection with an empty membership set.
    ///
    /// Idempotent: a duplicate register for the same id keeps the
    /// existing entry (and its live sink) untouched, so client retries
    /// cannot corrupt state.
    pub async fn register(&self, id: ConnectionId, sink: EventSink) {
        let mut inner = self.inner.write().await;
        match inner.connections.entry(id) {
            Entry::Occupied(_) => {
                tracing::debug!(%id, "duplicate register ignored");
            }
            Entry::Vacant(slot) => {
                let now = Utc::now();
                slot.insert(ConnectionEntry {
                    sink,
                    rooms: HashSet::new(),
                    connected_at: now,
                    last_seen: now,
                });
            }
        }
    }

    /// Adds the connection to a room (set semantics — joining twice is a
    /// no-op, not a duplicate membership).
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::UnregisteredConnection`] when the id is
    /// unknown — the caller logs and swallows this, since a queued join
    /// racing a disconnect must not crash the router.
    pub async fn join(&self, id: ConnectionId, room: RoomKey) -> Result<(), RealtimeError> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let Some(entry) = inner.connections.get_mut(&id) else {
            return Err(RealtimeError::UnregisteredConnection(id));
        };
        if entry.rooms.insert(room.clone()) {
            inner.rooms.entry(room).or_default().insert(id);
        }
        Ok(())
    }

    /// Removes the connection from a room; a no-op when it was not a
    /// member. The room key itself is dropped once its member set drains.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::UnregisteredConnection`] when the id is
    /// unknown.
    pub async fn leave(&self, id: ConnectionId, room: &RoomKey) -> Result<(), RealtimeError> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let Some(entry) = inner.connections.get_mut(&id) else {
            return Err(RealtimeError::UnregisteredConnection(id));
        };
        if entry.rooms.remove(room) {
            remove_member(&mut inner.rooms, room, id);
        }
        Ok(())
    }

    /// Removes the connection from every room it joined, then drops its
    /// entry. Duplicate disconnect signals from the transport are
    /// tolerated: a second call for the same id is a logged no-op.
    pub async fn unregister(&self, id: ConnectionId) {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let Some(entry) = inner.connections.remove(&id) else {
            tracing::debug!(%id, "duplicate disconnect signal ignored");
            return;
        };
        for room in &entry.rooms {
            remove_member(&mut inner.rooms, room, id);
        }
        tracing::debug!(%id, rooms = entry.rooms.len(), "connection unregistered");
    }

    /// Snapshot of the members of one room, paired with their sinks.
    /// Returns an empty vec (not an error) for a room nobody has joined.
    pub async fn members_of(&self, room: &RoomKey) -> Vec<(ConnectionId, EventSink)> {
        let inner = self.inner.read().await;
        let Some(members) = inner.rooms.get(room) else {
            return Vec::new();
        };
        members
            .iter()
            .filter_map(|id| {
                inner
                    .connections
                    .get(id)
                    .map(|entry| (*id, entry.sink.clone()))
            })
            .collect()
    }

    /// Snapshot of every registered connection — the broadcast set.
    pub async fn connections(&self) -> Vec<(ConnectionId, EventSink)> {
        let inner = self.inner.read().await;
        inner
            .connections
            .iter()
            .map(|(id, entry)| (*id, entry.sink.clone()))
            .collect()
    }

    /// Refreshes the liveness timestamp of a connection. Unknown ids are
    /// ignored (the frame raced a disconnect).
    pub async fn touch(&self, id: ConnectionId) {
        let mut inner = self.inner.write().await;
        if let Some(entry) = inner.connections.get_mut(&id) {
            entry.last_seen = Utc::now();
        }
    }

    /// Returns when the connection last showed life, if it is tracked.
    pub async fn last_seen(&self, id: ConnectionId) -> Option<DateTime<Utc>> {
        let inner = self.inner.read().await;
        inner.connections.get(&id).map(|entry| entry.last_seen)
    }

    /// Returns when the connection registered, if it is tracked.
    pub async fn connected_at(&self, id: ConnectionId) -> Option<DateTime<Utc>> {
        let inner = self.inner.read().await;
        inner.connections.get(&id).map(|entry| entry.connected_at)
    }

    /// Number of live connections.
    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }

    /// Number of rooms that currently have at least one member.
    pub async fn room_count(&self) -> usize {
        self.inner.read().await.rooms.len()
    }
}

/// Drops `id` from the room's member set, removing the key entirely once
/// the set drains.
fn remove_member(
    rooms: &mut HashMap<RoomKey, HashSet<ConnectionId>>,
    room: &RoomKey,
    id: ConnectionId,
) {
    if let Some(members) = rooms.get_mut(room) {
        members.remove(&id);
        if members.is_empty() {
            rooms.remove(room);
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::UnboundedReceiver;

    async fn connect(registry: &ConnectionRegistry) -> (ConnectionId, UnboundedReceiver<ServerEvent>) {
        let id = ConnectionId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        registry.register(id, tx).await;
        (id, rx)
    }

    #[tokio::test]
    async fn register_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let (id, _rx) = connect(&registry).await;

        let (other_tx, _other_rx) = mpsc::unbounded_channel();
        registry.register(id, other_tx).await;

        assert_eq!(registry.connection_count().await, 1);
    }

    #[tokio::test]
    async fn duplicate_register_keeps_original_sink() {
        let registry = ConnectionRegistry::new();
        let (id, mut rx) = connect(&registry).await;

        let (other_tx, mut other_rx) = mpsc::unbounded_channel();
        registry.register(id, other_tx).await;

        let result = registry.join(id, RoomKey::user("u-1")).await;
        assert!(result.is_ok());

        for (_, sink) in registry.members_of(&RoomKey::user("u-1")).await {
            let sent = sink.send(ServerEvent::AgentLocationUpdate(
                crate::ws::messages::LocationPing {
                    agent_id: crate::domain::AgentId::new("a-1"),
                    parcel_id: None,
                    latitude: 0.0,
                    longitude: 0.0,
                    timestamp: Utc::now(),
                },
            ));
            assert!(sent.is_ok(), "original sink should be live");
        }

        assert!(rx.try_recv().is_ok());
        assert!(other_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn join_unknown_connection_errs() {
        let registry = ConnectionRegistry::new();
        let result = registry
            .join(ConnectionId::new(), RoomKey::parcel("p-1"))
            .await;
        assert!(matches!(
            result,
            Err(RealtimeError::UnregisteredConnection(_))
        ));
    }

    #[tokio::test]
    async fn join_twice_keeps_single_membership() {
        let registry = ConnectionRegistry::new();
        let (id, _rx) = connect(&registry).await;

        let room = RoomKey::parcel("p-1");
        let _ = registry.join(id, room.clone()).await;
        let _ = registry.join(id, room.clone()).await;

        assert_eq!(registry.members_of(&room).await.len(), 1);
    }

    #[tokio::test]
    async fn leave_nonmember_is_noop() {
        let registry = ConnectionRegistry::new();
        let (id, _rx) = connect(&registry).await;

        let result = registry.leave(id, &RoomKey::parcel("p-1")).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn leave_unknown_connection_errs() {
        let registry = ConnectionRegistry::new();
        let result = registry
            .leave(ConnectionId::new(), &RoomKey::parcel("p-1"))
            .await;
        assert!(matches!(
            result,
            Err(RealtimeError::UnregisteredConnection(_))
        ));
    }

    #[tokio::test]
    async fn unregister_cleans_every_membership() {
        let registry = ConnectionRegistry::new();
        let (id, _rx) = connect(&registry).await;

        let _ = registry.join(id, RoomKey::user("u-1")).await;
        let _ = registry.join(id, RoomKey::parcel("p-1")).await;
        assert_eq!(registry.room_count().await, 2);

        registry.unregister(id).await;

        assert!(registry.members_of(&RoomKey::user("u-1")).await.is_empty());
        assert!(registry.members_of(&RoomKey::parcel("p-1")).await.is_empty());
        assert_eq!(registry.room_count().await, 0);
        assert_eq!(registry.connection_count().await, 0);
    }

    #[tokio::test]
    async fn unregister_twice_is_noop() {
        let registry = ConnectionRegistry::new();
        let (id, _rx) = connect(&registry).await;

        registry.unregister(id).await;
        registry.unregister(id).await;

        assert_eq!(registry.connection_count().await, 0);
    }

    #[tokio::test]
    async fn room_reforms_independently_after_draining() {
        let registry = ConnectionRegistry::new();
        let room = RoomKey::parcel("p-1");

        let (first, _rx1) = connect(&registry).await;
        let _ = registry.join(first, room.clone()).await;
        registry.unregister(first).await;
        assert_eq!(registry.room_count().await, 0);

        let (second, _rx2) = connect(&registry).await;
        let result = registry.join(second, room.clone()).await;
        assert!(result.is_ok());

        let members: Vec<ConnectionId> = registry
            .members_of(&room)
            .await
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(members, vec![second]);
    }

    #[tokio::test]
    async fn members_of_unknown_room_is_empty() {
        let registry = ConnectionRegistry::new();
        assert!(registry.members_of(&RoomKey::agent("a-1")).await.is_empty());
    }

    #[tokio::test]
    async fn touch_advances_last_seen() {
        let registry = ConnectionRegistry::new();
        let (id, _rx) = connect(&registry).await;

        let Some(before) = registry.last_seen(id).await else {
            panic!("connection should be tracked");
        };
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        registry.touch(id).await;
        let Some(after) = registry.last_seen(id).await else {
            panic!("connection should be tracked");
        };
        assert!(after > before);
    }
}
