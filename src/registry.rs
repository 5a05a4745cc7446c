//! In-memory registry of which connections are joined to which rooms.

use std::collections::HashMap;

use tokio::sync::{RwLock, mpsc};
use tracing::debug;
use uuid::Uuid;

use crate::protocol::ServerEvent;

/// Transport-level identity of one live connection.
pub type ConnId = Uuid;

/// Sending half of a connection's delivery channel. The writer task on the
/// other end drains it into the socket, so fan-out never blocks on I/O.
pub type OutboundSender = mpsc::UnboundedSender<ServerEvent>;

/// Room id → joined connections. All mutation and snapshotting goes through
/// one `RwLock`, so a `members_of` snapshot can never observe a half-applied
/// join, leave, or purge.
pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, HashMap<ConnId, OutboundSender>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Adds a connection to a room's member set. Idempotent; joining a room
    /// twice has no additional effect. The room does not need to exist in
    /// the store.
    pub async fn join(&self, room_id: &str, conn: ConnId, tx: OutboundSender) {
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room_id.to_owned())
            .or_default()
            .entry(conn)
            .or_insert(tx);
        debug!(room = room_id, conn = %conn, "joined room");
    }

    /// Removes a connection from a room's member set. No-op for non-members
    /// and unknown rooms. Emptied rooms are dropped from the map.
    pub async fn leave(&self, room_id: &str, conn: ConnId) {
        let mut rooms = self.rooms.write().await;
        if let Some(members) = rooms.get_mut(room_id) {
            members.remove(&conn);
            if members.is_empty() {
                rooms.remove(room_id);
            }
        }
        debug!(room = room_id, conn = %conn, "left room");
    }

    /// Removes a connection from every room it is joined to. Called exactly
    /// once, on disconnect; safe when the connection never joined anything.
    pub async fn purge(&self, conn: ConnId) {
        let mut rooms = self.rooms.write().await;
        rooms.retain(|_, members| {
            members.remove(&conn);
            !members.is_empty()
        });
        debug!(conn = %conn, "purged from all rooms");
    }

    /// Snapshot of a room's live members for fan-out. The returned set is
    /// owned; concurrent joins and leaves after the call returns are not
    /// observed, and a purged connection never appears.
    pub async fn members_of(&self, room_id: &str) -> Vec<(ConnId, OutboundSender)> {
        let rooms = self.rooms.read().await;
        rooms
            .get(room_id)
            .map(|members| {
                members
                    .iter()
                    .map(|(conn, tx)| (*conn, tx.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn member_count(&self, room_id: &str) -> usize {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).map_or(0, HashMap::len)
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
