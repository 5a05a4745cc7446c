//! Per-connection state tying one transport connection to the registry.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::protocol::ServerEvent;
use crate::registry::{ConnId, OutboundSender, RoomRegistry};

/// One live client connection and its current room memberships. Message
/// content never lives here; the relay owns the publish path.
pub struct ConnSession {
    id: ConnId,
    registry: Arc<RoomRegistry>,
    outbound: OutboundSender,
    joined: HashSet<String>,
}

impl ConnSession {
    pub fn new(registry: Arc<RoomRegistry>, outbound: OutboundSender) -> Self {
        Self {
            id: Uuid::now_v7(),
            registry,
            outbound,
            joined: HashSet::new(),
        }
    }

    pub fn id(&self) -> ConnId {
        self.id
    }

    pub async fn join_room(&mut self, room_id: &str) {
        self.registry
            .join(room_id, self.id, self.outbound.clone())
            .await;
        self.joined.insert(room_id.to_owned());
    }

    pub async fn leave_room(&mut self, room_id: &str) {
        self.registry.leave(room_id, self.id).await;
        self.joined.remove(room_id);
    }

    /// Best-effort event delivery to this connection only. Used to signal a
    /// failed publish back to its originator without touching the room.
    pub fn notify(&self, event: ServerEvent) {
        let _ = self.outbound.send(event);
    }

    /// Tears the session down, removing it from every room. Consumes the
    /// session so the purge can only run once per connection.
    pub async fn close(self) {
        self.registry.purge(self.id).await;
        debug!(conn = %self.id, rooms = self.joined.len(), "session closed");
    }
}
