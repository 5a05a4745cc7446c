//! The publish path: validate, persist, then fan out to joined connections.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::RelayError;
use crate::protocol::{SendMessage, ServerEvent};
use crate::registry::RoomRegistry;
use crate::store::{Message, Store};

/// Orchestrates message publishing. Holds a per-room lock so that messages
/// in one room are broadcast in the order they were persisted; rooms are
/// independent and publish in parallel.
pub struct MessageRelay {
    store: Store,
    registry: Arc<RoomRegistry>,
    publish_locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl MessageRelay {
    pub fn new(store: Store, registry: Arc<RoomRegistry>) -> Self {
        Self {
            store,
            registry,
            publish_locks: StdMutex::new(HashMap::new()),
        }
    }

    /// Persists a message and broadcasts it to every connection currently
    /// joined to the room, the sender included. The echo is how the sender
    /// learns the publish succeeded. A persistence failure aborts before any
    /// broadcast and is reported to the caller alone.
    pub async fn publish(&self, req: &SendMessage) -> Result<Message, RelayError> {
        req.validate()?;

        let lock = self.publish_lock(&req.room_id);
        let _serial = lock.lock().await;

        // Registry is only consulted after the write lands; a slow insert
        // must not block join/leave traffic for the room.
        let message = self
            .store
            .insert_message(&req.room_id, &req.author, &req.body, OffsetDateTime::now_utc())
            .await?;

        let members = self.registry.members_of(&req.room_id).await;
        debug!(room = %req.room_id, id = %message.id, members = members.len(), "broadcasting message");
        for (conn, tx) in members {
            if tx.send(ServerEvent::NewMessage(message.clone())).is_err() {
                // Receiver dropped mid-teardown; purge will catch up.
                debug!(conn = %conn, "skipping closed member channel");
            }
        }

        Ok(message)
    }

    /// The non-broadcast publish path (HTTP). Writes through the same store
    /// contract as `publish` and produces structurally identical messages.
    pub async fn post(&self, req: &SendMessage) -> Result<Message, RelayError> {
        req.validate()?;
        let message = self
            .store
            .insert_message(&req.room_id, &req.author, &req.body, OffsetDateTime::now_utc())
            .await?;
        debug!(room = %req.room_id, id = %message.id, "message stored without broadcast");
        Ok(message)
    }

    fn publish_lock(&self, room_id: &str) -> Arc<Mutex<()>> {
        let mut locks = match self.publish_locks.lock() {
            Ok(locks) => locks,
            Err(poisoned) => {
                warn!("publish lock map poisoned");
                poisoned.into_inner()
            }
        };
        locks.entry(room_id.to_owned()).or_default().clone()
    }
}
