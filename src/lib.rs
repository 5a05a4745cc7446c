pub mod error;
pub mod protocol;
pub mod registry;
pub mod relay;
pub mod rooms;
pub mod session;
pub mod store;

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

pub use error::{AppResult, RelayError};

use crate::registry::RoomRegistry;
use crate::relay::MessageRelay;
use crate::store::Store;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub store: Store,
    pub registry: Arc<RoomRegistry>,
    pub relay: Arc<MessageRelay>,
}

impl AppState {
    pub fn new(db_pool: SqlitePool) -> Self {
        let store = Store::new(db_pool);
        let registry = Arc::new(RoomRegistry::new());
        let relay = Arc::new(MessageRelay::new(store.clone(), registry.clone()));
        Self {
            store,
            registry,
            relay,
        }
    }
}
