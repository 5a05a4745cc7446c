//! Durable storage for rooms and messages, backed by SQLite.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

/// A named channel grouping messages and joined connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A persisted chat message. Field names on the wire keep the original
/// client contract: `user` is the author, `message` is the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub room_id: String,
    #[serde(rename = "user")]
    pub author: String,
    #[serde(rename = "message")]
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Handle on the rooms/messages store. Rooms and messages are independent
/// record sets; a message may reference a room id that was never created.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS rooms (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                room_id TEXT NOT NULL,
                author TEXT NOT NULL,
                body TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_messages_room ON messages (room_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn insert_room(&self, name: &str, description: &str) -> Result<Room, sqlx::Error> {
        let room = Room {
            id: Uuid::now_v7(),
            name: name.to_owned(),
            description: description.to_owned(),
            created_at: OffsetDateTime::now_utc(),
        };

        sqlx::query("INSERT INTO rooms (id,name,description,created_at) VALUES (?,?,?,?)")
            .bind(room.id.to_string())
            .bind(&room.name)
            .bind(&room.description)
            .bind(encode_ts(&room.created_at)?)
            .execute(&self.pool)
            .await?;

        Ok(room)
    }

    /// Inserts a message and returns it with its assigned id. The id exists
    /// only once the row is written; callers never see one for a failed
    /// insert.
    pub async fn insert_message(
        &self,
        room_id: &str,
        author: &str,
        body: &str,
        timestamp: OffsetDateTime,
    ) -> Result<Message, sqlx::Error> {
        let message = Message {
            id: Uuid::now_v7(),
            room_id: room_id.to_owned(),
            author: author.to_owned(),
            body: body.to_owned(),
            timestamp,
        };

        sqlx::query("INSERT INTO messages (id,room_id,author,body,created_at) VALUES (?,?,?,?,?)")
            .bind(message.id.to_string())
            .bind(&message.room_id)
            .bind(&message.author)
            .bind(&message.body)
            .bind(encode_ts(&message.timestamp)?)
            .execute(&self.pool)
            .await?;

        Ok(message)
    }

    pub async fn list_rooms(&self) -> Result<Vec<Room>, sqlx::Error> {
        let rows: Vec<(String, String, String, String)> =
            sqlx::query_as("SELECT id,name,description,created_at FROM rooms ORDER BY rowid")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter()
            .map(|(id, name, description, created_at)| {
                Ok(Room {
                    id: parse_id(&id)?,
                    name,
                    description,
                    created_at: parse_ts(&created_at)?,
                })
            })
            .collect()
    }

    /// Messages for one room, in insertion order.
    pub async fn list_messages(&self, room_id: &str) -> Result<Vec<Message>, sqlx::Error> {
        let rows: Vec<(String, String, String, String)> = sqlx::query_as(
            "SELECT id,author,body,created_at FROM messages WHERE room_id=? ORDER BY rowid",
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(id, author, body, created_at)| {
                Ok(Message {
                    id: parse_id(&id)?,
                    room_id: room_id.to_owned(),
                    author,
                    body,
                    timestamp: parse_ts(&created_at)?,
                })
            })
            .collect()
    }
}

fn encode_ts(ts: &OffsetDateTime) -> Result<String, sqlx::Error> {
    ts.format(&Rfc3339)
        .map_err(|err| sqlx::Error::Encode(Box::new(err)))
}

fn parse_ts(raw: &str) -> Result<OffsetDateTime, sqlx::Error> {
    OffsetDateTime::parse(raw, &Rfc3339).map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

fn parse_id(raw: &str) -> Result<Uuid, sqlx::Error> {
    Uuid::parse_str(raw).map_err(|err| sqlx::Error::Decode(Box::new(err)))
}
