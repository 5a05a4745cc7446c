//! Typed wire events exchanged over the WebSocket transport.
//!
//! Frames are JSON objects of the form `{"event": "...", "data": {...}}`.
//! Event names and payload fields keep the contract the original clients
//! speak: `joinRoom`, `leaveRoom`, `sendMessage` inbound and `newMessage`
//! outbound.

use serde::{Deserialize, Serialize};

use crate::error::RelayError;
use crate::store::Message;

/// Client → server command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    JoinRoom {
        #[serde(rename = "roomId")]
        room_id: String,
    },
    LeaveRoom {
        #[serde(rename = "roomId")]
        room_id: String,
    },
    SendMessage(SendMessage),
}

/// Server → client event. `Error` is only ever delivered to the connection
/// whose request failed; other room members never observe it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    NewMessage(Message),
    Error { message: String },
}

/// A publish request, from either the WebSocket or the HTTP path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    pub room_id: String,
    #[serde(rename = "user")]
    pub author: String,
    #[serde(rename = "message")]
    pub body: String,
}

impl SendMessage {
    /// Required-field checks, applied before the relay is reached.
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.room_id.trim().is_empty() {
            return Err(RelayError::validation("roomId is required"));
        }
        if self.body.trim().is_empty() {
            return Err(RelayError::validation("message must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    #[test]
    fn join_room_deserializes() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"event":"joinRoom","data":{"roomId":"general"}}"#).unwrap();
        match event {
            ClientEvent::JoinRoom { room_id } => assert_eq!(room_id, "general"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn send_message_deserializes_with_original_field_names() {
        let event: ClientEvent = serde_json::from_str(
            r#"{"event":"sendMessage","data":{"roomId":"general","message":"hi","user":"alice"}}"#,
        )
        .unwrap();
        match event {
            ClientEvent::SendMessage(req) => {
                assert_eq!(req.room_id, "general");
                assert_eq!(req.author, "alice");
                assert_eq!(req.body, "hi");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn unknown_event_is_rejected() {
        let parsed: Result<ClientEvent, _> =
            serde_json::from_str(r#"{"event":"shout","data":{}}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn new_message_serializes_with_wire_names() {
        let event = ServerEvent::NewMessage(Message {
            id: Uuid::now_v7(),
            room_id: "general".to_owned(),
            author: "alice".to_owned(),
            body: "hi".to_owned(),
            timestamp: OffsetDateTime::now_utc(),
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""event":"newMessage""#));
        assert!(json.contains(r#""roomId":"general""#));
        assert!(json.contains(r#""user":"alice""#));
        assert!(json.contains(r#""message":"hi""#));
        assert!(json.contains(r#""timestamp""#));
    }

    #[test]
    fn validate_rejects_missing_room_id() {
        let req = SendMessage {
            room_id: "  ".to_owned(),
            author: "alice".to_owned(),
            body: "hi".to_owned(),
        };
        assert!(matches!(req.validate(), Err(RelayError::Validation(_))));
    }

    #[test]
    fn validate_rejects_empty_body() {
        let req = SendMessage {
            room_id: "general".to_owned(),
            author: "alice".to_owned(),
            body: String::new(),
        };
        assert!(matches!(req.validate(), Err(RelayError::Validation(_))));
    }

    #[test]
    fn validate_allows_anonymous_author() {
        let req = SendMessage {
            room_id: "general".to_owned(),
            author: String::new(),
            body: "hi".to_owned(),
        };
        assert!(req.validate().is_ok());
    }
}
