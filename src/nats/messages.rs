use serde::{Deserialize, Serialize};

/// What a presence message announces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceKind {
    Joined,
    Updated,
    Left,
}

/// Presence message published on `interview.room.<room_id>.presence`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceMessage {
    pub participant_id: String,
    pub display_name: String,
    pub kind: PresenceKind,
    pub audio_enabled: bool,
    pub video_enabled: bool,
    pub timestamp: String, // RFC3339 timestamp
}

/// Chat message published on `interview.room.<room_id>.chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatWireMessage {
    pub participant_id: String,
    pub display_name: String,
    pub content: String,
    pub timestamp: String, // RFC3339 timestamp
}

pub fn presence_subject(room_id: &str) -> String {
    format!("interview.room.{}.presence", room_id)
}

pub fn chat_subject(room_id: &str) -> String {
    format!("interview.room.{}.chat", room_id)
}
