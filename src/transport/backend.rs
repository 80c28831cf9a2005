use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Media track kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Audio,
    Video,
}

/// Opaque handle to a media track owned by the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackHandle {
    pub id: String,
    pub kind: TrackKind,
}

impl TrackHandle {
    pub fn for_participant(participant_id: &str, kind: TrackKind) -> Self {
        let suffix = match kind {
            TrackKind::Audio => "audio",
            TrackKind::Video => "video",
        };
        Self {
            id: format!("{}-{}", participant_id, suffix),
            kind,
        }
    }
}

/// One endpoint (local or remote) inside a connected room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub display_name: String,
    pub is_local: bool,
    pub audio_track: Option<TrackHandle>,
    pub video_track: Option<TrackHandle>,
    pub audio_enabled: bool,
    pub video_enabled: bool,
}

/// Parameters for joining a room
#[derive(Debug, Clone)]
pub struct JoinOptions {
    pub room_id: String,
    pub token: String,
    pub display_name: String,
    pub initial_audio_enabled: bool,
    pub initial_video_enabled: bool,
}

/// Connection status as reported by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connected,
    Reconnecting,
    Disconnected,
}

/// Events pushed by the transport while a room is joined
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    ConnectionChanged(ConnectionStatus),
    ParticipantJoined(Participant),
    ParticipantUpdated(Participant),
    ParticipantLeft { participant_id: String },
    /// Broadcast text from a remote participant
    Message {
        sender_id: String,
        sender_name: String,
        content: String,
    },
}

/// Real-time media session transport
///
/// Implementations:
/// - NATS: presence, device state and chat over room-scoped subjects
/// - Tests: scripted in-memory transport
///
/// Only the session lifecycle manager calls `join`/`leave`.
#[async_trait::async_trait]
pub trait MediaTransport: Send + Sync {
    /// Join a room, returning the local participant
    async fn join(&self, options: JoinOptions) -> Result<Participant>;

    /// Leave the joined room
    async fn leave(&self) -> Result<()>;

    async fn set_local_audio_enabled(&self, enabled: bool) -> Result<()>;

    async fn set_local_video_enabled(&self, enabled: bool) -> Result<()>;

    /// Broadcast a text message to every participant in the room
    async fn send_broadcast_message(&self, text: &str) -> Result<()>;

    /// Register for transport events
    ///
    /// Dropping the receiver unregisters it.
    fn subscribe(&self) -> broadcast::Receiver<TransportEvent>;

    /// Get transport name for logging
    fn name(&self) -> &str;
}
