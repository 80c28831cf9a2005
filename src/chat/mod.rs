//! Text side-channel over the transport's broadcast primitive.

use crate::error::{InterviewError, Result};
use crate::session::{SessionManager, SessionState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

const CHAT_CHANNEL_CAPACITY: usize = 128;

/// A chat line, as observed locally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Display name of the author
    pub sender: String,
    /// Whether the local participant wrote it
    pub from_self: bool,
    pub content: String,
    /// Local send or receive time
    pub sent_at: DateTime<Utc>,
}

/// Append-only message log, ordered by local observation
#[derive(Clone)]
pub struct ChatLog {
    messages: Arc<Mutex<Vec<ChatMessage>>>,
    appended: broadcast::Sender<ChatMessage>,
}

impl ChatLog {
    pub fn new() -> Self {
        let (appended, _) = broadcast::channel(CHAT_CHANNEL_CAPACITY);
        Self {
            messages: Arc::new(Mutex::new(Vec::new())),
            appended,
        }
    }

    pub async fn push(&self, message: ChatMessage) {
        {
            let mut messages = self.messages.lock().await;
            messages.push(message.clone());
        }
        let _ = self.appended.send(message);
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        let messages = self.messages.lock().await;
        messages.clone()
    }

    pub async fn clear(&self) {
        self.messages.lock().await.clear();
    }

    /// Receive every message appended from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ChatMessage> {
        self.appended.subscribe()
    }
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Chat over the connected session
///
/// Incoming messages are appended by the session's event pump; this type only
/// sends and reads.
pub struct ChatChannel {
    manager: Arc<SessionManager>,
}

impl ChatChannel {
    pub fn new(manager: Arc<SessionManager>) -> Self {
        Self { manager }
    }

    /// Broadcast `text` and append it as self-authored.
    ///
    /// Returns `Ok(None)` without sending when the text is blank or the session
    /// is not connected. Delivery is best-effort and at most once.
    pub async fn send(&self, text: &str) -> Result<Option<ChatMessage>> {
        let content = text.trim();
        if content.is_empty() {
            debug!("Ignoring empty chat message");
            return Ok(None);
        }

        let state = self.manager.state();
        if state != SessionState::Connected {
            debug!("Ignoring chat message while {}", state);
            return Ok(None);
        }

        self.manager
            .transport()
            .send_broadcast_message(content)
            .await
            .map_err(|e| {
                warn!("Failed to broadcast chat message: {:#}", e);
                InterviewError::ChatSend(format!("{:#}", e))
            })?;

        let message = ChatMessage {
            sender: self.manager.display_name().to_string(),
            from_self: true,
            content: content.to_string(),
            sent_at: Utc::now(),
        };
        self.manager.chat_log().push(message.clone()).await;

        info!("Chat message sent ({} chars)", content.len());

        Ok(Some(message))
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.manager.chat_log().messages().await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatMessage> {
        self.manager.chat_log().subscribe()
    }
}
