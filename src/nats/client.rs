use super::messages::{
    chat_subject, presence_subject, ChatWireMessage, PresenceKind, PresenceMessage,
};
use crate::transport::{
    ConnectionStatus, JoinOptions, MediaTransport, Participant, TrackHandle, TrackKind,
    TransportEvent,
};
use anyhow::{bail, Context, Result};
use async_nats::{Client, Subscriber};
use futures::stream::StreamExt;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// State held while a room is joined
struct JoinedRoom {
    client: Client,
    room_id: String,
    local: Arc<Mutex<Participant>>,
    listeners: Vec<JoinHandle<()>>,
}

/// Media session transport backed by NATS
///
/// Presence and device state are published on the room's presence subject,
/// chat on the room's chat subject. Media tracks are exposed as handles only.
pub struct NatsTransport {
    url: String,
    events: broadcast::Sender<TransportEvent>,
    room: Mutex<Option<JoinedRoom>>,
}

impl NatsTransport {
    pub fn new(url: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            url: url.into(),
            events,
            room: Mutex::new(None),
        }
    }

    /// Forward remote presence to subscribers, answering newcomers with our own presence
    async fn presence_loop(
        mut subscriber: Subscriber,
        client: Client,
        subject: String,
        local: Arc<Mutex<Participant>>,
        events: broadcast::Sender<TransportEvent>,
    ) {
        info!("Presence listener started on {}", subject);

        while let Some(msg) = subscriber.next().await {
            let presence = match serde_json::from_slice::<PresenceMessage>(&msg.payload) {
                Ok(p) => p,
                Err(e) => {
                    warn!("Failed to parse presence message: {}", e);
                    continue;
                }
            };

            let me = local.lock().await.clone();
            if presence.participant_id == me.id {
                continue;
            }

            debug!(
                "Presence {:?} from {} ({})",
                presence.kind, presence.display_name, presence.participant_id
            );

            let event = match presence.kind {
                PresenceKind::Joined => {
                    if let Err(e) =
                        publish_presence(&client, &subject, &me, PresenceKind::Updated).await
                    {
                        warn!("Failed to announce presence to newcomer: {}", e);
                    }
                    TransportEvent::ParticipantJoined(remote_participant(&presence))
                }
                PresenceKind::Updated => {
                    TransportEvent::ParticipantUpdated(remote_participant(&presence))
                }
                PresenceKind::Left => TransportEvent::ParticipantLeft {
                    participant_id: presence.participant_id,
                },
            };

            // No receivers is fine: nobody is observing right now
            let _ = events.send(event);
        }

        info!("Presence listener stopped");
    }

    async fn chat_loop(
        mut subscriber: Subscriber,
        local_id: String,
        events: broadcast::Sender<TransportEvent>,
    ) {
        info!("Chat listener started");

        while let Some(msg) = subscriber.next().await {
            match serde_json::from_slice::<ChatWireMessage>(&msg.payload) {
                Ok(chat) => {
                    if chat.participant_id == local_id {
                        continue;
                    }
                    let _ = events.send(TransportEvent::Message {
                        sender_id: chat.participant_id,
                        sender_name: chat.display_name,
                        content: chat.content,
                    });
                }
                Err(e) => {
                    warn!("Failed to parse chat message: {}", e);
                }
            }
        }

        info!("Chat listener stopped");
    }

    async fn set_local_flag(&self, kind: TrackKind, enabled: bool) -> Result<()> {
        let room = self.room.lock().await;
        let Some(joined) = room.as_ref() else {
            bail!("Not joined to a room");
        };

        let me = {
            let mut local = joined.local.lock().await;
            match kind {
                TrackKind::Audio => local.audio_enabled = enabled,
                TrackKind::Video => local.video_enabled = enabled,
            }
            local.clone()
        };

        publish_presence(
            &joined.client,
            &presence_subject(&joined.room_id),
            &me,
            PresenceKind::Updated,
        )
        .await
    }
}

#[async_trait::async_trait]
impl MediaTransport for NatsTransport {
    async fn join(&self, options: JoinOptions) -> Result<Participant> {
        let mut room = self.room.lock().await;
        if room.is_some() {
            bail!("Already joined a room");
        }

        info!("Connecting to NATS at {} for room {}", self.url, options.room_id);

        let client = async_nats::ConnectOptions::new()
            .token(options.token.clone())
            .connect(self.url.as_str())
            .await
            .context("Failed to connect to NATS")?;

        let participant_id = uuid::Uuid::new_v4().to_string();
        let local = Participant {
            audio_track: Some(TrackHandle::for_participant(&participant_id, TrackKind::Audio)),
            video_track: Some(TrackHandle::for_participant(&participant_id, TrackKind::Video)),
            id: participant_id.clone(),
            display_name: options.display_name.clone(),
            is_local: true,
            audio_enabled: options.initial_audio_enabled,
            video_enabled: options.initial_video_enabled,
        };

        let presence = presence_subject(&options.room_id);
        let presence_sub = client
            .subscribe(presence.clone())
            .await
            .context("Failed to subscribe to presence")?;
        let chat_sub = client
            .subscribe(chat_subject(&options.room_id))
            .await
            .context("Failed to subscribe to chat")?;

        let shared_local = Arc::new(Mutex::new(local.clone()));
        let listeners = vec![
            tokio::spawn(Self::presence_loop(
                presence_sub,
                client.clone(),
                presence.clone(),
                Arc::clone(&shared_local),
                self.events.clone(),
            )),
            tokio::spawn(Self::chat_loop(
                chat_sub,
                participant_id,
                self.events.clone(),
            )),
        ];

        if let Err(e) = publish_presence(&client, &presence, &local, PresenceKind::Joined).await {
            for task in &listeners {
                task.abort();
            }
            return Err(e);
        }

        *room = Some(JoinedRoom {
            client,
            room_id: options.room_id.clone(),
            local: shared_local,
            listeners,
        });

        let _ = self
            .events
            .send(TransportEvent::ConnectionChanged(ConnectionStatus::Connected));

        info!("Joined room {} as {}", options.room_id, local.display_name);

        Ok(local)
    }

    async fn leave(&self) -> Result<()> {
        let Some(joined) = self.room.lock().await.take() else {
            warn!("Leave requested without a joined room");
            return Ok(());
        };

        info!("Leaving room {}", joined.room_id);

        let me = joined.local.lock().await.clone();
        let result = publish_presence(
            &joined.client,
            &presence_subject(&joined.room_id),
            &me,
            PresenceKind::Left,
        )
        .await;

        if let Err(e) = joined.client.flush().await {
            warn!("Failed to flush NATS connection: {}", e);
        }

        for task in joined.listeners {
            task.abort();
        }

        let _ = self
            .events
            .send(TransportEvent::ConnectionChanged(ConnectionStatus::Disconnected));

        result
    }

    async fn set_local_audio_enabled(&self, enabled: bool) -> Result<()> {
        self.set_local_flag(TrackKind::Audio, enabled).await
    }

    async fn set_local_video_enabled(&self, enabled: bool) -> Result<()> {
        self.set_local_flag(TrackKind::Video, enabled).await
    }

    async fn send_broadcast_message(&self, text: &str) -> Result<()> {
        let room = self.room.lock().await;
        let Some(joined) = room.as_ref() else {
            bail!("Not joined to a room");
        };

        let me = joined.local.lock().await.clone();
        let message = ChatWireMessage {
            participant_id: me.id,
            display_name: me.display_name,
            content: text.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let payload = serde_json::to_vec(&message)?;

        joined
            .client
            .publish(chat_subject(&joined.room_id), payload.into())
            .await
            .context("Failed to publish chat message")?;

        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.events.subscribe()
    }

    fn name(&self) -> &str {
        "nats"
    }
}

async fn publish_presence(
    client: &Client,
    subject: &str,
    participant: &Participant,
    kind: PresenceKind,
) -> Result<()> {
    let message = PresenceMessage {
        participant_id: participant.id.clone(),
        display_name: participant.display_name.clone(),
        kind,
        audio_enabled: participant.audio_enabled,
        video_enabled: participant.video_enabled,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    let payload = serde_json::to_vec(&message)?;

    client
        .publish(subject.to_string(), payload.into())
        .await
        .context("Failed to publish presence")?;

    Ok(())
}

/// Build the view of a remote participant from its presence message
pub fn remote_participant(presence: &PresenceMessage) -> Participant {
    Participant {
        id: presence.participant_id.clone(),
        display_name: presence.display_name.clone(),
        is_local: false,
        audio_track: Some(TrackHandle::for_participant(
            &presence.participant_id,
            TrackKind::Audio,
        )),
        video_track: Some(TrackHandle::for_participant(
            &presence.participant_id,
            TrackKind::Video,
        )),
        audio_enabled: presence.audio_enabled,
        video_enabled: presence.video_enabled,
    }
}
