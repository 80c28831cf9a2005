use super::state::{DeviceState, LifecycleGuards, SessionSnapshot, SessionState};
use crate::chat::{ChatLog, ChatMessage};
use crate::config::ParticipantConfig;
use crate::error::{InterviewError, Result};
use crate::setup::RoomCredential;
use crate::transport::{JoinOptions, MediaTransport, Participant, TrackKind, TransportEvent};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Lifecycle record. Guards live here next to the state they protect.
///
/// Only touched under `SessionManager::lifecycle`, never across an await.
#[derive(Default)]
struct Lifecycle {
    state: SessionState,
    guards: LifecycleGuards,
    /// Tokens that already produced a successful join
    consumed_tokens: HashSet<String>,
    /// Transport event subscription, live while connected
    pump: Option<JoinHandle<()>>,
}

/// What `start_session` must do once the join settled
enum AfterJoin {
    Connected,
    LeaveNow,
}

/// Owns the media session: joins and leaves the transport exactly once per session
pub struct SessionManager {
    transport: Arc<dyn MediaTransport>,
    participant: ParticipantConfig,
    lifecycle: Mutex<Lifecycle>,
    snapshot: Arc<watch::Sender<SessionSnapshot>>,
    chat: ChatLog,
    /// Held across a device toggle so overlapping presses flip in turn
    audio_toggle: AsyncMutex<()>,
    video_toggle: AsyncMutex<()>,
}

impl SessionManager {
    pub fn new(transport: Arc<dyn MediaTransport>, participant: ParticipantConfig) -> Self {
        let devices = DeviceState {
            audio_enabled: participant.start_with_audio,
            video_enabled: participant.start_with_video,
        };
        let (snapshot, _) = watch::channel(SessionSnapshot::new(devices));

        Self {
            transport,
            participant,
            lifecycle: Mutex::new(Lifecycle::default()),
            snapshot: Arc::new(snapshot),
            chat: ChatLog::new(),
            audio_toggle: AsyncMutex::new(()),
            video_toggle: AsyncMutex::new(()),
        }
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, lifecycle: &mut Lifecycle, to: SessionState) {
        let from = lifecycle.state;
        lifecycle.state = to;
        self.snapshot.send_modify(|s| s.state = to);
        info!("Session state {} -> {}", from, to);
    }

    /// Join the room the credential authorises.
    ///
    /// Requires `Idle` (or `Failed`, for a manual retry) with no join in flight.
    /// If `end_session` is called while joining, the session is left as soon as
    /// the join succeeds and this returns `Ok(())` in `Idle`.
    pub async fn start_session(&self, credential: RoomCredential) -> Result<()> {
        {
            let mut lc = self.lifecycle();

            if lc.guards.join_in_flight {
                warn!("Join already in flight for room {}", credential.room_id);
                return Err(InterviewError::InvalidState(
                    "a join is already in flight".to_string(),
                ));
            }
            if !matches!(lc.state, SessionState::Idle | SessionState::Failed) {
                warn!("Cannot start session while {}", lc.state);
                return Err(InterviewError::InvalidState(format!(
                    "cannot start a session while {}",
                    lc.state
                )));
            }
            if lc.consumed_tokens.contains(&credential.auth_token) {
                return Err(InterviewError::CredentialConsumed(credential.room_id));
            }

            lc.guards.join_in_flight = true;
            lc.guards.leave_requested = false;
            self.snapshot.send_modify(|s| {
                s.room_id = Some(credential.room_id.clone());
                s.last_error = None;
            });
            self.transition(&mut lc, SessionState::Joining);
        }

        self.chat.clear().await;

        info!(
            "Joining room {} via {} as {}",
            credential.room_id,
            self.transport.name(),
            self.participant.display_name
        );

        // Subscribe before joining so no event between join and pump start is lost
        let events = self.transport.subscribe();
        let options = JoinOptions {
            room_id: credential.room_id.clone(),
            token: credential.auth_token.clone(),
            display_name: self.participant.display_name.clone(),
            initial_audio_enabled: self.participant.start_with_audio,
            initial_video_enabled: self.participant.start_with_video,
        };

        let joined = self.transport.join(options).await;

        let next = {
            let mut lc = self.lifecycle();
            lc.guards.join_in_flight = false;
            let leave_requested = std::mem::take(&mut lc.guards.leave_requested);

            match joined {
                Ok(local) => {
                    lc.consumed_tokens.insert(credential.auth_token.clone());

                    if leave_requested {
                        // Straight to Leaving: a teardown waiter must never see Connected here
                        self.begin_leave(&mut lc);
                        AfterJoin::LeaveNow
                    } else {
                        lc.pump = Some(tokio::spawn(pump_events(
                            events,
                            Arc::clone(&self.snapshot),
                            self.chat.clone(),
                        )));
                        self.snapshot.send_modify(|s| {
                            s.devices = DeviceState {
                                audio_enabled: local.audio_enabled,
                                video_enabled: local.video_enabled,
                            };
                            s.participants.insert(local.id.clone(), local);
                        });
                        self.transition(&mut lc, SessionState::Connected);
                        AfterJoin::Connected
                    }
                }
                Err(e) => {
                    let message = format!("{:#}", e);
                    error!("Failed to join room {}: {}", credential.room_id, message);

                    if leave_requested {
                        self.snapshot.send_modify(|s| s.room_id = None);
                        self.transition(&mut lc, SessionState::Idle);
                    } else {
                        self.snapshot
                            .send_modify(|s| s.last_error = Some(message.clone()));
                        self.transition(&mut lc, SessionState::Failed);
                    }
                    return Err(InterviewError::Join(message));
                }
            }
        };

        match next {
            AfterJoin::Connected => {
                info!("Connected to room {}", credential.room_id);
            }
            AfterJoin::LeaveNow => {
                info!("Teardown was requested while joining; leaving now");
                self.finish_leave().await;
            }
        }

        Ok(())
    }

    /// Tear the session down. Safe to call any number of times from any state.
    ///
    /// Leave failures are logged and swallowed; the session always ends `Idle`.
    pub async fn end_session(&self) {
        let wait_for_join = {
            let mut lc = self.lifecycle();

            if lc.guards.leave_in_flight {
                debug!("Leave already in flight");
                return;
            }

            match lc.state {
                SessionState::Idle => return,
                SessionState::Failed => {
                    self.snapshot.send_modify(|s| s.room_id = None);
                    self.transition(&mut lc, SessionState::Idle);
                    return;
                }
                SessionState::Joining => {
                    lc.guards.leave_requested = true;
                    true
                }
                SessionState::Connected => {
                    self.begin_leave(&mut lc);
                    false
                }
                SessionState::Leaving => return,
            }
        };

        if wait_for_join {
            info!("Teardown requested while joining; waiting for the join to settle");
            let mut rx = self.snapshot.subscribe();
            if rx
                .wait_for(|s| !matches!(s.state, SessionState::Joining | SessionState::Leaving))
                .await
                .is_err()
            {
                warn!("Session snapshot closed while waiting for join");
            }
            return;
        }

        self.finish_leave().await;
    }

    /// Enter `Leaving`: mark the guard and drop the event subscription
    fn begin_leave(&self, lc: &mut Lifecycle) {
        lc.guards.leave_in_flight = true;
        if let Some(pump) = lc.pump.take() {
            pump.abort();
        }
        self.transition(lc, SessionState::Leaving);
    }

    async fn finish_leave(&self) {
        if let Err(e) = self.transport.leave().await {
            warn!("Leave failed, continuing teardown: {:#}", e);
        }

        let mut lc = self.lifecycle();
        lc.guards.leave_in_flight = false;
        let initial = self.initial_devices();
        self.snapshot.send_modify(|s| {
            s.participants.clear();
            s.room_id = None;
            s.connection = None;
            s.devices = initial;
        });
        self.transition(&mut lc, SessionState::Idle);
    }

    fn initial_devices(&self) -> DeviceState {
        DeviceState {
            audio_enabled: self.participant.start_with_audio,
            video_enabled: self.participant.start_with_video,
        }
    }

    /// Record a device flag the transport accepted
    pub(crate) fn record_device(&self, kind: TrackKind, enabled: bool) {
        self.snapshot.send_modify(|s| {
            match kind {
                TrackKind::Audio => s.devices.audio_enabled = enabled,
                TrackKind::Video => s.devices.video_enabled = enabled,
            }
            if let Some(local) = s.participants.values_mut().find(|p| p.is_local) {
                match kind {
                    TrackKind::Audio => local.audio_enabled = enabled,
                    TrackKind::Video => local.video_enabled = enabled,
                }
            }
        });
    }

    pub fn state(&self) -> SessionState {
        self.lifecycle().state
    }

    pub fn guards(&self) -> LifecycleGuards {
        self.lifecycle().guards
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Local participant first, then remotes by id
    pub fn participants(&self) -> Vec<Participant> {
        let snapshot = self.snapshot.borrow();
        snapshot
            .local_participant()
            .into_iter()
            .chain(snapshot.remote_participants())
            .cloned()
            .collect()
    }

    pub fn devices(&self) -> DeviceState {
        self.snapshot.borrow().devices
    }

    /// Receive every change of state, participants and device flags
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn display_name(&self) -> &str {
        &self.participant.display_name
    }

    pub(crate) fn transport(&self) -> &Arc<dyn MediaTransport> {
        &self.transport
    }

    pub(crate) fn toggle_lock(&self, kind: TrackKind) -> &AsyncMutex<()> {
        match kind {
            TrackKind::Audio => &self.audio_toggle,
            TrackKind::Video => &self.video_toggle,
        }
    }

    pub(crate) fn chat_log(&self) -> &ChatLog {
        &self.chat
    }
}

/// Apply transport events to the snapshot and chat log until unsubscribed
async fn pump_events(
    mut events: broadcast::Receiver<TransportEvent>,
    snapshot: Arc<watch::Sender<SessionSnapshot>>,
    chat: ChatLog,
) {
    debug!("Transport event pump started");

    loop {
        match events.recv().await {
            Ok(event) => apply_event(&snapshot, &chat, event).await,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Dropped {} transport events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }

    debug!("Transport event pump stopped");
}

async fn apply_event(
    snapshot: &watch::Sender<SessionSnapshot>,
    chat: &ChatLog,
    event: TransportEvent,
) {
    match event {
        TransportEvent::ConnectionChanged(status) => {
            debug!("Transport connection: {:?}", status);
            snapshot.send_modify(|s| s.connection = Some(status));
        }
        TransportEvent::ParticipantJoined(participant)
        | TransportEvent::ParticipantUpdated(participant) => {
            debug!("Participant {} ({})", participant.display_name, participant.id);
            snapshot.send_modify(|s| {
                if participant.is_local {
                    s.devices = DeviceState {
                        audio_enabled: participant.audio_enabled,
                        video_enabled: participant.video_enabled,
                    };
                }
                s.participants.insert(participant.id.clone(), participant);
            });
        }
        TransportEvent::ParticipantLeft { participant_id } => {
            debug!("Participant {} left", participant_id);
            snapshot.send_modify(|s| {
                if s.participants.get(&participant_id).is_some_and(|p| !p.is_local) {
                    s.participants.remove(&participant_id);
                }
            });
        }
        TransportEvent::Message {
            sender_id,
            sender_name,
            content,
        } => {
            debug!("Chat message from {}", sender_id);
            chat.push(ChatMessage {
                sender: sender_name,
                from_self: false,
                content,
                sent_at: Utc::now(),
            })
            .await;
        }
    }
}
