use crate::transport::{ConnectionStatus, Participant};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Lifecycle of the media session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Joining,
    Connected,
    Leaving,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "idle",
            SessionState::Joining => "joining",
            SessionState::Connected => "connected",
            SessionState::Leaving => "leaving",
            SessionState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Local microphone and camera flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceState {
    pub audio_enabled: bool,
    pub video_enabled: bool,
}

/// Everything an observer of the session can see, pushed on every change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub room_id: Option<String>,
    /// Keyed by participant id
    pub participants: BTreeMap<String, Participant>,
    pub devices: DeviceState,
    /// Last status reported by the transport
    pub connection: Option<ConnectionStatus>,
    /// User-facing message for the last join failure
    pub last_error: Option<String>,
}

impl SessionSnapshot {
    pub fn new(devices: DeviceState) -> Self {
        Self {
            state: SessionState::Idle,
            room_id: None,
            participants: BTreeMap::new(),
            devices,
            connection: None,
            last_error: None,
        }
    }

    pub fn local_participant(&self) -> Option<&Participant> {
        self.participants.values().find(|p| p.is_local)
    }

    pub fn remote_participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values().filter(|p| !p.is_local)
    }
}

/// Idempotency guards of the lifecycle, exposed for inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LifecycleGuards {
    pub join_in_flight: bool,
    pub leave_in_flight: bool,
    /// Teardown arrived while joining; leave runs as soon as the join settles
    pub leave_requested: bool,
}
