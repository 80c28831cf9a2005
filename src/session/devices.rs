use super::manager::SessionManager;
use super::state::SessionState;
use crate::transport::TrackKind;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Local microphone and camera control
///
/// Toggles only act on a connected session. Failures are never fatal: the
/// flag stays at its last known good value.
pub struct DeviceControl {
    manager: Arc<SessionManager>,
}

impl DeviceControl {
    pub fn new(manager: Arc<SessionManager>) -> Self {
        Self { manager }
    }

    /// Flip the microphone. Returns the resulting flag.
    pub async fn toggle_audio(&self) -> bool {
        self.toggle(TrackKind::Audio).await
    }

    /// Flip the camera. Returns the resulting flag.
    pub async fn toggle_video(&self) -> bool {
        self.toggle(TrackKind::Video).await
    }

    async fn toggle(&self, kind: TrackKind) -> bool {
        // Read, flip and record under the per-track lock so presses apply in turn
        let _toggling = self.manager.toggle_lock(kind).lock().await;

        let devices = self.manager.devices();
        let current = match kind {
            TrackKind::Audio => devices.audio_enabled,
            TrackKind::Video => devices.video_enabled,
        };

        let state = self.manager.state();
        if state != SessionState::Connected {
            debug!("Ignoring {:?} toggle while {}", kind, state);
            return current;
        }

        let target = !current;
        let transport = self.manager.transport();
        let result = match kind {
            TrackKind::Audio => transport.set_local_audio_enabled(target).await,
            TrackKind::Video => transport.set_local_video_enabled(target).await,
        };

        match result {
            Ok(()) => {
                self.manager.record_device(kind, target);
                info!("{:?} {}", kind, if target { "enabled" } else { "disabled" });
                target
            }
            Err(e) => {
                warn!("{:?} toggle failed, keeping {}: {:#}", kind, current, e);
                current
            }
        }
    }
}
