//! Room setup: interview parameters in, room credential out.

mod params;

pub use params::{Difficulty, InterviewParams, PRESET_TOPICS};

use crate::backend::RoomProvisioner;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Short-lived credential authorising one join to one room
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomCredential {
    pub room_id: String,
    #[serde(skip_serializing)]
    pub auth_token: String,
    pub created_at: DateTime<Utc>,
}

impl RoomCredential {
    pub fn new(room_id: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            auth_token: auth_token.into(),
            created_at: Utc::now(),
        }
    }
}

/// Requests room credentials from the provisioning endpoint
pub struct RoomSetup {
    provisioner: Arc<dyn RoomProvisioner>,
}

impl RoomSetup {
    pub fn new(provisioner: Arc<dyn RoomProvisioner>) -> Self {
        Self { provisioner }
    }

    /// Validate the parameters and request a room credential.
    ///
    /// On failure nothing changes, so the caller can correct the form and retry.
    pub async fn request_room(&self, params: &InterviewParams) -> Result<RoomCredential> {
        let params = params.validated()?;

        info!(
            "Requesting room for {} ({})",
            params.language_or_topic, params.difficulty
        );

        let grant = self.provisioner.provision_room(&params).await.map_err(|e| {
            warn!("Room request failed: {}", e);
            e
        })?;

        info!("Room {} provisioned", grant.room_id);

        Ok(RoomCredential::new(grant.room_id, grant.token))
    }
}
