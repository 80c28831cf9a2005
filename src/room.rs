//! Interview room: setup, session, devices, chat and the Q&A flow wired together.
//!
//! The hosting view calls `open()` and `close()`; both are safe to repeat.
//! Session and flow calls run on spawned tasks so a caller that goes away
//! mid-call (a dropped HTTP request, a closed view) cannot strand a guard.

use crate::backend::{AnswerScorer, BackendClient, QuestionSource, RoomProvisioner};
use crate::chat::ChatChannel;
use crate::config::ParticipantConfig;
use crate::error::{InterviewError, Result};
use crate::interview::{FlowSnapshot, InterviewFlow};
use crate::session::{DeviceControl, SessionManager, SessionState};
use crate::setup::{InterviewParams, RoomCredential, RoomSetup};
use crate::transport::MediaTransport;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinError;
use tracing::{error, info, warn};

pub struct InterviewRoom {
    setup: RoomSetup,
    session: Arc<SessionManager>,
    devices: DeviceControl,
    chat: ChatChannel,
    flow: Arc<InterviewFlow>,
    /// Parameters of the currently open room, reused for the question fetch
    params: Mutex<Option<InterviewParams>>,
    /// Set while an `open()` is between its state check and its join
    opening: AtomicBool,
}

/// Clears the `opening` flag on every exit from `open()`
struct OpeningGuard<'a>(&'a AtomicBool);

impl Drop for OpeningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl InterviewRoom {
    pub fn new(
        transport: Arc<dyn MediaTransport>,
        provisioner: Arc<dyn RoomProvisioner>,
        questions: Arc<dyn QuestionSource>,
        scorer: Arc<dyn AnswerScorer>,
        participant: ParticipantConfig,
    ) -> Self {
        let session = Arc::new(SessionManager::new(transport, participant));

        Self {
            setup: RoomSetup::new(provisioner),
            devices: DeviceControl::new(Arc::clone(&session)),
            chat: ChatChannel::new(Arc::clone(&session)),
            session,
            flow: Arc::new(InterviewFlow::new(questions, scorer)),
            params: Mutex::new(None),
            opening: AtomicBool::new(false),
        }
    }

    /// Wire every backend collaborator to one HTTP client
    pub fn with_backend(
        transport: Arc<dyn MediaTransport>,
        backend: BackendClient,
        participant: ParticipantConfig,
    ) -> Self {
        let backend = Arc::new(backend);
        Self::new(
            transport,
            backend.clone(),
            backend.clone(),
            backend,
            participant,
        )
    }

    /// Request a room for `params` and join it.
    ///
    /// A provisioning failure leaves the room in setup so the form can be
    /// corrected. A join failure leaves the session `Failed` until `close()`
    /// or another `open()`.
    ///
    /// Only one `open()` runs at a time; an overlapping call is rejected with
    /// `InvalidState` before it provisions anything.
    pub async fn open(&self, params: &InterviewParams) -> Result<RoomCredential> {
        if self.opening.swap(true, Ordering::SeqCst) {
            warn!("Rejected open: another room is being opened");
            return Err(InterviewError::InvalidState(
                "a room is already being opened".to_string(),
            ));
        }
        let _opening = OpeningGuard(&self.opening);

        let state = self.session.state();
        if !matches!(state, SessionState::Idle | SessionState::Failed) {
            return Err(InterviewError::InvalidState(format!(
                "a session is already {}",
                state
            )));
        }

        let credential = self.setup.request_room(params).await?;

        self.flow.reset()?;
        *self.params.lock().unwrap_or_else(PoisonError::into_inner) = Some(params.validated()?);

        self.join(credential.clone()).await?;
        Ok(credential)
    }

    /// Join with an already issued credential
    pub async fn join(&self, credential: RoomCredential) -> Result<()> {
        let session = Arc::clone(&self.session);
        detached(async move { session.start_session(credential).await }).await
    }

    /// Leave the session. Always completes, whatever is in flight.
    pub async fn close(&self) {
        let session = Arc::clone(&self.session);
        let closed = tokio::spawn(async move { session.end_session().await }).await;
        if let Err(e) = closed {
            error!("Session teardown task failed: {}", e);
        }
        info!("Interview room closed");
    }

    /// Fetch questions for the open room and present the first one
    pub async fn start_interview(&self) -> Result<FlowSnapshot> {
        let params = self
            .params
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| InterviewError::InvalidState("no room has been set up".to_string()))?;

        let flow = Arc::clone(&self.flow);
        detached(async move { flow.start(&params).await }).await
    }

    pub async fn submit_answer(&self, text: String) -> Result<FlowSnapshot> {
        let flow = Arc::clone(&self.flow);
        detached(async move { flow.submit_answer(&text).await }).await
    }

    pub async fn retry_scoring(&self) -> Result<FlowSnapshot> {
        let flow = Arc::clone(&self.flow);
        detached(async move { flow.retry_scoring().await }).await
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn devices(&self) -> &DeviceControl {
        &self.devices
    }

    pub fn chat(&self) -> &ChatChannel {
        &self.chat
    }

    pub fn flow(&self) -> &InterviewFlow {
        &self.flow
    }
}

/// Run `fut` on its own task so it completes even if the caller is dropped
async fn detached<T, F>(fut: F) -> Result<T>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(fut).await.map_err(task_failed)?
}

fn task_failed(e: JoinError) -> InterviewError {
    error!("Interview task failed: {}", e);
    InterviewError::Internal("interview task failed".to_string())
}
