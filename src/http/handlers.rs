use super::state::AppState;
use crate::chat::ChatMessage;
use crate::error::InterviewError;
use crate::interview::FlowSnapshot;
use crate::session::{DeviceState, SessionSnapshot, SessionState};
use crate::setup::{Difficulty, InterviewParams};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::info;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct OpenRoomRequest {
    /// Preset language or free-text topic
    pub language_or_topic: String,
    pub difficulty: Difficulty,
}

#[derive(Debug, Serialize)]
pub struct OpenRoomResponse {
    pub room_id: String,
    pub state: SessionState,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// False when the message was ignored (blank text or no live session)
    pub sent: bool,
    pub message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    /// May be empty; scoring handles incomplete answers
    #[serde(default)]
    pub text: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /rooms
/// Provision a room and join it
pub async fn open_room(
    State(state): State<AppState>,
    Json(req): Json<OpenRoomRequest>,
) -> Result<Json<OpenRoomResponse>, InterviewError> {
    let params = InterviewParams::new(req.language_or_topic, req.difficulty);
    let credential = state.room.open(&params).await?;

    info!("Room {} opened", credential.room_id);

    Ok(Json(OpenRoomResponse {
        room_id: credential.room_id,
        state: state.room.session().state(),
    }))
}

/// POST /session/close
/// Leave the session (also the "abandon" action after a failed join)
pub async fn close_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    state.room.close().await;
    Json(state.room.session().snapshot())
}

/// GET /session
pub async fn get_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.room.session().snapshot())
}

/// POST /devices/audio/toggle
pub async fn toggle_audio(State(state): State<AppState>) -> Json<DeviceState> {
    state.room.devices().toggle_audio().await;
    Json(state.room.session().devices())
}

/// POST /devices/video/toggle
pub async fn toggle_video(State(state): State<AppState>) -> Json<DeviceState> {
    state.room.devices().toggle_video().await;
    Json(state.room.session().devices())
}

/// GET /chat
pub async fn get_chat(State(state): State<AppState>) -> Json<Vec<ChatMessage>> {
    Json(state.room.chat().messages().await)
}

/// POST /chat
pub async fn send_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, InterviewError> {
    let message = state.room.chat().send(&req.text).await?;
    Ok(Json(ChatResponse {
        sent: message.is_some(),
        message,
    }))
}

/// POST /interview/start
/// Fetch questions and present the first one
pub async fn start_interview(
    State(state): State<AppState>,
) -> Result<Json<FlowSnapshot>, InterviewError> {
    Ok(Json(state.room.start_interview().await?))
}

/// GET /interview
pub async fn get_interview(State(state): State<AppState>) -> Json<FlowSnapshot> {
    Json(state.room.flow().snapshot())
}

/// POST /interview/answer
pub async fn submit_answer(
    State(state): State<AppState>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<FlowSnapshot>, InterviewError> {
    Ok(Json(state.room.submit_answer(req.text).await?))
}

/// POST /interview/score/retry
/// Resubmit the kept answers after a scoring failure
pub async fn retry_scoring(
    State(state): State<AppState>,
) -> Result<Json<FlowSnapshot>, InterviewError> {
    Ok(Json(state.room.retry_scoring().await?))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
