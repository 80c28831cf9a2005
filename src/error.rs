//! Interview room error types.
//!
//! Every failure the room can surface to the hosting view is one of these
//! variants. Transport and network errors are converted at the call site so
//! nothing escapes as an unhandled failure.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, InterviewError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterviewError {
    /// Setup form is incomplete (no topic or blank free text).
    #[error("Invalid interview parameters: {0}")]
    InvalidParams(String),

    /// Room credential request failed.
    #[error("Room provisioning failed: {0}")]
    Provisioning(String),

    /// Transport could not connect (expired token, network).
    #[error("Could not join the room: {0}")]
    Join(String),

    #[error("Question service failed: {0}")]
    QuestionService(String),

    /// Question service answered with an empty list.
    #[error("No questions were generated for this interview")]
    NoQuestions,

    #[error("Scoring failed: {0}")]
    Scoring(String),

    /// Mute/unmute failed. Never fatal.
    #[error("Device control failed: {0}")]
    Device(String),

    #[error("Chat message could not be sent: {0}")]
    ChatSend(String),

    /// Operation not allowed in the current lifecycle phase.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Room credential for {0} was already used")]
    CredentialConsumed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl InterviewError {
    /// HTTP status used by the control API.
    pub fn status_code(&self) -> StatusCode {
        match self {
            InterviewError::InvalidParams(_) => StatusCode::BAD_REQUEST,
            InterviewError::InvalidState(_) | InterviewError::CredentialConsumed(_) => {
                StatusCode::CONFLICT
            }
            InterviewError::NoQuestions => StatusCode::UNPROCESSABLE_ENTITY,
            InterviewError::Provisioning(_)
            | InterviewError::Join(_)
            | InterviewError::QuestionService(_)
            | InterviewError::Scoring(_)
            | InterviewError::Device(_)
            | InterviewError::ChatSend(_) => StatusCode::BAD_GATEWAY,
            InterviewError::Config(_) | InterviewError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for InterviewError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
