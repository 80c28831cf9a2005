//! HTTP control API for the hosting view
//!
//! This module exposes the interview room over REST:
//! - POST /rooms - Provision a room and join it
//! - POST /session/close - Leave the session
//! - GET /session - Session state, participants and devices
//! - POST /devices/{audio,video}/toggle - Mute or unmute
//! - GET|POST /chat - Read or send chat
//! - POST /interview/start - Fetch questions
//! - GET /interview - Q&A progress
//! - POST /interview/answer - Answer the open question
//! - POST /interview/score/retry - Retry a failed scoring call
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
