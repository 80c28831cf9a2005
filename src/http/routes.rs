use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Setup and session lifecycle
        .route("/rooms", post(handlers::open_room))
        .route("/session", get(handlers::get_session))
        .route("/session/close", post(handlers::close_session))
        // Device control
        .route("/devices/audio/toggle", post(handlers::toggle_audio))
        .route("/devices/video/toggle", post(handlers::toggle_video))
        // Chat
        .route("/chat", get(handlers::get_chat).post(handlers::send_chat))
        // Q&A flow
        .route("/interview", get(handlers::get_interview))
        .route("/interview/start", post(handlers::start_interview))
        .route("/interview/answer", post(handlers::submit_answer))
        .route("/interview/score/retry", post(handlers::retry_scoring))
        // The UI shell is served from another origin
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
