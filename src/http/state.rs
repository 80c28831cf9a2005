use crate::room::InterviewRoom;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The one interview room this process drives
    pub room: Arc<InterviewRoom>,
}

impl AppState {
    pub fn new(room: Arc<InterviewRoom>) -> Self {
        Self { room }
    }
}
