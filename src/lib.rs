pub mod backend;
pub mod chat;
pub mod config;
pub mod error;
pub mod http;
pub mod interview;
pub mod nats;
pub mod room;
pub mod session;
pub mod setup;
pub mod transport;

pub use backend::{AnswerScorer, BackendClient, QuestionSource, RoomGrant, RoomProvisioner};
pub use chat::{ChatChannel, ChatMessage};
pub use config::Config;
pub use error::{InterviewError, Result};
pub use http::{create_router, AppState};
pub use interview::{Answer, FlowPhase, FlowSnapshot, InterviewFlow};
pub use nats::NatsTransport;
pub use room::InterviewRoom;
pub use session::{DeviceControl, DeviceState, SessionManager, SessionSnapshot, SessionState};
pub use setup::{Difficulty, InterviewParams, RoomCredential, RoomSetup};
pub use transport::{JoinOptions, MediaTransport, Participant, TransportEvent};
