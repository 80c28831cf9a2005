//! External interview backend: room provisioning, questions and scoring.

pub mod client;
pub mod messages;
pub mod services;

pub use client::BackendClient;
pub use messages::{RoomGrant, ServiceReply};
pub use services::{AnswerScorer, QuestionSource, RoomProvisioner};
