use super::messages::RoomGrant;
use crate::error::Result;
use crate::setup::InterviewParams;

/// Room Provisioning endpoint
#[async_trait::async_trait]
pub trait RoomProvisioner: Send + Sync {
    async fn provision_room(&self, params: &InterviewParams) -> Result<RoomGrant>;
}

/// Interview Question Service
#[async_trait::async_trait]
pub trait QuestionSource: Send + Sync {
    /// Ordered question list for the topic and difficulty
    async fn fetch_questions(&self, params: &InterviewParams) -> Result<Vec<String>>;
}

/// Answer Scoring Service
#[async_trait::async_trait]
pub trait AnswerScorer: Send + Sync {
    /// Analysis text for the full question/answer lists
    async fn score_answers(&self, questions: &[String], answers: &[String]) -> Result<String>;
}
