//! HTTP client for the external interview backend.
//!
//! One client serves the three request/response endpoints: room
//! provisioning, question generation and answer scoring. Network failures,
//! `{ "error": ... }` replies and malformed bodies are all converted into the
//! matching `InterviewError` variant here, so callers never see raw
//! transport errors.

use super::messages::{
    InterviewParamsRequest, QuestionsResponse, RoomGrant, ScoringRequest, ScoringResponse,
    ServiceReply,
};
use super::services::{AnswerScorer, QuestionSource, RoomProvisioner};
use crate::config::BackendConfig;
use crate::error::{InterviewError, Result};
use crate::setup::InterviewParams;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, instrument, warn};

#[derive(Clone)]
pub struct BackendClient {
    /// No request timeout: scoring may legitimately take a long time.
    client: Client,
    base_url: String,
    rooms_path: String,
    questions_path: String,
    scoring_path: String,
}

impl BackendClient {
    /// # Errors
    ///
    /// Returns `InterviewError::Config` if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| {
                error!(target: "interview.backend", error = %e, "Failed to build HTTP client");
                InterviewError::Config(format!("HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            rooms_path: config.rooms_path.clone(),
            questions_path: config.questions_path.clone(),
            scoring_path: config.scoring_path.clone(),
        })
    }

    async fn post<B, T>(
        &self,
        path: &str,
        body: &B,
        service: &'static str,
        to_error: fn(String) -> InterviewError,
    ) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);

        let response = self.client.post(&url).json(body).send().await.map_err(|e| {
            warn!(target: "interview.backend", error = %e, service, "Backend request failed");
            to_error(format!("{} is unavailable", service))
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            warn!(target: "interview.backend", error = %e, service, "Failed to read backend response");
            to_error(format!("{} response could not be read", service))
        })?;

        match serde_json::from_slice::<ServiceReply<T>>(&bytes) {
            Ok(ServiceReply::Success(payload)) if status.is_success() => Ok(payload),
            Ok(ServiceReply::Failure { error }) => {
                warn!(target: "interview.backend", status = %status, service, error = %error, "Backend returned error");
                Err(to_error(error))
            }
            Ok(ServiceReply::Success(_)) | Err(_) if !status.is_success() => {
                warn!(target: "interview.backend", status = %status, service, "Unexpected backend status");
                Err(to_error(format!("{} returned {}", service, status)))
            }
            _ => {
                error!(target: "interview.backend", service, "Malformed backend response");
                Err(to_error(format!("{} returned a malformed response", service)))
            }
        }
    }
}

#[async_trait::async_trait]
impl RoomProvisioner for BackendClient {
    #[instrument(skip(self), fields(topic = %params.language_or_topic, difficulty = %params.difficulty))]
    async fn provision_room(&self, params: &InterviewParams) -> Result<RoomGrant> {
        let request = InterviewParamsRequest {
            language_or_topic: params.language_or_topic.clone(),
            difficulty: params.difficulty,
        };
        self.post(
            &self.rooms_path,
            &request,
            "Room service",
            InterviewError::Provisioning,
        )
        .await
    }
}

#[async_trait::async_trait]
impl QuestionSource for BackendClient {
    #[instrument(skip(self), fields(topic = %params.language_or_topic, difficulty = %params.difficulty))]
    async fn fetch_questions(&self, params: &InterviewParams) -> Result<Vec<String>> {
        let request = InterviewParamsRequest {
            language_or_topic: params.language_or_topic.clone(),
            difficulty: params.difficulty,
        };
        let response: QuestionsResponse = self
            .post(
                &self.questions_path,
                &request,
                "Question service",
                InterviewError::QuestionService,
            )
            .await?;
        Ok(response.questions)
    }
}

#[async_trait::async_trait]
impl AnswerScorer for BackendClient {
    #[instrument(skip(self, questions, answers), fields(count = questions.len()))]
    async fn score_answers(&self, questions: &[String], answers: &[String]) -> Result<String> {
        let request = ScoringRequest {
            questions: questions.to_vec(),
            answers: answers.to_vec(),
        };
        let response: ScoringResponse = self
            .post(
                &self.scoring_path,
                &request,
                "Scoring service",
                InterviewError::Scoring,
            )
            .await?;
        Ok(response.analysis)
    }
}
