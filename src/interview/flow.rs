use crate::backend::{AnswerScorer, QuestionSource};
use crate::error::{InterviewError, Result};
use crate::setup::InterviewParams;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{error, info, warn};

/// Where the question-and-answer exchange stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", content = "index", rename_all = "snake_case")]
pub enum FlowPhase {
    #[default]
    NotStarted,
    Fetching,
    /// Question `index` is open
    Presenting(usize),
    Scoring,
    /// Scoring failed; answers are kept for a retry
    ScoringFailed,
    Scored,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_index: usize,
    pub text: String,
}

/// View of the exchange for the hosting view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowSnapshot {
    pub phase: FlowPhase,
    pub current_question: Option<String>,
    pub question_count: usize,
    pub answers: Vec<Answer>,
    pub analysis: Option<String>,
    pub last_error: Option<String>,
}

#[derive(Default)]
struct FlowState {
    phase: FlowPhase,
    questions: Vec<String>,
    answers: Vec<Answer>,
    analysis: Option<String>,
    last_error: Option<String>,
}

impl FlowState {
    fn snapshot(&self) -> FlowSnapshot {
        let current_question = match self.phase {
            FlowPhase::Presenting(i) => self.questions.get(i).cloned(),
            _ => None,
        };
        FlowSnapshot {
            phase: self.phase,
            current_question,
            question_count: self.questions.len(),
            answers: self.answers.clone(),
            analysis: self.analysis.clone(),
            last_error: self.last_error.clone(),
        }
    }

    fn scoring_input(&self) -> (Vec<String>, Vec<String>) {
        let answers = self.answers.iter().map(|a| a.text.clone()).collect();
        (self.questions.clone(), answers)
    }
}

/// Sequential question presentation, answer collection and scoring
///
/// Never advances past question `i` without answer `i`, and only ever has one
/// question open.
pub struct InterviewFlow {
    questions: Arc<dyn QuestionSource>,
    scorer: Arc<dyn AnswerScorer>,
    state: Mutex<FlowState>,
}

impl InterviewFlow {
    pub fn new(questions: Arc<dyn QuestionSource>, scorer: Arc<dyn AnswerScorer>) -> Self {
        Self {
            questions,
            scorer,
            state: Mutex::new(FlowState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, FlowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the questions and open the first one.
    ///
    /// An error or an empty list leaves the flow `NotStarted` so it can be retried.
    pub async fn start(&self, params: &InterviewParams) -> Result<FlowSnapshot> {
        let params = params.validated()?;
        {
            let mut state = self.state();
            if state.phase != FlowPhase::NotStarted {
                return Err(InterviewError::InvalidState(format!(
                    "interview already started ({:?})",
                    state.phase
                )));
            }
            state.phase = FlowPhase::Fetching;
            state.last_error = None;
        }

        info!(
            "Fetching {} questions on {}",
            params.difficulty, params.language_or_topic
        );

        let fetched = self.questions.fetch_questions(&params).await;

        let mut state = self.state();
        match fetched {
            Ok(questions) if questions.is_empty() => {
                warn!("Question service returned no questions");
                state.phase = FlowPhase::NotStarted;
                state.last_error = Some(InterviewError::NoQuestions.to_string());
                Err(InterviewError::NoQuestions)
            }
            Ok(questions) => {
                info!("Received {} questions", questions.len());
                state.questions = questions;
                state.answers.clear();
                state.analysis = None;
                state.phase = FlowPhase::Presenting(0);
                Ok(state.snapshot())
            }
            Err(e) => {
                error!("Failed to fetch questions: {}", e);
                state.phase = FlowPhase::NotStarted;
                state.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Record the answer to the open question.
    ///
    /// Empty answers are accepted. The last answer moves the flow to `Scoring`
    /// and submits everything; calls outside `Presenting` are rejected.
    pub async fn submit_answer(&self, text: &str) -> Result<FlowSnapshot> {
        let (questions, answers) = {
            let mut state = self.state();
            let index = match state.phase {
                FlowPhase::Presenting(i) => i,
                other => {
                    warn!("Rejected answer while {:?}", other);
                    return Err(InterviewError::InvalidState(format!(
                        "no question is open ({:?})",
                        other
                    )));
                }
            };

            state.answers.push(Answer {
                question_index: index,
                text: text.to_string(),
            });

            if index + 1 < state.questions.len() {
                state.phase = FlowPhase::Presenting(index + 1);
                return Ok(state.snapshot());
            }

            state.phase = FlowPhase::Scoring;
            state.last_error = None;
            state.scoring_input()
        };

        self.score(questions, answers).await
    }

    /// Resubmit the kept answers after a scoring failure
    pub async fn retry_scoring(&self) -> Result<FlowSnapshot> {
        let (questions, answers) = {
            let mut state = self.state();
            if state.phase != FlowPhase::ScoringFailed {
                return Err(InterviewError::InvalidState(format!(
                    "nothing to retry ({:?})",
                    state.phase
                )));
            }
            state.phase = FlowPhase::Scoring;
            state.last_error = None;
            state.scoring_input()
        };

        info!("Retrying scoring with {} answers", answers.len());
        self.score(questions, answers).await
    }

    async fn score(&self, questions: Vec<String>, answers: Vec<String>) -> Result<FlowSnapshot> {
        if questions.len() != answers.len() {
            let mut state = self.state();
            state.phase = FlowPhase::ScoringFailed;
            return Err(InterviewError::InvalidState(format!(
                "{} answers for {} questions",
                answers.len(),
                questions.len()
            )));
        }

        info!("Submitting {} answers for scoring", answers.len());
        let scored = self.scorer.score_answers(&questions, &answers).await;

        let mut state = self.state();
        match scored {
            Ok(analysis) => {
                info!("Interview scored");
                state.analysis = Some(analysis);
                state.phase = FlowPhase::Scored;
                Ok(state.snapshot())
            }
            Err(e) => {
                error!("Scoring failed: {}", e);
                state.phase = FlowPhase::ScoringFailed;
                state.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Forget everything and return to `NotStarted`.
    ///
    /// Rejected while a fetch or scoring call is outstanding.
    pub fn reset(&self) -> Result<()> {
        let mut state = self.state();
        if matches!(state.phase, FlowPhase::Fetching | FlowPhase::Scoring) {
            return Err(InterviewError::InvalidState(format!(
                "cannot reset while {:?}",
                state.phase
            )));
        }
        *state = FlowState::default();
        Ok(())
    }

    pub fn phase(&self) -> FlowPhase {
        self.state().phase
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        self.state().snapshot()
    }
}
