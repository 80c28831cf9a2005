// Shared test doubles: a scripted media transport and a scripted backend.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use interview_room::backend::{AnswerScorer, QuestionSource, RoomGrant, RoomProvisioner};
use interview_room::config::ParticipantConfig;
use interview_room::transport::{
    JoinOptions, MediaTransport, Participant, TrackHandle, TrackKind, TransportEvent,
};
use interview_room::{InterviewError, InterviewParams};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::{broadcast, Notify};

pub const LOCAL_ID: &str = "local-1";

pub fn participant_config() -> ParticipantConfig {
    ParticipantConfig {
        display_name: "Ada".to_string(),
        start_with_audio: true,
        start_with_video: true,
    }
}

pub fn remote(id: &str, name: &str) -> Participant {
    Participant {
        id: id.to_string(),
        display_name: name.to_string(),
        is_local: false,
        audio_track: Some(TrackHandle::for_participant(id, TrackKind::Audio)),
        video_track: Some(TrackHandle::for_participant(id, TrackKind::Video)),
        audio_enabled: true,
        video_enabled: true,
    }
}

/// In-memory transport that counts calls and can hold or fail them
pub struct FakeTransport {
    pub joins: AtomicUsize,
    pub leaves: AtomicUsize,
    pub audio_calls: AtomicUsize,
    pub video_calls: AtomicUsize,
    pub last_join: Mutex<Option<JoinOptions>>,
    pub broadcasts: Mutex<Vec<String>>,
    pub join_error: Mutex<Option<String>>,
    pub fail_leave: AtomicBool,
    pub fail_devices: AtomicBool,
    pub fail_broadcast: AtomicBool,
    /// Suspend every device call this long before answering
    pub device_delay_ms: AtomicU64,
    hold_join: AtomicBool,
    pub join_started: Notify,
    join_release: Notify,
    events: broadcast::Sender<TransportEvent>,
}

impl FakeTransport {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            joins: AtomicUsize::new(0),
            leaves: AtomicUsize::new(0),
            audio_calls: AtomicUsize::new(0),
            video_calls: AtomicUsize::new(0),
            last_join: Mutex::new(None),
            broadcasts: Mutex::new(Vec::new()),
            join_error: Mutex::new(None),
            fail_leave: AtomicBool::new(false),
            fail_devices: AtomicBool::new(false),
            fail_broadcast: AtomicBool::new(false),
            device_delay_ms: AtomicU64::new(0),
            hold_join: AtomicBool::new(false),
            join_started: Notify::new(),
            join_release: Notify::new(),
            events,
        }
    }

    /// Make every join wait for `release_join`
    pub fn hold_joins(&self) {
        self.hold_join.store(true, Ordering::SeqCst);
    }

    pub fn release_join(&self) {
        self.join_release.notify_one();
    }

    pub fn fail_next_join(&self, message: &str) {
        *self.join_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn emit(&self, event: TransportEvent) {
        let _ = self.events.send(event);
    }

    pub fn join_count(&self) -> usize {
        self.joins.load(Ordering::SeqCst)
    }

    pub fn leave_count(&self) -> usize {
        self.leaves.load(Ordering::SeqCst)
    }

    async fn device_delay(&self) {
        let delay = self.device_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }
}

#[async_trait::async_trait]
impl MediaTransport for FakeTransport {
    async fn join(&self, options: JoinOptions) -> Result<Participant> {
        self.joins.fetch_add(1, Ordering::SeqCst);
        *self.last_join.lock().unwrap() = Some(options.clone());
        self.join_started.notify_one();

        if self.hold_join.load(Ordering::SeqCst) {
            self.join_release.notified().await;
        }

        if let Some(message) = self.join_error.lock().unwrap().take() {
            return Err(anyhow!(message));
        }

        Ok(Participant {
            id: LOCAL_ID.to_string(),
            display_name: options.display_name,
            is_local: true,
            audio_track: Some(TrackHandle::for_participant(LOCAL_ID, TrackKind::Audio)),
            video_track: Some(TrackHandle::for_participant(LOCAL_ID, TrackKind::Video)),
            audio_enabled: options.initial_audio_enabled,
            video_enabled: options.initial_video_enabled,
        })
    }

    async fn leave(&self) -> Result<()> {
        self.leaves.fetch_add(1, Ordering::SeqCst);
        if self.fail_leave.load(Ordering::SeqCst) {
            return Err(anyhow!("network gone"));
        }
        Ok(())
    }

    async fn set_local_audio_enabled(&self, _enabled: bool) -> Result<()> {
        self.audio_calls.fetch_add(1, Ordering::SeqCst);
        self.device_delay().await;
        if self.fail_devices.load(Ordering::SeqCst) {
            return Err(anyhow!("microphone busy"));
        }
        Ok(())
    }

    async fn set_local_video_enabled(&self, _enabled: bool) -> Result<()> {
        self.video_calls.fetch_add(1, Ordering::SeqCst);
        self.device_delay().await;
        if self.fail_devices.load(Ordering::SeqCst) {
            return Err(anyhow!("camera busy"));
        }
        Ok(())
    }

    async fn send_broadcast_message(&self, text: &str) -> Result<()> {
        if self.fail_broadcast.load(Ordering::SeqCst) {
            return Err(anyhow!("broadcast failed"));
        }
        self.broadcasts.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.events.subscribe()
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Scripted room, question and scoring services
pub struct FakeBackend {
    pub grant: Mutex<std::result::Result<(String, String), String>>,
    pub questions: Mutex<std::result::Result<Vec<String>, String>>,
    /// Scoring replies, consumed in order; empty means success
    pub scoring_replies: Mutex<VecDeque<std::result::Result<String, String>>>,
    pub scoring_calls: Mutex<Vec<(Vec<String>, Vec<String>)>>,
    pub provision_calls: AtomicUsize,
    pub question_calls: AtomicUsize,
    /// Topics of every question fetch, in call order
    pub question_topics: Mutex<Vec<String>>,
    hold_provisioning: AtomicBool,
    pub provisioning_started: Notify,
    provisioning_release: Notify,
    hold_scoring: AtomicBool,
    pub scoring_started: Notify,
    scoring_release: Notify,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            grant: Mutex::new(Ok(("r1".to_string(), "t1".to_string()))),
            questions: Mutex::new(Ok(vec!["Q1".to_string(), "Q2".to_string()])),
            scoring_replies: Mutex::new(VecDeque::new()),
            scoring_calls: Mutex::new(Vec::new()),
            provision_calls: AtomicUsize::new(0),
            question_calls: AtomicUsize::new(0),
            question_topics: Mutex::new(Vec::new()),
            hold_provisioning: AtomicBool::new(false),
            provisioning_started: Notify::new(),
            provisioning_release: Notify::new(),
            hold_scoring: AtomicBool::new(false),
            scoring_started: Notify::new(),
            scoring_release: Notify::new(),
        }
    }

    pub fn with_questions(questions: &[&str]) -> Self {
        let backend = Self::new();
        *backend.questions.lock().unwrap() =
            Ok(questions.iter().map(|q| q.to_string()).collect());
        backend
    }

    /// Make every room request wait for `release_provisioning`
    pub fn hold_provisioning(&self) {
        self.hold_provisioning.store(true, Ordering::SeqCst);
    }

    pub fn release_provisioning(&self) {
        self.provisioning_release.notify_one();
    }

    pub fn hold_scoring(&self) {
        self.hold_scoring.store(true, Ordering::SeqCst);
    }

    pub fn release_scoring(&self) {
        self.scoring_release.notify_one();
    }

    pub fn push_scoring_reply(&self, reply: std::result::Result<&str, &str>) {
        self.scoring_replies
            .lock()
            .unwrap()
            .push_back(reply.map(str::to_string).map_err(str::to_string));
    }

    pub fn scoring_calls(&self) -> Vec<(Vec<String>, Vec<String>)> {
        self.scoring_calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RoomProvisioner for FakeBackend {
    async fn provision_room(&self, _params: &InterviewParams) -> interview_room::Result<RoomGrant> {
        self.provision_calls.fetch_add(1, Ordering::SeqCst);
        self.provisioning_started.notify_one();

        if self.hold_provisioning.load(Ordering::SeqCst) {
            self.provisioning_release.notified().await;
        }

        match self.grant.lock().unwrap().clone() {
            Ok((room_id, token)) => Ok(RoomGrant { room_id, token }),
            Err(e) => Err(InterviewError::Provisioning(e)),
        }
    }
}

#[async_trait::async_trait]
impl QuestionSource for FakeBackend {
    async fn fetch_questions(&self, params: &InterviewParams) -> interview_room::Result<Vec<String>> {
        self.question_calls.fetch_add(1, Ordering::SeqCst);
        self.question_topics
            .lock()
            .unwrap()
            .push(params.language_or_topic.clone());
        self.questions
            .lock()
            .unwrap()
            .clone()
            .map_err(InterviewError::QuestionService)
    }
}

#[async_trait::async_trait]
impl AnswerScorer for FakeBackend {
    async fn score_answers(
        &self,
        questions: &[String],
        answers: &[String],
    ) -> interview_room::Result<String> {
        self.scoring_calls
            .lock()
            .unwrap()
            .push((questions.to_vec(), answers.to_vec()));
        self.scoring_started.notify_one();

        if self.hold_scoring.load(Ordering::SeqCst) {
            self.scoring_release.notified().await;
        }

        let reply = self.scoring_replies.lock().unwrap().pop_front();
        match reply {
            Some(Ok(analysis)) => Ok(analysis),
            Some(Err(e)) => Err(InterviewError::Scoring(e)),
            None => Ok(format!("Answered {} of {} questions", answers.len(), questions.len())),
        }
    }
}
