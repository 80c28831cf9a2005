use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub backend: BackendConfig,
    pub transport: TransportConfig,
    pub participant: ParticipantConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Endpoints of the external room, question and scoring services
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default = "default_rooms_path")]
    pub rooms_path: String,
    #[serde(default = "default_questions_path")]
    pub questions_path: String,
    #[serde(default = "default_scoring_path")]
    pub scoring_path: String,
    /// Connect timeout only; requests themselves are never timed out
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    pub nats_url: String,
}

/// How the local participant shows up when joining
#[derive(Debug, Clone, Deserialize)]
pub struct ParticipantConfig {
    pub display_name: String,
    #[serde(default = "default_true")]
    pub start_with_audio: bool,
    #[serde(default = "default_true")]
    pub start_with_video: bool,
}

impl Default for ParticipantConfig {
    fn default() -> Self {
        Self {
            display_name: "Candidate".to_string(),
            start_with_audio: true,
            start_with_video: true,
        }
    }
}

fn default_rooms_path() -> String {
    "/api/rooms".to_string()
}

fn default_questions_path() -> String {
    "/api/interview/questions".to_string()
}

fn default_scoring_path() -> String {
    "/api/interview/analyze".to_string()
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load from a config file, then apply `INTERVIEW_ROOM__*` environment overrides
    /// (e.g. `INTERVIEW_ROOM__BACKEND__BASE_URL`).
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("INTERVIEW_ROOM").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
