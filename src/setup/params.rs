use crate::error::{InterviewError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Difficulty tier offered by the setup form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(s)
    }
}

/// Languages listed in the setup form. Anything else goes through free text.
pub const PRESET_TOPICS: &[&str] = &[
    "Python",
    "JavaScript",
    "TypeScript",
    "Java",
    "C++",
    "Go",
    "Rust",
    "SQL",
    "System Design",
];

/// Interview parameters collected by the setup form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewParams {
    /// Preset language or free-text topic
    pub language_or_topic: String,
    pub difficulty: Difficulty,
}

impl InterviewParams {
    pub fn new(language_or_topic: impl Into<String>, difficulty: Difficulty) -> Self {
        Self {
            language_or_topic: language_or_topic.into(),
            difficulty,
        }
    }

    /// Trim the topic and reject a blank one
    pub fn validated(&self) -> Result<Self> {
        let topic = self.language_or_topic.trim();
        if topic.is_empty() {
            return Err(InterviewError::InvalidParams(
                "a language or topic must be selected".to_string(),
            ));
        }
        Ok(Self {
            language_or_topic: topic.to_string(),
            difficulty: self.difficulty,
        })
    }

    /// Whether the topic came from free text rather than the preset list
    pub fn is_custom_topic(&self) -> bool {
        let topic = self.language_or_topic.trim();
        !PRESET_TOPICS.iter().any(|p| p.eq_ignore_ascii_case(topic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_serialization() {
        assert_eq!(serde_json::to_string(&Difficulty::Medium).unwrap(), "\"medium\"");
        let hard: Difficulty = serde_json::from_str("\"hard\"").unwrap();
        assert_eq!(hard, Difficulty::Hard);
        assert!(serde_json::from_str::<Difficulty>("\"impossible\"").is_err());
    }

    #[test]
    fn test_validated_trims_topic() {
        let params = InterviewParams::new("  Python ", Difficulty::Easy);
        let valid = params.validated().unwrap();
        assert_eq!(valid.language_or_topic, "Python");
        assert!(!valid.is_custom_topic());
    }

    #[test]
    fn test_blank_topic_rejected() {
        let params = InterviewParams::new("   ", Difficulty::Medium);
        assert!(matches!(
            params.validated(),
            Err(InterviewError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_free_text_topic() {
        let params = InterviewParams::new("Distributed caching", Difficulty::Hard);
        assert!(params.is_custom_topic());
        assert!(params.validated().is_ok());
    }
}
