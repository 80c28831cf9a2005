use crate::setup::Difficulty;
use serde::{Deserialize, Serialize};

/// Request body shared by room provisioning and question generation
#[derive(Debug, Clone, Serialize)]
pub struct InterviewParamsRequest {
    pub language_or_topic: String,
    pub difficulty: Difficulty,
}

/// Room provisioning success body
#[derive(Debug, Clone, Deserialize)]
pub struct RoomGrant {
    #[serde(rename = "roomId")]
    pub room_id: String,
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionsResponse {
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoringRequest {
    pub questions: Vec<String>,
    pub answers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringResponse {
    pub analysis: String,
}

/// Every backend endpoint answers either its payload or `{ "error": "..." }`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ServiceReply<T> {
    Failure { error: String },
    Success(T),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_grant_reply() {
        let reply: ServiceReply<RoomGrant> =
            serde_json::from_str(r#"{"roomId":"r1","token":"t1"}"#).unwrap();
        match reply {
            ServiceReply::Success(grant) => {
                assert_eq!(grant.room_id, "r1");
                assert_eq!(grant.token, "t1");
            }
            ServiceReply::Failure { error } => panic!("unexpected failure: {}", error),
        }
    }

    #[test]
    fn test_error_reply() {
        let reply: ServiceReply<QuestionsResponse> =
            serde_json::from_str(r#"{"error":"model overloaded"}"#).unwrap();
        assert!(matches!(reply, ServiceReply::Failure { error } if error == "model overloaded"));
    }

    #[test]
    fn test_malformed_reply() {
        let reply = serde_json::from_str::<ServiceReply<ScoringResponse>>(r#"{"score":3}"#);
        assert!(reply.is_err());
    }

    #[test]
    fn test_request_serialization() {
        let req = InterviewParamsRequest {
            language_or_topic: "Python".to_string(),
            difficulty: Difficulty::Medium,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"language_or_topic":"Python","difficulty":"medium"}"#);
    }
}
