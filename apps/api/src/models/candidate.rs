use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One answered screening question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
    /// Canonical technology identifier the question was drawn for.
    pub technology: String,
}

/// The fields collected during a screening conversation.
///
/// This is the wire shape for `POST /api/user` (no id, no timestamp) and the
/// payload the conversation finalizes before it is handed to the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub full_name: String,
    /// Unique key in the record store. Stored lowercase.
    pub email: String,
    pub phone: String,
    pub years_experience: f32,
    pub desired_positions: Vec<String>,
    pub current_location: String,
    /// Canonical technology identifiers, in the order the candidate gave them.
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub answers: Vec<QuestionAnswer>,
}

/// A stored candidate record: the profile plus store-generated identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub profile: CandidateProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> CandidateProfile {
        CandidateProfile {
            full_name: "Alice Smith".to_string(),
            email: "alice@example.com".to_string(),
            phone: "+15551234567".to_string(),
            years_experience: 3.0,
            desired_positions: vec!["Backend Engineer".to_string()],
            current_location: "Remote".to_string(),
            tech_stack: vec!["python".to_string(), "docker".to_string()],
            answers: vec![],
        }
    }

    #[test]
    fn test_profile_round_trips_through_json() {
        let profile = sample_profile();
        let json = serde_json::to_string(&profile).unwrap();
        let back: CandidateProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn test_profile_answers_default_to_empty() {
        let json = r#"{
            "full_name": "Alice Smith",
            "email": "alice@example.com",
            "phone": "+15551234567",
            "years_experience": 3,
            "desired_positions": ["Backend Engineer"],
            "current_location": "Remote",
            "tech_stack": ["python"]
        }"#;
        let profile: CandidateProfile = serde_json::from_str(json).unwrap();
        assert!(profile.answers.is_empty());
    }

    #[test]
    fn test_record_serializes_profile_flattened() {
        let record = CandidateRecord {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            profile: sample_profile(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("id").is_some());
        assert!(value.get("created_at").is_some());
        assert_eq!(value["email"], "alice@example.com");
        assert!(value.get("profile").is_none());
    }
}
