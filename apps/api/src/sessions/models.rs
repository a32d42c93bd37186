use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Evaluation of one answer as submitted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub analysis_content: String,
    #[serde(default)]
    pub analysis_delivery: String,
    /// 0-10. `None` means scoring failed, not zero.
    #[serde(default)]
    pub score: Option<u8>,
}

/// A stored interview session. Always holds exactly three questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Sum of question scores, missing scores counted as 0.
    pub total_score: u32,
    pub questions: Vec<QuestionRecord>,
    pub overall_summary: String,
}

/// Body of `POST /api/v1/sessions`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSubmission {
    #[serde(default)]
    pub questions: Vec<QuestionRecord>,
    #[serde(default)]
    pub overall_summary: String,
}
