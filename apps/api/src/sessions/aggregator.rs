//! Session aggregation: validate, total, timestamp, append.

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::parser::MAX_SCORE;
use crate::sessions::models::{QuestionRecord, SessionRecord, SessionSubmission};
use crate::sessions::store::SessionStore;

/// Every stored session covers exactly this many answered questions.
pub const REQUIRED_QUESTIONS: usize = 3;

/// Sum of scores; a missing score counts as 0.
pub fn total_score(questions: &[QuestionRecord]) -> u32 {
    questions
        .iter()
        .map(|q| u32::from(q.score.unwrap_or(0)))
        .sum()
}

/// Validates the submission and builds the record. Pure.
pub fn build_session(
    submission: SessionSubmission,
    timestamp: DateTime<Utc>,
) -> Result<SessionRecord, AppError> {
    if submission.questions.len() != REQUIRED_QUESTIONS {
        return Err(AppError::Validation(format!(
            "Must have exactly {REQUIRED_QUESTIONS} questions, got {}",
            submission.questions.len()
        )));
    }

    if let Some(q) = submission
        .questions
        .iter()
        .find(|q| q.score.is_some_and(|s| s > MAX_SCORE))
    {
        return Err(AppError::Validation(format!(
            "Score for '{}' must be between 0 and {MAX_SCORE}",
            q.question
        )));
    }

    Ok(SessionRecord {
        id: Uuid::new_v4(),
        timestamp,
        total_score: total_score(&submission.questions),
        questions: submission.questions,
        overall_summary: submission.overall_summary,
    })
}

/// Validates then appends. A rejected submission never reaches the store.
pub async fn save_session(
    store: &dyn SessionStore,
    submission: SessionSubmission,
) -> Result<SessionRecord, AppError> {
    let session = build_session(submission, Utc::now())?;
    store.append(session.clone()).await?;

    info!(
        "Session {} saved (total score: {})",
        session.id, session.total_score
    );
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::store::InMemorySessionStore;

    fn record(question: &str, score: Option<u8>) -> QuestionRecord {
        QuestionRecord {
            question: question.to_string(),
            response: "An answer.".to_string(),
            analysis_content: "Relevant.".to_string(),
            analysis_delivery: "Clear.".to_string(),
            score,
        }
    }

    fn submission(scores: &[Option<u8>]) -> SessionSubmission {
        SessionSubmission {
            questions: scores
                .iter()
                .enumerate()
                .map(|(i, s)| record(&format!("Q{}", i + 1), *s))
                .collect(),
            overall_summary: "Strong content, steady pace.".to_string(),
        }
    }

    #[test]
    fn test_total_score_sums_scores() {
        let session = build_session(submission(&[Some(8), Some(7), Some(0)]), Utc::now()).unwrap();
        assert_eq!(session.total_score, 15);
    }

    #[test]
    fn test_missing_score_counts_as_zero() {
        let session = build_session(submission(&[Some(9), None, Some(6)]), Utc::now()).unwrap();
        assert_eq!(session.total_score, 15);
        assert_eq!(session.questions[1].score, None);
    }

    #[test]
    fn test_build_session_keeps_order_and_timestamp() {
        let now = Utc::now();
        let session = build_session(submission(&[Some(1), Some(2), Some(3)]), now).unwrap();

        assert_eq!(session.timestamp, now);
        let questions: Vec<&str> = session.questions.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(questions, vec!["Q1", "Q2", "Q3"]);
        assert_eq!(session.overall_summary, "Strong content, steady pace.");
    }

    #[test]
    fn test_wrong_question_count_is_rejected() {
        for scores in [vec![], vec![Some(5)], vec![Some(5); 4]] {
            let result = build_session(submission(&scores), Utc::now());
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
    }

    #[test]
    fn test_out_of_range_score_is_rejected() {
        let result = build_session(submission(&[Some(8), Some(11), Some(3)]), Utc::now());
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_two_question_session_leaves_store_unchanged() {
        let store = InMemorySessionStore::default();
        save_session(&store, submission(&[Some(8), Some(7), Some(0)]))
            .await
            .unwrap();

        let result = save_session(&store, submission(&[Some(8), Some(7)])).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_saved_session_is_listed() {
        let store = InMemorySessionStore::default();
        let saved = save_session(&store, submission(&[Some(8), Some(7), Some(0)]))
            .await
            .unwrap();

        assert_eq!(store.list_all().await.unwrap(), vec![saved]);
    }
}
