//! Short encouraging comments for the session history view.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::{LlmClient, TextCompletion, CHAT_MODEL};
use crate::sessions::models::SessionRecord;

pub const COMMENT_SYSTEM: &str = "You are a friendly interview coach.";
pub const COMMENT_TEMPERATURE: f32 = 0.7;
/// Keeps replies to two or three lines.
pub const COMMENT_MAX_TOKENS: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionComment {
    pub timestamp: DateTime<Utc>,
    pub comment: String,
}

pub fn comment_prompt(overall_summary: &str) -> String {
    format!(
        "{COMMENT_SYSTEM}\n\
        Based on this session summary, give a 2-3 line comment that encourages the candidate or gives a small tip:\n\n\
        Summary: {overall_summary}"
    )
}

/// One comment per session, in store order. Any failed call fails the batch.
pub async fn comment_on_sessions(
    llm: &LlmClient,
    sessions: &[SessionRecord],
) -> Result<Vec<SessionComment>, AppError> {
    let mut comments = Vec::with_capacity(sessions.len());

    for session in sessions {
        let prompt = comment_prompt(&session.overall_summary);
        let comment = llm
            .complete(TextCompletion {
                model: CHAT_MODEL,
                system: COMMENT_SYSTEM,
                prompt: &prompt,
                temperature: COMMENT_TEMPERATURE,
                max_tokens: COMMENT_MAX_TOKENS,
            })
            .await
            .map_err(|e| AppError::Llm(format!("Session comment failed: {e}")))?;

        comments.push(SessionComment {
            timestamp: session.timestamp,
            comment,
        });
    }

    info!("Generated {} session comments", comments.len());
    Ok(comments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_prompt_embeds_summary() {
        let prompt = comment_prompt("Good structure, rushed delivery.");
        assert!(prompt.starts_with("You are a friendly interview coach."));
        assert!(prompt.contains("2-3 line comment"));
        assert!(prompt.ends_with("Summary: Good structure, rushed delivery."));
    }
}
