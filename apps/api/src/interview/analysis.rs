//! Answer scoring and coaching summaries via the scoring model.
//!
//! The scoring model emits a `</think>` preamble and often wraps its JSON in
//! fences or prose; `parser` recovers what it can.

use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::interview::parser::{
    parse_coaching_summary, parse_question_analysis, CoachingSummary, QuestionAnalysis,
};
use crate::interview::prompts::{build_prompt, PromptPayload, TemplateKind};
use crate::llm_client::prompts::COACH_SYSTEM;
use crate::llm_client::{LlmClient, TextCompletion, MAX_TOKENS, SCORING_MODEL};

/// Scoring runs deterministic.
pub const SCORING_TEMPERATURE: f32 = 0.0;

/// One question with the candidate's transcribed answer.
#[derive(Debug, Clone, Deserialize)]
pub struct AnsweredQuestion {
    pub question: String,
    pub response: String,
}

/// Coaching feedback on a single free-form transcript.
pub async fn summarize_transcript(
    llm: &LlmClient,
    transcript: &str,
) -> Result<CoachingSummary, AppError> {
    let prompt = build_prompt(
        TemplateKind::Summary,
        &PromptPayload::Transcript(transcript),
        None,
    );
    let raw = score(llm, &prompt, "Transcript summary").await?;
    Ok(parse_coaching_summary(&raw))
}

/// Content/delivery analysis and 0-10 score for one answer.
pub async fn analyze_question(
    llm: &LlmClient,
    question: &str,
    response: &str,
) -> Result<QuestionAnalysis, AppError> {
    let prompt = build_prompt(
        TemplateKind::QuestionAnalysis,
        &PromptPayload::QuestionResponse { question, response },
        None,
    );
    let raw = score(llm, &prompt, "Question analysis").await?;

    let analysis = parse_question_analysis(&raw);
    info!("Answer analyzed (score: {:?})", analysis.score);
    Ok(analysis)
}

/// Overall assessment across every answer of an interview.
pub async fn summarize_interview(
    llm: &LlmClient,
    answers: &[AnsweredQuestion],
) -> Result<CoachingSummary, AppError> {
    let pairs = answers
        .iter()
        .map(|a| (a.question.as_str(), a.response.as_str()))
        .collect();
    let prompt = build_prompt(
        TemplateKind::InterviewSummary,
        &PromptPayload::Responses(pairs),
        None,
    );
    let raw = score(llm, &prompt, "Interview summary").await?;
    Ok(parse_coaching_summary(&raw))
}

async fn score(llm: &LlmClient, prompt: &str, step: &str) -> Result<String, AppError> {
    llm.complete(TextCompletion {
        model: SCORING_MODEL,
        system: COACH_SYSTEM,
        prompt,
        temperature: SCORING_TEMPERATURE,
        max_tokens: MAX_TOKENS,
    })
    .await
    .map_err(|e| AppError::Llm(format!("{step} failed: {e}")))
}
