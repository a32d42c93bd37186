//! Question generation: role + notes (+ resume passages) → three questions.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::interview::parser::{parse_question_list, GeneratedQuestion};
use crate::interview::prompts::{build_prompt, PromptPayload, TemplateKind};
use crate::llm_client::prompts::INTERVIEWER_SYSTEM;
use crate::llm_client::{LlmClient, TextCompletion, CHAT_MODEL, MAX_TOKENS};
use crate::retrieval::{retrieve_context, Embedder, ResumeIndex};

pub const DEFAULT_ROLE: &str = "software engineer";
pub const QUESTION_TEMPERATURE: f32 = 0.8;

/// Trimmed role, or `software engineer` when absent or blank.
pub fn normalize_role(role: Option<&str>) -> &str {
    role.map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_ROLE)
}

/// Builds the question-generation prompt. The retrieval block is always
/// present; with an empty index it is empty and no embedding call is made.
pub async fn build_question_prompt(
    index: &ResumeIndex,
    embedder: &dyn Embedder,
    role: &str,
    additional_note: &str,
    top_k: usize,
) -> Result<String, AppError> {
    let payload = PromptPayload::Role {
        role,
        additional_note,
    };

    let context = retrieve_context(index, embedder, &payload.render(), top_k)
        .await
        .map_err(|e| AppError::Llm(format!("Resume retrieval failed: {e}")))?;
    info!(
        "Question prompt for '{role}' grounded on {} resume passages",
        context.passages().len()
    );

    Ok(build_prompt(
        TemplateKind::QuestionGeneration,
        &payload,
        Some(&context),
    ))
}

/// Generates interview questions in model order.
/// An unparseable reply yields fewer (possibly zero) questions, not an error.
pub async fn generate_questions(
    llm: &LlmClient,
    embedder: &dyn Embedder,
    index: &ResumeIndex,
    role: &str,
    additional_note: &str,
    top_k: usize,
) -> Result<Vec<GeneratedQuestion>, AppError> {
    let prompt = build_question_prompt(index, embedder, role, additional_note, top_k).await?;

    let raw = llm
        .complete(TextCompletion {
            model: CHAT_MODEL,
            system: INTERVIEWER_SYSTEM,
            prompt: &prompt,
            temperature: QUESTION_TEMPERATURE,
            max_tokens: MAX_TOKENS,
        })
        .await
        .map_err(|e| AppError::Llm(format!("Question generation failed: {e}")))?;

    let questions = parse_question_list(&raw);
    if questions.is_empty() {
        warn!("Model reply contained no usable questions");
    } else {
        info!("Generated {} questions for '{role}'", questions.len());
    }
    Ok(questions)
}
