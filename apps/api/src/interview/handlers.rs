//! Axum route handlers for the interview API.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::audio::transcode::prepare_answer_audio;
use crate::audio::wav::pcm_to_wav;
use crate::errors::AppError;
use crate::interview::analysis::{
    analyze_question, summarize_interview, summarize_transcript, AnsweredQuestion,
};
use crate::interview::answers::{analyze_answer_audio, AnswerAnalysis};
use crate::interview::parser::{CoachingSummary, GeneratedQuestion, QuestionAnalysis};
use crate::interview::questions::{generate_questions, normalize_role};
use crate::retrieval::resume::{extract_resume_text, index_resume};
use crate::retrieval::ResumeIndex;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct QuestionsRequest {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub additional_note: String,
}

#[derive(Debug, Serialize)]
pub struct QuestionsResponse {
    pub questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub voice: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub transcript: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: CoachingSummary,
}

#[derive(Debug, Deserialize)]
pub struct QuestionAnalysisRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct InterviewSummaryRequest {
    #[serde(default)]
    pub questions: Vec<AnsweredQuestion>,
}

#[derive(Debug, Serialize)]
pub struct InterviewSummaryResponse {
    pub overall_summary: CoachingSummary,
}

/// Resume upload as read from a multipart body.
struct ResumeUpload {
    filename: String,
    bytes: Bytes,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/questions
///
/// Generates questions from role and notes only. The prompt still carries an
/// (empty) resume context block.
pub async fn handle_generate_questions(
    State(state): State<AppState>,
    Json(request): Json<QuestionsRequest>,
) -> Result<Json<QuestionsResponse>, AppError> {
    let questions = generate_questions(
        &state.openai,
        state.embedder.as_ref(),
        &ResumeIndex::default(),
        normalize_role(request.role.as_deref()),
        &request.additional_note,
        state.config.retrieval_top_k,
    )
    .await?;

    Ok(Json(QuestionsResponse { questions }))
}

/// POST /api/v1/questions/resume
///
/// Multipart fields: `role`, `additional_note`, `resume` (PDF or plain text).
/// The resume is indexed for this request only.
pub async fn handle_generate_questions_from_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<QuestionsResponse>, AppError> {
    let mut role: Option<String> = None;
    let mut additional_note = String::new();
    let mut resume: Option<ResumeUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "role" => role = Some(field.text().await.map_err(multipart_error)?),
            "additional_note" => additional_note = field.text().await.map_err(multipart_error)?,
            "resume" => {
                let filename = field.file_name().unwrap_or("resume.pdf").to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                resume = Some(ResumeUpload { filename, bytes });
            }
            _ => {}
        }
    }

    let index = match resume.filter(|r| !r.bytes.is_empty()) {
        Some(upload) => {
            let text = extract_resume_text(upload.bytes, &upload.filename).await?;
            index_resume(&text, state.embedder.as_ref()).await?
        }
        None => ResumeIndex::default(),
    };

    let questions = generate_questions(
        &state.openai,
        state.embedder.as_ref(),
        &index,
        normalize_role(role.as_deref()),
        &additional_note,
        state.config.retrieval_top_k,
    )
    .await?;

    Ok(Json(QuestionsResponse { questions }))
}

/// POST /api/v1/tts
///
/// Returns `audio/wav` (mono, 16-bit, 24 kHz).
pub async fn handle_tts(
    State(state): State<AppState>,
    Json(request): Json<TtsRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text required".to_string()));
    }
    let voice = request
        .voice
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(&state.config.tts_voice);

    let pcm = state
        .boson
        .synthesize_speech(voice, &request.text)
        .await
        .map_err(|e| AppError::Llm(format!("Speech synthesis failed: {e}")))?;
    let wav = pcm_to_wav(&pcm).map_err(|e| AppError::Audio(format!("WAV encoding failed: {e}")))?;

    Ok(([(header::CONTENT_TYPE, "audio/wav")], wav))
}

/// POST /api/v1/answers
///
/// Multipart field `file`: a recorded answer in any ffmpeg-readable format.
pub async fn handle_upload_answer(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnswerAnalysis>, AppError> {
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("answer").to_string();
            let bytes = field.bytes().await.map_err(multipart_error)?;
            upload = Some((filename, bytes));
            break;
        }
    }

    let Some((filename, bytes)) = upload else {
        return Err(AppError::Validation("file required".to_string()));
    };
    if bytes.is_empty() {
        return Err(AppError::Validation("file is empty".to_string()));
    }

    let wav = prepare_answer_audio(&state.config.ffmpeg_path, &bytes, &filename)
        .await
        .map_err(|e| AppError::Audio(format!("Could not convert '{filename}' to WAV: {e}")))?;

    let analysis = analyze_answer_audio(&state.boson, &wav).await?;
    Ok(Json(analysis))
}

/// POST /api/v1/summary
pub async fn handle_summary(
    State(state): State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> Result<Json<SummaryResponse>, AppError> {
    if request.transcript.trim().is_empty() {
        return Err(AppError::Validation("transcript required".to_string()));
    }

    let summary = summarize_transcript(&state.boson, &request.transcript).await?;
    Ok(Json(SummaryResponse { summary }))
}

/// POST /api/v1/analysis/question
pub async fn handle_analyze_question(
    State(state): State<AppState>,
    Json(request): Json<QuestionAnalysisRequest>,
) -> Result<Json<QuestionAnalysis>, AppError> {
    if request.question.trim().is_empty() || request.response.trim().is_empty() {
        return Err(AppError::Validation(
            "question and response required".to_string(),
        ));
    }

    let analysis = analyze_question(&state.boson, &request.question, &request.response).await?;
    Ok(Json(analysis))
}

/// POST /api/v1/analysis/interview
pub async fn handle_summarize_interview(
    State(state): State<AppState>,
    Json(request): Json<InterviewSummaryRequest>,
) -> Result<Json<InterviewSummaryResponse>, AppError> {
    if request.questions.is_empty() {
        return Err(AppError::Validation("questions required".to_string()));
    }

    let overall_summary = summarize_interview(&state.boson, &request.questions).await?;
    Ok(Json(InterviewSummaryResponse { overall_summary }))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Invalid multipart body: {e}"))
}
