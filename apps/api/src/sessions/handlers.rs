//! Axum route handlers for session history.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::sessions::aggregator::save_session;
use crate::sessions::comments::{comment_on_sessions, SessionComment};
use crate::sessions::models::{SessionRecord, SessionSubmission};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SaveSessionResponse {
    pub status: &'static str,
    pub session: SessionRecord,
}

#[derive(Debug, Serialize)]
pub struct SessionHistoryResponse {
    pub sessions: Vec<SessionRecord>,
}

#[derive(Debug, Serialize)]
pub struct SessionCommentsResponse {
    pub comments: Vec<SessionComment>,
}

/// POST /api/v1/sessions
pub async fn handle_save_session(
    State(state): State<AppState>,
    Json(submission): Json<SessionSubmission>,
) -> Result<Json<SaveSessionResponse>, AppError> {
    let session = save_session(state.sessions.as_ref(), submission).await?;
    Ok(Json(SaveSessionResponse {
        status: "success",
        session,
    }))
}

/// GET /api/v1/sessions
pub async fn handle_list_sessions(
    State(state): State<AppState>,
) -> Result<Json<SessionHistoryResponse>, AppError> {
    let sessions = state.sessions.list_all().await?;
    Ok(Json(SessionHistoryResponse { sessions }))
}

/// GET /api/v1/sessions/comments
pub async fn handle_session_comments(
    State(state): State<AppState>,
) -> Result<Json<SessionCommentsResponse>, AppError> {
    let sessions = state.sessions.list_all().await?;
    let comments = comment_on_sessions(&state.openai, &sessions).await?;
    Ok(Json(SessionCommentsResponse { comments }))
}
