use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// This is the only place an error is turned into an HTTP response.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Audio(msg) => {
                tracing::error!("Audio error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AUDIO_ERROR",
                    "An audio processing error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request_with_message() {
        let response = AppError::Validation("text required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upstream_detail_is_not_leaked_to_client() {
        let response = AppError::Llm("invalid api key sk-123".to_string()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["error"]["code"], "LLM_ERROR");
        assert_eq!(body["error"]["message"], "An AI processing error occurred");
    }

    #[test]
    fn test_upstream_errors_map_to_internal_server_error() {
        let llm = AppError::Llm("401 unauthorized".to_string()).into_response();
        let audio = AppError::Audio("ffmpeg exited 1".to_string()).into_response();
        assert_eq!(llm.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(audio.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
