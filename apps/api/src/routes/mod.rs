pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;
use tracing::info;

use crate::interview::handlers as interview;
use crate::sessions::handlers as sessions;
use crate::state::AppState;

/// Upper bound for resume and answer uploads.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();

    let router = Router::new()
        .route("/health", get(health::health_handler))
        // Question generation
        .route("/api/v1/questions", post(interview::handle_generate_questions))
        .route(
            "/api/v1/questions/resume",
            post(interview::handle_generate_questions_from_resume),
        )
        // Speech in / speech out
        .route("/api/v1/tts", post(interview::handle_tts))
        .route("/api/v1/answers", post(interview::handle_upload_answer))
        // Scoring
        .route("/api/v1/summary", post(interview::handle_summary))
        .route(
            "/api/v1/analysis/question",
            post(interview::handle_analyze_question),
        )
        .route(
            "/api/v1/analysis/interview",
            post(interview::handle_summarize_interview),
        )
        // Session history
        .route(
            "/api/v1/sessions",
            get(sessions::handle_list_sessions).post(sessions::handle_save_session),
        )
        .route(
            "/api/v1/sessions/comments",
            get(sessions::handle_session_comments),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state);

    match static_dir {
        Some(dir) => {
            info!("Serving frontend from {dir}");
            router.fallback_service(ServeDir::new(dir))
        }
        None => router,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::LlmClient;
    use crate::retrieval::index::tests::KeywordEmbedder;
    use crate::sessions::InMemorySessionStore;

    /// Model clients point at a closed port; no test here reaches them.
    fn test_state() -> AppState {
        let config = Config {
            boson_api_base: "http://127.0.0.1:9/v1".to_string(),
            boson_api_key: "test".to_string(),
            openai_api_base: "http://127.0.0.1:9/v1".to_string(),
            openai_api_key: "test".to_string(),
            tts_voice: "en_woman_1".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            retrieval_top_k: 5,
            static_dir: None,
            port: 0,
            rust_log: "info".to_string(),
        };

        AppState {
            boson: LlmClient::new(&config.boson_api_base, &config.boson_api_key),
            openai: LlmClient::new(&config.openai_api_base, &config.openai_api_key),
            embedder: Arc::new(KeywordEmbedder::default()),
            sessions: Arc::new(InMemorySessionStore::default()),
            config,
        }
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn question(text: &str, score: Option<u8>) -> Value {
        json!({
            "question": text,
            "response": "My answer.",
            "analysis_content": "On topic.",
            "analysis_delivery": "Calm.",
            "score": score
        })
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "coach-api");
    }

    #[tokio::test]
    async fn test_session_save_then_list_round_trip() {
        let app = build_router(test_state());

        let saved = app
            .clone()
            .oneshot(post_json(
                "/api/v1/sessions",
                json!({
                    "questions": [question("Q1", Some(8)), question("Q2", Some(7)), question("Q3", Some(0))],
                    "overall_summary": "Strong content."
                }),
            ))
            .await
            .unwrap();
        assert_eq!(saved.status(), StatusCode::OK);
        let saved = body_json(saved).await;
        assert_eq!(saved["status"], "success");
        assert_eq!(saved["session"]["total_score"], 15);

        let listed = app
            .oneshot(Request::get("/api/v1/sessions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let listed = body_json(listed).await;
        let sessions = listed["sessions"].as_array().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0], saved["session"]);
    }

    #[tokio::test]
    async fn test_two_question_session_is_rejected_and_not_stored() {
        let state = test_state();
        let store = Arc::clone(&state.sessions);
        let app = build_router(state);

        let response = app
            .oneshot(post_json(
                "/api/v1/sessions",
                json!({
                    "questions": [question("Q1", Some(8)), question("Q2", None)],
                    "overall_summary": ""
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_comments_for_empty_history_make_no_calls() {
        let app = build_router(test_state());
        let response = app
            .oneshot(
                Request::get("/api/v1/sessions/comments")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"comments": []}));
    }

    #[tokio::test]
    async fn test_missing_inputs_are_rejected_before_model_calls() {
        let cases = [
            ("/api/v1/tts", json!({"text": "  "})),
            ("/api/v1/summary", json!({})),
            ("/api/v1/analysis/question", json!({"question": "Why Rust?"})),
            ("/api/v1/analysis/interview", json!({"questions": []})),
        ];

        for (uri, body) in cases {
            let app = build_router(test_state());
            let response = app.oneshot(post_json(uri, body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_answer_upload_without_file_is_rejected() {
        let boundary = "coach-test-boundary";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{boundary}--\r\n"
        );
        let request = Request::post("/api/v1/answers")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = build_router(test_state()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "file required");
    }

    #[tokio::test]
    async fn test_unreachable_model_yields_generic_llm_error() {
        let cases = [
            ("/api/v1/summary", json!({"transcript": "I led a migration."})),
            (
                "/api/v1/analysis/question",
                json!({"question": "Why Rust?", "response": "Memory safety without a GC."}),
            ),
        ];

        for (uri, body) in cases {
            let response = build_router(test_state())
                .oneshot(post_json(uri, body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{uri}");

            let body = body_json(response).await;
            assert_eq!(body["error"]["code"], "LLM_ERROR");
            assert_eq!(body["error"]["message"], "An AI processing error occurred");
            assert!(!body.to_string().contains("127.0.0.1"));
        }
    }

    #[tokio::test]
    async fn test_unknown_path_without_static_dir_is_not_found() {
        let response = build_router(test_state())
            .oneshot(Request::get("/practice.html").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
