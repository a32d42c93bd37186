use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::retrieval::Embedder;
use crate::sessions::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Audio understanding, speech synthesis and answer scoring.
    pub boson: LlmClient,
    /// Question generation and session comments.
    pub openai: LlmClient,
    /// Resume chunk embeddings. Default: the OpenAI client.
    pub embedder: Arc<dyn Embedder>,
    /// Session history. Default: `InMemorySessionStore`.
    pub sessions: Arc<dyn SessionStore>,
    pub config: Config,
}
