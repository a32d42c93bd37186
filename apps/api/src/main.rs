mod audio;
mod config;
mod errors;
mod interview;
mod llm_client;
mod retrieval;
mod routes;
mod sessions;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::sessions::InMemorySessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Config before logging: RUST_LOG may come from .env
    let config = Config::from_env()?;
    init_tracing(&config.rust_log);

    info!("Starting Coach API v{}", env!("CARGO_PKG_VERSION"));

    let app = build_router(build_state(config.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `RUST_LOG` in the process environment wins; otherwise scope the
/// configured level to this crate.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={level}", env!("CARGO_PKG_NAME"))));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wires both model endpoints, the embedder and an empty session store.
fn build_state(config: Config) -> AppState {
    let boson = LlmClient::new(&config.boson_api_base, &config.boson_api_key);
    info!(
        "Boson endpoint: {} (scoring: {}, voice: {})",
        boson.base_url(),
        llm_client::SCORING_MODEL,
        config.tts_voice
    );

    let openai = LlmClient::new(&config.openai_api_base, &config.openai_api_key);
    info!(
        "OpenAI endpoint: {} (chat: {}, embeddings: {})",
        openai.base_url(),
        llm_client::CHAT_MODEL,
        llm_client::EMBEDDING_MODEL
    );

    AppState {
        boson,
        embedder: Arc::new(openai.clone()),
        openai,
        sessions: Arc::new(InMemorySessionStore::default()),
        config,
    }
}
