use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenAI-compatible endpoint serving the audio models and the scoring model.
    pub boson_api_base: String,
    pub boson_api_key: String,
    /// OpenAI endpoint serving question generation, comments and embeddings.
    pub openai_api_base: String,
    pub openai_api_key: String,
    pub tts_voice: String,
    pub ffmpeg_path: String,
    pub retrieval_top_k: usize,
    /// Frontend bundle served for any path the API does not claim.
    pub static_dir: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            boson_api_base: env_or("BOSON_API_BASE", "https://hackathon.boson.ai/v1"),
            boson_api_key: require_env("BOSON_API_KEY")?,
            openai_api_base: env_or("OPENAI_API_BASE", "https://api.openai.com/v1"),
            openai_api_key: require_env("OPENAI_API_KEY")?,
            tts_voice: env_or("HIGGS_TTS_VOICE", "en_woman_1"),
            ffmpeg_path: env_or("FFMPEG_PATH", "ffmpeg"),
            retrieval_top_k: env_or("RETRIEVAL_TOP_K", "5")
                .parse::<usize>()
                .context("RETRIEVAL_TOP_K must be a positive integer")?,
            static_dir: std::env::var("STATIC_DIR").ok().filter(|s| !s.is_empty()),
            port: env_or("PORT", "5000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
