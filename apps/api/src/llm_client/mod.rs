/// LLM Client: the single point of entry for all hosted model calls in Coach.
///
/// ARCHITECTURAL RULE: No other module may call a model endpoint directly.
/// All model interactions MUST go through this module.
///
/// Speaks the OpenAI-compatible wire format: chat completions (plain text and
/// `input_audio` parts), speech synthesis and embeddings. Calls are never
/// retried; failures surface to the caller as `LlmError`.
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

/// Audio-understanding model (transcription and voice analysis).
pub const AUDIO_UNDERSTANDING_MODEL: &str = "higgs-audio-understanding-Hackathon";
/// Speech-synthesis model. Returns raw s16le PCM at 24 kHz.
pub const AUDIO_GENERATION_MODEL: &str = "higgs-audio-generation-Hackathon";
/// Text model used to score answers and summarize interviews.
/// Emits a `</think>` reasoning preamble before its answer.
pub const SCORING_MODEL: &str = "Qwen3-Omni-30B-A3B-Thinking-Hackathon";
/// Chat model used for question generation and coaching comments.
pub const CHAT_MODEL: &str = "gpt-4o-mini";
pub const EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const MAX_TOKENS: u32 = 4096;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model returned empty content")]
    EmptyContent,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    InputAudio { input_audio: InputAudio },
}

#[derive(Debug, Serialize)]
struct InputAudio {
    data: String,
    format: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Extracts the trimmed text content of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Parameters for a plain text completion.
#[derive(Debug, Clone, Copy)]
pub struct TextCompletion<'a> {
    pub model: &'a str,
    pub system: &'a str,
    pub prompt: &'a str,
    pub temperature: f32,
    pub max_tokens: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Client for one OpenAI-compatible endpoint. Coach holds two of these:
/// the Boson endpoint (audio + scoring) and the OpenAI endpoint
/// (questions, comments, embeddings).
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a system + user text prompt and returns the raw text of the first choice.
    pub async fn complete(&self, request: TextCompletion<'_>) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: request.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(request.system),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Text(request.prompt),
                },
            ],
            temperature: request.temperature,
            max_tokens: Some(request.max_tokens),
            max_completion_tokens: None,
        };

        debug!(
            "Text completion: model={}, prompt_chars={}",
            request.model,
            request.prompt.len()
        );
        self.chat(&body).await
    }

    /// Sends audio bytes as a base64 `input_audio` part with a system instruction.
    /// Runs at temperature 0 so repeated transcriptions agree.
    pub async fn understand_audio(
        &self,
        system: &str,
        audio: &[u8],
        format: &str,
    ) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: AUDIO_UNDERSTANDING_MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(system),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Parts(vec![ContentPart::InputAudio {
                        input_audio: InputAudio {
                            data: BASE64.encode(audio),
                            format: format.to_string(),
                        },
                    }]),
                },
            ],
            temperature: 0.0,
            max_tokens: None,
            max_completion_tokens: Some(MAX_TOKENS),
        };

        debug!("Audio understanding: {} bytes of {format}", audio.len());
        self.chat(&body).await
    }

    /// Requests raw PCM (s16le, mono, 24 kHz) for `text`.
    /// Callers wrap the result with `audio::wav::pcm_to_wav` before serving it.
    pub async fn synthesize_speech(&self, voice: &str, text: &str) -> Result<Vec<u8>, LlmError> {
        let body = SpeechRequest {
            model: AUDIO_GENERATION_MODEL,
            voice,
            input: text,
            response_format: "pcm",
        };

        let response = self.post("audio/speech", &body).await?;
        let pcm = response.bytes().await?;
        if pcm.is_empty() {
            return Err(LlmError::EmptyContent);
        }

        debug!("Speech synthesis returned {} PCM bytes", pcm.len());
        Ok(pcm.to_vec())
    }

    /// Embeds each input, preserving input order.
    pub async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        let body = EmbeddingRequest {
            model: EMBEDDING_MODEL,
            input: inputs,
        };

        let response: EmbeddingResponse = self.post_json("embeddings", &body).await?;
        if response.data.len() != inputs.len() {
            return Err(LlmError::Api {
                status: 200,
                message: format!(
                    "expected {} embeddings, got {}",
                    inputs.len(),
                    response.data.len()
                ),
            });
        }

        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }

    async fn chat(&self, body: &ChatRequest<'_>) -> Result<String, LlmError> {
        let response: ChatResponse = self.post_json("chat/completions", body).await?;

        if let Some(usage) = &response.usage {
            debug!(
                "Chat call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, LlmError> {
        let response = self.post(path, body).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(LlmError::Parse)
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<reqwest::Response, LlmError> {
        let response = self
            .client
            .post(endpoint_url(&self.base_url, path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Model API returned {}: {}", status, body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: api_error_message(body),
            });
        }

        Ok(response)
    }
}

fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

/// Pulls `error.message` out of an OpenAI-style error body, else returns the body.
fn api_error_message(body: String) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_joins_without_double_slash() {
        assert_eq!(
            endpoint_url("https://api.openai.com/v1/", "chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            endpoint_url("https://hackathon.boson.ai/v1", "audio/speech"),
            "https://hackathon.boson.ai/v1/audio/speech"
        );
    }

    #[test]
    fn test_audio_request_serializes_input_audio_part() {
        let body = ChatRequest {
            model: AUDIO_UNDERSTANDING_MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![ContentPart::InputAudio {
                    input_audio: InputAudio {
                        data: BASE64.encode(b"RIFF"),
                        format: "wav".to_string(),
                    },
                }]),
            }],
            temperature: 0.0,
            max_tokens: None,
            max_completion_tokens: Some(MAX_TOKENS),
        };

        let value = serde_json::to_value(&body).unwrap();
        let part = &value["messages"][0]["content"][0];
        assert_eq!(part["type"], "input_audio");
        assert_eq!(part["input_audio"]["data"], "UklGRg==");
        assert_eq!(part["input_audio"]["format"], "wav");
        assert_eq!(value["max_completion_tokens"], 4096);
        assert!(value.get("max_tokens").is_none());
    }

    #[test]
    fn test_text_request_serializes_plain_string_content() {
        let body = ChatRequest {
            model: SCORING_MODEL,
            messages: vec![ChatMessage {
                role: "system",
                content: MessageContent::Text("You are an expert interview coach."),
            }],
            temperature: 0.0,
            max_tokens: Some(MAX_TOKENS),
            max_completion_tokens: None,
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value["messages"][0]["content"],
            "You are an expert interview coach."
        );
        assert_eq!(value["max_tokens"], 4096);
    }

    #[test]
    fn test_chat_response_text_takes_first_choice_trimmed() {
        let json = r#"{
            "choices": [
                {"message": {"content": "  {\"score\": 7}\n"}},
                {"message": {"content": "ignored"}}
            ],
            "usage": {"prompt_tokens": 12, "completion_tokens": 5}
        }"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), Some("{\"score\": 7}"));
    }

    #[test]
    fn test_chat_response_without_content_has_no_text() {
        let json = r#"{"choices": [{"message": {"content": null}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_api_error_message_prefers_error_envelope() {
        let body = r#"{"error": {"message": "Invalid API key", "type": "auth"}}"#.to_string();
        assert_eq!(api_error_message(body), "Invalid API key");
        assert_eq!(api_error_message("bad gateway".to_string()), "bad gateway");
    }
}
