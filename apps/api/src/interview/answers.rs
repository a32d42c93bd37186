//! Spoken-answer understanding: one transcription call and one voice-analysis
//! call against the same WAV payload.

use serde::Serialize;
use tracing::info;

use crate::audio::wav::wav_duration_seconds;
use crate::errors::AppError;
use crate::llm_client::LlmClient;

pub const TRANSCRIBE_SYSTEM: &str = "Please transcribe this audio exactly as spoken.";
pub const VOICE_ANALYSIS_SYSTEM: &str = "Analyze the audio for speaker characteristics, clarity, tone, \
    background noise, pitch, speech rate, and pronunciation. \
    Do NOT include the transcript, only the analysis.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceAnalysis {
    /// `None` when the WAV header could not be read.
    pub duration_seconds: Option<f64>,
    pub analysis_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerAnalysis {
    pub transcript: String,
    pub analysis: VoiceAnalysis,
}

/// Transcribes and analyzes a WAV answer. Both calls run concurrently.
pub async fn analyze_answer_audio(llm: &LlmClient, wav: &[u8]) -> Result<AnswerAnalysis, AppError> {
    let duration_seconds = wav_duration_seconds(wav);

    let (transcript, analysis_text) = tokio::try_join!(
        llm.understand_audio(TRANSCRIBE_SYSTEM, wav, "wav"),
        llm.understand_audio(VOICE_ANALYSIS_SYSTEM, wav, "wav"),
    )
    .map_err(|e| AppError::Llm(format!("Audio understanding failed: {e}")))?;

    info!(
        "Answer transcribed: {} chars, duration {:?}s",
        transcript.len(),
        duration_seconds
    );

    Ok(AnswerAnalysis {
        transcript,
        analysis: VoiceAnalysis {
            duration_seconds,
            analysis_text,
        },
    })
}
