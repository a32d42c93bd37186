//! Converts uploaded answers (webm/ogg/mp3/...) to mono 16 kHz WAV with ffmpeg.

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, error};

use crate::audio::AudioError;

/// Assumed container when the upload has no usable extension (browser recordings).
pub const DEFAULT_INPUT_EXT: &str = "webm";
const TARGET_SAMPLE_RATE: &str = "16000";

/// Lower-cased ASCII-alphanumeric extension of `filename`, or `webm`.
pub fn input_extension(filename: &str) -> String {
    let ext: String = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase();

    if ext.is_empty() {
        DEFAULT_INPUT_EXT.to_string()
    } else {
        ext
    }
}

/// Runs `ffmpeg -y -i in.<ext> -ar 16000 -ac 1 out.wav` in a scratch directory
/// and returns the output bytes. The directory is removed on return.
pub async fn transcode_to_wav(ffmpeg: &str, input: &[u8], ext: &str) -> Result<Vec<u8>, AudioError> {
    let ext: String = ext.chars().filter(char::is_ascii_alphanumeric).collect();
    let ext = if ext.is_empty() { DEFAULT_INPUT_EXT } else { ext.as_str() };

    let scratch = tempfile::tempdir()?;
    let input_path = scratch.path().join(format!("in.{ext}"));
    let output_path = scratch.path().join("out.wav");
    tokio::fs::write(&input_path, input).await?;

    let output = Command::new(ffmpeg)
        .arg("-y")
        .arg("-i")
        .arg(&input_path)
        .args(["-ar", TARGET_SAMPLE_RATE, "-ac", "1"])
        .arg(&output_path)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        error!("ffmpeg failed on .{ext} input: {stderr}");
        return Err(AudioError::Transcode {
            status: output.status.code().unwrap_or(-1),
            stderr,
        });
    }

    let wav = tokio::fs::read(&output_path).await?;
    debug!("Transcoded {} bytes of .{ext} to {} bytes of WAV", input.len(), wav.len());
    Ok(wav)
}

/// WAV uploads pass through untouched; anything else is transcoded.
pub async fn prepare_answer_audio(
    ffmpeg: &str,
    bytes: &[u8],
    filename: &str,
) -> Result<Vec<u8>, AudioError> {
    match input_extension(filename).as_str() {
        "wav" | "wave" => Ok(bytes.to_vec()),
        ext => transcode_to_wav(ffmpeg, bytes, ext).await,
    }
}
