// Audio plumbing for the answer and speech endpoints.
// WAV framing via hound; format conversion via an ffmpeg subprocess.

pub mod transcode;
pub mod wav;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("ffmpeg exited with status {status}: {stderr}")]
    Transcode { status: i32, stderr: String },
}
