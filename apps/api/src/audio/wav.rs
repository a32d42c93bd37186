//! WAV framing for synthesized speech and duration probing for uploads.

use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::audio::AudioError;

/// Sample rate of the speech-synthesis PCM stream.
pub const TTS_SAMPLE_RATE: u32 = 24_000;

/// Wraps little-endian s16 PCM in a mono 16-bit 24 kHz WAV container.
/// A trailing odd byte is dropped.
pub fn pcm_to_wav(pcm: &[u8]) -> Result<Vec<u8>, AudioError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: TTS_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(pcm.len() + 44));
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for frame in pcm.chunks_exact(2) {
            writer.write_sample(i16::from_le_bytes([frame[0], frame[1]]))?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

/// Frames divided by sample rate. `None` if `bytes` is not a readable WAV.
pub fn wav_duration_seconds(bytes: &[u8]) -> Option<f64> {
    let reader = WavReader::new(Cursor::new(bytes)).ok()?;
    let sample_rate = reader.spec().sample_rate;
    if sample_rate == 0 {
        return None;
    }
    Some(f64::from(reader.duration()) / f64::from(sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcm_to_wav_reads_back_as_mono_16bit_24khz() {
        let samples: Vec<i16> = vec![0, 1000, -1000, i16::MAX, i16::MIN, 42];
        let pcm: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();

        let wav = pcm_to_wav(&pcm).unwrap();
        let reader = WavReader::new(Cursor::new(&wav)).unwrap();
        let spec = reader.spec();

        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_rate, TTS_SAMPLE_RATE);
        assert_eq!(reader.len() as usize, pcm.len() / 2);

        let decoded: Vec<i16> = reader.into_samples::<i16>().map(Result::unwrap).collect();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn test_pcm_to_wav_empty_input_is_valid_wav() {
        let wav = pcm_to_wav(&[]).unwrap();
        assert_eq!(wav_duration_seconds(&wav), Some(0.0));
    }

    #[test]
    fn test_duration_of_one_second_of_speech() {
        let pcm = vec![0u8; TTS_SAMPLE_RATE as usize * 2];
        let wav = pcm_to_wav(&pcm).unwrap();
        assert_eq!(wav_duration_seconds(&wav), Some(1.0));
    }

    #[test]
    fn test_duration_of_non_wav_is_none() {
        assert_eq!(wav_duration_seconds(b"OggS not a wav file"), None);
    }
}
