//! Rendering of synthesized speech.
//!
//! Speech arrives as base64-encoded 16-bit little-endian PCM, 24 kHz mono.
//! [`AudioContext`] is an explicitly owned output resource: it opens its
//! output directory on first use, and [`AudioContext::close`] releases it.
//! A closed context reopens on the next render.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub const SAMPLE_RATE: u32 = 24_000;
pub const NUM_CHANNELS: u16 = 1;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Invalid base64 audio payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("PCM payload of {0} bytes is not a whole number of 16-bit samples")]
    TruncatedSample(usize),
    #[error("Failed to write WAV file: {0}")]
    Wav(#[from] hound::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Decoded audio with samples normalized to `[-1.0, 1.0)`, interleaved by channel.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<f32>,
}

impl AudioBuffer {
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frame_count() as f64 / self.sample_rate as f64)
    }
}

/// Decode raw little-endian 16-bit PCM.
pub fn decode_pcm(
    bytes: &[u8],
    sample_rate: u32,
    channels: u16,
) -> Result<AudioBuffer, AudioError> {
    if bytes.len() % 2 != 0 {
        return Err(AudioError::TruncatedSample(bytes.len()));
    }

    let samples = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect();

    Ok(AudioBuffer {
        sample_rate,
        channels,
        samples,
    })
}

/// Decode a base64 speech payload at the provider's fixed format.
pub fn decode_speech(base64_audio: &str) -> Result<AudioBuffer, AudioError> {
    let bytes = STANDARD.decode(base64_audio.trim())?;
    decode_pcm(&bytes, SAMPLE_RATE, NUM_CHANNELS)
}

/// Write a buffer as a 16-bit integer WAV file.
pub fn write_wav(buffer: &AudioBuffer, path: &Path) -> Result<(), AudioError> {
    let spec = hound::WavSpec {
        channels: buffer.channels,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for sample in &buffer.samples {
        writer.write_sample((sample * 32768.0).clamp(i16::MIN as f32, i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Never used yet
    Idle,
    Running,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedAudio {
    pub path: PathBuf,
    pub duration: Duration,
}

#[derive(Debug)]
pub struct AudioContext {
    output_dir: PathBuf,
    state: ContextState,
    rendered: u32,
}

impl AudioContext {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            state: ContextState::Idle,
            rendered: 0,
        }
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn acquire(&mut self) -> Result<(), AudioError> {
        if self.state != ContextState::Running {
            std::fs::create_dir_all(&self.output_dir)?;
            debug!("Audio context opened at {}", self.output_dir.display());
            self.state = ContextState::Running;
        }
        Ok(())
    }

    /// Decode a speech payload and write it out as a WAV file.
    pub fn render(&mut self, base64_audio: &str) -> Result<RenderedAudio, AudioError> {
        let buffer = decode_speech(base64_audio)?;
        self.acquire()?;

        self.rendered += 1;
        let path = self.output_dir.join(format!(
            "speech-{}-{}.wav",
            chrono::Utc::now().timestamp_millis(),
            self.rendered
        ));
        write_wav(&buffer, &path)?;

        info!(
            "Rendered {:.1}s of speech to {}",
            buffer.duration().as_secs_f64(),
            path.display()
        );
        Ok(RenderedAudio {
            path,
            duration: buffer.duration(),
        })
    }

    pub fn close(&mut self) {
        if self.state == ContextState::Running {
            debug!("Audio context closed after {} renders", self.rendered);
            self.state = ContextState::Closed;
        }
    }
}

impl Drop for AudioContext {
    fn drop(&mut self) {
        self.close();
    }
}
