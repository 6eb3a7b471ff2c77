//! Audio capture parameters and chunk payload encoding.
//!
//! The device captures mono speech at 16 kHz and ships it in fixed-interval
//! chunks.  Each chunk is the samples captured since the previous tick,
//! encoded as 16-bit little-endian PCM and then standard base64.  That string
//! is the `data` field of an `audio_stream` frame.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Default chunk interval in milliseconds.
pub const DEFAULT_CHUNK_INTERVAL_MS: u64 = 100;

/// Default sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// Parameters requested from the microphone and the chunk slicer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Channel count.  The relay always requests mono.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Ask the capture device for echo cancellation.
    pub echo_cancellation: bool,
    /// Ask the capture device for noise suppression.
    pub noise_suppression: bool,
    /// How often captured samples are sliced into a chunk.
    pub chunk_interval: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: DEFAULT_SAMPLE_RATE,
            echo_cancellation: true,
            noise_suppression: true,
            chunk_interval: Duration::from_millis(DEFAULT_CHUNK_INTERVAL_MS),
        }
    }
}

impl CaptureConfig {
    /// Number of samples expected in one full chunk (all channels).
    pub fn samples_per_chunk(&self) -> usize {
        let per_second = u128::from(self.sample_rate) * u128::from(self.channels.max(1));
        let n = per_second * self.chunk_interval.as_millis() / 1000;
        usize::try_from(n).unwrap_or(usize::MAX)
    }
}

/// Encodes captured samples into an `audio_stream` payload.
///
/// Returns `None` for an empty slice; empty chunks are never sent.
///
/// # Example
///
/// ```rust
/// use relay_core::encode_chunk;
///
/// assert_eq!(encode_chunk(&[1, -1]).as_deref(), Some("AQD//w=="));
/// assert_eq!(encode_chunk(&[]), None);
/// ```
pub fn encode_chunk(samples: &[i16]) -> Option<String> {
    if samples.is_empty() {
        return None;
    }
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for s in samples {
        bytes.extend_from_slice(&s.to_le_bytes());
    }
    Some(STANDARD.encode(bytes))
}

/// Converts a float sample in `[-1.0, 1.0]` to PCM16, clamping out-of-range
/// input.
pub fn f32_to_pcm16(sample: f32) -> i16 {
    let clamped = if sample.is_nan() {
        0.0
    } else {
        sample.clamp(-1.0, 1.0)
    };
    (clamped * f32::from(i16::MAX)) as i16
}

// ── Tests ─────────────────────────────────────────────────────────────────────
