//! Synthetic microphone producing a sine tone.
//!
//! Used when the binary is built without `cpal-capture`, or when no input
//! device exists.  Samples are generated on demand from wall-clock time, so
//! chunk sizes match what real hardware would deliver at the configured rate.

use std::f32::consts::TAU;
use std::time::Instant;

use relay_core::{f32_to_pcm16, CaptureConfig};

use crate::application::ports::{AudioError, CaptureStream, MicrophoneSource};

/// Default tone pitch in Hz.
pub const DEFAULT_TONE_HZ: f32 = 440.0;

/// Peak amplitude relative to full scale.
const AMPLITUDE: f32 = 0.25;

#[derive(Debug, Clone)]
pub struct ToneMicrophone {
    frequency: f32,
}

impl ToneMicrophone {
    pub fn new(frequency: f32) -> Self {
        Self { frequency }
    }
}

impl Default for ToneMicrophone {
    fn default() -> Self {
        Self::new(DEFAULT_TONE_HZ)
    }
}

impl MicrophoneSource for ToneMicrophone {
    fn open(&mut self, config: &CaptureConfig) -> Result<Box<dyn CaptureStream>, AudioError> {
        if config.sample_rate == 0 {
            return Err(AudioError::UnsupportedFormat(
                "sample rate must be non-zero".to_string(),
            ));
        }
        Ok(Box::new(ToneStream {
            frequency: self.frequency,
            sample_rate: config.sample_rate,
            started: Instant::now(),
            produced: 0,
            stopped: false,
        }))
    }
}

struct ToneStream {
    frequency: f32,
    sample_rate: u32,
    started: Instant,
    /// Samples handed out so far.
    produced: u64,
    stopped: bool,
}

impl ToneStream {
    fn render(&self, from: u64, count: usize) -> Vec<i16> {
        let rate = self.sample_rate as f32;
        (0..count as u64)
            .map(|i| {
                // Phase wraps per sample index so precision holds for long runs.
                let n = (from + i) % u64::from(self.sample_rate);
                let t = n as f32 / rate;
                f32_to_pcm16((TAU * self.frequency * t).sin() * AMPLITUDE)
            })
            .collect()
    }
}

impl CaptureStream for ToneStream {
    fn take_samples(&mut self) -> Vec<i16> {
        if self.stopped {
            return Vec::new();
        }
        let due = (self.started.elapsed().as_secs_f64() * f64::from(self.sample_rate)) as u64;
        let pending = due.saturating_sub(self.produced);
        // At most one second per call; anything older is skipped.
        let count = pending.min(u64::from(self.sample_rate));
        let from = due - count;
        let samples = self.render(from, count as usize);
        self.produced = due;
        samples
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}
