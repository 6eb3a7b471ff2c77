//! Audio relay session: one microphone capture, sliced into chunks.
//!
//! The session owns the capture stream for its whole lifetime.  The event
//! loop calls [`AudioRelaySession::tick`] once per chunk interval; each tick
//! drains what the microphone captured since the previous tick and turns it
//! into one `audio_stream` command.  [`AudioRelaySession::stop`] stops and
//! releases the device; after it returns no tick produces anything.

use relay_core::{encode_chunk, CaptureConfig, RelayCommand};
use tracing::{debug, info};

use crate::application::ports::{AudioError, CaptureStream, MicrophoneSource};

pub struct AudioRelaySession {
    stream: Option<Box<dyn CaptureStream>>,
    chunks_emitted: u64,
}

impl AudioRelaySession {
    /// Acquires the microphone and starts capturing.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError`] when the source cannot open a stream.  Nothing
    /// is held in that case.
    pub fn start(
        source: &mut dyn MicrophoneSource,
        config: CaptureConfig,
    ) -> Result<Self, AudioError> {
        let stream = source.open(&config)?;
        info!(
            "audio capture started: {} Hz, {} channel(s), {} ms chunks",
            config.sample_rate,
            config.channels,
            config.chunk_interval.as_millis()
        );
        Ok(Self {
            stream: Some(stream),
            chunks_emitted: 0,
        })
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    pub fn chunks_emitted(&self) -> u64 {
        self.chunks_emitted
    }

    /// Slices the samples captured since the previous tick into a chunk.
    ///
    /// Returns `None` when stopped or when nothing was captured.
    pub fn tick(&mut self) -> Option<RelayCommand> {
        let stream = self.stream.as_mut()?;
        let samples = stream.take_samples();
        let data = encode_chunk(&samples)?;
        self.chunks_emitted += 1;
        Some(RelayCommand::AudioChunk { data })
    }

    /// Stops capture and releases the device.  Safe to call any number of
    /// times.
    pub fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            debug!(
                "audio capture stopped after {} chunk(s)",
                self.chunks_emitted
            );
        }
    }
}

impl Drop for AudioRelaySession {
    fn drop(&mut self) {
        self.stop();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
