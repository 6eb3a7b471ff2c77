//! An [`InputSink`] that only logs.
//!
//! Stands in for OS input injection.  Typed text and audio are never written
//! to the log; only their sizes are.

use std::sync::atomic::{AtomicU64, Ordering};

use relay_core::{KeyName, MouseButton, ScrollDirection};
use tracing::{debug, info};

use crate::application::input_sink::{InputSink, SinkError};

#[derive(Debug, Default)]
pub struct LoggingInputSink {
    audio_bytes: AtomicU64,
}

impl LoggingInputSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total audio bytes received so far.
    pub fn audio_bytes(&self) -> u64 {
        self.audio_bytes.load(Ordering::Relaxed)
    }
}

impl InputSink for LoggingInputSink {
    fn move_pointer(&self, dx: i32, dy: i32) -> Result<(), SinkError> {
        debug!("pointer move dx={dx} dy={dy}");
        Ok(())
    }

    fn click(&self, button: MouseButton) -> Result<(), SinkError> {
        info!("click {}", button.as_str());
        Ok(())
    }

    fn scroll(&self, direction: ScrollDirection) -> Result<(), SinkError> {
        info!("scroll {direction:?}");
        Ok(())
    }

    fn press_key(&self, key: KeyName) -> Result<(), SinkError> {
        info!("key {}", key.as_str());
        Ok(())
    }

    fn type_text(&self, text: &str) -> Result<(), SinkError> {
        info!("typed {} character(s)", text.chars().count());
        Ok(())
    }

    fn audio_chunk(&self, pcm: &[u8]) -> Result<(), SinkError> {
        let total = self.audio_bytes.fetch_add(pcm.len() as u64, Ordering::Relaxed) + pcm.len() as u64;
        debug!("audio chunk {} bytes ({total} total)", pcm.len());
        Ok(())
    }
}
