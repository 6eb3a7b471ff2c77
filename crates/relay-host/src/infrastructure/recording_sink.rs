//! Recording [`InputSink`] for tests.
//!
//! Every call is pushed into a `Mutex<Vec<SinkCall>>` so assertions can
//! inspect exactly what was dispatched and in what order.
//!
//! ```ignore
//! let sink = Arc::new(RecordingInputSink::new());
//! dispatch_frame(&*sink, r#"{"type":"key_press","key":"enter"}"#)?;
//! assert_eq!(sink.calls(), vec![SinkCall::Key(KeyName::Enter)]);
//! ```

use std::sync::{Mutex, PoisonError};

use relay_core::{KeyName, MouseButton, ScrollDirection};

use crate::application::input_sink::{InputSink, SinkError};

/// One recorded sink call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    Move(i32, i32),
    Click(MouseButton),
    Scroll(ScrollDirection),
    Key(KeyName),
    Text(String),
    Audio(Vec<u8>),
}

#[derive(Debug, Default)]
pub struct RecordingInputSink {
    calls: Mutex<Vec<SinkCall>>,
    /// When `true`, every method returns [`SinkError::Platform`].
    pub should_fail: bool,
}

impl RecordingInputSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every call fails.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Snapshot of the calls so far.
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: SinkCall) -> Result<(), SinkError> {
        if self.should_fail {
            return Err(SinkError::Platform("simulated failure".to_string()));
        }
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        Ok(())
    }
}

impl InputSink for RecordingInputSink {
    fn move_pointer(&self, dx: i32, dy: i32) -> Result<(), SinkError> {
        self.record(SinkCall::Move(dx, dy))
    }

    fn click(&self, button: MouseButton) -> Result<(), SinkError> {
        self.record(SinkCall::Click(button))
    }

    fn scroll(&self, direction: ScrollDirection) -> Result<(), SinkError> {
        self.record(SinkCall::Scroll(direction))
    }

    fn press_key(&self, key: KeyName) -> Result<(), SinkError> {
        self.record(SinkCall::Key(key))
    }

    fn type_text(&self, text: &str) -> Result<(), SinkError> {
        self.record(SinkCall::Text(text.to_string()))
    }

    fn audio_chunk(&self, pcm: &[u8]) -> Result<(), SinkError> {
        self.record(SinkCall::Audio(pcm.to_vec()))
    }
}
