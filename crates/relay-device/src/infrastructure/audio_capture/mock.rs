//! Scripted microphone for tests.
//!
//! Tests push samples with [`MockMicrophone::feed`]; the open stream hands
//! them out on the next `take_samples`.  Clones share state, so the test
//! keeps one handle and gives the other to the code under test.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use relay_core::CaptureConfig;

use crate::application::ports::{AudioError, CaptureStream, MicrophoneSource};

#[derive(Debug, Default)]
struct MicState {
    unavailable: bool,
    buffer: Vec<i16>,
    opens: usize,
    stops: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MockMicrophone {
    state: Arc<Mutex<MicState>>,
}

impl MockMicrophone {
    pub fn new() -> Self {
        Self::default()
    }

    /// A microphone whose `open` always fails, as if permission was denied.
    pub fn unavailable() -> Self {
        let mic = Self::default();
        lock(&mic.state).unavailable = true;
        mic
    }

    /// Appends samples as if the hardware had just captured them.
    pub fn feed(&self, samples: &[i16]) {
        lock(&self.state).buffer.extend_from_slice(samples);
    }

    /// Successful `open` calls.
    pub fn open_count(&self) -> usize {
        lock(&self.state).opens
    }

    /// Streams stopped (each stream counts once).
    pub fn stop_count(&self) -> usize {
        lock(&self.state).stops
    }
}

impl MicrophoneSource for MockMicrophone {
    fn open(&mut self, _config: &CaptureConfig) -> Result<Box<dyn CaptureStream>, AudioError> {
        let mut state = lock(&self.state);
        if state.unavailable {
            return Err(AudioError::Unavailable("permission denied".to_string()));
        }
        state.opens += 1;
        Ok(Box::new(MockStream {
            state: Arc::clone(&self.state),
            stopped: false,
        }))
    }
}

struct MockStream {
    state: Arc<Mutex<MicState>>,
    stopped: bool,
}

impl CaptureStream for MockStream {
    fn take_samples(&mut self) -> Vec<i16> {
        if self.stopped {
            return Vec::new();
        }
        std::mem::take(&mut lock(&self.state).buffer)
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            lock(&self.state).stops += 1;
        }
    }
}

impl Drop for MockStream {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock(state: &Mutex<MicState>) -> MutexGuard<'_, MicState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
