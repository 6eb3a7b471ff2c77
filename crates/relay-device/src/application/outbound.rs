//! Bounded outbound frame queue.
//!
//! The session pushes encoded frames synchronously; the transport writer task
//! awaits them with [`OutboundQueue::pop`] and writes them in FIFO order.
//!
//! When the queue is full:
//!
//! - the oldest queued **audio** frame is dropped to make room for the new
//!   frame, whatever its kind;
//! - if no audio frame is queued, the new frame is rejected with
//!   [`TransportError::QueueFull`].  Control frames are never dropped to make
//!   room for anything.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use tracing::debug;

use crate::application::ports::{OutboundFrame, TransportError};

/// Result of a successful [`OutboundQueue::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The frame was queued without displacing anything.
    Queued,
    /// The frame was queued after dropping the oldest audio frame.
    DroppedOldestAudio,
}

#[derive(Debug, Default)]
struct QueueState {
    frames: VecDeque<OutboundFrame>,
    closed: bool,
}

/// FIFO frame queue shared by one producer (the session) and one consumer
/// (the transport writer).
#[derive(Debug)]
pub struct OutboundQueue {
    state: Mutex<QueueState>,
    notify: Notify,
    capacity: usize,
}

impl OutboundQueue {
    /// Creates a queue holding at most `capacity` frames (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            notify: Notify::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().frames.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Appends a frame, applying the drop-oldest-audio policy when full.
    ///
    /// # Errors
    ///
    /// [`TransportError::Closed`] after [`close`](Self::close);
    /// [`TransportError::QueueFull`] when the queue holds only control frames.
    pub fn push(&self, frame: OutboundFrame) -> Result<PushOutcome, TransportError> {
        let mut state = self.lock();
        if state.closed {
            return Err(TransportError::Closed);
        }

        let mut outcome = PushOutcome::Queued;
        if state.frames.len() >= self.capacity {
            let oldest_audio = state
                .frames
                .iter()
                .position(OutboundFrame::is_audio)
                .ok_or(TransportError::QueueFull)?;
            state.frames.remove(oldest_audio);
            outcome = PushOutcome::DroppedOldestAudio;
        }

        state.frames.push_back(frame);
        drop(state);
        self.notify.notify_one();
        Ok(outcome)
    }

    /// Waits for the next frame.  Returns `None` once the queue is closed and
    /// drained.
    pub async fn pop(&self) -> Option<OutboundFrame> {
        loop {
            // Register interest before checking, so a push between the check
            // and the await is not missed.
            let notified = self.notify.notified();
            {
                let mut state = self.lock();
                if let Some(frame) = state.frames.pop_front() {
                    return Some(frame);
                }
                if state.closed {
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Removes all queued audio frames.  Returns how many were removed.
    pub fn purge_audio(&self) -> usize {
        let mut state = self.lock();
        let before = state.frames.len();
        state.frames.retain(|f| !f.is_audio());
        let purged = before - state.frames.len();
        if purged > 0 {
            debug!("purged {purged} pending audio frame(s)");
        }
        purged
    }

    /// Closes the queue.  Pending frames are discarded; the consumer's
    /// [`pop`](Self::pop) returns `None`.
    pub fn close(&self) {
        {
            let mut state = self.lock();
            state.closed = true;
            state.frames.clear();
        }
        self.notify.notify_waiters();
        self.notify.notify_one();
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
