//! Recording transport for tests.
//!
//! [`MockConnector`] never touches the network.  Each opened handle accepts
//! frames into a real [`OutboundQueue`] (so the backpressure policy applies)
//! that is never drained, and records every accepted frame.  Clones share
//! the same records, so a test keeps one clone and hands the other to the
//! session.
//!
//! ```ignore
//! let connector = MockConnector::new();
//! let session = RemoteSession::new(SessionPorts { connector: Box::new(connector.clone()), .. }, ..);
//! session.connect_url("ws://10.0.0.2:8765?pin=1111")?;
//! assert_eq!(connector.opened_urls(), vec!["ws://10.0.0.2:8765?pin=1111"]);
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use relay_core::ConnectionEndpoint;
use tokio::sync::mpsc::UnboundedSender;

use crate::application::outbound::OutboundQueue;
use crate::application::ports::{
    OutboundFrame, TransportConnector, TransportError, TransportHandle,
};
use crate::domain::state::{TransportEvent, TransportEventKind};

const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug)]
struct MockState {
    opened: Vec<String>,
    sent: Vec<OutboundFrame>,
    log: Vec<String>,
    closed: usize,
    capacity: usize,
    auto_open: bool,
    fail_next: Option<TransportError>,
    last: Option<(u64, UnboundedSender<TransportEvent>)>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            opened: Vec::new(),
            sent: Vec::new(),
            log: Vec::new(),
            closed: 0,
            capacity: DEFAULT_CAPACITY,
            auto_open: false,
            fail_next: None,
            last: None,
        }
    }
}

/// A connector that records instead of connecting.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    state: Arc<Mutex<MockState>>,
}

impl MockConnector {
    /// A connector whose transports stay in the handshake until a test
    /// calls [`emit`](Self::emit).
    pub fn new() -> Self {
        Self::default()
    }

    /// A connector whose transports report `Opened` immediately.
    pub fn auto_open() -> Self {
        let connector = Self::default();
        connector.lock().auto_open = true;
        connector
    }

    /// Makes the next [`TransportConnector::open`] fail with `error`.
    pub fn fail_next_open(&self, error: TransportError) {
        self.lock().fail_next = Some(error);
    }

    /// Queue capacity of transports opened from now on.
    pub fn set_capacity(&self, capacity: usize) {
        self.lock().capacity = capacity;
    }

    /// Sends a lifecycle event as the most recently opened transport.
    ///
    /// # Panics
    ///
    /// Panics if no transport has been opened yet, so a test that emits
    /// before the session connected fails loudly.
    pub fn emit(&self, kind: TransportEventKind) {
        let state = self.lock();
        let Some((attempt, events)) = state.last.as_ref() else {
            panic!("MockConnector::emit({kind:?}) before any transport was opened");
        };
        let _ = events.send(TransportEvent {
            attempt: *attempt,
            kind,
        });
    }

    /// URLs passed to `open`, in order.
    pub fn opened_urls(&self) -> Vec<String> {
        self.lock().opened.clone()
    }

    /// Text of every frame accepted by any handle, in order.
    pub fn sent_texts(&self) -> Vec<String> {
        self.lock().sent.iter().map(|f| f.text.clone()).collect()
    }

    /// `discard_audio` / `close` calls on any handle, in order.
    pub fn log(&self) -> Vec<String> {
        self.lock().log.clone()
    }

    /// How many handles were closed.
    pub fn closed_count(&self) -> usize {
        self.lock().closed
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TransportConnector for MockConnector {
    fn open(
        &mut self,
        endpoint: &ConnectionEndpoint,
        attempt: u64,
        events: UnboundedSender<TransportEvent>,
    ) -> Result<Box<dyn TransportHandle>, TransportError> {
        let mut state = self.lock();
        if let Some(error) = state.fail_next.take() {
            return Err(error);
        }
        state.opened.push(endpoint.to_url());
        if state.auto_open {
            let _ = events.send(TransportEvent::opened(attempt));
        }
        state.last = Some((attempt, events));
        let queue = OutboundQueue::new(state.capacity);
        drop(state);

        Ok(Box::new(MockHandle {
            state: Arc::clone(&self.state),
            queue,
            closed: false,
        }))
    }
}

struct MockHandle {
    state: Arc<Mutex<MockState>>,
    queue: OutboundQueue,
    closed: bool,
}

impl MockHandle {
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TransportHandle for MockHandle {
    fn send(&self, frame: OutboundFrame) -> Result<(), TransportError> {
        self.queue.push(frame.clone())?;
        self.lock().sent.push(frame);
        Ok(())
    }

    fn discard_pending_audio(&self) -> usize {
        self.lock().log.push("discard_audio".to_string());
        self.queue.purge_audio()
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.queue.close();
        let mut state = self.lock();
        state.log.push("close".to_string());
        state.closed += 1;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    #[should_panic(expected = "before any transport was opened")]
    fn test_emit_without_open_transport_panics() {
        MockConnector::new().emit(TransportEventKind::Closed);
    }

    #[test]
    fn test_emit_reaches_latest_attempt() {
        // Arrange
        let mut connector = MockConnector::new();
        let endpoint = ConnectionEndpoint::parse_url("ws://10.0.0.2:8765?pin=1111").unwrap();
        let (tx, mut rx) = unbounded_channel();
        let _handle = connector.open(&endpoint, 3, tx).unwrap();

        // Act
        connector.emit(TransportEventKind::Opened);

        // Assert
        assert_eq!(rx.try_recv().unwrap(), TransportEvent::opened(3));
        assert_eq!(connector.opened_urls(), vec![endpoint.to_url()]);
    }
}
