//! Terminal stand-ins for the handheld's vibration motor and toast UI.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::application::ports::{HapticError, HapticFeedback, Notifier};
use crate::domain::state::{Notification, Severity};

/// Records haptic pulses in the debug log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogHaptics;

impl HapticFeedback for LogHaptics {
    fn pulse(&self, duration: Duration) -> Result<(), HapticError> {
        debug!("haptic pulse {} ms", duration.as_millis());
        Ok(())
    }
}

/// Prints notifications to stdout and mirrors them into the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Info => info!(kind = ?notification.kind, "{}", notification.message),
            Severity::Error => warn!(kind = ?notification.kind, "{}", notification.message),
        }
        println!("[{}]", notification);
    }
}
