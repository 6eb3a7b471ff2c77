//! Microphone sources.
//!
//! - [`tone::ToneMicrophone`] – synthetic sine source, always available.
//! - `hardware::CpalMicrophone` – real input device (feature `cpal-capture`).
//! - [`mock::MockMicrophone`] – scripted source for tests.

#[cfg(feature = "cpal-capture")]
pub mod hardware;
pub mod mock;
pub mod tone;

use crate::application::ports::MicrophoneSource;

/// Picks the microphone for this build: the hardware device when
/// `cpal-capture` is enabled and one exists, otherwise the tone source.
pub fn default_microphone(preferred_device: Option<String>) -> Box<dyn MicrophoneSource> {
    #[cfg(feature = "cpal-capture")]
    {
        if hardware::CpalMicrophone::is_available() {
            return Box::new(hardware::CpalMicrophone::new(preferred_device));
        }
        tracing::warn!("no input device found; using the synthetic tone source");
    }
    #[cfg(not(feature = "cpal-capture"))]
    {
        if let Some(name) = preferred_device {
            tracing::warn!("built without cpal-capture; ignoring input device '{name}'");
        }
    }
    Box::new(tone::ToneMicrophone::default())
}
