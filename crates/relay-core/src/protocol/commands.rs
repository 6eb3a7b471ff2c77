//! Relay command types.
//!
//! Every message on the wire is one [`RelayCommand`].  The device produces
//! them; the host consumes them.  Commands carry no sequence number and no
//! acknowledgement is ever expected: each one is self-contained and can be
//! decoded on its own.
//!
//! # JSON discriminant
//!
//! Every command is a JSON object with a `"type"` field that identifies the
//! variant; all other fields sit at the top level of the same object:
//!
//! ```json
//! {"type":"mouse_move","dx":4,"dy":-2}
//! {"type":"mouse_click","button":"left"}
//! {"type":"audio_stream","data":"AAEC"}
//! ```
//!
//! Serde's `#[serde(tag = "type")]` attribute handles this automatically.

use serde::de::{Error as _, Unexpected};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::protocol::keys::KeyName;

/// One discrete instruction sent from the device to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayCommand {
    /// Relative cursor motion in host pixels.
    MouseMove {
        /// Horizontal delta; positive moves right.
        dx: i32,
        /// Vertical delta; positive moves down.
        dy: i32,
    },

    /// A single click of the given button.
    MouseClick {
        /// Which button to click.
        button: MouseButton,
    },

    /// One fixed scroll step.
    ///
    /// On the wire the direction is the `delta` field: `1` scrolls up, `-1`
    /// scrolls down.  Any other value fails to deserialize.
    MouseScroll {
        #[serde(rename = "delta")]
        direction: ScrollDirection,
    },

    /// A press of a named key from the fixed vocabulary.
    KeyPress {
        /// The key to press.
        key: KeyName,
    },

    /// A string to be typed on the host.  Never empty.
    TextType {
        /// The text to type.
        text: String,
    },

    /// One fixed-interval slice of microphone audio.
    ///
    /// On the wire this is tagged `audio_stream` (the name the host expects).
    #[serde(rename = "audio_stream")]
    AudioChunk {
        /// Standard base64 (RFC 4648, padded) of the chunk bytes.
        data: String,
    },
}

impl RelayCommand {
    /// Returns the wire `type` tag of this command.
    ///
    /// Used in log messages so that payloads (typed text, audio) never end up
    /// in the log.
    pub fn type_name(&self) -> &'static str {
        match self {
            RelayCommand::MouseMove { .. } => "mouse_move",
            RelayCommand::MouseClick { .. } => "mouse_click",
            RelayCommand::MouseScroll { .. } => "mouse_scroll",
            RelayCommand::KeyPress { .. } => "key_press",
            RelayCommand::TextType { .. } => "text_type",
            RelayCommand::AudioChunk { .. } => "audio_stream",
        }
    }

    /// Returns `true` for audio chunks.
    ///
    /// The outbound queue may drop audio frames under pressure but never
    /// control frames.
    pub fn is_audio(&self) -> bool {
        matches!(self, RelayCommand::AudioChunk { .. })
    }
}

/// Mouse button identifier used in [`RelayCommand::MouseClick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
}

impl MouseButton {
    /// Lowercase wire name of the button.
    pub fn as_str(self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
        }
    }
}

impl std::str::FromStr for MouseButton {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(MouseButton::Left),
            "right" => Ok(MouseButton::Right),
            other => Err(format!("unknown mouse button: {other}")),
        }
    }
}

/// Scroll direction of a scroll action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    /// The fixed wire delta for this direction: `1` for up, `-1` for down.
    pub fn delta(self) -> i32 {
        match self {
            ScrollDirection::Up => 1,
            ScrollDirection::Down => -1,
        }
    }

    /// Inverse of [`Self::delta`].  `None` for anything but `1` and `-1`.
    pub fn from_delta(delta: i64) -> Option<Self> {
        match delta {
            1 => Some(ScrollDirection::Up),
            -1 => Some(ScrollDirection::Down),
            _ => None,
        }
    }
}

impl Serialize for ScrollDirection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.delta())
    }
}

impl<'de> Deserialize<'de> for ScrollDirection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let delta = i64::deserialize(deserializer)?;
        ScrollDirection::from_delta(delta)
            .ok_or_else(|| D::Error::invalid_value(Unexpected::Signed(delta), &"1 or -1"))
    }
}

impl std::str::FromStr for ScrollDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(ScrollDirection::Up),
            "down" => Ok(ScrollDirection::Down),
            other => Err(format!("unknown scroll direction: {other}")),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
