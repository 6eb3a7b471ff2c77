//! Gesture translator: absolute touch positions to relative mouse motion.
//!
//! The touchpad surface reports absolute positions.  The host wants relative
//! motion.  The translator remembers the previous sample of the current
//! contact and emits the scaled difference for each new sample.
//!
//! - The first sample of a contact only records the position.
//! - Each later sample emits one [`RelayCommand::MouseMove`] with
//!   `round((x - last_x) * sensitivity)` and the same for `y`.
//! - Contact end forgets the previous sample, so lifting and touching
//!   elsewhere never produces a jump.
//!
//! Rounding is half-up (`floor(v + 0.5)`), which differs from
//! [`f64::round`] for negative halves: `-0.5` rounds to `0`, not `-1`.

use crate::protocol::commands::RelayCommand;

/// Default motion multiplier.
pub const DEFAULT_SENSITIVITY: f64 = 2.0;

/// Tracks the previous touch sample of the current contact.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureTranslator {
    last: Option<(f64, f64)>,
    sensitivity: f64,
}

impl Default for GestureTranslator {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVITY)
    }
}

impl GestureTranslator {
    /// Creates a translator with the given motion multiplier.
    ///
    /// Non-finite or non-positive values fall back to [`DEFAULT_SENSITIVITY`].
    pub fn new(sensitivity: f64) -> Self {
        let sensitivity = if sensitivity.is_finite() && sensitivity > 0.0 {
            sensitivity
        } else {
            DEFAULT_SENSITIVITY
        };
        Self {
            last: None,
            sensitivity,
        }
    }

    /// The motion multiplier in use.
    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    /// Returns `true` while a contact is being tracked.
    pub fn in_contact(&self) -> bool {
        self.last.is_some()
    }

    /// Feeds one touch sample.
    ///
    /// Returns `None` for the first sample of a contact and a
    /// [`RelayCommand::MouseMove`] for every later sample, including a
    /// `(0, 0)` move when the finger did not travel far enough to round away.
    ///
    /// # Example
    ///
    /// ```rust
    /// use relay_core::{GestureTranslator, RelayCommand};
    ///
    /// let mut g = GestureTranslator::default();
    /// assert_eq!(g.on_move(100.0, 100.0), None);
    /// assert_eq!(
    ///     g.on_move(103.0, 99.0),
    ///     Some(RelayCommand::MouseMove { dx: 6, dy: -2 })
    /// );
    /// ```
    pub fn on_move(&mut self, x: f64, y: f64) -> Option<RelayCommand> {
        let previous = self.last.replace((x, y));
        let (last_x, last_y) = previous?;
        Some(RelayCommand::MouseMove {
            dx: round_half_up((x - last_x) * self.sensitivity),
            dy: round_half_up((y - last_y) * self.sensitivity),
        })
    }

    /// Ends the current contact.  Emits nothing.
    pub fn on_contact_end(&mut self) {
        self.last = None;
    }
}

/// `floor(v + 0.5)`, saturating at the `i32` range.
fn round_half_up(v: f64) -> i32 {
    // `as` saturates for out-of-range floats and maps NaN to 0.
    (v + 0.5).floor() as i32
}

// ── Tests ─────────────────────────────────────────────────────────────────────
