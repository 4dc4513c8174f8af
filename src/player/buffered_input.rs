//! Discrete button presses that stay valid for a short window.
//!
//! Input events and the per-frame state machine run at different rates. A
//! press is kept alive for `time_frame` seconds so the state that polls it a
//! frame later still sees it.

use serde::Deserialize;

/// Smallest and largest accepted buffer window, in seconds.
pub const MIN_TIME_FRAME: f32 = 0.01;
pub const MAX_TIME_FRAME: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "f32")]
pub struct BufferedInput {
    time_frame: f32,
    pressed_at: f32,
    active: bool,
}

impl Default for BufferedInput {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl From<f32> for BufferedInput {
    fn from(time_frame: f32) -> Self {
        Self::new(time_frame)
    }
}

impl BufferedInput {
    pub fn new(time_frame: f32) -> Self {
        Self {
            time_frame: time_frame.clamp(MIN_TIME_FRAME, MAX_TIME_FRAME),
            pressed_at: f32::NEG_INFINITY,
            active: false,
        }
    }

    pub fn time_frame(&self) -> f32 {
        self.time_frame
    }

    /// Record a fresh press at `now`.
    pub fn set(&mut self, now: f32) {
        self.active = true;
        self.pressed_at = now;
    }

    /// Consume the press.
    pub fn unset(&mut self) {
        self.active = false;
    }

    /// True while pressed, not consumed, and within the window.
    pub fn is_active_and_valid(&self, now: f32) -> bool {
        self.active && now - self.pressed_at <= self.time_frame
    }
}
