//! Audio module - one-shot cues raised by animation events.

mod plugin;

pub use plugin::{cue_for, AudioCue, GameAudioPlugin};
