//! Player module - the state machine, its inputs and the body it drives.

mod animation;
mod buffered_input;
mod clips;
mod components;
mod flags;
mod machine;
mod movement;
mod plugin;
mod states;

pub use animation::{params, AnimationEvent, AnimationId, Animator, PlayerAnimator, RootMotion};
pub use buffered_input::BufferedInput;
pub use clips::{clip_for, Clip, ClipMarker, ClipPlayer};
pub use components::*;
pub use flags::PlayerFlags;
pub use machine::{Motion, PlayerContext, PlayerMachine};
pub use movement::spawn_player;
pub use plugin::PlayerPlugin;
pub use states::{PlayerState, StateKind};
