//! Animation playback contract between the player machine and the animator.
//!
//! The machine only requests animations, sets parameters and consumes the
//! root motion the animator produced for the current step. Playback itself
//! is done by [`ClipPlayer`](super::ClipPlayer).

use std::collections::HashMap;

use bevy::prelude::*;

use super::flags::PlayerFlags;

/// Animation ids understood by the player's animator graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum AnimationId {
    Idle = 0,
    Move = 1,
    Attack = 2,
    Roll = 3,
    Fall = 4,
    Land = 5,
}

/// Animator parameter names.
pub mod params {
    pub const ANIMATION_ID: &str = "animationID";
    pub const ATTACK_INDEX: &str = "attackIndex";
    pub const RE_ROLL: &str = "ReRoll";
    pub const RELATIVE_X_SPEED: &str = "relativeXSpeed";
    pub const RELATIVE_Z_SPEED: &str = "relativeZSpeed";
}

/// Displacement produced by the animation for one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMotion {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for RootMotion {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Sink for animation requests.
pub trait Animator {
    fn play(&mut self, id: AnimationId);
    fn set_float(&mut self, name: &'static str, value: f32);
    fn set_int(&mut self, name: &'static str, value: i32);
    fn set_bool(&mut self, name: &'static str, value: bool);
    fn set_trigger(&mut self, name: &'static str);
    /// Take the root motion accumulated since the last call.
    fn take_root_motion(&mut self) -> RootMotion;
}

/// Events fired by animation clips at authored frames.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum AnimationEvent {
    /// Attack recovery reached; rolling and attacking are allowed again.
    AttackComplete,
    SetRollEnabled(bool),
    SetFlag(PlayerFlags),
    UnsetFlag(PlayerFlags),
    SetIFrames(bool),
    /// Contact frame of the current attack.
    Hit,
    FootstepLeft,
    FootstepRight,
    Land,
}

/// Animator state for the player entity.
///
/// The clip player reads the requested id, parameters and triggers, and
/// pushes root motion in with [`PlayerAnimator::push_root_motion`].
#[derive(Component, Debug, Default)]
pub struct PlayerAnimator {
    pub current: Option<AnimationId>,
    pub floats: HashMap<&'static str, f32>,
    pub ints: HashMap<&'static str, i32>,
    pub bools: HashMap<&'static str, bool>,
    /// Triggers fired since the animation system last drained them.
    pub triggers: Vec<&'static str>,
    root_motion: RootMotion,
}

impl PlayerAnimator {
    pub fn push_root_motion(&mut self, motion: RootMotion) {
        self.root_motion.translation += motion.translation;
        self.root_motion.rotation = motion.rotation * self.root_motion.rotation;
    }
}

impl Animator for PlayerAnimator {
    fn play(&mut self, id: AnimationId) {
        self.current = Some(id);
        self.ints.insert(params::ANIMATION_ID, id as i32);
    }

    fn set_float(&mut self, name: &'static str, value: f32) {
        self.floats.insert(name, value);
    }

    fn set_int(&mut self, name: &'static str, value: i32) {
        self.ints.insert(name, value);
    }

    fn set_bool(&mut self, name: &'static str, value: bool) {
        self.bools.insert(name, value);
    }

    fn set_trigger(&mut self, name: &'static str) {
        self.triggers.push(name);
    }

    fn take_root_motion(&mut self) -> RootMotion {
        std::mem::take(&mut self.root_motion)
    }
}
