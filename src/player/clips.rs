//! Stand-in clip timelines.
//!
//! Authored animation clips fire events at fixed frames and carry root
//! motion. Until real clips exist, each animation id gets a fixed timeline
//! that fires the same events and pushes forward root motion.

use bevy::prelude::*;

use super::animation::{params, AnimationEvent, AnimationId, PlayerAnimator};
use super::flags::PlayerFlags;

/// An event fired `at` seconds into a clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipMarker {
    pub at: f32,
    pub event: AnimationEvent,
}

const fn marker(at: f32, event: AnimationEvent) -> ClipMarker {
    ClipMarker { at, event }
}

/// Timeline of one animation.
#[derive(Debug, Clone, Copy)]
pub struct Clip {
    pub markers: &'static [ClipMarker],
    /// Loop length; `None` plays once.
    pub period: Option<f32>,
    /// Forward root motion speed and the window it applies in.
    pub root_speed: f32,
    pub root_window: (f32, f32),
}

const TRIES_TO_IDLE: AnimationEvent = AnimationEvent::SetFlag(PlayerFlags::TRIES_TO_IDLE);

const MOVE: &[ClipMarker] = &[
    marker(0.1, AnimationEvent::FootstepLeft),
    marker(0.45, AnimationEvent::FootstepRight),
];

const ATTACK: &[ClipMarker] = &[
    marker(0.22, AnimationEvent::Hit),
    marker(0.4, AnimationEvent::AttackComplete),
    marker(0.75, TRIES_TO_IDLE),
];

const ROLL: &[ClipMarker] = &[
    marker(0.05, AnimationEvent::SetIFrames(true)),
    marker(0.4, AnimationEvent::SetIFrames(false)),
    marker(0.45, AnimationEvent::SetRollEnabled(true)),
    marker(0.45, AnimationEvent::SetFlag(PlayerFlags::CAN_ATTACK)),
    marker(0.65, TRIES_TO_IDLE),
];

const LAND: &[ClipMarker] = &[marker(0.0, AnimationEvent::Land), marker(0.25, TRIES_TO_IDLE)];

pub fn clip_for(id: AnimationId) -> Clip {
    let still = Clip {
        markers: &[],
        period: None,
        root_speed: 0.0,
        root_window: (0.0, 0.0),
    };
    match id {
        AnimationId::Idle | AnimationId::Fall => still,
        AnimationId::Move => Clip {
            markers: MOVE,
            period: Some(0.7),
            ..still
        },
        AnimationId::Attack => Clip {
            markers: ATTACK,
            root_speed: 2.0,
            root_window: (0.05, 0.25),
            ..still
        },
        AnimationId::Roll => Clip {
            markers: ROLL,
            root_speed: 6.0,
            root_window: (0.0, 0.5),
            ..still
        },
        AnimationId::Land => Clip {
            markers: LAND,
            ..still
        },
    }
}

/// Plays the clip the animator currently asks for.
#[derive(Component, Debug, Default)]
pub struct ClipPlayer {
    playing: Option<AnimationId>,
    attack_index: i32,
    elapsed: f32,
    next_marker: usize,
}

impl ClipPlayer {
    /// Advance by `dt`, restarting when the animator switched clips, changed
    /// attack or fired a re-roll.
    ///
    /// Pushes due events to `out` and returns the forward root motion distance.
    pub fn advance(&mut self, animator: &mut PlayerAnimator, dt: f32, out: &mut Vec<AnimationEvent>) -> f32 {
        let attack_index = animator.ints.get(params::ATTACK_INDEX).copied().unwrap_or(0);
        let re_rolled = animator.triggers.contains(&params::RE_ROLL);
        animator.triggers.clear();

        if animator.current != self.playing || attack_index != self.attack_index || re_rolled {
            self.playing = animator.current;
            self.attack_index = attack_index;
            self.elapsed = 0.0;
            self.next_marker = 0;
        }

        let Some(id) = self.playing else {
            return 0.0;
        };
        let clip = clip_for(id);

        let start = self.elapsed;
        self.elapsed += dt;
        loop {
            while let Some(marker) = clip.markers.get(self.next_marker) {
                if marker.at > self.elapsed {
                    break;
                }
                out.push(marker.event);
                self.next_marker += 1;
            }
            match clip.period {
                Some(period) if self.elapsed >= period => {
                    self.elapsed -= period;
                    self.next_marker = 0;
                }
                _ => break,
            }
        }

        let (from, to) = clip.root_window;
        let overlap = (start + dt).min(to) - start.max(from);
        clip.root_speed * overlap.max(0.0)
    }
}
