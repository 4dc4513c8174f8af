//! Global events used for cross-system communication.
//!
//! The player machine, combat and camera never reach into each other's
//! components. They talk through these events instead.

use bevy::prelude::*;

use crate::camera::TargetHandle;

/// Sent when an attack connects with something that has health.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DamageEvent {
    /// Entity receiving damage
    pub target: Entity,
    /// Entity that caused the damage
    pub source: Entity,
    pub amount: f32,
}

/// Sent once when an entity's health reaches 0.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DeathEvent {
    pub entity: Entity,
    /// Entity that landed the killing blow (if any)
    pub killed_by: Option<Entity>,
}

/// Player resource changes, consumed by the HUD.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum StatusEvent {
    HealthChanged(f32),
    MaxHealthChanged(f32),
    StaminaChanged(f32),
    MaxStaminaChanged(f32),
}

/// The camera's lock-on target changed, including to or from none.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetChangedEvent {
    pub previous: Option<TargetHandle>,
    pub current: Option<TargetHandle>,
    /// Enemy entity behind `current`.
    pub entity: Option<Entity>,
}
