//! Combat-related components.

use bevy::prelude::*;

// Re-export from core to avoid duplication
pub use crate::core::{DamageEvent, DeathEvent};

/// Anything that can receive damage from an attack.
pub trait Damageable {
    fn damage(&mut self, amount: f32);
}

/// Component for entities that can take damage.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Health {
    pub current: f32,
    pub maximum: f32,
    /// Incoming hits are ignored while set (dodge i-frames).
    pub invulnerable: bool,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            maximum: max,
            invulnerable: false,
        }
    }

    pub fn take_damage(&mut self, amount: f32) -> f32 {
        if self.invulnerable {
            return 0.0;
        }
        let actual = amount.min(self.current);
        self.current -= actual;
        actual
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }
}

impl Damageable for Health {
    fn damage(&mut self, amount: f32) {
        self.take_damage(amount);
    }
}

/// Marker component for entities that have died (prevents multiple death events).
#[derive(Component)]
pub struct Dead;
