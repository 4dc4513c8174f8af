//! Enemies module - lock-on registration and training dummies.

mod components;
mod plugin;
mod visibility;

pub use components::*;
pub use plugin::EnemyPlugin;
pub use visibility::{track_enemy_visibility, unregister_removed_enemies};
