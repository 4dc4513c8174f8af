//! Soulslike - a third-person action game core in Bevy.
//!
//! # Architecture
//!
//! The game is organized into plugins, each handling a specific aspect:
//!
//! - **Core**: Game states, frame ordering and global events
//! - **Player**: Buffered input and the player state machine
//! - **Combat**: Attack data, hit resolution and damage
//! - **Camera**: Third-person follow camera and lock-on targeting
//! - **Enemies**: Lock-on registration and training dummies
//! - **World**: The arena
//! - **UI**: HUD and pause overlay
//! - **Audio**: Footstep and landing cues
//!
//! The state machine, attack resolution, target tracking and the camera rig
//! are plain Rust over `bevy::math` types; the systems around them only move
//! data between the ECS and those types.

pub mod audio;
pub mod camera;
pub mod combat;
pub mod core;
pub mod enemies;
pub mod physics;
pub mod player;
pub mod ui;
pub mod world;

#[cfg(test)]
mod testing;

use bevy::prelude::*;

/// Main game plugin that adds all sub-plugins.
pub struct SoulslikePlugin;

impl Plugin for SoulslikePlugin {
    fn build(&self, app: &mut App) {
        app
            // Core systems (must be first)
            .add_plugins(core::CorePlugin)
            .add_plugins(player::PlayerPlugin)
            .add_plugins(combat::CombatPlugin)
            .add_plugins(camera::CameraPlugin)
            .add_plugins(enemies::EnemyPlugin)
            .add_plugins(world::WorldPlugin)
            .add_plugins(ui::UiPlugin)
            .add_plugins(audio::GameAudioPlugin);
    }
}
