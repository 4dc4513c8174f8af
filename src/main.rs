//! Soulslike - Entry Point
//!
//! Controls:
//! - WASD / left stick: Move
//! - Mouse / right stick: Look around
//! - Shift / East: Sprint
//! - Space / South: Roll
//! - Left click / R1: Attack
//! - Q / middle click / right stick press: Lock on, flick to switch targets
//! - Escape: Pause/Unpause

use bevy::prelude::*;
use bevy_kira_audio::AudioPlugin;
use bevy_rapier3d::prelude::*;

fn main() {
    App::new()
        // Bevy default plugins; kira replaces the built-in audio
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Soulslike".to_string(),
                        resolution: (1280.0, 720.0).into(),
                        ..default()
                    }),
                    ..default()
                })
                .disable::<bevy::audio::AudioPlugin>(),
        )
        .add_plugins(AudioPlugin)
        // Physics
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
        // Our game plugin
        .add_plugins(soulslike::SoulslikePlugin)
        .run();
}
