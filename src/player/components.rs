//! Player-related components and tuning.

use std::fs;

use bevy::prelude::*;
use serde::Deserialize;

use super::buffered_input::BufferedInput;
use crate::physics::{layers, LayerMask};

/// Marker component for the player entity.
#[derive(Component)]
pub struct Player;

/// Player tuning loaded from assets/data/player.ron.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Base movement speed in units per second
    pub walk_speed: f32,
    /// Sprint speed in units per second
    pub run_speed: f32,
    /// How fast the current speed approaches the target speed (units/s²)
    pub acceleration: f32,
    /// Maximum turn rate in degrees per second
    pub turn_speed: f32,
    /// Downward displacement applied every grounded step to hug slopes
    pub ground_bias: f32,
    pub max_stamina: f32,
    /// Stamina regained per second
    pub stamina_regen: f32,
    /// Seconds after running dry before regeneration resumes
    pub stamina_regen_delay: f32,
    /// Flat stamina cost of each roll
    pub roll_stamina_cost: f32,
    /// Stamina consumed per second while sprinting
    pub sprint_stamina_cost: f32,
    /// Buffer window of the attack button
    pub attack_input: BufferedInput,
    /// Buffer window of the roll button
    pub roll_input: BufferedInput,
    /// Gravity while falling (units/s², negative is down)
    pub gravity: f32,
    /// Vertical velocity when leaving the ground
    pub fall_start_velocity: f32,
    /// Horizontal carry-over decay while falling (units/s²)
    pub air_drag: f32,
    pub ground_check_distance: f32,
    /// Steepest surface still counted as ground, in degrees
    pub max_ground_angle: f32,
    pub ground_mask: LayerMask,
    /// Layers attack hit volumes can touch
    pub hit_mask: LayerMask,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            walk_speed: 3.0,
            run_speed: 7.0,
            acceleration: 40.0,
            turn_speed: 720.0,
            ground_bias: -4.0,
            max_stamina: 100.0,
            stamina_regen: 30.0,
            stamina_regen_delay: 0.5,
            roll_stamina_cost: 22.0,
            sprint_stamina_cost: 8.0,
            attack_input: BufferedInput::new(0.1),
            roll_input: BufferedInput::new(0.1),
            gravity: -10.0,
            fall_start_velocity: -1.5,
            air_drag: 6.0,
            ground_check_distance: 0.1,
            max_ground_angle: 45.0,
            ground_mask: LayerMask(layers::ENVIRONMENT),
            hit_mask: LayerMask(layers::ENEMY),
        }
    }
}

impl PlayerSettings {
    /// Load player settings from RON file.
    pub fn load() -> Self {
        let path = "assets/data/player.ron";
        match fs::read_to_string(path) {
            Ok(contents) => match ron::from_str(&contents) {
                Ok(settings) => {
                    info!("Loaded player settings from {}", path);
                    settings
                }
                Err(e) => {
                    error!("Failed to parse {}: {}. Using defaults.", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Could not read {}: {}. Using defaults.", path, e);
                Self::default()
            }
        }
    }
}
