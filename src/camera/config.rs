//! Camera tuning loaded from assets/data/camera.ron.

use std::fs;

use bevy::prelude::*;
use serde::Deserialize;

use crate::physics::{layers, LayerMask};

#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Free-look rotation speed in degrees per second at full input
    pub rotation_speed: f32,
    /// Lowest pitch in degrees
    pub min_pitch: f32,
    /// Highest pitch in degrees
    pub max_pitch: f32,
    pub invert_y: bool,
    /// Degrees turned per pixel of mouse travel
    pub mouse_sensitivity: f32,
    /// Mouse travel in one frame (pixels) that counts as a full switch flick
    pub mouse_switch_distance: f32,
    /// Preferred distance between anchor and camera
    pub follow_distance: f32,
    /// Radius of the sphere swept back from the anchor
    pub collision_radius: f32,
    /// How fast the camera eases back out after an occluder clears (units/s)
    pub zoom_out_speed: f32,
    /// Point above the player the camera orbits
    pub anchor_offset: (f32, f32, f32),
    /// Yaw smoothing time while locked on, in seconds
    pub lock_smooth_time: f32,
    /// Targets beyond this distance cannot be locked
    pub max_lock_distance: f32,
    /// Layers that block the camera and line of sight
    pub occlusion_mask: LayerMask,
    /// Horizontal input needed to switch targets
    pub switch_threshold: f32,
    /// Input must drop below this before another switch
    pub neutral_dead_zone: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            rotation_speed: 180.0,
            min_pitch: -75.0,
            max_pitch: 80.0,
            invert_y: false,
            mouse_sensitivity: 0.12,
            mouse_switch_distance: 25.0,
            follow_distance: 5.0,
            collision_radius: 0.25,
            zoom_out_speed: 4.0,
            anchor_offset: (0.0, 1.6, 0.0),
            lock_smooth_time: 0.1,
            max_lock_distance: 25.0,
            occlusion_mask: LayerMask(layers::ENVIRONMENT),
            switch_threshold: 0.5,
            neutral_dead_zone: 0.2,
        }
    }
}

impl CameraSettings {
    pub fn load() -> Self {
        let path = "assets/data/camera.ron";
        match fs::read_to_string(path) {
            Ok(contents) => match ron::from_str(&contents) {
                Ok(settings) => {
                    info!("Loaded camera settings from {}", path);
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

    pub fn anchor_offset(&self) -> Vec3 {
        Vec3::from(self.anchor_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings() {
        let settings: CameraSettings =
            ron::from_str("(invert_y: true, anchor_offset: (0.0, 2.0, 0.0))").unwrap();
        assert!(settings.invert_y);
        assert_eq!(settings.anchor_offset(), Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(settings.follow_distance, 5.0);
    }
}
