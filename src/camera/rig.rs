//! Third-person orbit: free look, lock-on tracking and occlusion avoidance.

use std::f32::consts::{PI, TAU};

use bevy::prelude::*;

use super::config::CameraSettings;
use crate::physics::PhysicsQuery;

/// Orbit state of the follow camera. Angles are radians.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraRig {
    pub yaw: f32,
    pub pitch: f32,
    yaw_velocity: f32,
    distance: f32,
    switch_armed: bool,
}

impl CameraRig {
    pub fn new(settings: &CameraSettings) -> Self {
        Self {
            yaw: 0.0,
            pitch: -15f32.to_radians(),
            yaw_velocity: 0.0,
            distance: settings.follow_distance,
            switch_armed: true,
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        Quat::from_rotation_y(self.yaw) * Vec3::X
    }

    /// Current anchor-to-camera distance after occlusion.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Align a horizontal direction with the view.
    pub fn world_to_camera_xz(&self, direction: Vec3) -> Vec3 {
        Quat::from_rotation_y(self.yaw) * direction
    }

    /// Free look from a rate input such as a stick. Positive `input.y` looks up.
    pub fn rotate(&mut self, input: Vec2, dt: f32, settings: &CameraSettings) {
        self.turn(input * settings.rotation_speed * dt, settings);
    }

    /// Free look by an angle already accumulated over the frame, in degrees.
    ///
    /// Mouse deltas are per frame, so they must not be scaled by frame time.
    pub fn look(&mut self, degrees: Vec2, settings: &CameraSettings) {
        self.turn(degrees, settings);
    }

    fn turn(&mut self, degrees: Vec2, settings: &CameraSettings) {
        let invert = if settings.invert_y { -1.0 } else { 1.0 };
        self.yaw = wrap_angle(self.yaw - degrees.x.to_radians());
        self.pitch = self.clamp_pitch(self.pitch + degrees.y.to_radians() * invert, settings);
    }

    /// Follow a locked target: yaw eases toward it, pitch snaps.
    pub fn track(&mut self, anchor: Vec3, target: Vec3, dt: f32, settings: &CameraSettings) {
        let direction = (target - anchor).normalize_or_zero();
        if direction == Vec3::ZERO {
            return;
        }
        let desired_yaw = (-direction.x).atan2(-direction.z);
        let desired_pitch = direction.y.clamp(-1.0, 1.0).asin();

        self.yaw = wrap_angle(smooth_damp_angle(
            self.yaw,
            desired_yaw,
            &mut self.yaw_velocity,
            settings.lock_smooth_time,
            dt,
        ));
        self.pitch = self.clamp_pitch(desired_pitch, settings);
    }

    /// Forget smoothing velocity, e.g. when the lock changes.
    pub fn reset_smoothing(&mut self) {
        self.yaw_velocity = 0.0;
    }

    /// Pull the camera in front of occluders; ease back out once clear.
    pub fn update_distance<P: PhysicsQuery>(
        &mut self,
        anchor: Vec3,
        physics: &P,
        settings: &CameraSettings,
        dt: f32,
    ) -> f32 {
        let limit = physics
            .sphere_cast(
                anchor,
                -self.forward(),
                settings.collision_radius,
                settings.follow_distance,
                settings.occlusion_mask,
            )
            .unwrap_or(settings.follow_distance)
            .min(settings.follow_distance);

        if limit < self.distance {
            self.distance = limit;
        } else {
            self.distance = (self.distance + settings.zoom_out_speed * dt).min(limit);
        }
        self.distance
    }

    /// Camera placement orbiting `anchor`.
    pub fn placement(&self, anchor: Vec3) -> Transform {
        let rotation = self.rotation();
        Transform::from_translation(anchor - rotation * Vec3::NEG_Z * self.distance).with_rotation(rotation)
    }

    /// Debounced target switching.
    ///
    /// Returns the switch direction once per push past the threshold; the
    /// input must return near neutral before the next switch.
    pub fn switch_input(&mut self, horizontal: f32, settings: &CameraSettings) -> Option<f32> {
        if horizontal.abs() < settings.neutral_dead_zone {
            self.switch_armed = true;
            return None;
        }
        if self.switch_armed && horizontal.abs() >= settings.switch_threshold {
            self.switch_armed = false;
            return Some(horizontal.signum());
        }
        None
    }

    fn clamp_pitch(&self, pitch: f32, settings: &CameraSettings) -> f32 {
        pitch.clamp(settings.min_pitch.to_radians(), settings.max_pitch.to_radians())
    }
}

fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Critically damped approach, in the style of a spring with no overshoot.
fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);
    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    // No overshoot.
    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = (output - target) / dt.max(f32::EPSILON);
    }
    output
}

fn smooth_damp_angle(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    let target = current + wrap_angle(target - current);
    smooth_damp(current, target, velocity, smooth_time, dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePhysics;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_pitch_is_clamped() {
        let settings = CameraSettings::default();
        let mut rig = CameraRig::new(&settings);
        rig.rotate(Vec2::new(0.0, 1.0), 10.0, &settings);
        assert!(approx(rig.pitch, 80f32.to_radians()));
        rig.rotate(Vec2::new(0.0, -1.0), 10.0, &settings);
        assert!(approx(rig.pitch, -75f32.to_radians()));
    }

    #[test]
    fn test_invert_y() {
        let settings = CameraSettings {
            invert_y: true,
            ..default()
        };
        let mut rig = CameraRig::new(&settings);
        let before = rig.pitch;
        rig.rotate(Vec2::new(0.0, 1.0), 0.1, &settings);
        assert!(rig.pitch < before);
    }

    #[test]
    fn test_input_right_turns_right() {
        let settings = CameraSettings::default();
        let mut rig = CameraRig::new(&settings);
        rig.rotate(Vec2::new(1.0, 0.0), 0.5, &settings);
        // Quarter turn at 180 degrees per second.
        let forward = rig.world_to_camera_xz(Vec3::NEG_Z);
        assert!(forward.distance(Vec3::X) < 1e-4);
        assert!(rig.right().distance(Vec3::Z) < 1e-4);
    }

    #[test]
    fn test_mouse_look_ignores_frame_rate() {
        let settings = CameraSettings::default();

        // The same 30 degrees of mouse travel, delivered at 30 and at 120 frames per second.
        let mut slow = CameraRig::new(&settings);
        for _ in 0..3 {
            slow.look(Vec2::new(10.0, 0.0), &settings);
        }
        let mut fast = CameraRig::new(&settings);
        for _ in 0..12 {
            fast.look(Vec2::new(2.5, 0.0), &settings);
        }

        assert!(approx(slow.yaw, -30f32.to_radians()));
        assert!(approx(fast.yaw, slow.yaw));
    }

    #[test]
    fn test_lock_on_eases_yaw_and_snaps_pitch() {
        let settings = CameraSettings::default();
        let mut rig = CameraRig::new(&settings);
        let anchor = Vec3::ZERO;
        let target = Vec3::new(-10.0, 10.0, 0.0);

        rig.track(anchor, target, 1.0 / 60.0, &settings);
        assert!(rig.yaw > 0.0 && rig.yaw < PI / 2.0);
        assert!(approx(rig.pitch, PI / 4.0));

        for _ in 0..120 {
            rig.track(anchor, target, 1.0 / 60.0, &settings);
        }
        assert!(approx(rig.yaw, PI / 2.0));
    }

    #[test]
    fn test_lock_on_takes_the_short_way_round() {
        let settings = CameraSettings::default();
        let mut rig = CameraRig::new(&settings);
        rig.yaw = 170f32.to_radians();
        // Target at -170 degrees.
        let target = Quat::from_rotation_y(-170f32.to_radians()) * Vec3::NEG_Z;
        rig.track(Vec3::ZERO, target, 1.0 / 60.0, &settings);
        assert!(rig.yaw.abs() > 170f32.to_radians());
    }

    #[test]
    fn test_occluder_clips_in_and_zooms_out_slowly() {
        let settings = CameraSettings::default();
        let mut rig = CameraRig::new(&settings);
        rig.pitch = 0.0;

        let mut physics = FakePhysics::default();
        // Behind the camera is +Z.
        physics.add_occluder(Vec3::new(0.0, 0.0, 3.0), 0.5);
        let clipped = rig.update_distance(Vec3::ZERO, &physics, &settings, 0.016);
        assert!(approx(clipped, 2.25));

        let clear = FakePhysics::default();
        let eased = rig.update_distance(Vec3::ZERO, &clear, &settings, 0.25);
        assert!(approx(eased, 3.25));
        let done = rig.update_distance(Vec3::ZERO, &clear, &settings, 10.0);
        assert_eq!(done, 5.0);
    }

    #[test]
    fn test_placement_sits_behind_anchor() {
        let settings = CameraSettings::default();
        let mut rig = CameraRig::new(&settings);
        rig.pitch = 0.0;
        let transform = rig.placement(Vec3::new(0.0, 1.6, 0.0));
        assert!(transform.translation.distance(Vec3::new(0.0, 1.6, 5.0)) < 1e-4);
    }

    #[test]
    fn test_switch_needs_return_to_neutral() {
        let settings = CameraSettings::default();
        let mut rig = CameraRig::new(&settings);
        assert_eq!(rig.switch_input(0.9, &settings), Some(1.0));
        assert_eq!(rig.switch_input(1.0, &settings), None);
        assert_eq!(rig.switch_input(0.3, &settings), None);
        assert_eq!(rig.switch_input(0.1, &settings), None);
        assert_eq!(rig.switch_input(-0.8, &settings), Some(-1.0));
    }
}
