//! Scene queries used by combat hit detection and the camera.
//!
//! Gameplay code only talks to [`PhysicsQuery`]. The Rapier-backed
//! implementation lives in [`rapier`]; tests use a hand-written fake.

mod rapier;

use std::hash::Hash;

use bevy::prelude::*;
use serde::Deserialize;

pub use rapier::RapierPhysics;

/// Bit mask selecting which collision layers a query considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: Self = Self(u32::MAX);
    pub const NONE: Self = Self(0);

    pub fn contains(self, layer: u32) -> bool {
        self.0 & layer != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Collision layers used by the scene.
pub mod layers {
    pub const ENVIRONMENT: u32 = 1 << 0;
    pub const PLAYER: u32 = 1 << 1;
    pub const ENEMY: u32 = 1 << 2;
}

/// Physics backend contract.
///
/// Overlap queries append to `out` and may produce duplicates across calls;
/// callers deduplicate. Every query ignores sensors (triggers).
pub trait PhysicsQuery {
    /// Identity of a hit collider.
    type Collider: Copy + Eq + Hash;

    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask, out: &mut Vec<Self::Collider>);

    /// Capsule between the two segment end points.
    fn overlap_capsule(
        &self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        mask: LayerMask,
        out: &mut Vec<Self::Collider>,
    );

    fn overlap_box(
        &self,
        center: Vec3,
        half_extents: Vec3,
        rotation: Quat,
        mask: LayerMask,
        out: &mut Vec<Self::Collider>,
    );

    /// Distance to the nearest hit of a sphere swept along `direction`.
    fn sphere_cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        radius: f32,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<f32>;

    /// Whether anything on `mask` lies on the segment between the two points.
    fn line_blocked(&self, from: Vec3, to: Vec3, mask: LayerMask) -> bool;
}
