//! [`PhysicsQuery`] over a Rapier scene.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::{LayerMask, PhysicsQuery};

/// Borrowed view of the Rapier context for one system run.
pub struct RapierPhysics<'a> {
    context: &'a RapierContext,
    exclude: Option<Entity>,
}

impl<'a> RapierPhysics<'a> {
    pub fn new(context: &'a RapierContext) -> Self {
        Self { context, exclude: None }
    }

    /// Skip the given collider in every query (usually the querying body itself).
    pub fn excluding(mut self, entity: Entity) -> Self {
        self.exclude = Some(entity);
        self
    }

    fn filter(&self, mask: LayerMask) -> QueryFilter<'static> {
        let mut filter = QueryFilter::new()
            .exclude_sensors()
            .groups(CollisionGroups::new(Group::ALL, Group::from_bits_truncate(mask.0)));
        if let Some(entity) = self.exclude {
            filter = filter.exclude_collider(entity);
        }
        filter
    }

    fn overlap(&self, shape: &Collider, position: Vec3, rotation: Quat, mask: LayerMask, out: &mut Vec<Entity>) {
        self.context
            .intersections_with_shape(position, rotation, shape, self.filter(mask), |entity| {
                out.push(entity);
                true
            });
    }

    /// Ray straight down from `origin`; returns the hit normal when ground is found.
    pub fn ground_normal(&self, origin: Vec3, max_distance: f32, mask: LayerMask) -> Option<Vec3> {
        self.context
            .cast_ray_and_get_normal(origin, Vec3::NEG_Y, max_distance, true, self.filter(mask))
            .map(|(_, hit)| hit.normal)
    }
}

impl PhysicsQuery for RapierPhysics<'_> {
    type Collider = Entity;

    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask, out: &mut Vec<Entity>) {
        self.overlap(&Collider::ball(radius), center, Quat::IDENTITY, mask, out);
    }

    fn overlap_capsule(&self, start: Vec3, end: Vec3, radius: f32, mask: LayerMask, out: &mut Vec<Entity>) {
        // Capsule points are given in world space, so the shape sits at the origin.
        self.overlap(&Collider::capsule(start, end, radius), Vec3::ZERO, Quat::IDENTITY, mask, out);
    }

    fn overlap_box(
        &self,
        center: Vec3,
        half_extents: Vec3,
        rotation: Quat,
        mask: LayerMask,
        out: &mut Vec<Entity>,
    ) {
        let shape = Collider::cuboid(half_extents.x, half_extents.y, half_extents.z);
        self.overlap(&shape, center, rotation, mask, out);
    }

    fn sphere_cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        radius: f32,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<f32> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        self.context
            .cast_shape(
                origin,
                Quat::IDENTITY,
                direction,
                &Collider::ball(radius),
                ShapeCastOptions::with_max_time_of_impact(max_distance),
                self.filter(mask),
            )
            .map(|(_, hit)| hit.time_of_impact)
    }

    fn line_blocked(&self, from: Vec3, to: Vec3, mask: LayerMask) -> bool {
        let delta = to - from;
        if delta == Vec3::ZERO {
            return false;
        }
        // Unnormalized direction: time of impact 1.0 is the end point.
        self.context
            .cast_ray(from, delta, 1.0, true, self.filter(mask))
            .is_some()
    }
}
