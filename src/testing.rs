//! Test doubles shared by unit tests.

use bevy::prelude::*;

use crate::physics::{layers, LayerMask, PhysicsQuery};

#[derive(Debug, Clone, Copy)]
struct Body {
    id: u32,
    center: Vec3,
    radius: f32,
    layer: u32,
}

/// Scene made of spheres. Bodies answer overlaps; occluders block sight and casts.
#[derive(Debug, Default)]
pub struct FakePhysics {
    bodies: Vec<Body>,
    occluders: Vec<Body>,
}

impl FakePhysics {
    pub fn add_body(&mut self, id: u32, center: Vec3, radius: f32) {
        self.add_body_on_layer(id, center, radius, layers::ENEMY);
    }

    pub fn add_body_on_layer(&mut self, id: u32, center: Vec3, radius: f32, layer: u32) {
        self.bodies.push(Body {
            id,
            center,
            radius,
            layer,
        });
    }

    pub fn add_occluder(&mut self, center: Vec3, radius: f32) {
        self.occluders.push(Body {
            id: u32::MAX,
            center,
            radius,
            layer: layers::ENVIRONMENT,
        });
    }

    fn bodies_on(&self, mask: LayerMask) -> impl Iterator<Item = &Body> {
        self.bodies.iter().filter(move |body| mask.contains(body.layer))
    }
}

fn closest_on_segment(start: Vec3, end: Vec3, point: Vec3) -> Vec3 {
    let segment = end - start;
    let length_sq = segment.length_squared();
    if length_sq <= f32::EPSILON {
        return start;
    }
    let t = ((point - start).dot(segment) / length_sq).clamp(0.0, 1.0);
    start + segment * t
}

/// Entry distance of a ray into a sphere, if it enters within `max_distance`.
fn ray_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32, max_distance: f32) -> Option<f32> {
    let to_origin = origin - center;
    let c = to_origin.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }
    let b = to_origin.dot(direction);
    let discriminant = b * b - c;
    if b > 0.0 || discriminant < 0.0 {
        return None;
    }
    let t = -b - discriminant.sqrt();
    (t <= max_distance).then_some(t)
}

impl PhysicsQuery for FakePhysics {
    type Collider = u32;

    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask, out: &mut Vec<u32>) {
        out.extend(
            self.bodies_on(mask)
                .filter(|body| body.center.distance(center) <= radius + body.radius)
                .map(|body| body.id),
        );
    }

    fn overlap_capsule(&self, start: Vec3, end: Vec3, radius: f32, mask: LayerMask, out: &mut Vec<u32>) {
        out.extend(
            self.bodies_on(mask)
                .filter(|body| {
                    closest_on_segment(start, end, body.center).distance(body.center) <= radius + body.radius
                })
                .map(|body| body.id),
        );
    }

    fn overlap_box(
        &self,
        center: Vec3,
        half_extents: Vec3,
        rotation: Quat,
        mask: LayerMask,
        out: &mut Vec<u32>,
    ) {
        let inverse = rotation.inverse();
        out.extend(
            self.bodies_on(mask)
                .filter(|body| {
                    let local = inverse * (body.center - center);
                    let closest = local.clamp(-half_extents, half_extents);
                    closest.distance(local) <= body.radius
                })
                .map(|body| body.id),
        );
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
        self.bodies_on(mask)
            .chain(self.occluders.iter().filter(|o| mask.contains(o.layer)))
            .filter_map(|body| ray_sphere(origin, direction, body.center, body.radius + radius, max_distance))
            .min_by(|a, b| a.total_cmp(b))
    }

    fn line_blocked(&self, from: Vec3, to: Vec3, mask: LayerMask) -> bool {
        self.occluders
            .iter()
            .filter(|o| mask.contains(o.layer))
            .any(|o| closest_on_segment(from, to, o.center).distance(o.center) <= o.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_overlap_respects_rotation() {
        let mut physics = FakePhysics::default();
        physics.add_body(1, Vec3::new(1.5, 0.0, 0.0), 0.1);
        let half = Vec3::new(0.2, 0.2, 1.5);

        let mut hits = Vec::new();
        physics.overlap_box(Vec3::ZERO, half, Quat::IDENTITY, LayerMask::ALL, &mut hits);
        assert!(hits.is_empty());

        physics.overlap_box(
            Vec3::ZERO,
            half,
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            LayerMask::ALL,
            &mut hits,
        );
        assert_eq!(hits, vec![1]);
    }

    #[test]
    fn test_sphere_cast_distance() {
        let mut physics = FakePhysics::default();
        physics.add_occluder(Vec3::new(0.0, 0.0, 5.0), 1.0);
        let hit = physics.sphere_cast(Vec3::ZERO, Vec3::Z, 0.5, 10.0, LayerMask::ALL);
        assert!((hit.unwrap() - 3.5).abs() < 1e-4);
        assert_eq!(physics.sphere_cast(Vec3::ZERO, Vec3::Z, 0.5, 3.0, LayerMask::ALL), None);
    }
}
