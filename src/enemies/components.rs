//! Enemy-related components.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::combat::Health;
use crate::physics::layers;

/// Anything the camera can lock on to.
#[derive(Component, Debug, Clone, Copy)]
pub struct Enemy {
    /// Height above the origin the camera and player aim at.
    pub lock_on_height: f32,
}

impl Default for Enemy {
    fn default() -> Self {
        Self { lock_on_height: 1.0 }
    }
}

/// Last visibility reported to the lock-on tracker.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InView(pub bool);

/// A stationary enemy that only reports the hits it takes.
#[derive(Component, Debug, Clone)]
pub struct TargetDummy {
    pub name: String,
}

/// Spawn a training dummy standing on the ground at `position`.
pub fn spawn_target_dummy(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    name: &str,
    position: Vec3,
) -> Entity {
    commands
        .spawn((
            Name::new(name.to_string()),
            Enemy::default(),
            InView::default(),
            TargetDummy { name: name.to_string() },
            Health::new(30.0),
            Mesh3d(meshes.add(Capsule3d::new(0.35, 1.2))),
            MeshMaterial3d(materials.add(Color::srgb(0.6, 0.45, 0.3))),
            Transform::from_translation(position + Vec3::Y * 0.95),
            RigidBody::Fixed,
            Collider::capsule_y(0.6, 0.35),
            CollisionGroups::new(Group::from_bits_truncate(layers::ENEMY), Group::ALL),
        ))
        .id()
}
