//! Static arena pieces.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::physics::layers;

/// Marker for static arena geometry.
#[derive(Component)]
pub struct ArenaGeometry;

/// Spawn a solid box on the environment layer.
///
/// `center` is the middle of the box; `size` its full extents.
pub fn spawn_block(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    material: Handle<StandardMaterial>,
    center: Vec3,
    size: Vec3,
) -> Entity {
    commands
        .spawn((
            Mesh3d(meshes.add(Cuboid::new(size.x, size.y, size.z))),
            MeshMaterial3d(material),
            Transform::from_translation(center),
            RigidBody::Fixed,
            Collider::cuboid(size.x / 2.0, size.y / 2.0, size.z / 2.0),
            CollisionGroups::new(Group::from_bits_truncate(layers::ENVIRONMENT), Group::ALL),
            ArenaGeometry,
        ))
        .id()
}
