//! World plugin - builds the arena and places the player and dummies.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::arena::{spawn_block, ArenaGeometry};
use crate::combat::AttackChain;
use crate::core::GameState;
use crate::enemies::spawn_target_dummy;
use crate::physics::layers;
use crate::player::{spawn_player, PlayerSettings};

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        // Once, so pausing does not rebuild the level.
        app.add_systems(OnExit(GameState::Loading), setup_arena);
    }
}

pub fn setup_arena(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<PlayerSettings>,
    attacks: Res<AttackChain>,
) {
    info!("Building arena");

    let stone = materials.add(StandardMaterial {
        base_color: Color::srgb(0.28, 0.27, 0.26),
        perceptual_roughness: 0.9,
        ..default()
    });
    let pillar = materials.add(StandardMaterial {
        base_color: Color::srgb(0.35, 0.33, 0.3),
        perceptual_roughness: 0.8,
        ..default()
    });

    // Floor, top surface at y = 0.
    spawn_block(
        &mut commands,
        &mut meshes,
        stone.clone(),
        Vec3::new(0.0, -0.5, 0.0),
        Vec3::new(40.0, 1.0, 40.0),
    );

    // Pillars to hide behind and to test camera occlusion.
    for (x, z) in [(-6.0, -6.0), (6.0, -6.0), (-6.0, 6.0), (6.0, 6.0), (0.0, -12.0)] {
        spawn_block(
            &mut commands,
            &mut meshes,
            pillar.clone(),
            Vec3::new(x, 3.0, z),
            Vec3::new(1.5, 6.0, 1.5),
        );
    }

    // Raised ledge to fall from, with a ramp up.
    spawn_block(
        &mut commands,
        &mut meshes,
        stone.clone(),
        Vec3::new(12.0, 1.0, 0.0),
        Vec3::new(6.0, 2.0, 6.0),
    );
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(3.0, 0.3, 7.0))),
        MeshMaterial3d(stone),
        Transform::from_xyz(12.0, 1.0, 6.2).with_rotation(Quat::from_rotation_x(16f32.to_radians())),
        RigidBody::Fixed,
        Collider::cuboid(1.5, 0.15, 3.5),
        CollisionGroups::new(Group::from_bits_truncate(layers::ENVIRONMENT), Group::ALL),
        ArenaGeometry,
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(10.0, 20.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
        ArenaGeometry,
    ));
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.6, 0.6, 0.7),
        brightness: 200.0,
    });

    for (name, position) in [
        ("Dummy A", Vec3::new(0.0, 0.0, -5.0)),
        ("Dummy B", Vec3::new(-3.0, 0.0, -8.0)),
        ("Dummy C", Vec3::new(3.5, 0.0, -7.0)),
        ("Dummy D", Vec3::new(12.0, 2.0, -1.5)),
    ] {
        spawn_target_dummy(&mut commands, &mut meshes, &mut materials, name, position);
    }

    spawn_player(
        &mut commands,
        &mut meshes,
        &mut materials,
        Vec3::new(0.0, 1.0, 4.0),
        &settings,
        attacks.0.clone(),
    );
}
