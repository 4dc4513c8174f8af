//! Bevy side of the player: devices in, character controller out.

use std::sync::Arc;

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::animation::PlayerAnimator;
use super::clips::ClipPlayer;
use super::components::*;
use super::machine::PlayerMachine;
use crate::camera::{FollowCamera, LockOnTargets};
use crate::combat::{AttackDefinition, Health};
use crate::core::TargetChangedEvent;
use crate::physics::{layers, RapierPhysics};

/// Capsule half height and radius of the player body.
const BODY_HALF_HEIGHT: f32 = 0.5;
const BODY_RADIUS: f32 = 0.3;

/// Distance from the body centre to just above the capsule bottom.
const FOOT_OFFSET: f32 = BODY_HALF_HEIGHT + BODY_RADIUS - 0.05;

/// Keyboard, mouse and gamepad into the machine's buffered inputs.
pub fn read_player_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    gamepads: Query<&Gamepad>,
    time: Res<Time>,
    mut query: Query<&mut PlayerMachine, With<Player>>,
) {
    let Ok(mut machine) = query.get_single_mut() else {
        return;
    };

    let mut movement = Vec2::ZERO;
    if keyboard.pressed(KeyCode::KeyW) {
        movement.y += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        movement.y -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        movement.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        movement.x += 1.0;
    }

    let mut sprint_pressed = keyboard.just_pressed(KeyCode::ShiftLeft);
    let mut sprint_released = keyboard.just_released(KeyCode::ShiftLeft);
    let mut attack = mouse.just_pressed(MouseButton::Left);
    let mut roll = keyboard.just_pressed(KeyCode::Space);

    for gamepad in &gamepads {
        let stick = gamepad.left_stick();
        if stick.length() > 0.1 {
            movement += stick;
        }
        sprint_pressed |= gamepad.just_pressed(GamepadButton::East);
        sprint_released |= gamepad.just_released(GamepadButton::East);
        attack |= gamepad.just_pressed(GamepadButton::RightTrigger);
        roll |= gamepad.just_pressed(GamepadButton::South);
    }

    let now = time.elapsed_secs();
    machine.set_movement_input(movement);
    if let Some(held) = sprint_change(sprint_pressed, sprint_released) {
        machine.set_sprint(held);
    }
    if attack {
        machine.press_attack(now);
    }
    if roll {
        machine.press_roll(now);
    }
}

/// Sprint follows button edges only. Holding the button never re-arms a
/// sprint that ran out of stamina; it has to be pressed again.
fn sprint_change(pressed: bool, released: bool) -> Option<bool> {
    if pressed {
        Some(true)
    } else if released {
        Some(false)
    } else {
        None
    }
}

/// Camera yaw, lock-on position and body placement into the machine.
pub fn sync_player_view(
    targets: Res<LockOnTargets>,
    cameras: Query<&FollowCamera>,
    mut query: Query<(&Transform, &mut PlayerMachine), With<Player>>,
) {
    let Ok((transform, mut machine)) = query.get_single_mut() else {
        return;
    };

    if let Ok(camera) = cameras.get_single() {
        machine.set_view_yaw(camera.rig.yaw);
    }
    let look_target = machine.locked_target().and_then(|handle| targets.position(handle));
    machine.set_look_target(look_target);
    machine.sync_body(transform.translation, transform.forward().as_vec3());
}

pub fn apply_target_changes(
    mut events: EventReader<TargetChangedEvent>,
    mut query: Query<&mut PlayerMachine, With<Player>>,
) {
    let Ok(mut machine) = query.get_single_mut() else {
        return;
    };
    for event in events.read() {
        machine.on_target_changed(event.current);
    }
}

/// Let the active state move and turn the body.
pub fn drive_player_motion(
    time: Res<Time>,
    mut query: Query<
        (
            &mut Transform,
            &mut KinematicCharacterController,
            &mut PlayerMachine,
            &mut PlayerAnimator,
        ),
        With<Player>,
    >,
) {
    let Ok((mut transform, mut controller, mut machine, mut animator)) = query.get_single_mut() else {
        return;
    };

    let motion = machine.animator_move(time.delta_secs(), &mut *animator);
    controller.translation = Some(motion.displacement);
    transform.rotation = Quat::from_rotation_y((-motion.forward.x).atan2(-motion.forward.z));
}

/// Grounded when the controller says so or a short ray finds walkable ground.
pub fn update_grounded(
    settings: Res<PlayerSettings>,
    rapier_context: Query<&RapierContext>,
    mut query: Query<
        (
            Entity,
            &Transform,
            &mut PlayerMachine,
            Option<&KinematicCharacterControllerOutput>,
        ),
        With<Player>,
    >,
) {
    let Ok((entity, transform, mut machine, output)) = query.get_single_mut() else {
        return;
    };

    let controller_grounded = output.is_some_and(|output| output.grounded);
    let ray_grounded = rapier_context.get_single().ok().is_some_and(|context| {
        let origin = transform.translation - Vec3::Y * FOOT_OFFSET;
        RapierPhysics::new(context)
            .excluding(entity)
            .ground_normal(origin, 0.05 + settings.ground_check_distance, settings.ground_mask)
            .is_some_and(|normal| normal.angle_between(Vec3::Y) <= settings.max_ground_angle.to_radians())
    });

    machine.set_grounded(controller_grounded || ray_grounded);
}

/// Spawn the player body with its state machine.
pub fn spawn_player(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    position: Vec3,
    settings: &PlayerSettings,
    attacks: Arc<[AttackDefinition]>,
) -> Entity {
    let mut animator = PlayerAnimator::default();
    let machine = PlayerMachine::new(settings.clone(), attacks, &mut animator);

    commands
        .spawn((
            Player,
            machine,
            animator,
            ClipPlayer::default(),
            Health::new(100.0),
            Transform::from_translation(position),
            Visibility::default(),
            RigidBody::KinematicPositionBased,
            Collider::capsule_y(BODY_HALF_HEIGHT, BODY_RADIUS),
            CollisionGroups::new(
                Group::from_bits_truncate(layers::PLAYER),
                Group::from_bits_truncate(layers::ENVIRONMENT | layers::ENEMY),
            ),
            KinematicCharacterController {
                offset: CharacterLength::Absolute(0.01),
                autostep: Some(CharacterAutostep {
                    max_height: CharacterLength::Absolute(0.4),
                    min_width: CharacterLength::Absolute(0.3),
                    include_dynamic_bodies: false,
                }),
                max_slope_climb_angle: settings.max_ground_angle.to_radians(),
                min_slope_slide_angle: 30_f32.to_radians(),
                snap_to_ground: Some(CharacterLength::Absolute(0.5)),
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn((
                Mesh3d(meshes.add(Capsule3d::new(BODY_RADIUS, BODY_HALF_HEIGHT * 2.0))),
                MeshMaterial3d(materials.add(Color::srgb(0.55, 0.5, 0.45))),
            ));
            // Nose, so facing is readable.
            parent.spawn((
                Mesh3d(meshes.add(Cuboid::new(0.1, 0.1, 0.3))),
                MeshMaterial3d(materials.add(Color::srgb(0.8, 0.7, 0.3))),
                Transform::from_xyz(0.0, 0.4, -0.3),
            ));
        })
        .id()
}
