//! Camera plugin - input, lock-on and orbit placement.

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};
use bevy_rapier3d::prelude::*;

use super::config::CameraSettings;
use super::rig::CameraRig;
use super::targets::{SelectionSettings, TargetChanged, TargetTracker, Viewpoint};
use crate::core::{GameState, GameplaySet, TargetChangedEvent};
use crate::physics::RapierPhysics;
use crate::player::Player;

/// The enemies currently in view and the locked one.
///
/// Enemies register here when they become visible and unregister when they
/// leave the view or despawn.
#[derive(Resource, Default, Deref, DerefMut)]
pub struct LockOnTargets(pub TargetTracker<Entity>);

/// Camera input gathered this frame.
#[derive(Resource, Debug, Default)]
pub struct CameraInput {
    /// Stick free-look rate, x right and y up
    pub rotation: Vec2,
    /// Mouse free-look this frame, in degrees
    pub look: Vec2,
    pub lock_on_pressed: bool,
    /// Horizontal nudge used for target switching
    pub switch_axis: f32,
}

#[derive(Component, Debug)]
pub struct FollowCamera {
    pub rig: CameraRig,
}

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        let settings = CameraSettings::load();
        app.insert_resource(settings)
            .init_resource::<LockOnTargets>()
            .init_resource::<CameraInput>()
            .add_systems(OnExit(GameState::Loading), spawn_camera)
            .add_systems(OnEnter(GameState::InGame), grab_cursor)
            .add_systems(OnExit(GameState::InGame), release_cursor)
            .add_systems(Update, read_camera_input.in_set(GameplaySet::Input))
            .add_systems(
                Update,
                (handle_lock_on, orbit_camera).chain().in_set(GameplaySet::Camera),
            );
    }
}

/// Build the notification for a selection change.
pub fn target_changed_event(change: TargetChanged, targets: &TargetTracker<Entity>) -> TargetChangedEvent {
    let entity = change.current.and_then(|handle| targets.key(handle));
    match entity {
        Some(entity) => info!("Locked on to {:?}", entity),
        None => info!("Lock-on released"),
    }
    TargetChangedEvent {
        previous: change.previous,
        current: change.current,
        entity,
    }
}

fn spawn_camera(mut commands: Commands, settings: Res<CameraSettings>) {
    let rig = CameraRig::new(&settings);
    commands.spawn((
        Camera3d::default(),
        rig.placement(settings.anchor_offset()),
        FollowCamera { rig },
    ));
}

fn grab_cursor(mut window_query: Query<&mut Window, With<PrimaryWindow>>) {
    if let Ok(mut window) = window_query.get_single_mut() {
        window.cursor_options.grab_mode = CursorGrabMode::Locked;
        window.cursor_options.visible = false;
    }
}

fn release_cursor(mut window_query: Query<&mut Window, With<PrimaryWindow>>) {
    if let Ok(mut window) = window_query.get_single_mut() {
        window.cursor_options.grab_mode = CursorGrabMode::None;
        window.cursor_options.visible = true;
    }
}

/// Mouse and gamepad into [`CameraInput`].
fn read_camera_input(
    mut mouse_motion: EventReader<MouseMotion>,
    mouse: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    gamepads: Query<&Gamepad>,
    settings: Res<CameraSettings>,
    mut input: ResMut<CameraInput>,
) {
    let mut delta = Vec2::ZERO;
    for event in mouse_motion.read() {
        delta += event.delta;
    }

    let mut rotation = Vec2::ZERO;
    let mut lock_on = mouse.just_pressed(MouseButton::Middle) || keyboard.just_pressed(KeyCode::KeyQ);

    for gamepad in &gamepads {
        rotation += gamepad.right_stick();
        lock_on |= gamepad.just_pressed(GamepadButton::RightThumb);
    }

    input.rotation = rotation.clamp_length_max(1.0);
    input.look = Vec2::new(delta.x, -delta.y) * settings.mouse_sensitivity;
    input.lock_on_pressed = lock_on;
    input.switch_axis = (input.rotation.x + delta.x / settings.mouse_switch_distance.max(1.0)).clamp(-1.0, 1.0);
}

fn handle_lock_on(
    settings: Res<CameraSettings>,
    input: Res<CameraInput>,
    mut targets: ResMut<LockOnTargets>,
    rapier_context: Query<&RapierContext>,
    mut cameras: Query<(&Transform, &mut FollowCamera)>,
    mut changes: EventWriter<TargetChangedEvent>,
) {
    let Ok((transform, mut camera)) = cameras.get_single_mut() else {
        return;
    };
    let Ok(context) = rapier_context.get_single() else {
        return;
    };

    let physics = RapierPhysics::new(context);
    let view = Viewpoint {
        position: transform.translation,
        right: camera.rig.right(),
    };
    let selection = SelectionSettings {
        max_distance: settings.max_lock_distance,
        occlusion_mask: settings.occlusion_mask,
    };

    let change = if input.lock_on_pressed {
        camera.rig.reset_smoothing();
        targets.toggle_lock_on(&view, &selection, &physics)
    } else if targets.selected().is_some() {
        camera
            .rig
            .switch_input(input.switch_axis, &settings)
            .and_then(|direction| targets.switch_target(direction, &view, &selection, &physics))
    } else {
        None
    };

    if let Some(change) = change {
        changes.send(target_changed_event(change, &targets));
    }
}

fn orbit_camera(
    time: Res<Time>,
    settings: Res<CameraSettings>,
    input: Res<CameraInput>,
    targets: Res<LockOnTargets>,
    rapier_context: Query<&RapierContext>,
    player_query: Query<(Entity, &Transform), (With<Player>, Without<FollowCamera>)>,
    mut cameras: Query<(&mut Transform, &mut FollowCamera)>,
) {
    let Ok((player, player_transform)) = player_query.get_single() else {
        return;
    };
    let Ok((mut transform, mut camera)) = cameras.get_single_mut() else {
        return;
    };

    let dt = time.delta_secs();
    let anchor = player_transform.translation + settings.anchor_offset();

    match targets.selected().and_then(|handle| targets.position(handle)) {
        Some(target) => camera.rig.track(anchor, target, dt, &settings),
        None => {
            camera.rig.look(input.look, &settings);
            camera.rig.rotate(input.rotation, dt, &settings);
        }
    }

    if let Ok(context) = rapier_context.get_single() {
        let physics = RapierPhysics::new(context).excluding(player);
        camera.rig.update_distance(anchor, &physics, &settings, dt);
    }

    *transform = camera.rig.placement(anchor);
}
