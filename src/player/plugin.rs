//! Player plugin - wires the state machine into the frame.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::animation::{AnimationEvent, PlayerAnimator, RootMotion};
use super::clips::ClipPlayer;
use super::components::*;
use super::machine::PlayerMachine;
use super::movement;
use crate::combat::{resolve_hit, DamageEvent, DamageSink, Health};
use crate::core::{GameplaySet, StatusEvent};
use crate::physics::RapierPhysics;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(PlayerSettings::load())
            .add_event::<AnimationEvent>()
            .add_systems(Update, movement::read_player_input.in_set(GameplaySet::Input))
            .add_systems(
                Update,
                (
                    movement::apply_target_changes,
                    movement::sync_player_view,
                    tick_player_machine,
                    advance_clips,
                    handle_animation_events,
                    movement::drive_player_motion,
                    movement::update_grounded,
                    publish_player_health,
                )
                    .chain()
                    .in_set(GameplaySet::Player),
            );
    }
}

/// Evaluate transitions and forward stamina changes to the HUD.
fn tick_player_machine(
    time: Res<Time>,
    mut query: Query<(&mut PlayerMachine, &mut PlayerAnimator), With<Player>>,
    mut status: EventWriter<StatusEvent>,
) {
    let Ok((mut machine, mut animator)) = query.get_single_mut() else {
        return;
    };

    machine.update(time.elapsed_secs(), time.delta_secs(), &mut *animator);
    status.send_batch(machine.drain_status_events());
}

/// Fire clip events and push root motion for the animation being played.
fn advance_clips(
    time: Res<Time>,
    mut query: Query<(&PlayerMachine, &mut PlayerAnimator, &mut ClipPlayer), With<Player>>,
    mut events: EventWriter<AnimationEvent>,
) {
    let Ok((machine, mut animator, mut clips)) = query.get_single_mut() else {
        return;
    };

    let mut fired = Vec::new();
    let distance = clips.advance(&mut animator, time.delta_secs(), &mut fired);
    if distance > 0.0 {
        animator.push_root_motion(RootMotion {
            translation: machine.context().forward() * distance,
            rotation: Quat::IDENTITY,
        });
    }
    events.send_batch(fired);
}

/// React to events fired by the player's animation clips.
fn handle_animation_events(
    mut events: EventReader<AnimationEvent>,
    settings: Res<PlayerSettings>,
    rapier_context: Query<&RapierContext>,
    mut query: Query<(Entity, &Transform, &mut PlayerMachine, &mut Health), With<Player>>,
    damageable: Query<(), (With<Health>, Without<Player>)>,
    mut damage_events: EventWriter<DamageEvent>,
) {
    let Ok((entity, transform, mut machine, mut health)) = query.get_single_mut() else {
        return;
    };

    for event in events.read() {
        match *event {
            AnimationEvent::Hit => {
                let Ok(context) = rapier_context.get_single() else {
                    continue;
                };
                let physics = RapierPhysics::new(context).excluding(entity);
                let mut pending = Vec::new();
                let mut sink = DamageSink::new(entity, &damageable, &mut pending);
                let hits = resolve_hit(
                    machine.current_attack(),
                    transform,
                    &physics,
                    settings.hit_mask,
                    &mut sink,
                );
                debug!("Player attack hit {} target(s)", hits);
                damage_events.send_batch(pending);
            }
            AnimationEvent::SetIFrames(enabled) => health.invulnerable = enabled,
            other => machine.handle_animation_event(other),
        }
    }
}

fn publish_player_health(
    query: Query<Ref<Health>, With<Player>>,
    mut status: EventWriter<StatusEvent>,
) {
    let Ok(health) = query.get_single() else {
        return;
    };
    if health.is_added() {
        status.send(StatusEvent::MaxHealthChanged(health.maximum));
    }
    if health.is_changed() {
        status.send(StatusEvent::HealthChanged(health.current));
    }
}
