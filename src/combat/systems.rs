//! Combat systems - turning hits into damage and deaths.

use bevy::ecs::query::QueryFilter;
use bevy::prelude::*;

use super::components::*;
use super::resolver::DamageTargets;
use crate::player::Player;

/// Collects [`DamageEvent`]s for hit entities that have [`Health`].
pub struct DamageSink<'a, 'w, 's, F: QueryFilter> {
    source: Entity,
    damageable: &'a Query<'w, 's, (), F>,
    pending: &'a mut Vec<DamageEvent>,
}

impl<'a, 'w, 's, F: QueryFilter> DamageSink<'a, 'w, 's, F> {
    pub fn new(source: Entity, damageable: &'a Query<'w, 's, (), F>, pending: &'a mut Vec<DamageEvent>) -> Self {
        Self {
            source,
            damageable,
            pending,
        }
    }
}

impl<F: QueryFilter> DamageTargets<Entity> for DamageSink<'_, '_, '_, F> {
    fn damage(&mut self, collider: Entity, amount: f32) -> bool {
        if !self.damageable.contains(collider) {
            return false;
        }
        self.pending.push(DamageEvent {
            target: collider,
            source: self.source,
            amount,
        });
        true
    }
}

/// Apply damage events to health; mark and announce deaths once.
pub fn apply_damage(
    mut commands: Commands,
    mut damage_events: EventReader<DamageEvent>,
    mut health_query: Query<(&mut Health, Has<Dead>)>,
    mut death_events: EventWriter<DeathEvent>,
) {
    let mut died_this_frame = std::collections::HashSet::new();

    for event in damage_events.read() {
        if died_this_frame.contains(&event.target) {
            continue;
        }
        let Ok((mut health, dead)) = health_query.get_mut(event.target) else {
            continue;
        };
        if dead {
            continue;
        }

        let dealt = health.take_damage(event.amount);
        if dealt == 0.0 {
            debug!("{:?} ignored a hit", event.target);
            continue;
        }

        if health.is_dead() {
            died_this_frame.insert(event.target);
            commands.entity(event.target).insert(Dead);
            death_events.send(DeathEvent {
                entity: event.target,
                killed_by: Some(event.source),
            });
        }
    }
}

/// Remove dead non-player entities.
pub fn handle_deaths(
    mut commands: Commands,
    mut death_events: EventReader<DeathEvent>,
    player_query: Query<(), With<Player>>,
) {
    for event in death_events.read() {
        if player_query.contains(event.entity) {
            info!("Player died");
        } else {
            info!("{:?} died", event.entity);
            commands.entity(event.entity).despawn_recursive();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn damage_app() -> App {
        let mut app = App::new();
        app.add_event::<DamageEvent>()
            .add_event::<DeathEvent>()
            .add_systems(Update, apply_damage);
        app
    }

    #[test]
    fn test_lethal_damage_marks_dead_once() {
        let mut app = damage_app();
        let source = app.world_mut().spawn_empty().id();
        let target = app.world_mut().spawn(Health::new(1.0)).id();

        app.world_mut().send_event(DamageEvent {
            target,
            source,
            amount: 1.0,
        });
        app.world_mut().send_event(DamageEvent {
            target,
            source,
            amount: 1.0,
        });
        app.update();

        assert!(app.world().get::<Dead>(target).is_some());
        let deaths = app.world().resource::<Events<DeathEvent>>();
        assert_eq!(deaths.len(), 1);
    }

    #[test]
    fn test_invulnerable_target_keeps_health() {
        let mut app = damage_app();
        let source = app.world_mut().spawn_empty().id();
        let mut health = Health::new(3.0);
        health.invulnerable = true;
        let target = app.world_mut().spawn(health).id();

        app.world_mut().send_event(DamageEvent {
            target,
            source,
            amount: 1.0,
        });
        app.update();

        assert_eq!(app.world().get::<Health>(target).map(|h| h.current), Some(3.0));
        assert!(app.world().get::<Dead>(target).is_none());
    }
}
