//! Enemy plugin - visibility bookkeeping and dummy feedback.

use bevy::prelude::*;

use super::components::TargetDummy;
use super::visibility::{track_enemy_visibility, unregister_removed_enemies};
use crate::combat::{DamageEvent, Health};
use crate::core::GameplaySet;

pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (track_enemy_visibility, unregister_removed_enemies)
                .chain()
                .in_set(GameplaySet::Targets),
        )
        // After damage is applied so the log shows the remaining health.
        .add_systems(Update, log_dummy_damage.in_set(GameplaySet::Feedback));
    }
}

fn log_dummy_damage(mut events: EventReader<DamageEvent>, dummies: Query<(&TargetDummy, &Health)>) {
    for event in events.read() {
        if let Ok((dummy, health)) = dummies.get(event.target) {
            info!(
                "{} took {} damage ({}/{})",
                dummy.name, event.amount, health.current, health.maximum
            );
        }
    }
}
