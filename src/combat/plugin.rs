//! Combat plugin - attack data and damage flow.

use std::sync::Arc;

use bevy::prelude::*;

use super::data::{load_attack_chain, AttackDefinition};
use super::systems::{apply_damage, handle_deaths};
use crate::core::GameplaySet;

/// Directory holding the basic attack chain, one file per combo step.
pub const ATTACKS_DIR: &str = "assets/data/attacks";

/// The player's basic combo, in order.
#[derive(Resource, Debug, Clone, Default)]
pub struct AttackChain(pub Arc<[AttackDefinition]>);

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        let attacks = match load_attack_chain(ATTACKS_DIR) {
            Ok(attacks) => {
                info!("Loaded {} attack(s) for the basic combo", attacks.len());
                attacks
            }
            Err(e) => {
                error!("{}. The player will not be able to attack.", e);
                Vec::new()
            }
        };

        app.insert_resource(AttackChain(attacks.into()))
            .add_systems(Update, (apply_damage, handle_deaths).chain().in_set(GameplaySet::Combat));
    }
}
