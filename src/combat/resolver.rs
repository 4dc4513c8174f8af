//! Melee hit resolution for the attack currently being animated.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use bevy::prelude::*;

use super::components::Damageable;
use super::data::AttackDefinition;
use crate::physics::{LayerMask, PhysicsQuery};

/// Damage dealt to every collider an attack touches.
///
/// The attack's `damage_multiplier` is not applied here yet.
pub const HIT_DAMAGE: f32 = 1.0;

/// Lookup from a hit collider to whatever takes damage for it.
pub trait DamageTargets<C> {
    /// Damage the owner of `collider`. Returns false when it cannot take damage.
    fn damage(&mut self, collider: C, amount: f32) -> bool;
}

impl<C: Eq + Hash, D: Damageable> DamageTargets<C> for HashMap<C, D> {
    fn damage(&mut self, collider: C, amount: f32) -> bool {
        match self.get_mut(&collider) {
            Some(target) => {
                target.damage(amount);
                true
            }
            None => false,
        }
    }
}

/// Collect the unique colliders touched by all hit volumes of `attack`.
pub fn collect_hits<P: PhysicsQuery>(
    attack: Option<&AttackDefinition>,
    origin: &Transform,
    physics: &P,
    mask: LayerMask,
) -> Vec<P::Collider> {
    let Some(attack) = attack else {
        return Vec::new();
    };

    let mut buffer = Vec::with_capacity(10);
    let mut seen = HashSet::new();
    let mut hits = Vec::new();

    for volume in &attack.hit_volumes {
        buffer.clear();
        volume.overlap(origin, physics, mask, &mut buffer);
        for &collider in &buffer {
            if seen.insert(collider) {
                hits.push(collider);
            }
        }
    }

    hits
}

/// Run the overlap checks for `attack` and damage each unique hit once.
///
/// Returns how many targets took damage.
pub fn resolve_hit<P, T>(
    attack: Option<&AttackDefinition>,
    origin: &Transform,
    physics: &P,
    mask: LayerMask,
    targets: &mut T,
) -> usize
where
    P: PhysicsQuery,
    T: DamageTargets<P::Collider>,
{
    collect_hits(attack, origin, physics, mask)
        .into_iter()
        .filter(|&collider| targets.damage(collider, HIT_DAMAGE))
        .count()
}
