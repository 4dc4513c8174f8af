//! Combat module - attack definitions, hit resolution and damage.

mod components;
mod data;
mod error;
mod plugin;
mod resolver;
mod systems;

pub use components::*;
pub use data::{load_attack_chain, parse_attack, AttackDefinition, HitShape, HitVolume};
pub use error::DataLoadError;
pub use plugin::{AttackChain, CombatPlugin, ATTACKS_DIR};
pub use resolver::{collect_hits, resolve_hit, DamageTargets, HIT_DAMAGE};
pub use systems::{apply_damage, DamageSink};
