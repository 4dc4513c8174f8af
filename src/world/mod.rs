//! World module - the training arena.

mod arena;
mod plugin;

pub use arena::{spawn_block, ArenaGeometry};
pub use plugin::{setup_arena, WorldPlugin};
