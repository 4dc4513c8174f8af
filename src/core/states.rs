//! Game state definitions that control the overall flow of the game.

use bevy::prelude::*;

/// Main game states.
///
/// - Start in `Loading` while data files are read
/// - `InGame` runs every gameplay system
/// - `Paused` freezes gameplay but keeps the world visible
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum GameState {
    #[default]
    Loading,
    InGame,
    Paused,
}

/// Frame order of gameplay systems. Only runs in `InGame`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameplaySet {
    /// Read devices into buffered inputs
    Input,
    /// Enemy visibility and lock-on bookkeeping
    Targets,
    Camera,
    /// State machine, motion and animation events
    Player,
    /// Damage and deaths
    Combat,
    /// HUD and audio
    Feedback,
}
