//! Core plugin that sets up game states and global events.

use bevy::prelude::*;

use super::events::*;
use super::states::*;

/// Core plugin - must be added first as other plugins depend on it.
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app
            .init_state::<GameState>()
            .add_event::<DamageEvent>()
            .add_event::<DeathEvent>()
            .add_event::<StatusEvent>()
            .add_event::<TargetChangedEvent>()
            .configure_sets(
                Update,
                (
                    GameplaySet::Input,
                    GameplaySet::Targets,
                    GameplaySet::Camera,
                    GameplaySet::Player,
                    GameplaySet::Combat,
                    GameplaySet::Feedback,
                )
                    .chain()
                    .run_if(in_state(GameState::InGame)),
            )
            // Data files are read synchronously while plugins build, so there
            // is nothing left to wait for.
            .add_systems(OnEnter(GameState::Loading), finish_loading)
            .add_systems(
                Update,
                handle_pause_input.run_if(in_state(GameState::InGame).or(in_state(GameState::Paused))),
            );
    }
}

fn finish_loading(mut next_state: ResMut<NextState<GameState>>) {
    info!("Loading complete");
    next_state.set(GameState::InGame);
}

/// Handle Escape key to pause/unpause the game.
fn handle_pause_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    current_state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if keyboard.just_pressed(KeyCode::Escape) {
        match current_state.get() {
            GameState::InGame => next_state.set(GameState::Paused),
            GameState::Paused => next_state.set(GameState::InGame),
            GameState::Loading => {}
        }
    }
}
