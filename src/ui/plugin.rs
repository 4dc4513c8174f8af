//! UI plugin - HUD and the pause overlay.

use bevy::prelude::*;

use super::hud;
use crate::core::GameState;

/// Action and binding pairs listed while paused.
const CONTROLS: &[(&str, &str)] = &[
    ("Move", "WASD / left stick"),
    ("Look", "Mouse / right stick"),
    ("Sprint", "Shift / East"),
    ("Roll", "Space / South"),
    ("Attack", "Left click / R1"),
    ("Lock on", "Q / middle click / R3"),
    ("Switch target", "Flick the camera while locked"),
];

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        hud::setup_hud_systems(app);

        app.add_systems(OnEnter(GameState::Paused), spawn_pause_overlay)
            .add_systems(OnExit(GameState::Paused), despawn_pause_overlay);
    }
}

#[derive(Component)]
struct PauseOverlay;

fn spawn_pause_overlay(mut commands: Commands) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(6.0),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.7)),
            PauseOverlay,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("PAUSED"),
                TextFont {
                    font_size: 48.0,
                    ..default()
                },
                TextColor(Color::srgb(0.8, 0.8, 0.85)),
                Node {
                    margin: UiRect::bottom(Val::Px(18.0)),
                    ..default()
                },
            ));

            for (action, binding) in CONTROLS {
                parent
                    .spawn(Node {
                        width: Val::Px(420.0),
                        justify_content: JustifyContent::SpaceBetween,
                        ..default()
                    })
                    .with_children(|row| {
                        row.spawn((
                            Text::new(*action),
                            TextFont {
                                font_size: 16.0,
                                ..default()
                            },
                            TextColor(Color::srgb(0.75, 0.72, 0.65)),
                        ));
                        row.spawn((
                            Text::new(*binding),
                            TextFont {
                                font_size: 16.0,
                                ..default()
                            },
                            TextColor(Color::srgb(0.55, 0.55, 0.6)),
                        ));
                    });
            }

            parent.spawn((
                Text::new("Escape to resume"),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(0.6, 0.6, 0.65)),
                Node {
                    margin: UiRect::top(Val::Px(18.0)),
                    ..default()
                },
            ));
        });
}

fn despawn_pause_overlay(mut commands: Commands, query: Query<Entity, With<PauseOverlay>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}
