//! In-game HUD - health and stamina bars fed by status events.

use bevy::prelude::*;

use crate::core::{GameState, GameplaySet, StatusEvent};

/// Marker for HUD root entity.
#[derive(Component)]
pub struct HudRoot;

/// Marker for health bar fill.
#[derive(Component)]
pub struct HealthBar;

/// Marker for stamina bar fill.
#[derive(Component)]
pub struct StaminaBar;

/// Last values reported by the player.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct HudValues {
    pub health: f32,
    pub max_health: f32,
    pub stamina: f32,
    pub max_stamina: f32,
}

impl Default for HudValues {
    fn default() -> Self {
        Self {
            health: 1.0,
            max_health: 1.0,
            stamina: 1.0,
            max_stamina: 1.0,
        }
    }
}

impl HudValues {
    pub fn apply(&mut self, event: StatusEvent) {
        match event {
            StatusEvent::HealthChanged(value) => self.health = value,
            StatusEvent::MaxHealthChanged(value) => self.max_health = value,
            StatusEvent::StaminaChanged(value) => self.stamina = value,
            StatusEvent::MaxStaminaChanged(value) => self.max_stamina = value,
        }
    }

    pub fn health_percent(&self) -> f32 {
        percent(self.health, self.max_health)
    }

    pub fn stamina_percent(&self) -> f32 {
        percent(self.stamina, self.max_stamina)
    }
}

fn percent(value: f32, maximum: f32) -> f32 {
    if maximum <= 0.0 {
        return 0.0;
    }
    (value / maximum).clamp(0.0, 1.0) * 100.0
}

/// Setup HUD systems.
pub fn setup_hud_systems(app: &mut App) {
    app.init_resource::<HudValues>()
        .add_systems(OnExit(GameState::Loading), spawn_hud)
        .add_systems(Update, update_bars.in_set(GameplaySet::Feedback));
}

fn spawn_hud(mut commands: Commands) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Start,
                align_items: AlignItems::Start,
                padding: UiRect::all(Val::Px(20.0)),
                ..default()
            },
            HudRoot,
        ))
        .with_children(|parent| {
            spawn_bar(parent, "Health", Color::srgb(0.7, 0.15, 0.15), 240.0, HealthBar);
            spawn_bar(parent, "Stamina", Color::srgb(0.2, 0.65, 0.3), 180.0, StaminaBar);
        });
}

fn spawn_bar<M: Component>(parent: &mut ChildBuilder, label: &str, color: Color, width: f32, bar_marker: M) {
    parent
        .spawn(Node {
            flex_direction: FlexDirection::Row,
            align_items: AlignItems::Center,
            margin: UiRect::bottom(Val::Px(5.0)),
            ..default()
        })
        .with_children(|bar_parent| {
            bar_parent.spawn((
                Text::new(label),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(0.8, 0.8, 0.8)),
                Node {
                    width: Val::Px(60.0),
                    ..default()
                },
            ));

            bar_parent
                .spawn((
                    Node {
                        width: Val::Px(width),
                        height: Val::Px(10.0),
                        ..default()
                    },
                    BackgroundColor(Color::srgb(0.1, 0.1, 0.1)),
                ))
                .with_children(|bg| {
                    bg.spawn((
                        Node {
                            width: Val::Percent(100.0),
                            height: Val::Percent(100.0),
                            ..default()
                        },
                        BackgroundColor(color),
                        bar_marker,
                    ));
                });
        });
}

fn update_bars(
    mut events: EventReader<StatusEvent>,
    mut values: ResMut<HudValues>,
    mut health_bar: Query<&mut Node, (With<HealthBar>, Without<StaminaBar>)>,
    mut stamina_bar: Query<&mut Node, (With<StaminaBar>, Without<HealthBar>)>,
) {
    if events.is_empty() {
        return;
    }
    for event in events.read() {
        values.apply(*event);
    }

    if let Ok(mut bar) = health_bar.get_single_mut() {
        bar.width = Val::Percent(values.health_percent());
    }
    if let Ok(mut bar) = stamina_bar.get_single_mut() {
        bar.width = Val::Percent(values.stamina_percent());
    }
}
