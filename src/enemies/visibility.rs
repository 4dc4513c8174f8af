//! Keep the lock-on tracker in step with what the camera can see.

use bevy::prelude::*;

use super::components::{Enemy, InView};
use crate::camera::{target_changed_event, LockOnTargets};
use crate::combat::Dead;
use crate::core::TargetChangedEvent;

/// Register enemies that became visible, unregister those that left the view,
/// and refresh positions of the rest.
pub fn track_enemy_visibility(
    mut targets: ResMut<LockOnTargets>,
    mut query: Query<(Entity, &Enemy, &GlobalTransform, &ViewVisibility, &mut InView, Has<Dead>)>,
    mut changes: EventWriter<TargetChangedEvent>,
) {
    for (entity, enemy, transform, visibility, mut in_view, dead) in &mut query {
        let visible = visibility.get() && !dead;
        let position = transform.translation() + Vec3::Y * enemy.lock_on_height;

        if visible == in_view.0 {
            if visible {
                targets.set_position(entity, position);
            }
            continue;
        }

        in_view.0 = visible;
        if visible {
            targets.register(entity, position);
            debug!("{:?} entered view", entity);
        } else if let Some(change) = targets.unregister(entity) {
            changes.send(target_changed_event(change, &targets));
        }
    }
}

/// Despawned enemies never report leaving the view; drop them here.
pub fn unregister_removed_enemies(
    mut removed: RemovedComponents<Enemy>,
    mut targets: ResMut<LockOnTargets>,
    mut changes: EventWriter<TargetChangedEvent>,
) {
    for entity in removed.read() {
        if let Some(change) = targets.unregister(entity) {
            changes.send(target_changed_event(change, &targets));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{SelectionSettings, Viewpoint};
    use crate::physics::LayerMask;
    use crate::testing::FakePhysics;

    fn tracking_app() -> App {
        let mut app = App::new();
        app.init_resource::<LockOnTargets>()
            .add_event::<TargetChangedEvent>()
            .add_systems(Update, (track_enemy_visibility, unregister_removed_enemies).chain());
        app
    }

    fn spawn_enemy(app: &mut App, visible: bool) -> Entity {
        let mut visibility = ViewVisibility::HIDDEN;
        if visible {
            visibility.set();
        }
        app.world_mut()
            .spawn((
                Enemy::default(),
                InView::default(),
                GlobalTransform::from_translation(Vec3::new(0.0, 0.0, -4.0)),
                visibility,
            ))
            .id()
    }

    #[test]
    fn test_visible_enemy_is_registered_once() {
        let mut app = tracking_app();
        let enemy = spawn_enemy(&mut app, true);
        app.update();
        app.update();

        let targets = app.world().resource::<LockOnTargets>();
        assert_eq!(targets.visible_count(), 1);
        let handle = targets.handle_of(enemy).unwrap();
        assert_eq!(targets.position(handle), Some(Vec3::new(0.0, 1.0, -4.0)));
    }

    #[test]
    fn test_hidden_enemy_is_unregistered() {
        let mut app = tracking_app();
        let enemy = spawn_enemy(&mut app, true);
        app.update();

        app.world_mut().entity_mut(enemy).insert(ViewVisibility::HIDDEN);
        app.update();
        assert_eq!(app.world().resource::<LockOnTargets>().visible_count(), 0);
        assert_eq!(app.world().get::<InView>(enemy), Some(&InView(false)));
    }

    #[test]
    fn test_despawning_locked_enemy_releases_lock() {
        let mut app = tracking_app();
        let enemy = spawn_enemy(&mut app, true);
        app.update();

        let view = Viewpoint {
            position: Vec3::ZERO,
            right: Vec3::X,
        };
        let settings = SelectionSettings {
            max_distance: 10.0,
            occlusion_mask: LayerMask::ALL,
        };
        let locked = app
            .world_mut()
            .resource_mut::<LockOnTargets>()
            .select_best(&view, &settings, &FakePhysics::default())
            .and_then(|change| change.current)
            .unwrap();

        app.world_mut().despawn(enemy);
        app.update();

        let targets = app.world().resource::<LockOnTargets>();
        assert_eq!(targets.visible_count(), 0);
        assert_eq!(targets.selected(), None);
        assert!(targets.get(locked).is_none());
        assert_eq!(app.world().resource::<Events<TargetChangedEvent>>().len(), 1);
    }
}
