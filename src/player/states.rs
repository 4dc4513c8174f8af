//! Player states.
//!
//! Each state decides the next state from the shared context, sets up flags
//! and animation on enter, and moves the player in `on_animator_move`. The
//! machine stores the active state in place; a transition overwrites it with
//! a fresh variant instead of allocating.

use bevy::prelude::*;

use super::animation::{params, AnimationId, Animator};
use super::flags::PlayerFlags;
use super::machine::PlayerContext;

/// Tag of a player state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Idle,
    Moving,
    Attacking,
    Rolling,
    Falling,
    Landing,
}

/// Active state with its per-instance data.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerState {
    Idle,
    Moving {
        /// Smoothed speed approaching the target speed.
        current_speed: f32,
    },
    Attacking {
        combo_index: usize,
    },
    Rolling,
    Falling {
        vertical_velocity: f32,
        /// Horizontal velocity carried over from the ground.
        carry: Vec3,
    },
    Landing,
}

/// Base rule: when the animation asks to idle, hand control back to the
/// grounded states. Otherwise stay in `current`.
fn idle_or_moving(ctx: &PlayerContext, current: StateKind) -> StateKind {
    if !ctx.has_flag(PlayerFlags::TRIES_TO_IDLE) {
        return current;
    }
    if ctx.has_movement_input() {
        StateKind::Moving
    } else {
        StateKind::Idle
    }
}

fn wants_roll(ctx: &PlayerContext) -> bool {
    ctx.has_valid_roll_input() && ctx.has_flag(PlayerFlags::CAN_ROLL)
}

fn wants_attack(ctx: &PlayerContext) -> bool {
    ctx.has_valid_attack_input() && ctx.has_flag(PlayerFlags::CAN_ATTACK)
}

fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

fn move_towards_vec(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_delta || distance == 0.0 {
        target
    } else {
        current + delta / distance * max_delta
    }
}

impl PlayerState {
    /// A new instance of `kind` with its per-instance data reset.
    pub fn fresh(kind: StateKind) -> Self {
        match kind {
            StateKind::Idle => Self::Idle,
            StateKind::Moving => Self::Moving { current_speed: 0.0 },
            StateKind::Attacking => Self::Attacking { combo_index: 0 },
            StateKind::Rolling => Self::Rolling,
            StateKind::Falling => Self::Falling {
                vertical_velocity: 0.0,
                carry: Vec3::ZERO,
            },
            StateKind::Landing => Self::Landing,
        }
    }

    pub fn kind(&self) -> StateKind {
        match self {
            Self::Idle => StateKind::Idle,
            Self::Moving { .. } => StateKind::Moving,
            Self::Attacking { .. } => StateKind::Attacking,
            Self::Rolling => StateKind::Rolling,
            Self::Falling { .. } => StateKind::Falling,
            Self::Landing => StateKind::Landing,
        }
    }

    /// Which state should be active next. Pure: reads the context only.
    pub fn next_state(&self, ctx: &PlayerContext) -> StateKind {
        match self {
            Self::Idle => {
                if !ctx.is_grounded() {
                    StateKind::Falling
                } else if wants_attack(ctx) {
                    StateKind::Attacking
                } else if wants_roll(ctx) {
                    StateKind::Rolling
                } else if ctx.has_movement_input() {
                    StateKind::Moving
                } else {
                    idle_or_moving(ctx, StateKind::Idle)
                }
            }
            Self::Moving { .. } => {
                if !ctx.is_grounded() {
                    StateKind::Falling
                } else if wants_roll(ctx) {
                    StateKind::Rolling
                } else if wants_attack(ctx) {
                    StateKind::Attacking
                } else if !ctx.has_movement_input() {
                    StateKind::Idle
                } else {
                    StateKind::Moving
                }
            }
            Self::Attacking { .. } => {
                if wants_roll(ctx) {
                    StateKind::Rolling
                } else {
                    idle_or_moving(ctx, StateKind::Attacking)
                }
            }
            Self::Rolling => {
                if wants_attack(ctx) {
                    StateKind::Attacking
                } else {
                    idle_or_moving(ctx, StateKind::Rolling)
                }
            }
            Self::Falling { .. } => {
                if ctx.is_grounded() {
                    StateKind::Landing
                } else {
                    StateKind::Falling
                }
            }
            Self::Landing => {
                if wants_roll(ctx) {
                    StateKind::Rolling
                } else {
                    idle_or_moving(ctx, StateKind::Landing)
                }
            }
        }
    }

    pub fn on_enter(&mut self, ctx: &mut PlayerContext, animator: &mut dyn Animator) {
        match self {
            Self::Idle => {
                ctx.update_relative_speeds(animator, Vec3::ZERO);
                animator.play(AnimationId::Idle);
                ctx.set_flags(
                    PlayerFlags::CAN_ROLL
                        | PlayerFlags::CAN_ATTACK
                        | PlayerFlags::CAN_ROTATE
                        | PlayerFlags::CAN_MOVE
                        | PlayerFlags::CAN_REGEN_STAMINA,
                );
                ctx.unset_flags(PlayerFlags::TRIES_TO_IDLE);
            }
            Self::Moving { .. } => {
                animator.play(AnimationId::Move);
                ctx.set_flags(
                    PlayerFlags::CAN_ROLL
                        | PlayerFlags::CAN_ATTACK
                        | PlayerFlags::CAN_ROTATE
                        | PlayerFlags::CAN_MOVE
                        | PlayerFlags::CAN_REGEN_STAMINA,
                );
                ctx.unset_flags(PlayerFlags::TRIES_TO_IDLE);
            }
            Self::Attacking { combo_index } => {
                ctx.consume_attack_input();
                *combo_index = 0;
                ctx.set_attack_index(animator, 0);
                animator.play(AnimationId::Attack);
                ctx.unset_flags(
                    PlayerFlags::CAN_ATTACK
                        | PlayerFlags::CAN_ROLL
                        | PlayerFlags::TRIES_TO_IDLE
                        | PlayerFlags::CAN_REGEN_STAMINA,
                );
                ctx.set_flags(PlayerFlags::CAN_ROTATE);
            }
            Self::Rolling => {
                ctx.consume_roll_input();
                ctx.snap_facing(ctx.world_space_input());
                animator.play(AnimationId::Roll);
                ctx.unset_flags(
                    PlayerFlags::TRIES_TO_IDLE
                        | PlayerFlags::CAN_ATTACK
                        | PlayerFlags::CAN_ROLL
                        | PlayerFlags::CAN_REGEN_STAMINA,
                );
                ctx.use_roll_stamina();
            }
            Self::Falling {
                vertical_velocity,
                carry,
            } => {
                animator.play(AnimationId::Fall);
                ctx.unset_flags(PlayerFlags::CAN_ROLL | PlayerFlags::CAN_ROTATE | PlayerFlags::CAN_MOVE);
                // Kept for plunge attacks.
                ctx.set_flags(PlayerFlags::CAN_ATTACK);
                *vertical_velocity = ctx.settings().fall_start_velocity;
                *carry = ctx.world_space_input() * ctx.current_movement_speed();
            }
            Self::Landing => {
                animator.play(AnimationId::Land);
                ctx.unset_flags(PlayerFlags::CAN_MOVE | PlayerFlags::CAN_ATTACK | PlayerFlags::CAN_ROTATE);
                ctx.set_flags(PlayerFlags::CAN_ROLL);
            }
        }
    }

    pub fn on_exit(&mut self, ctx: &mut PlayerContext, animator: &mut dyn Animator) {
        if let Self::Attacking { combo_index } = self {
            *combo_index = 0;
            ctx.clear_attack(animator);
        }
    }

    pub fn on_animator_move(&mut self, ctx: &mut PlayerContext, animator: &mut dyn Animator, dt: f32) {
        match self {
            Self::Idle | Self::Landing => {}
            Self::Moving { current_speed } => {
                let direction = ctx.world_space_input().normalize_or(ctx.forward());
                *current_speed = move_towards(
                    *current_speed,
                    ctx.current_movement_speed(),
                    ctx.settings().acceleration * dt,
                );

                let locked = ctx.has_flag(PlayerFlags::IS_LOCKED_ON);
                if ctx.has_flag(PlayerFlags::CAN_ROTATE) {
                    let goal = ctx.facing_goal(!ctx.is_sprinting());
                    ctx.rotate_towards(goal, dt);
                }

                let multiplier = if locked {
                    1.0
                } else {
                    direction.dot(ctx.forward()).max(0.0)
                };
                let velocity = direction * *current_speed * multiplier;
                ctx.update_relative_speeds(animator, velocity);

                let mut step = velocity * dt;
                step.y = ctx.settings().ground_bias;
                ctx.move_by(step);

                if ctx.is_sprinting() {
                    ctx.use_sprint_stamina(dt);
                    ctx.unset_flags(PlayerFlags::CAN_REGEN_STAMINA);
                } else {
                    ctx.set_flags(PlayerFlags::CAN_REGEN_STAMINA);
                }
            }
            Self::Attacking { combo_index } => {
                ctx.apply_root_motion(animator);
                if ctx.has_flag(PlayerFlags::CAN_ROTATE) {
                    ctx.rotate_towards(ctx.facing_goal(true), dt);
                }

                if ctx.has_flag(PlayerFlags::CAN_ATTACK) && ctx.has_valid_attack_input() {
                    ctx.consume_attack_input();
                    *combo_index = (*combo_index + 1) % ctx.basic_attacks().len();
                    ctx.set_attack_index(animator, *combo_index);
                    ctx.set_flags(PlayerFlags::CAN_ROTATE);
                    ctx.unset_flags(
                        PlayerFlags::CAN_ROLL | PlayerFlags::CAN_ATTACK | PlayerFlags::TRIES_TO_IDLE,
                    );
                }
            }
            Self::Rolling => {
                ctx.apply_root_motion(animator);
                if ctx.has_valid_roll_input() && ctx.has_flag(PlayerFlags::CAN_ROLL) {
                    animator.set_trigger(params::RE_ROLL);
                    ctx.consume_roll_input();
                    ctx.unset_flags(PlayerFlags::CAN_ROLL);
                    ctx.snap_facing(ctx.world_space_input());
                    ctx.use_roll_stamina();
                }
            }
            Self::Falling {
                vertical_velocity,
                carry,
            } => {
                let velocity = Vec3::new(carry.x, *vertical_velocity, carry.z);
                *vertical_velocity += ctx.settings().gravity * dt;
                *carry = move_towards_vec(*carry, Vec3::ZERO, ctx.settings().air_drag * dt);
                ctx.move_by(velocity * dt);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::camera::TargetTracker;
    use crate::combat::{AttackDefinition, HitVolume};
    use crate::core::StatusEvent;
    use crate::player::animation::{AnimationEvent, PlayerAnimator};
    use crate::player::machine::PlayerMachine;
    use crate::player::PlayerSettings;

    const DT: f32 = 1.0 / 60.0;

    fn attacks(count: usize) -> Arc<[AttackDefinition]> {
        (0..count)
            .map(|i| AttackDefinition {
                name: format!("Swing {i}"),
                damage_multiplier: 1.0,
                stamina_cost: 0.0,
                hit_volumes: vec![HitVolume::sphere(Vec3::new(0.0, 1.0, -1.0), 0.5)],
            })
            .collect()
    }

    fn machine(attack_count: usize) -> (PlayerMachine, PlayerAnimator) {
        let mut animator = PlayerAnimator::default();
        let machine = PlayerMachine::new(PlayerSettings::default(), attacks(attack_count), &mut animator);
        (machine, animator)
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        a.distance(b) < 1e-4
    }

    #[test]
    fn test_starts_idle_with_ground_flags() {
        let (machine, animator) = machine(1);
        assert_eq!(machine.state(), StateKind::Idle);
        assert_eq!(animator.current, Some(AnimationId::Idle));
        assert!(machine.flags().contains(
            PlayerFlags::CAN_ROLL
                | PlayerFlags::CAN_ATTACK
                | PlayerFlags::CAN_MOVE
                | PlayerFlags::CAN_ROTATE
                | PlayerFlags::CAN_REGEN_STAMINA
        ));
    }

    #[test]
    fn test_roll_from_idle_spends_stamina_and_keeps_facing() {
        let (mut machine, mut animator) = machine(1);
        machine.drain_status_events().for_each(drop);

        machine.press_roll(0.0);
        assert_eq!(machine.update(0.05, DT, &mut animator), Some(StateKind::Rolling));
        assert_eq!(machine.stamina(), 78.0);
        assert!(approx(machine.context().forward(), Vec3::NEG_Z));
        assert!(!machine.context().has_valid_roll_input());

        let events: Vec<_> = machine.drain_status_events().collect();
        assert_eq!(events, vec![StatusEvent::StaminaChanged(78.0)]);
    }

    #[test]
    fn test_roll_faces_input_direction() {
        let (mut machine, mut animator) = machine(1);
        machine.set_movement_input(Vec2::new(1.0, 0.0));
        machine.press_roll(0.0);
        machine.update(0.0, DT, &mut animator);
        assert_eq!(machine.state(), StateKind::Rolling);
        assert!(approx(machine.context().forward(), Vec3::X));
    }

    #[test]
    fn test_expired_roll_is_ignored() {
        let (mut machine, mut animator) = machine(1);
        machine.press_roll(0.0);
        assert_eq!(machine.update(0.2, DT, &mut animator), None);
        assert_eq!(machine.state(), StateKind::Idle);
    }

    #[test]
    fn test_roll_cannot_be_buffered_in_the_air() {
        let (mut machine, mut animator) = machine(1);
        machine.set_grounded(false);
        machine.press_roll(0.0);
        machine.update(0.0, DT, &mut animator);
        assert_eq!(machine.state(), StateKind::Falling);
        assert!(!machine.context().has_valid_roll_input());
    }

    #[test]
    fn test_re_roll_fires_trigger() {
        let (mut machine, mut animator) = machine(1);
        machine.press_roll(0.0);
        machine.update(0.0, DT, &mut animator);

        machine.handle_animation_event(AnimationEvent::SetRollEnabled(true));
        machine.press_roll(0.5);
        machine.update(0.5, DT, &mut animator);
        assert_eq!(machine.state(), StateKind::Rolling);
        machine.animator_move(DT, &mut animator);

        assert_eq!(animator.triggers, vec![params::RE_ROLL]);
        assert_eq!(machine.stamina(), 56.0);
        assert!(!machine.flags().contains(PlayerFlags::CAN_ROLL));
    }

    #[test]
    fn test_combo_wraps_around() {
        let (mut machine, mut animator) = machine(3);
        machine.press_attack(0.0);
        machine.update(0.0, DT, &mut animator);
        assert_eq!(machine.state(), StateKind::Attacking);
        assert_eq!(machine.current_attack().map(|a| a.name.as_str()), Some("Swing 0"));

        let mut now = 0.0;
        for expected in [1, 2, 0] {
            now += 0.5;
            machine.handle_animation_event(AnimationEvent::AttackComplete);
            machine.press_attack(now);
            assert_eq!(machine.update(now, DT, &mut animator), None);
            machine.animator_move(DT, &mut animator);
            assert_eq!(animator.ints[params::ATTACK_INDEX], expected);
            assert_eq!(machine.active_state(), &PlayerState::Attacking { combo_index: expected as usize });
        }
    }

    #[test]
    fn test_attack_input_needs_attack_flag() {
        let (mut machine, mut animator) = machine(2);
        machine.press_attack(0.0);
        machine.update(0.0, DT, &mut animator);

        // Still recovering from the first swing.
        machine.press_attack(0.05);
        machine.update(0.05, DT, &mut animator);
        machine.animator_move(DT, &mut animator);
        assert_eq!(machine.active_state(), &PlayerState::Attacking { combo_index: 0 });
    }

    #[test]
    fn test_no_attacks_means_no_attacking() {
        let (mut machine, mut animator) = machine(0);
        machine.press_attack(0.0);
        assert_eq!(machine.update(0.0, DT, &mut animator), None);
    }

    #[test]
    fn test_leaving_attack_clears_current_attack() {
        let (mut machine, mut animator) = machine(2);
        machine.press_attack(0.0);
        machine.update(0.0, DT, &mut animator);
        assert!(machine.current_attack().is_some());

        machine.handle_animation_event(AnimationEvent::SetFlag(PlayerFlags::TRIES_TO_IDLE));
        assert_eq!(machine.update(0.5, DT, &mut animator), Some(StateKind::Idle));
        assert!(machine.current_attack().is_none());
        assert_eq!(animator.ints[params::ATTACK_INDEX], 0);
    }

    #[test]
    fn test_roll_cancels_attack_once_allowed() {
        let (mut machine, mut animator) = machine(1);
        machine.press_attack(0.0);
        machine.update(0.0, DT, &mut animator);

        machine.press_roll(0.1);
        assert_eq!(machine.update(0.1, DT, &mut animator), None);

        machine.handle_animation_event(AnimationEvent::AttackComplete);
        machine.press_roll(0.2);
        assert_eq!(machine.update(0.2, DT, &mut animator), Some(StateKind::Rolling));
    }

    #[test]
    fn test_locked_movement_turns_toward_target() {
        let (mut machine, mut animator) = machine(1);
        let mut tracker = TargetTracker::default();
        let target = Vec3::new(5.0, 0.0, 0.0);
        let handle = tracker.register(1u32, target);

        machine.on_target_changed(Some(handle));
        machine.set_look_target(Some(target));
        machine.set_movement_input(Vec2::new(0.0, 1.0));
        assert_eq!(machine.update(0.0, DT, &mut animator), Some(StateKind::Moving));

        let motion = machine.animator_move(1.0, &mut animator);
        assert!(approx(motion.forward, Vec3::X));
        assert!(machine.flags().contains(PlayerFlags::IS_LOCKED_ON));
        assert_eq!(machine.locked_target(), Some(handle));
    }

    #[test]
    fn test_sprinting_ignores_lock_for_facing() {
        let (mut machine, mut animator) = machine(1);
        let mut tracker = TargetTracker::default();
        let target = Vec3::new(5.0, 0.0, 0.0);
        machine.on_target_changed(Some(tracker.register(1u32, target)));
        machine.set_look_target(Some(target));
        machine.set_movement_input(Vec2::new(0.0, 1.0));
        machine.set_sprint(true);
        machine.update(0.0, DT, &mut animator);

        let motion = machine.animator_move(1.0, &mut animator);
        assert!(approx(motion.forward, Vec3::NEG_Z));
    }

    #[test]
    fn test_turn_rate_is_limited() {
        let (mut machine, mut animator) = machine(1);
        machine.set_movement_input(Vec2::new(0.0, -1.0));
        machine.update(0.0, DT, &mut animator);

        // 720 degrees per second for a quarter of a second: a half turn at most.
        let motion = machine.animator_move(0.125, &mut animator);
        assert!(approx(motion.forward, Vec3::X) || approx(motion.forward, Vec3::NEG_X));
    }

    #[test]
    fn test_moving_applies_ground_bias() {
        let (mut machine, mut animator) = machine(1);
        machine.set_movement_input(Vec2::new(0.0, 1.0));
        machine.update(0.0, DT, &mut animator);
        let motion = machine.animator_move(DT, &mut animator);
        assert_eq!(motion.displacement.y, -4.0);
        assert!(motion.displacement.z < 0.0);
    }

    #[test]
    fn test_reversing_turns_before_moving() {
        let (mut machine, mut animator) = machine(1);
        machine.set_movement_input(Vec2::new(0.0, -1.0));
        machine.update(0.0, DT, &mut animator);

        // Still facing mostly away from the input after one frame of turning.
        let motion = machine.animator_move(DT, &mut animator);
        assert_eq!(motion.displacement.x, 0.0);
        assert_eq!(motion.displacement.z, 0.0);
    }

    #[test]
    fn test_stopping_returns_to_idle() {
        let (mut machine, mut animator) = machine(1);
        machine.set_movement_input(Vec2::new(0.0, 1.0));
        machine.update(0.0, DT, &mut animator);
        machine.set_movement_input(Vec2::ZERO);
        assert_eq!(machine.update(DT, DT, &mut animator), Some(StateKind::Idle));
        assert_eq!(animator.floats[params::RELATIVE_Z_SPEED], 0.0);
    }

    #[test]
    fn test_fall_and_land() {
        let (mut machine, mut animator) = machine(1);
        machine.set_grounded(false);
        assert_eq!(machine.update(0.0, DT, &mut animator), Some(StateKind::Falling));
        assert!(machine.flags().contains(PlayerFlags::CAN_ATTACK));
        assert!(!machine.flags().intersects(PlayerFlags::CAN_ROLL | PlayerFlags::CAN_MOVE));

        let first = machine.animator_move(0.1, &mut animator);
        assert!((first.displacement.y - -0.15).abs() < 1e-5);
        let second = machine.animator_move(0.1, &mut animator);
        assert!((second.displacement.y - -0.25).abs() < 1e-5);

        machine.set_grounded(true);
        assert_eq!(machine.update(0.2, DT, &mut animator), Some(StateKind::Landing));
        assert!(machine.flags().contains(PlayerFlags::CAN_ROLL));
        assert!(!machine.flags().contains(PlayerFlags::CAN_MOVE));

        machine.handle_animation_event(AnimationEvent::SetFlag(PlayerFlags::TRIES_TO_IDLE));
        assert_eq!(machine.update(0.5, DT, &mut animator), Some(StateKind::Idle));
    }

    #[test]
    fn test_fall_carries_horizontal_speed() {
        let (mut machine, mut animator) = machine(1);
        machine.set_movement_input(Vec2::new(0.0, 1.0));
        machine.update(0.0, DT, &mut animator);
        machine.set_grounded(false);
        machine.update(DT, DT, &mut animator);

        let motion = machine.animator_move(0.5, &mut animator);
        // Walk speed of 3 carried for half a second.
        assert!((motion.displacement.z - -1.5).abs() < 1e-4);
        let motion = machine.animator_move(0.5, &mut animator);
        assert!(motion.displacement.z.abs() < 1e-4);
    }

    const ALL_KINDS: [StateKind; 6] = [
        StateKind::Idle,
        StateKind::Moving,
        StateKind::Attacking,
        StateKind::Rolling,
        StateKind::Falling,
        StateKind::Landing,
    ];

    #[test]
    fn test_next_state_has_no_side_effects() {
        let gating = [
            PlayerFlags::empty(),
            PlayerFlags::CAN_ROLL | PlayerFlags::CAN_ATTACK,
            PlayerFlags::TRIES_TO_IDLE,
            PlayerFlags::CAN_ROLL | PlayerFlags::CAN_ATTACK | PlayerFlags::TRIES_TO_IDLE,
        ];

        for grounded in [true, false] {
            for input in [Vec2::ZERO, Vec2::new(0.0, 1.0)] {
                for pressed in [(false, false), (true, false), (false, true), (true, true)] {
                    for flags in gating {
                        let (mut machine, _animator) = machine(2);
                        machine.handle_animation_event(AnimationEvent::UnsetFlag(PlayerFlags::all()));
                        machine.handle_animation_event(AnimationEvent::SetFlag(flags));
                        machine.set_movement_input(input);
                        if pressed.0 {
                            machine.press_roll(0.0);
                        }
                        if pressed.1 {
                            machine.press_attack(0.0);
                        }
                        machine.set_grounded(grounded);

                        let before_flags = machine.flags();
                        for kind in ALL_KINDS {
                            let state = PlayerState::fresh(kind);
                            let first = state.next_state(machine.context());
                            let second = state.next_state(machine.context());
                            assert_eq!(first, second, "{kind:?} grounded={grounded} input={input} flags={flags:?}");

                            if !grounded && matches!(kind, StateKind::Idle | StateKind::Moving) {
                                assert_eq!(first, StateKind::Falling);
                            }
                            if kind == StateKind::Falling {
                                let expected = if grounded { StateKind::Landing } else { StateKind::Falling };
                                assert_eq!(first, expected);
                            }
                        }

                        assert_eq!(machine.state(), StateKind::Idle);
                        assert_eq!(machine.flags(), before_flags);
                        assert_eq!(machine.stamina(), 100.0);
                        assert_eq!(machine.context().has_valid_roll_input(), pressed.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_landing_can_be_cancelled_by_roll() {
        let (mut machine, mut animator) = machine(1);
        machine.set_grounded(false);
        machine.update(0.0, DT, &mut animator);
        machine.set_grounded(true);
        assert_eq!(machine.update(0.2, DT, &mut animator), Some(StateKind::Landing));

        machine.press_roll(0.25);
        assert_eq!(machine.update(0.25, DT, &mut animator), Some(StateKind::Rolling));
        assert_eq!(machine.stamina(), 78.0);
    }

    #[test]
    fn test_roll_goes_straight_into_attack_once_allowed() {
        let (mut machine, mut animator) = machine(1);
        machine.press_roll(0.0);
        machine.update(0.0, DT, &mut animator);

        machine.press_attack(0.1);
        assert_eq!(machine.update(0.1, DT, &mut animator), None);

        machine.handle_animation_event(AnimationEvent::SetFlag(PlayerFlags::CAN_ATTACK));
        machine.press_attack(0.4);
        assert_eq!(machine.update(0.4, DT, &mut animator), Some(StateKind::Attacking));
        assert!(machine.current_attack().is_some());
    }

    #[test]
    fn test_held_sprint_stays_off_after_running_dry() {
        let (mut machine, mut animator) = machine(1);
        machine.set_movement_input(Vec2::new(0.0, 1.0));
        machine.set_sprint(true);
        machine.update(1.0, DT, &mut animator);
        machine.animator_move(20.0, &mut animator);
        assert_eq!(machine.stamina(), 0.0);

        // The button stays down but no new press arrives.
        let mut now = 1.0;
        let mut previous = machine.stamina();
        for _ in 0..20 {
            now += 0.1;
            machine.update(now, 0.1, &mut animator);
            machine.animator_move(0.1, &mut animator);
            assert!(!machine.context().is_sprinting());
            assert!(machine.stamina() >= previous);
            previous = machine.stamina();
        }
        assert!(machine.stamina() > 30.0);
    }

    #[test]
    fn test_stamina_clamps_and_waits_before_regen() {
        let (mut machine, mut animator) = machine(1);
        machine.set_movement_input(Vec2::new(0.0, 1.0));
        machine.set_sprint(true);
        machine.update(1.0, DT, &mut animator);

        machine.animator_move(20.0, &mut animator);
        assert_eq!(machine.stamina(), 0.0);
        assert!(!machine.context().is_sprinting());

        machine.animator_move(DT, &mut animator);
        assert!(machine.flags().contains(PlayerFlags::CAN_REGEN_STAMINA));
        machine.update(1.4, 0.1, &mut animator);
        assert_eq!(machine.stamina(), 0.0);
        machine.update(1.6, 0.1, &mut animator);
        assert!((machine.stamina() - 3.0).abs() < 1e-4);

        machine.press_roll(1.6);
        assert!(machine.context().has_valid_roll_input());
    }

    #[test]
    fn test_empty_stamina_blocks_roll() {
        let (mut machine, mut animator) = machine(1);
        machine.set_movement_input(Vec2::new(0.0, 1.0));
        machine.set_sprint(true);
        machine.update(0.0, DT, &mut animator);
        machine.animator_move(20.0, &mut animator);

        machine.press_roll(0.1);
        assert_eq!(machine.next_state(), StateKind::Moving);
    }

    #[test]
    fn test_lock_release_clears_flag() {
        let (mut machine, _animator) = machine(1);
        let mut tracker = TargetTracker::default();
        machine.on_target_changed(Some(tracker.register(1u32, Vec3::NEG_Z)));
        machine.on_target_changed(None);
        assert!(!machine.flags().contains(PlayerFlags::IS_LOCKED_ON));
        assert_eq!(machine.context().look_target(), None);
    }
}
