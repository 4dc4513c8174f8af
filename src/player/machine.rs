//! The player state machine and the data every state reads and writes.

use std::sync::Arc;

use bevy::prelude::*;

use super::animation::{params, AnimationEvent, Animator};
use super::buffered_input::BufferedInput;
use super::components::PlayerSettings;
use super::flags::PlayerFlags;
use super::states::{PlayerState, StateKind};
use crate::camera::TargetHandle;
use crate::combat::AttackDefinition;
use crate::core::StatusEvent;

/// Result of one motion step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    /// World-space displacement for the character controller.
    pub displacement: Vec3,
    /// Facing after the step (horizontal, normalized).
    pub forward: Vec3,
}

/// Everything the states share. Owned by [`PlayerMachine`].
#[derive(Debug, Clone)]
pub struct PlayerContext {
    settings: PlayerSettings,
    flags: PlayerFlags,
    attack_input: BufferedInput,
    roll_input: BufferedInput,
    movement_input: Vec2,
    sprint_held: bool,
    grounded: bool,
    stamina: f32,
    zero_stamina_time: f32,
    basic_attacks: Arc<[AttackDefinition]>,
    current_attack: Option<usize>,
    locked_target: Option<TargetHandle>,
    look_target: Option<Vec3>,
    position: Vec3,
    forward: Vec3,
    view_yaw: f32,
    now: f32,
    displacement: Vec3,
    status: Vec<StatusEvent>,
}

impl PlayerContext {
    fn new(settings: PlayerSettings, basic_attacks: Arc<[AttackDefinition]>) -> Self {
        Self {
            flags: PlayerFlags::empty(),
            attack_input: settings.attack_input,
            roll_input: settings.roll_input,
            movement_input: Vec2::ZERO,
            sprint_held: false,
            grounded: true,
            stamina: settings.max_stamina,
            zero_stamina_time: f32::NEG_INFINITY,
            basic_attacks,
            current_attack: None,
            locked_target: None,
            look_target: None,
            position: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            view_yaw: 0.0,
            now: 0.0,
            displacement: Vec3::ZERO,
            status: vec![
                StatusEvent::MaxStaminaChanged(settings.max_stamina),
                StatusEvent::StaminaChanged(settings.max_stamina),
            ],
            settings,
        }
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    pub fn flags(&self) -> PlayerFlags {
        self.flags
    }

    pub fn has_flag(&self, flag: PlayerFlags) -> bool {
        self.flags.intersects(flag)
    }

    pub(crate) fn set_flags(&mut self, flags: PlayerFlags) {
        self.flags.insert(flags);
    }

    pub(crate) fn unset_flags(&mut self, flags: PlayerFlags) {
        self.flags.remove(flags);
    }

    pub fn stamina(&self) -> f32 {
        self.stamina
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn movement_input(&self) -> Vec2 {
        self.movement_input
    }

    pub fn has_movement_input(&self) -> bool {
        self.movement_input != Vec2::ZERO
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn look_target(&self) -> Option<Vec3> {
        self.look_target
    }

    pub fn basic_attacks(&self) -> &[AttackDefinition] {
        &self.basic_attacks
    }

    pub fn current_attack(&self) -> Option<&AttackDefinition> {
        self.current_attack.and_then(|index| self.basic_attacks.get(index))
    }

    /// Roll pressed recently, not consumed, and stamina left.
    pub fn has_valid_roll_input(&self) -> bool {
        self.roll_input.is_active_and_valid(self.now) && self.stamina > 0.0
    }

    /// Attack pressed recently, not consumed, stamina left, and something to swing.
    pub fn has_valid_attack_input(&self) -> bool {
        self.attack_input.is_active_and_valid(self.now)
            && self.stamina > 0.0
            && !self.basic_attacks.is_empty()
    }

    pub(crate) fn consume_roll_input(&mut self) {
        self.roll_input.unset();
    }

    pub(crate) fn consume_attack_input(&mut self) {
        self.attack_input.unset();
    }

    pub fn is_sprinting(&self) -> bool {
        self.sprint_held && self.stamina > 0.0
    }

    /// Target speed for the current sprint state.
    pub fn current_movement_speed(&self) -> f32 {
        if self.is_sprinting() {
            self.settings.run_speed
        } else {
            self.settings.walk_speed
        }
    }

    /// Movement input in world space, relative to the camera.
    ///
    /// Not normalized. Falls back to the current facing without input.
    pub fn world_space_input(&self) -> Vec3 {
        if self.movement_input == Vec2::ZERO {
            return self.forward;
        }
        let raw = Vec3::new(self.movement_input.x, 0.0, -self.movement_input.y);
        Quat::from_rotation_y(self.view_yaw) * raw
    }

    /// Direction to face: the locked target when `toward_target`, else the input.
    pub(crate) fn facing_goal(&self, toward_target: bool) -> Vec3 {
        match self.look_target {
            Some(target) if toward_target && self.has_flag(PlayerFlags::IS_LOCKED_ON) => {
                target - self.position
            }
            _ => self.world_space_input(),
        }
    }

    /// Turn toward `direction` about +Y, limited by the turn rate.
    pub(crate) fn rotate_towards(&mut self, direction: Vec3, dt: f32) {
        let direction = Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero();
        if direction == Vec3::ZERO {
            return;
        }
        let cross = self.forward.cross(direction);
        let angle = cross.y.atan2(self.forward.dot(direction));
        let max_step = self.settings.turn_speed.to_radians() * dt;
        let step = angle.signum() * angle.abs().min(max_step);
        self.forward = (Quat::from_rotation_y(step) * self.forward).normalize_or(self.forward);
    }

    /// Face `direction` immediately.
    pub(crate) fn snap_facing(&mut self, direction: Vec3) {
        let direction = Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero();
        if direction != Vec3::ZERO {
            self.forward = direction;
        }
    }

    pub(crate) fn move_by(&mut self, displacement: Vec3) {
        self.displacement += displacement;
    }

    pub(crate) fn apply_root_motion(&mut self, animator: &mut dyn Animator) {
        let motion = animator.take_root_motion();
        self.displacement += motion.translation;
        let turned = motion.rotation * self.forward;
        self.snap_facing(turned);
    }

    /// Publish the velocity in the player's local frame for the blend tree.
    pub(crate) fn update_relative_speeds(&self, animator: &mut dyn Animator, velocity: Vec3) {
        let yaw = (-self.forward.x).atan2(-self.forward.z);
        let local = Quat::from_rotation_y(-yaw) * velocity;
        animator.set_float(params::RELATIVE_X_SPEED, local.x);
        animator.set_float(params::RELATIVE_Z_SPEED, -local.z);
    }

    pub(crate) fn set_attack_index(&mut self, animator: &mut dyn Animator, index: usize) {
        animator.set_int(params::ATTACK_INDEX, index as i32);
        self.current_attack = (index < self.basic_attacks.len()).then_some(index);
    }

    pub(crate) fn clear_attack(&mut self, animator: &mut dyn Animator) {
        animator.set_int(params::ATTACK_INDEX, 0);
        self.current_attack = None;
    }

    fn set_stamina(&mut self, value: f32) {
        let clamped = value.clamp(0.0, self.settings.max_stamina);
        if clamped != self.stamina {
            self.status.push(StatusEvent::StaminaChanged(clamped));
        }
        self.stamina = clamped;
        if clamped <= f32::EPSILON {
            self.zero_stamina_time = self.now;
            self.sprint_held = false;
        }
    }

    pub(crate) fn use_roll_stamina(&mut self) {
        self.set_stamina(self.stamina - self.settings.roll_stamina_cost);
    }

    pub(crate) fn use_sprint_stamina(&mut self, dt: f32) {
        self.set_stamina(self.stamina - self.settings.sprint_stamina_cost * dt);
    }

    fn regen_stamina(&mut self, dt: f32) {
        if self.has_flag(PlayerFlags::CAN_REGEN_STAMINA)
            && self.now - self.zero_stamina_time > self.settings.stamina_regen_delay
        {
            self.set_stamina(self.stamina + self.settings.stamina_regen * dt);
        }
    }
}

/// The player's behaviour: exactly one active state plus shared context.
#[derive(Component, Debug, Clone)]
pub struct PlayerMachine {
    state: PlayerState,
    ctx: PlayerContext,
}

impl PlayerMachine {
    /// Create the machine in Idle.
    pub fn new(
        settings: PlayerSettings,
        basic_attacks: Arc<[AttackDefinition]>,
        animator: &mut dyn Animator,
    ) -> Self {
        let mut machine = Self {
            state: PlayerState::Idle,
            ctx: PlayerContext::new(settings, basic_attacks),
        };
        machine.state.on_enter(&mut machine.ctx, animator);
        machine
    }

    pub fn state(&self) -> StateKind {
        self.state.kind()
    }

    /// The active state with its per-instance data.
    pub fn active_state(&self) -> &PlayerState {
        &self.state
    }

    pub fn context(&self) -> &PlayerContext {
        &self.ctx
    }

    pub fn flags(&self) -> PlayerFlags {
        self.ctx.flags
    }

    pub fn stamina(&self) -> f32 {
        self.ctx.stamina
    }

    pub fn current_attack(&self) -> Option<&AttackDefinition> {
        self.ctx.current_attack()
    }

    pub fn locked_target(&self) -> Option<TargetHandle> {
        self.ctx.locked_target
    }

    // Input

    pub fn set_movement_input(&mut self, input: Vec2) {
        self.ctx.movement_input = input.clamp_length_max(1.0);
    }

    pub fn set_sprint(&mut self, held: bool) {
        self.ctx.sprint_held = held;
    }

    pub fn press_attack(&mut self, now: f32) {
        self.ctx.attack_input.set(now);
    }

    /// Rolls can only be buffered on the ground.
    pub fn press_roll(&mut self, now: f32) {
        if self.ctx.grounded {
            self.ctx.roll_input.set(now);
        }
    }

    // World state

    /// Copy the body's current placement in before stepping.
    pub fn sync_body(&mut self, position: Vec3, forward: Vec3) {
        self.ctx.position = position;
        self.ctx.snap_facing(forward);
    }

    /// Yaw of the camera, used to map input into world space.
    pub fn set_view_yaw(&mut self, yaw: f32) {
        self.ctx.view_yaw = yaw;
    }

    pub fn set_grounded(&mut self, grounded: bool) {
        self.ctx.grounded = grounded;
    }

    /// Current world position of the locked target, if any.
    pub fn set_look_target(&mut self, position: Option<Vec3>) {
        self.ctx.look_target = position;
    }

    /// The camera's lock-on target changed.
    pub fn on_target_changed(&mut self, target: Option<TargetHandle>) {
        self.ctx.locked_target = target;
        if target.is_some() {
            self.ctx.set_flags(PlayerFlags::IS_LOCKED_ON);
        } else {
            self.ctx.look_target = None;
            self.ctx.unset_flags(PlayerFlags::IS_LOCKED_ON);
        }
    }

    // Ticking

    /// Per-frame update: evaluate the transition, then regenerate stamina.
    ///
    /// Returns the new state when a transition happened.
    pub fn update(&mut self, now: f32, dt: f32, animator: &mut dyn Animator) -> Option<StateKind> {
        self.ctx.now = now;
        let transition = self.check_for_transition(animator);
        self.ctx.regen_stamina(dt);
        transition
    }

    /// Next state per the active state's rules, without side effects.
    pub fn next_state(&self) -> StateKind {
        self.state.next_state(&self.ctx)
    }

    /// Physics/animation step: the active state moves and rotates the player.
    pub fn animator_move(&mut self, dt: f32, animator: &mut dyn Animator) -> Motion {
        self.ctx.displacement = Vec3::ZERO;
        self.state.on_animator_move(&mut self.ctx, animator, dt);
        Motion {
            displacement: self.ctx.displacement,
            forward: self.ctx.forward,
        }
    }

    /// Apply a flag-related animation event. Other events are ignored here.
    pub fn handle_animation_event(&mut self, event: AnimationEvent) {
        match event {
            AnimationEvent::AttackComplete => {
                self.ctx.set_flags(PlayerFlags::CAN_ROLL | PlayerFlags::CAN_ATTACK);
            }
            AnimationEvent::SetRollEnabled(true) => self.ctx.set_flags(PlayerFlags::CAN_ROLL),
            AnimationEvent::SetRollEnabled(false) => self.ctx.unset_flags(PlayerFlags::CAN_ROLL),
            AnimationEvent::SetFlag(flags) => self.ctx.set_flags(flags),
            AnimationEvent::UnsetFlag(flags) => self.ctx.unset_flags(flags),
            _ => {}
        }
    }

    /// Stamina notifications produced since the last drain.
    pub fn drain_status_events(&mut self) -> std::vec::Drain<'_, StatusEvent> {
        self.ctx.status.drain(..)
    }

    fn check_for_transition(&mut self, animator: &mut dyn Animator) -> Option<StateKind> {
        let next = self.state.next_state(&self.ctx);
        if next == self.state.kind() {
            return None;
        }
        debug!("Player state {:?} -> {:?}", self.state.kind(), next);
        self.state.on_exit(&mut self.ctx, animator);
        self.state = PlayerState::fresh(next);
        self.state.on_enter(&mut self.ctx, animator);
        Some(next)
    }
}
