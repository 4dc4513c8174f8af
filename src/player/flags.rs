//! Cross-state permission flags of the player machine.

use bitflags::bitflags;

bitflags! {
    /// Gates what the active state (and the next one) may do.
    ///
    /// Written only by state enter/exit/motion code, animation events routed
    /// through the machine, and the lock-on target callback.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct PlayerFlags: u8 {
        /// The current state can be cancelled with a roll.
        const CAN_ROLL          = 1 << 0;
        /// Movement input may move the player.
        const CAN_MOVE          = 1 << 1;
        /// An attack may start (or continue a combo) this frame.
        const CAN_ATTACK        = 1 << 2;
        /// Movement and camera orient toward the locked target.
        const IS_LOCKED_ON      = 1 << 3;
        /// The current animation is done; fall back to Idle or Moving.
        const TRIES_TO_IDLE     = 1 << 4;
        /// The machine may rotate the player.
        const CAN_ROTATE        = 1 << 5;
        /// Natural stamina regeneration runs.
        const CAN_REGEN_STAMINA = 1 << 6;
    }
}

impl PlayerFlags {
    /// Resolve a flag from the name used in animation event data.
    ///
    /// Blank names resolve to an empty set, unknown names to `None`.
    pub fn from_event_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Some(Self::empty());
        }
        let flag = match name {
            "CanRoll" => Self::CAN_ROLL,
            "CanMove" => Self::CAN_MOVE,
            "CanAttack" => Self::CAN_ATTACK,
            "IsLockedOnTarget" => Self::IS_LOCKED_ON,
            "TriesToIdle" => Self::TRIES_TO_IDLE,
            "CanRotate" => Self::CAN_ROTATE,
            "CanRegenStamina" => Self::CAN_REGEN_STAMINA,
            _ => return None,
        };
        Some(flag)
    }
}
