//! Character lifecycle and round-level fight state.
//!
//! ```text
//!            start fight           target acquired
//!   Idle ───────────────▶ Seeking ─────────────────▶ Approaching ◀──▶ Engaging
//!    ▲                      ▲  │                          │  range crossed  │
//!    │                      │  └──── target lost ◀────────┴─────────────────┘
//!    │ round reset          │
//!   Dead ◀──────────── health ≤ 0 (from any state)
//! ```
//!
//! While the battle is [`FightState::Idle`] every character is frozen in
//! [`LifecycleState::Idle`], regardless of its health.

use serde::{Deserialize, Serialize};

/// Global state of the battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FightState {
    /// Placement phase. Characters are frozen and can be moved on the board.
    #[default]
    Idle,
    /// Combat is running.
    Fighting,
}

/// Per-character lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LifecycleState {
    /// Battle not started; no targeting or movement.
    #[default]
    Idle,
    /// Fighting with no target; will try to acquire one this tick.
    Seeking,
    /// Has a target outside attack range and is closing in.
    Approaching,
    /// Has a target inside attack range; attack cycles may run.
    Engaging,
    /// Health reached zero. Terminal until the round resets.
    Dead,
}

impl LifecycleState {
    /// Check if the character is dead.
    #[must_use]
    pub const fn is_dead(self) -> bool {
        matches!(self, Self::Dead)
    }

    /// Check if the character is taking part in a running fight.
    #[must_use]
    pub const fn is_fighting(self) -> bool {
        matches!(self, Self::Seeking | Self::Approaching | Self::Engaging)
    }

    /// State of a living, fighting character after its target check.
    #[must_use]
    pub const fn resolve(has_target: bool, in_range: bool) -> Self {
        match (has_target, in_range) {
            (false, _) => Self::Seeking,
            (true, true) => Self::Engaging,
            (true, false) => Self::Approaching,
        }
    }
}
