//! Notifications emitted by the battle for observers.
//!
//! The core never calls into a UI. Each [`Battle::advance`](crate::battle::Battle::advance)
//! returns the events of that tick; commands buffer theirs until
//! [`Battle::take_events`](crate::battle::Battle::take_events) is called.

use serde::{Deserialize, Serialize};

use crate::blueprint::{CharacterId, Side};
use crate::character::CharacterSnapshot;
use crate::combat::HitKind;
use crate::lifecycle::FightState;
use crate::math::Vec2;

/// Something observers may want to react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleEvent {
    /// Full state of a character after its update.
    CharacterUpdated(CharacterSnapshot),
    /// The global fight state changed.
    FightStateChanged(FightState),
    /// The player roster is empty and needs a first character.
    NeedStartingCharacter,
    /// A strike landed.
    DamageDealt {
        /// Character whose strike it was.
        attacker: CharacterId,
        /// Character that was hit.
        target: CharacterId,
        /// Health removed after mitigation.
        amount: f32,
        /// Normal, critical, or blocked.
        kind: HitKind,
    },
    /// A character died.
    CharacterDied(CharacterId),
    /// An attack cycle began.
    AttackStarted {
        /// Attacking character.
        attacker: CharacterId,
        /// Its target.
        target: CharacterId,
    },
    /// A ranged attacker released a projectile.
    ProjectileFired {
        /// Projectile ID.
        projectile: u64,
        /// Character that fired.
        owner: CharacterId,
        /// Launch position.
        from: Vec2,
    },
    /// A character gained a level.
    LeveledUp {
        /// Character that leveled.
        character: CharacterId,
        /// New level.
        level: u32,
    },
    /// A side was wiped and the round reset.
    RoundFinished {
        /// Surviving side, or `None` if both were wiped in the same pass.
        winner: Option<Side>,
    },
}

/// Events produced by a single tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickEvents {
    /// Tick number after the advance.
    pub tick: u64,
    /// Events in emission order.
    pub events: Vec<BattleEvent>,
}

impl TickEvents {
    /// Check if nothing happened.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Characters that died this tick.
    pub fn deaths(&self) -> impl Iterator<Item = &CharacterId> {
        self.events.iter().filter_map(|e| match e {
            BattleEvent::CharacterDied(id) => Some(id),
            _ => None,
        })
    }

    /// Outcome of the round, if it finished this tick.
    #[must_use]
    pub fn round_result(&self) -> Option<Option<Side>> {
        self.events.iter().find_map(|e| match e {
            BattleEvent::RoundFinished { winner } => Some(*winner),
            _ => None,
        })
    }

    /// Number of strikes that landed this tick.
    #[must_use]
    pub fn hit_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, BattleEvent::DamageDealt { .. }))
            .count()
    }
}
