//! # Arena Core
//!
//! Combat core for a grid-placement auto-battler.
//!
//! Two rosters are placed on a board, then fight on their own: every
//! character picks the nearest living enemy, walks to it while sidestepping
//! other bodies, and attacks on a timed cycle until one side is wiped.
//!
//! This crate contains **only** the simulation:
//! - No rendering
//! - No file or network IO (persistence is the [`store::RosterStore`] seam)
//! - No system randomness (crit rolls come from a seeded [`rng::CombatRng`])
//!
//! ## Crate Structure
//!
//! - [`battle`] - Tick orchestrator and roster commands
//! - [`character`] - Runtime characters built from blueprints
//! - [`targeting`] - Nearest-enemy selection
//! - [`steering`] - Movement with peer avoidance
//! - [`combat`] - Damage math and attack timing
//! - [`lifecycle`] - Per-character and global state machines
//! - [`data`] - Data-driven class table
//! - [`math`] - Vector and angle utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod battle;
pub mod blueprint;
pub mod character;
pub mod combat;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod grid;
pub mod lifecycle;
pub mod math;
pub mod projectile;
pub mod rng;
pub mod roster;
pub mod stats;
pub mod steering;
pub mod store;
pub mod targeting;
pub mod timers;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::battle::Battle;
    pub use crate::blueprint::{Blueprint, CharacterId, Side};
    pub use crate::character::{Character, CharacterSnapshot};
    pub use crate::combat::HitKind;
    pub use crate::config::BattleConfig;
    pub use crate::data::{AttackStyle, ClassData, ClassRegistry};
    pub use crate::error::{ArenaError, Result};
    pub use crate::events::{BattleEvent, TickEvents};
    pub use crate::grid::{BoardGrid, Cell};
    pub use crate::lifecycle::{FightState, LifecycleState};
    pub use crate::math::Vec2;
    pub use crate::stats::{LevelUpDelta, Progression, StatBlock};
    pub use crate::steering::Facing;
    pub use crate::store::RosterStore;
}
