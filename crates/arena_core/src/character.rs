//! Runtime characters.
//!
//! A [`Character`] is built from a [`Blueprint`] and a class definition. It
//! owns its stats and transient combat state; the battle orchestrator decides
//! when each mutation happens.

use serde::{Deserialize, Serialize};

use crate::blueprint::{Blueprint, CharacterId, Side};
use crate::combat::{classify, mitigate, DamageOutcome};
use crate::data::{AttackStyle, ClassRegistry};
use crate::error::Result;
use crate::lifecycle::LifecycleState;
use crate::math::Vec2;
use crate::stats::{LevelUpDelta, Progression, StatBlock, Vitals};
use crate::steering::{Facing, Peer};

/// A combatant on the board.
#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    id: CharacterId,
    class: String,
    side: Side,
    attack_style: AttackStyle,
    level_up: LevelUpDelta,
    collision_width: f32,

    /// Current stats, including level-up gains.
    pub stats: StatBlock,
    /// Health and mana pools.
    pub vitals: Vitals,
    /// Level and experience.
    pub progression: Progression,
    /// Live world position.
    pub position: Vec2,
    /// Home position restored when a round resets.
    pub board_position: Vec2,
    /// Velocity in world units per second.
    pub velocity: Vec2,
    /// Current target. Looked up by ID every tick and never owned.
    pub target: Option<CharacterId>,
    /// Cardinal facing.
    pub facing: Facing,
    /// Lifecycle state.
    pub state: LifecycleState,
    /// Set while an attack cycle is in progress.
    pub is_attacking: bool,
    /// Set while steering is driving the character.
    pub moving: bool,
}

impl Character {
    /// Build a character from a blueprint.
    ///
    /// The blueprint's stat block is taken as-is; the class supplies the
    /// attack style, level-up deltas, and body size.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::UnknownClass`](crate::error::ArenaError::UnknownClass)
    /// if the blueprint names a class the registry does not know.
    pub fn from_blueprint(blueprint: &Blueprint, classes: &ClassRegistry) -> Result<Self> {
        let class = classes.get(&blueprint.class)?;

        Ok(Self {
            id: blueprint.id.clone(),
            class: class.id.clone(),
            side: blueprint.side(),
            attack_style: class.attack_style,
            level_up: class.level_up,
            collision_width: class.collision_width,
            stats: blueprint.stats,
            vitals: Vitals::full(&blueprint.stats),
            progression: blueprint.progression,
            position: blueprint.board_position,
            board_position: blueprint.board_position,
            velocity: Vec2::ZERO,
            target: None,
            facing: Facing::Down,
            state: LifecycleState::Idle,
            is_attacking: false,
            moving: false,
        })
    }

    /// Serialize the persistent part of this character.
    #[must_use]
    pub fn to_blueprint(&self) -> Blueprint {
        Blueprint {
            id: self.id.clone(),
            class: self.class.clone(),
            is_player: self.side == Side::Player,
            progression: self.progression,
            stats: self.stats,
            board_position: self.board_position,
        }
    }

    /// Unique ID.
    #[must_use]
    pub fn id(&self) -> &CharacterId {
        &self.id
    }

    /// Class name.
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Roster this character fights for.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Melee or ranged damage delivery.
    #[must_use]
    pub const fn attack_style(&self) -> AttackStyle {
        self.attack_style
    }

    /// Body width in world units.
    #[must_use]
    pub const fn collision_width(&self) -> f32 {
        self.collision_width
    }

    /// Whether the character still counts toward its roster.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.state.is_dead()
    }

    /// This character seen as an obstacle by others.
    #[must_use]
    pub const fn as_peer(&self) -> Peer {
        Peer {
            position: self.position,
            collision_width: self.collision_width,
        }
    }

    /// Apply incoming damage through armor and resistance.
    ///
    /// Returns `None` if the character is already dead; dead characters take
    /// no further damage. A hit that brings health to zero kills the
    /// character immediately.
    pub fn take_damage(&mut self, raw: f32, crit: bool) -> Option<DamageOutcome> {
        if !self.is_active() {
            return None;
        }

        let amount = mitigate(raw, self.stats.armor, self.stats.resistance);
        self.vitals.lose_health(amount);
        let killed = self.vitals.is_depleted() && self.die();

        Some(DamageOutcome {
            amount,
            kind: classify(amount, crit),
            killed,
        })
    }

    /// Mark the character dead.
    ///
    /// Returns `true` only on the first call; later calls change nothing.
    pub fn die(&mut self) -> bool {
        if self.state.is_dead() {
            return false;
        }

        self.state = LifecycleState::Dead;
        self.facing = self.facing.fallen();
        self.target = None;
        self.is_attacking = false;
        self.stop();
        true
    }

    /// Zero velocity and clear the moving flag.
    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
        self.moving = false;
    }

    /// Drop the current target and fall back to the neutral facing.
    pub fn clear_target(&mut self) {
        self.target = None;
        self.facing = Facing::Down;
        self.stop();
    }

    /// Passive mana regeneration for `delta_ms` of battle time.
    pub fn regen_mana(&mut self, delta_ms: f32) {
        let gained = self.stats.mana_per_second * delta_ms / 1000.0;
        self.vitals.gain_mana(gained, self.stats.max_mana);
    }

    /// Mana reward for a landed strike.
    pub fn reward_attack(&mut self) {
        self.vitals
            .gain_mana(self.stats.mana_per_attack, self.stats.max_mana);
    }

    /// Grant one experience point, applying the class deltas on level-up.
    ///
    /// Returns `true` if the character leveled up.
    pub fn gain_experience(&mut self) -> bool {
        let leveled = self.progression.gain_experience();
        if leveled {
            self.level_up.apply(&mut self.stats);
        }
        leveled
    }

    /// Restore the character for a new round at `position`.
    pub fn reset_for_round(&mut self, position: Vec2) {
        self.vitals = Vitals::full(&self.stats);
        self.state = LifecycleState::Idle;
        self.position = position;
        self.is_attacking = false;
        self.clear_target();
    }

    /// Read-only view for observers.
    #[must_use]
    pub fn snapshot(&self) -> CharacterSnapshot {
        CharacterSnapshot {
            id: self.id.clone(),
            class: self.class.clone(),
            side: self.side,
            health: self.vitals.health,
            max_health: self.stats.max_health,
            mana: self.vitals.mana,
            max_mana: self.stats.max_mana,
            level: self.progression.level,
            experience: self.progression.experience,
            stats: self.stats,
            facing: self.facing,
            state: self.state,
            alive: self.is_active(),
            position: self.position,
            target: self.target.clone(),
        }
    }
}

/// Everything an observer may read about a character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSnapshot {
    /// Character ID.
    pub id: CharacterId,
    /// Class name.
    pub class: String,
    /// Roster.
    pub side: Side,
    /// Current health.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Current mana.
    pub mana: f32,
    /// Maximum mana.
    pub max_mana: f32,
    /// Level.
    pub level: u32,
    /// Experience toward the next level.
    pub experience: u32,
    /// Full combat stat block.
    pub stats: StatBlock,
    /// Facing.
    pub facing: Facing,
    /// Lifecycle state.
    pub state: LifecycleState,
    /// Whether the character is alive.
    pub alive: bool,
    /// World position.
    pub position: Vec2,
    /// Current target, if any.
    pub target: Option<CharacterId>,
}
