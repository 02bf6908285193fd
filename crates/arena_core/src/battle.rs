//! Battle orchestrator.
//!
//! [`Battle`] owns both rosters, the battle clock, pending timers, and
//! projectiles in flight. The host calls [`Battle::advance`] once per frame
//! with the elapsed time; everything else is a command issued between
//! frames.
//!
//! # Tick order
//!
//! While fighting, each advance runs:
//! 1. **Clock**: battle time moves forward by the frame delta
//! 2. **Timers**: due attack impacts, recoveries, and projectile expiries fire
//! 3. **Projectiles**: every projectile moves and may hit an enemy
//! 4. **Characters**: player roster first, then enemies, in roster order.
//!    Each character targets, attacks or steers, then moves.
//! 5. **Round check**: if either roster has no active member the round ends
//!
//! While idle, advancing only bumps the tick counter.
//!
//! # Determinism
//!
//! Crit rolls come from a seeded [`CombatRng`] and iteration follows roster
//! order, so the same seed, inputs, and frame deltas always replay the same
//! fight. [`Battle::state_hash`] fingerprints the state for comparison.
//!
//! # Example
//!
//! ```
//! use arena_core::prelude::*;
//!
//! let classes = ClassRegistry::builtin();
//! let mut battle = Battle::new(BattleConfig::default(), classes.clone());
//!
//! let knight = Blueprint::from_class("k1", classes.get("knight")?)
//!     .for_player()
//!     .at(Vec2::new(400.0, 400.0));
//! battle.add_character(&knight)?;
//! battle.spawn_enemy(&Blueprint::from_class("r1", classes.get("rogue")?))?;
//!
//! battle.start_fight();
//! let events = battle.advance(16.0);
//! assert_eq!(events.tick, 1);
//! # Ok::<(), arena_core::error::ArenaError>(())
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tracing::{debug, info, warn};

use crate::blueprint::{Blueprint, CharacterId, Side};
use crate::character::{Character, CharacterSnapshot};
use crate::combat::{attack_cycle_ms, impact_delay_ms, in_attack_range, roll_strike};
use crate::config::BattleConfig;
use crate::data::{AttackStyle, ClassRegistry};
use crate::error::{ArenaError, Result};
use crate::events::{BattleEvent, TickEvents};
use crate::grid::Cell;
use crate::lifecycle::{FightState, LifecycleState};
use crate::projectile::{lifetime_ms, Projectile};
use crate::rng::CombatRng;
use crate::roster::Roster;
use crate::steering::{compute_velocity, Facing, Peer};
use crate::store::{load_or_empty, RosterStore};
use crate::targeting::acquire_target;
use crate::timers::{TimerKind, TimerQueue};

/// A single arena battle between the player roster and the enemy roster.
#[derive(Debug, Clone)]
pub struct Battle {
    config: BattleConfig,
    classes: ClassRegistry,
    players: Roster,
    enemies: Roster,
    state: FightState,
    tick: u64,
    clock_ms: f64,
    round: u32,
    /// Whether any enemy took part in the current fight.
    contested: bool,
    timers: TimerQueue,
    projectiles: Vec<Projectile>,
    next_projectile: u64,
    rng: CombatRng,
    pending: Vec<BattleEvent>,
}

impl Battle {
    /// Create an idle battle with empty rosters.
    #[must_use]
    pub fn new(config: BattleConfig, classes: ClassRegistry) -> Self {
        let rng = CombatRng::from_seed(config.seed);
        Self {
            config,
            classes,
            players: Roster::new(Side::Player),
            enemies: Roster::new(Side::Enemy),
            state: FightState::Idle,
            tick: 0,
            clock_ms: 0.0,
            round: 1,
            contested: false,
            timers: TimerQueue::new(),
            projectiles: Vec::new(),
            next_projectile: 0,
            rng,
            pending: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Battle constants.
    #[must_use]
    pub const fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Class table used to build characters.
    #[must_use]
    pub const fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    /// Current global fight state.
    #[must_use]
    pub const fn fight_state(&self) -> FightState {
        self.state
    }

    /// Number of advances so far.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Battle clock in milliseconds. Only runs while fighting.
    #[must_use]
    pub const fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    /// Current round, starting at 1.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// The player roster.
    #[must_use]
    pub const fn players(&self) -> &Roster {
        &self.players
    }

    /// The enemy roster.
    #[must_use]
    pub const fn enemies(&self) -> &Roster {
        &self.enemies
    }

    /// Roster for a side.
    #[must_use]
    pub const fn roster(&self, side: Side) -> &Roster {
        match side {
            Side::Player => &self.players,
            Side::Enemy => &self.enemies,
        }
    }

    /// Look up a character in either roster.
    #[must_use]
    pub fn character(&self, id: &CharacterId) -> Option<&Character> {
        self.players.get(id).or_else(|| self.enemies.get(id))
    }

    /// Snapshot of a character in either roster.
    #[must_use]
    pub fn snapshot(&self, id: &CharacterId) -> Option<CharacterSnapshot> {
        self.character(id).map(Character::snapshot)
    }

    /// Snapshots of every character, players first.
    #[must_use]
    pub fn snapshots(&self) -> Vec<CharacterSnapshot> {
        self.players
            .iter()
            .chain(self.enemies.iter())
            .map(Character::snapshot)
            .collect()
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Number of pending timers.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Blueprints of the player roster, in roster order, for saving.
    #[must_use]
    pub fn player_blueprints(&self) -> Vec<Blueprint> {
        self.players.iter().map(Character::to_blueprint).collect()
    }

    /// Drain events buffered by commands since the last call or advance.
    pub fn take_events(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.pending)
    }

    // ------------------------------------------------------------------
    // Fight control
    // ------------------------------------------------------------------

    /// Switch to fighting. Does nothing if already fighting.
    pub fn start_fight(&mut self) {
        if self.state == FightState::Fighting {
            return;
        }

        self.state = FightState::Fighting;
        self.contested = self.enemies.active_count() > 0;
        for character in self.players.iter_mut().chain(self.enemies.iter_mut()) {
            if character.is_active() {
                character.state = LifecycleState::Seeking;
            }
        }

        info!(
            round = self.round,
            players = self.players.len(),
            enemies = self.enemies.len(),
            "Fight started"
        );
        self.pending
            .push(BattleEvent::FightStateChanged(FightState::Fighting));
    }

    /// Abort the fight and reset the round without a winner.
    ///
    /// Does nothing if already idle.
    pub fn stop_fight(&mut self) {
        if self.state == FightState::Idle {
            return;
        }

        info!(round = self.round, "Fight stopped");
        self.state = FightState::Idle;
        let mut events = std::mem::take(&mut self.pending);
        events.push(BattleEvent::FightStateChanged(FightState::Idle));
        self.reset_round(&mut events);
        self.pending = events;
    }

    /// Advance the battle by `delta_ms` milliseconds.
    ///
    /// Returns every event produced since the last drain, including those
    /// buffered by commands.
    pub fn advance(&mut self, delta_ms: f32) -> TickEvents {
        let mut events = std::mem::take(&mut self.pending);
        self.tick += 1;

        if self.state == FightState::Fighting {
            self.clock_ms += f64::from(delta_ms);

            self.fire_timers(&mut events);
            self.step_projectiles(delta_ms, &mut events);

            for side in [Side::Player, Side::Enemy] {
                for id in self.roster(side).ids() {
                    if let Err(e) = self.update_character(side, &id, delta_ms, &mut events) {
                        warn!(character = %id, error = %e, "Character update failed, skipping");
                    }
                }
            }

            self.check_round_end(&mut events);
        }

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            debug!(tick = self.tick, state_hash = hash, "Battle state hash");
        }

        #[cfg(feature = "debug-validation")]
        {
            if let Err(e) = self.validate() {
                warn!(tick = self.tick, error = %e, "Battle invariant violated");
            }
        }

        TickEvents {
            tick: self.tick,
            events,
        }
    }

    // ------------------------------------------------------------------
    // Roster commands
    // ------------------------------------------------------------------

    /// Place a player character on a board cell.
    ///
    /// Moving a character already on the board onto an occupied cell swaps
    /// the occupant into the mover's old cell. A new character, or one
    /// standing off the board, cannot be placed on an occupied cell.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::InvalidState`] while fighting
    /// - [`ArenaError::CellOutOfBounds`] if the cell is off the grid
    /// - [`ArenaError::CellOccupied`] if the cell is taken and no swap is possible
    /// - [`ArenaError::UnknownClass`] if the blueprint's class is unknown
    pub fn place_character(&mut self, blueprint: &Blueprint, cell: Cell) -> Result<()> {
        self.ensure_idle("place a character")?;
        let center = self.config.grid.cell_to_center(cell)?;

        let mut blueprint = blueprint.clone();
        blueprint.is_player = true;
        blueprint.board_position = center;
        let character = Character::from_blueprint(&blueprint, &self.classes)?;

        let grid = self.config.grid;
        let occupant = self
            .players
            .iter()
            .find(|c| c.id() != &blueprint.id && grid.world_to_cell(c.board_position) == Some(cell))
            .map(|c| c.id().clone());

        if let Some(occupant) = occupant {
            // Only a character coming from another cell can swap with the occupant
            let previous = self
                .players
                .get(&blueprint.id)
                .map(|c| c.board_position)
                .filter(|&position| grid.world_to_cell(position).is_some());
            let Some(previous) = previous else {
                return Err(ArenaError::CellOccupied {
                    col: cell.col,
                    row: cell.row,
                    occupant,
                });
            };

            if let Some(displaced) = self.players.get_mut(&occupant) {
                displaced.board_position = previous;
                displaced.reset_for_round(previous);
                debug!(character = %occupant, "Swapped into vacated cell");
                self.pending
                    .push(BattleEvent::CharacterUpdated(displaced.snapshot()));
            }
        }

        self.enemies.remove(&blueprint.id);
        self.pending
            .push(BattleEvent::CharacterUpdated(character.snapshot()));
        self.players.upsert(character);
        debug!(character = %blueprint.id, col = cell.col, row = cell.row, "Character placed");
        Ok(())
    }

    /// Add a character to the roster its blueprint names, replacing any
    /// character with the same ID.
    ///
    /// The character stands at its blueprint's board position. Added while
    /// fighting, it joins the fight on the next tick.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::UnknownClass`] if the blueprint's class is unknown.
    pub fn add_character(&mut self, blueprint: &Blueprint) -> Result<()> {
        let character = Character::from_blueprint(blueprint, &self.classes)?;
        self.insert(character);
        Ok(())
    }

    /// Add an enemy at the next spawn slot.
    ///
    /// Re-spawning an existing enemy ID replaces it in its current slot.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::UnknownClass`] if the blueprint's class is unknown.
    pub fn spawn_enemy(&mut self, blueprint: &Blueprint) -> Result<()> {
        let mut blueprint = blueprint.clone();
        blueprint.is_player = false;

        let slot = self
            .enemies
            .index_of(&blueprint.id)
            .unwrap_or(self.enemies.len());
        blueprint.board_position = self.config.spawn_slot(slot);

        let character = Character::from_blueprint(&blueprint, &self.classes)?;
        self.insert(character);
        Ok(())
    }

    /// Remove a character from whichever roster holds it.
    ///
    /// Its pending timers and projectiles go with it. Characters targeting
    /// it pick a new target on their next update.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::CharacterNotFound`] if no roster holds the ID.
    pub fn remove_character(&mut self, id: &CharacterId) -> Result<Character> {
        let removed = self
            .players
            .remove(id)
            .or_else(|| self.enemies.remove(id))
            .ok_or_else(|| ArenaError::CharacterNotFound(id.clone()))?;

        self.drop_owned(id);
        debug!(character = %id, "Character removed");

        if removed.side() == Side::Player && self.players.is_empty() {
            self.pending.push(BattleEvent::NeedStartingCharacter);
        }
        Ok(removed)
    }

    /// Replace the player roster with characters built from `blueprints`.
    ///
    /// Blueprints that fail to build are logged and skipped. Returns the
    /// number of characters loaded.
    pub fn load_player_roster(&mut self, blueprints: &[Blueprint]) -> usize {
        for id in self.players.ids() {
            self.drop_owned(&id);
        }
        self.players.clear();

        for blueprint in blueprints {
            let mut blueprint = blueprint.clone();
            blueprint.is_player = true;
            match Character::from_blueprint(&blueprint, &self.classes) {
                Ok(character) => {
                    self.enemies.remove(character.id());
                    self.players.upsert(character);
                }
                Err(e) => {
                    warn!(character = %blueprint.id, error = %e, "Skipping saved character");
                }
            }
        }

        let fighting = self.state == FightState::Fighting;
        for character in self.players.iter_mut() {
            let home = character.board_position;
            character.reset_for_round(home);
            if fighting {
                character.state = LifecycleState::Seeking;
            }
            self.pending
                .push(BattleEvent::CharacterUpdated(character.snapshot()));
        }

        info!(loaded = self.players.len(), "Player roster loaded");
        if self.players.is_empty() {
            self.pending.push(BattleEvent::NeedStartingCharacter);
        }
        self.players.len()
    }

    /// Load the player roster from a store, treating read failures as empty.
    pub fn load_from_store(&mut self, store: &dyn RosterStore) -> usize {
        let blueprints = load_or_empty(store);
        self.load_player_roster(&blueprints)
    }

    /// Calculate a hash of the battle state.
    ///
    /// Two battles with identical state produce identical hashes. Covers the
    /// tick, clock, fight state, and every character's position, vitals, and
    /// lifecycle state in roster order, plus projectiles in flight.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);
        self.clock_ms.to_bits().hash(&mut hasher);
        self.state.hash(&mut hasher);
        self.round.hash(&mut hasher);

        for roster in [&self.players, &self.enemies] {
            roster.len().hash(&mut hasher);
            for character in roster {
                character.id().hash(&mut hasher);
                character.position.x.to_bits().hash(&mut hasher);
                character.position.y.to_bits().hash(&mut hasher);
                character.vitals.health.to_bits().hash(&mut hasher);
                character.vitals.mana.to_bits().hash(&mut hasher);
                character.state.hash(&mut hasher);
                character.facing.hash(&mut hasher);
                character.is_attacking.hash(&mut hasher);
                character.target.hash(&mut hasher);
                character.progression.level.hash(&mut hasher);
            }
        }

        self.projectiles.len().hash(&mut hasher);
        for projectile in &self.projectiles {
            projectile.id.hash(&mut hasher);
            projectile.position.x.to_bits().hash(&mut hasher);
            projectile.position.y.to_bits().hash(&mut hasher);
        }

        hasher.finish()
    }

    /// Check cross-cutting invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::InvalidState`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        for character in self.players.iter().chain(self.enemies.iter()) {
            let id = character.id();
            let vitals = character.vitals;
            if vitals.health < 0.0 || vitals.health > character.stats.max_health.max(0.0) {
                return Err(ArenaError::InvalidState(format!(
                    "{id} health {} outside [0, {}]",
                    vitals.health, character.stats.max_health
                )));
            }
            if vitals.mana < 0.0 || vitals.mana > character.stats.max_mana.max(0.0) {
                return Err(ArenaError::InvalidState(format!(
                    "{id} mana {} outside [0, {}]",
                    vitals.mana, character.stats.max_mana
                )));
            }
            if character.state.is_dead() && character.target.is_some() {
                return Err(ArenaError::InvalidState(format!("dead {id} still has a target")));
            }
            if self.state == FightState::Idle && character.state != LifecycleState::Idle {
                return Err(ArenaError::InvalidState(format!(
                    "{id} is {:?} while the battle is idle",
                    character.state
                )));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn ensure_idle(&self, action: &str) -> Result<()> {
        if self.state == FightState::Fighting {
            return Err(ArenaError::InvalidState(format!(
                "cannot {action} while fighting"
            )));
        }
        Ok(())
    }

    /// Upsert a character into its side's roster.
    fn insert(&mut self, mut character: Character) {
        let id = character.id().clone();
        let (own, other) = match character.side() {
            Side::Player => (&mut self.players, &mut self.enemies),
            Side::Enemy => (&mut self.enemies, &mut self.players),
        };

        if other.remove(&id).is_some() {
            debug!(character = %id, "Character switched sides");
        }
        if self.state == FightState::Fighting {
            character.state = LifecycleState::Seeking;
            if character.side() == Side::Enemy && character.is_active() {
                self.contested = true;
            }
        }
        self.pending
            .push(BattleEvent::CharacterUpdated(character.snapshot()));
        if own.upsert(character).is_some() {
            self.timers.cancel_owner(&id);
            self.projectiles.retain(|p| p.owner != id);
        }
    }

    /// Cancel every timer and projectile a character owns.
    fn drop_owned(&mut self, id: &CharacterId) {
        self.timers.cancel_owner(id);
        self.projectiles.retain(|p| &p.owner != id);
    }

    fn side_of(&self, id: &CharacterId) -> Option<Side> {
        if self.players.contains(id) {
            Some(Side::Player)
        } else if self.enemies.contains(id) {
            Some(Side::Enemy)
        } else {
            None
        }
    }

    fn fire_timers(&mut self, events: &mut Vec<BattleEvent>) {
        let due = self.timers.drain_due(self.clock_ms);

        // Impacts drained together land together. Aim is taken before any
        // resolves, so an owner felled earlier in the pass still strikes.
        let aims: Vec<Option<CharacterId>> = due
            .iter()
            .map(|timer| match timer.kind {
                TimerKind::AttackImpact => self
                    .character(&timer.owner)
                    .filter(|c| c.is_active())
                    .and_then(|c| c.target.clone()),
                _ => None,
            })
            .collect();

        for (timer, aim) in due.into_iter().zip(aims) {
            match timer.kind {
                TimerKind::AttackImpact => {
                    if let Some(target) = aim {
                        self.resolve_impact(&timer.owner, &target, events);
                    }
                }
                TimerKind::AttackRecover => {
                    if let Some(side) = self.side_of(&timer.owner) {
                        if let Some(attacker) = self
                            .roster_mut(side)
                            .get_mut(&timer.owner)
                            .filter(|c| c.is_active())
                        {
                            attacker.is_attacking = false;
                        }
                    }
                }
                TimerKind::ProjectileExpire(projectile) => {
                    self.projectiles.retain(|p| p.id != projectile);
                }
            }
        }
    }

    /// Damage point of an attack cycle, against the target aimed at when
    /// the impact came due.
    fn resolve_impact(
        &mut self,
        owner: &CharacterId,
        target: &CharacterId,
        events: &mut Vec<BattleEvent>,
    ) {
        let Some(side) = self.side_of(owner) else {
            return;
        };
        let Some(attacker) = self.roster(side).get(owner) else {
            return;
        };
        let Some(target) = self
            .roster(side.opponent())
            .get(target)
            .filter(|t| t.is_active())
        else {
            return;
        };

        match attacker.attack_style() {
            AttackStyle::Melee => {
                let target = target.id().clone();
                self.strike(owner, side, &target, events);
            }
            AttackStyle::Ranged => {
                // A fallen archer's shot never leaves the bow
                if !attacker.is_active() {
                    return;
                }
                let from = attacker.position;
                let aim = target.position;
                let range = attacker.stats.range_in_world(self.config.cell_size);

                let id = self.next_projectile;
                self.next_projectile += 1;
                let projectile = Projectile::fire(
                    id,
                    owner.clone(),
                    side,
                    from,
                    aim,
                    self.config.projectile_speed,
                );

                let expires = self.clock_ms + lifetime_ms(range, self.config.projectile_speed);
                self.timers
                    .schedule(expires, owner.clone(), TimerKind::ProjectileExpire(id));
                self.projectiles.push(projectile);

                debug!(owner = %owner, projectile = id, "Projectile fired");
                events.push(BattleEvent::ProjectileFired {
                    projectile: id,
                    owner: owner.clone(),
                    from,
                });
            }
        }
    }

    /// Roll the attacker's strike and apply it to `target`.
    fn strike(
        &mut self,
        attacker_id: &CharacterId,
        side: Side,
        target_id: &CharacterId,
        events: &mut Vec<BattleEvent>,
    ) {
        let Self {
            players,
            enemies,
            rng,
            ..
        } = self;
        let (own, opponents) = match side {
            Side::Player => (players, enemies),
            Side::Enemy => (enemies, players),
        };

        let Some(attacker) = own.get_mut(attacker_id) else {
            return;
        };
        let Some(target) = opponents.get_mut(target_id) else {
            return;
        };

        let strike = roll_strike(&attacker.stats, rng);
        let Some(outcome) = target.take_damage(strike.damage, strike.crit) else {
            return;
        };
        if attacker.is_active() {
            attacker.reward_attack();
        }

        debug!(
            attacker = %attacker_id,
            victim = %target_id,
            amount = outcome.amount,
            kind = ?outcome.kind,
            health = target.vitals.health,
            "Strike landed"
        );
        events.push(BattleEvent::DamageDealt {
            attacker: attacker_id.clone(),
            target: target_id.clone(),
            amount: outcome.amount,
            kind: outcome.kind,
        });

        if outcome.killed {
            self.handle_death(target_id, events);
        }
    }

    fn handle_death(&mut self, id: &CharacterId, events: &mut Vec<BattleEvent>) {
        self.drop_owned(id);
        debug!(character = %id, "Character died");
        events.push(BattleEvent::CharacterDied(id.clone()));
    }

    fn step_projectiles(&mut self, delta_ms: f32, events: &mut Vec<BattleEvent>) {
        if self.projectiles.is_empty() {
            return;
        }

        for projectile in &mut self.projectiles {
            projectile.step(delta_ms);
        }

        let hit_radius = self.config.projectile_hit_radius;
        let in_flight: Vec<u64> = self.projectiles.iter().map(|p| p.id).collect();

        for projectile_id in in_flight {
            // Earlier hits may have killed the owner and dropped this one
            let Some(index) = self.projectiles.iter().position(|p| p.id == projectile_id) else {
                continue;
            };

            let projectile = &self.projectiles[index];
            let owner_active = self
                .roster(projectile.side)
                .get(&projectile.owner)
                .is_some_and(Character::is_active);
            if !owner_active {
                self.projectiles.remove(index);
                self.timers.cancel_projectile(projectile_id);
                continue;
            }

            let hit = projectile
                .first_hit(self.roster(projectile.side.opponent()), hit_radius)
                .map(|c| c.id().clone());

            if let Some(target) = hit {
                let projectile = self.projectiles.remove(index);
                self.timers.cancel_projectile(projectile_id);
                self.strike(&projectile.owner, projectile.side, &target, events);
            }
        }
    }

    /// One character's turn in the tick pass.
    fn update_character(
        &mut self,
        side: Side,
        id: &CharacterId,
        delta_ms: f32,
        events: &mut Vec<BattleEvent>,
    ) -> Result<()> {
        let Self {
            players,
            enemies,
            config,
            timers,
            projectiles,
            clock_ms,
            ..
        } = self;
        let (own, opponents) = match side {
            Side::Player => (players, &*enemies),
            Side::Enemy => (enemies, &*players),
        };
        let missing = || ArenaError::CharacterNotFound(id.clone());

        let me = own.get_mut(id).ok_or_else(missing)?;
        if !me.is_active() {
            return Ok(());
        }
        if me.vitals.is_depleted() {
            if me.die() {
                timers.cancel_owner(id);
                projectiles.retain(|p| &p.owner != id);
                events.push(BattleEvent::CharacterDied(id.clone()));
            }
            return Ok(());
        }

        me.regen_mana(delta_ms);

        let tracked = me
            .target
            .as_ref()
            .and_then(|t| opponents.get(t))
            .filter(|t| t.is_active())
            .map(|t| t.position);

        let target_position = if let Some(position) = tracked {
            position
        } else {
            if let Some(lost) = me.target.take() {
                timers.cancel_attack(id);
                me.is_attacking = false;
                debug!(character = %id, lost = %lost, "Target lost");
            }
            me.stop();

            let Some(found) = acquire_target(me.position, opponents) else {
                me.clear_target();
                me.state = LifecycleState::Seeking;
                events.push(BattleEvent::CharacterUpdated(me.snapshot()));
                return Ok(());
            };

            debug!(character = %id, foe = %found.id(), "Target acquired");
            me.target = Some(found.id().clone());
            me.facing = Facing::toward(me.position, found.position);
            found.position
        };

        let in_range = in_attack_range(
            me.position,
            target_position,
            me.stats.attack_range,
            config.cell_size,
        );
        me.state = LifecycleState::resolve(true, in_range);

        let steering = if in_range {
            me.stop();
            me.facing = Facing::toward(me.position, target_position);
            if !me.is_attacking && me.stats.attack_speed > 0.0 {
                let cycle = attack_cycle_ms(config.base_attack_cycle_ms, me.stats.attack_speed);
                let impact = impact_delay_ms(cycle, config.impact_fraction);
                timers.schedule(*clock_ms + impact, id.clone(), TimerKind::AttackImpact);
                timers.schedule(*clock_ms + cycle, id.clone(), TimerKind::AttackRecover);
                me.is_attacking = true;

                let target = me.target.clone().ok_or_else(missing)?;
                debug!(attacker = %id, foe = %target, cycle_ms = cycle, "Attack started");
                events.push(BattleEvent::AttackStarted {
                    attacker: id.clone(),
                    target,
                });
            }
            None
        } else if me.is_attacking {
            me.stop();
            None
        } else {
            let position = me.position;
            let speed = me.stats.speed;
            let target = me.target.clone();
            let peers: Vec<Peer> = own
                .iter()
                .chain(opponents.iter())
                .filter(|c| c.is_active() && c.id() != id && Some(c.id()) != target.as_ref())
                .map(Character::as_peer)
                .collect();
            Some(compute_velocity(
                position,
                speed,
                target_position,
                peers,
                &config.steering,
            ))
        };

        let me = own.get_mut(id).ok_or_else(missing)?;
        if let Some(steering) = steering {
            me.velocity = steering.velocity;
            me.facing = steering.facing;
            me.moving = true;
        }

        me.position += me.velocity.scale(delta_ms / 1000.0);
        if let Some(bounds) = &config.bounds {
            me.position = me.position.clamp_to(bounds);
        }

        events.push(BattleEvent::CharacterUpdated(me.snapshot()));
        Ok(())
    }

    fn check_round_end(&mut self, events: &mut Vec<BattleEvent>) {
        let players_left = self.players.active_count();
        let enemies_left = self.enemies.active_count();
        if players_left > 0 && enemies_left > 0 {
            return;
        }

        let winner = match (players_left > 0, enemies_left > 0) {
            (true, false) => Some(Side::Player),
            (false, true) => Some(Side::Enemy),
            _ => None,
        };

        // Clearing an empty field earns nothing
        if winner == Some(Side::Player) && self.contested {
            for character in self.players.iter_mut() {
                if character.gain_experience() {
                    info!(
                        character = %character.id(),
                        level = character.progression.level,
                        "Character leveled up"
                    );
                    events.push(BattleEvent::LeveledUp {
                        character: character.id().clone(),
                        level: character.progression.level,
                    });
                }
            }
        }

        info!(
            round = self.round,
            tick = self.tick,
            winner = ?winner,
            "Round finished"
        );
        self.state = FightState::Idle;
        events.push(BattleEvent::RoundFinished { winner });
        events.push(BattleEvent::FightStateChanged(FightState::Idle));
        self.reset_round(events);
        self.round += 1;
    }

    /// Restore both rosters for the placement phase.
    fn reset_round(&mut self, events: &mut Vec<BattleEvent>) {
        self.contested = false;
        self.timers.clear();
        self.projectiles.clear();

        for character in self.players.iter_mut() {
            let home = character.board_position;
            character.reset_for_round(home);
            events.push(BattleEvent::CharacterUpdated(character.snapshot()));
        }
        for (slot, character) in self.enemies.iter_mut().enumerate() {
            let spawn = self.config.spawn_slot(slot);
            character.board_position = spawn;
            character.reset_for_round(spawn);
            events.push(BattleEvent::CharacterUpdated(character.snapshot()));
        }
    }

    fn roster_mut(&mut self, side: Side) -> &mut Roster {
        match side {
            Side::Player => &mut self.players,
            Side::Enemy => &mut self.enemies,
        }
    }
}
