//! Round metrics collection for balance analysis.

use std::collections::{BTreeMap, HashMap};

use arena_core::prelude::*;
use serde::{Deserialize, Serialize};

/// How a headless round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RoundEnd {
    /// One or both rosters were wiped.
    #[default]
    Wipe,
    /// The tick limit was reached first.
    Timeout,
}

/// Combat totals for one side of a round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideMetrics {
    /// Characters fielded at the start.
    pub fielded: u32,
    /// Total damage dealt after mitigation.
    pub damage_dealt: f64,
    /// Strikes that landed, including blocked ones.
    pub hits: u32,
    /// Strikes that crit.
    pub crits: u32,
    /// Strikes fully absorbed by the target.
    pub blocked: u32,
    /// Projectiles released.
    pub projectiles_fired: u32,
    /// Own characters that died.
    pub deaths: u32,
    /// Level-ups earned at round end.
    pub level_ups: u32,
}

/// Complete metrics for a single round.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundMetrics {
    /// Scenario name.
    pub scenario: String,
    /// Crit RNG seed.
    pub seed: u64,
    /// Ticks until the round ended.
    pub duration_ticks: u64,
    /// Battle time until the round ended, in milliseconds.
    pub duration_ms: f64,
    /// Winning side (None = draw or timeout).
    pub winner: Option<Side>,
    /// How the round ended.
    pub end: RoundEnd,
    /// Player roster totals.
    pub player: SideMetrics,
    /// Enemy roster totals.
    pub enemy: SideMetrics,
    /// Characters that died, in order.
    pub casualties: Vec<CharacterId>,
    /// Battle state hash after the round (for determinism validation).
    pub final_state_hash: u64,
}

impl RoundMetrics {
    /// Totals for one side.
    #[must_use]
    pub fn side(&self, side: Side) -> &SideMetrics {
        match side {
            Side::Player => &self.player,
            Side::Enemy => &self.enemy,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut SideMetrics {
        match side {
            Side::Player => &mut self.player,
            Side::Enemy => &mut self.enemy,
        }
    }
}

/// Folds tick events into [`RoundMetrics`].
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    metrics: RoundMetrics,
    sides: HashMap<CharacterId, Side>,
}

impl MetricsCollector {
    /// Start collecting for `battle` as it stands before the fight.
    #[must_use]
    pub fn new(scenario: &str, battle: &Battle) -> Self {
        let mut metrics = RoundMetrics {
            scenario: scenario.to_string(),
            seed: battle.config().seed,
            ..RoundMetrics::default()
        };
        let mut sides = HashMap::new();
        for side in [Side::Player, Side::Enemy] {
            let roster = battle.roster(side);
            metrics.side_mut(side).fielded = roster.len() as u32;
            for character in roster {
                sides.insert(character.id().clone(), side);
            }
        }
        Self { metrics, sides }
    }

    /// Record one tick's events.
    pub fn observe(&mut self, tick: &TickEvents) {
        for event in &tick.events {
            match event {
                BattleEvent::DamageDealt {
                    attacker,
                    amount,
                    kind,
                    ..
                } => {
                    let Some(&side) = self.sides.get(attacker) else {
                        continue;
                    };
                    let totals = self.metrics.side_mut(side);
                    totals.hits += 1;
                    totals.damage_dealt += f64::from(*amount);
                    match kind {
                        HitKind::Critical => totals.crits += 1,
                        HitKind::Blocked => totals.blocked += 1,
                        HitKind::Normal => {}
                    }
                }
                BattleEvent::ProjectileFired { owner, .. } => {
                    if let Some(&side) = self.sides.get(owner) {
                        self.metrics.side_mut(side).projectiles_fired += 1;
                    }
                }
                BattleEvent::CharacterDied(id) => {
                    if let Some(&side) = self.sides.get(id) {
                        self.metrics.side_mut(side).deaths += 1;
                    }
                    self.metrics.casualties.push(id.clone());
                }
                BattleEvent::LeveledUp { character, .. } => {
                    if let Some(&side) = self.sides.get(character) {
                        self.metrics.side_mut(side).level_ups += 1;
                    }
                }
                BattleEvent::RoundFinished { winner } => {
                    self.metrics.winner = *winner;
                    self.metrics.end = RoundEnd::Wipe;
                }
                _ => {}
            }
        }
    }

    /// Close the round and return its metrics.
    #[must_use]
    pub fn finish(mut self, battle: &Battle, ticks: u64, duration_ms: f64, end: RoundEnd) -> RoundMetrics {
        self.metrics.duration_ticks = ticks;
        self.metrics.duration_ms = duration_ms;
        self.metrics.end = end;
        if end == RoundEnd::Timeout {
            self.metrics.winner = None;
        }
        self.metrics.final_state_hash = battle.state_hash();
        self.metrics
    }
}

/// Summary statistics across many rounds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total rounds played.
    pub total_rounds: u32,
    /// Rounds won by each side.
    pub wins_by_side: BTreeMap<String, u32>,
    /// Win rates by side.
    pub win_rates: BTreeMap<String, f64>,
    /// Rounds that ended with both sides wiped.
    pub draws: u32,
    /// Rounds that hit the tick limit.
    pub timeouts: u32,
    /// Average round length in ticks.
    pub avg_duration_ticks: f64,
    /// Shortest round.
    pub min_duration_ticks: u64,
    /// Longest round.
    pub max_duration_ticks: u64,
    /// Average damage dealt per round by side.
    pub avg_damage_dealt: BTreeMap<String, f64>,
}

fn side_key(side: Side) -> String {
    format!("{side:?}").to_lowercase()
}

impl BatchSummary {
    /// Calculate summary from a list of round metrics.
    #[must_use]
    pub fn from_rounds(rounds: &[RoundMetrics]) -> Self {
        if rounds.is_empty() {
            return Self::default();
        }

        let total = rounds.len() as f64;
        let mut summary = Self {
            total_rounds: rounds.len() as u32,
            min_duration_ticks: u64::MAX,
            ..Self::default()
        };

        let mut duration_sum = 0u64;
        for round in rounds {
            duration_sum += round.duration_ticks;
            summary.min_duration_ticks = summary.min_duration_ticks.min(round.duration_ticks);
            summary.max_duration_ticks = summary.max_duration_ticks.max(round.duration_ticks);

            match (round.end, round.winner) {
                (RoundEnd::Timeout, _) => summary.timeouts += 1,
                (RoundEnd::Wipe, None) => summary.draws += 1,
                (RoundEnd::Wipe, Some(side)) => {
                    *summary.wins_by_side.entry(side_key(side)).or_default() += 1;
                }
            }

            for side in [Side::Player, Side::Enemy] {
                *summary.avg_damage_dealt.entry(side_key(side)).or_default() +=
                    round.side(side).damage_dealt / total;
            }
        }

        summary.avg_duration_ticks = duration_sum as f64 / total;
        for side in [Side::Player, Side::Enemy] {
            let wins = summary.wins_by_side.get(&side_key(side)).copied().unwrap_or(0);
            summary
                .win_rates
                .insert(side_key(side), f64::from(wins) / total);
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_test_utils::fixtures::{duel, FRAME_MS};

    #[test]
    fn test_collector_counts_a_round() {
        let mut battle = duel("rogue", "dummy", 3);
        let mut collector = MetricsCollector::new("duel", &battle);
        battle.start_fight();

        let mut ticks = 0;
        let mut end = RoundEnd::Timeout;
        for _ in 0..5_000 {
            let events = battle.advance(FRAME_MS);
            ticks = events.tick;
            collector.observe(&events);
            if events.round_result().is_some() {
                end = RoundEnd::Wipe;
                break;
            }
        }
        let metrics = collector.finish(&battle, ticks, battle.clock_ms(), end);

        assert_eq!(metrics.end, RoundEnd::Wipe);
        assert_eq!(metrics.winner, Some(Side::Player));
        assert_eq!(metrics.player.fielded, 1);
        assert_eq!(metrics.enemy.deaths, 1);
        assert_eq!(metrics.casualties, vec![CharacterId::new("e1")]);
        assert!(metrics.player.hits >= 3);
        assert!(metrics.player.damage_dealt >= 100.0);
        assert_eq!(metrics.final_state_hash, battle.state_hash());
    }

    #[test]
    fn test_summary_from_rounds() {
        let round = |winner, end, ticks| RoundMetrics {
            winner,
            end,
            duration_ticks: ticks,
            player: SideMetrics {
                damage_dealt: 100.0,
                ..SideMetrics::default()
            },
            ..RoundMetrics::default()
        };
        let rounds = vec![
            round(Some(Side::Player), RoundEnd::Wipe, 100),
            round(Some(Side::Player), RoundEnd::Wipe, 300),
            round(Some(Side::Enemy), RoundEnd::Wipe, 200),
            round(None, RoundEnd::Timeout, 400),
        ];

        let summary = BatchSummary::from_rounds(&rounds);
        assert_eq!(summary.total_rounds, 4);
        assert_eq!(summary.timeouts, 1);
        assert_eq!(summary.draws, 0);
        assert!((summary.win_rates["player"] - 0.5).abs() < 1e-9);
        assert!((summary.win_rates["enemy"] - 0.25).abs() < 1e-9);
        assert_eq!(summary.min_duration_ticks, 100);
        assert_eq!(summary.max_duration_ticks, 400);
        assert!((summary.avg_duration_ticks - 250.0).abs() < 1e-9);
        assert!((summary.avg_damage_dealt["player"] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchSummary::from_rounds(&[]);
        assert_eq!(summary.total_rounds, 0);
        assert!(summary.win_rates.is_empty());
    }
}
