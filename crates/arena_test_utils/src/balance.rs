//! Balance testing utilities.
//!
//! Runs many seeded rounds of a matchup to check that no class pairing is
//! lopsided beyond what its stats suggest.

use arena_core::prelude::*;
use tracing::debug;

use crate::fixtures::FRAME_MS;

/// Result of one round played to completion or timeout.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundOutcome {
    /// Winning side. `None` for a simultaneous wipe or a timeout.
    pub winner: Option<Side>,
    /// Ticks elapsed.
    pub ticks: u64,
    /// Whether the round hit the tick limit without finishing.
    pub timed_out: bool,
    /// Strikes that landed during the round.
    pub hits: usize,
    /// Characters that died during the round.
    pub deaths: usize,
}

/// Statistics for a set of rounds.
#[derive(Debug, Clone, Default)]
pub struct MatchupStats {
    /// Total rounds run.
    pub total_rounds: u32,
    /// Player wins.
    pub player_wins: u32,
    /// Enemy wins.
    pub enemy_wins: u32,
    /// Draws (timeouts or simultaneous wipes).
    pub draws: u32,
    /// Average ticks to resolution.
    pub avg_ticks: f64,
}

impl MatchupStats {
    /// Fold one round into the totals.
    pub fn record(&mut self, outcome: &RoundOutcome) {
        let previous = f64::from(self.total_rounds);
        self.total_rounds += 1;
        match outcome.winner {
            Some(Side::Player) => self.player_wins += 1,
            Some(Side::Enemy) => self.enemy_wins += 1,
            None => self.draws += 1,
        }
        self.avg_ticks =
            (self.avg_ticks * previous + outcome.ticks as f64) / f64::from(self.total_rounds);
    }

    /// Player win rate (0.0 to 1.0).
    pub fn player_win_rate(&self) -> f64 {
        if self.total_rounds == 0 {
            return 0.5;
        }
        f64::from(self.player_wins) / f64::from(self.total_rounds)
    }

    /// Enemy win rate (0.0 to 1.0).
    pub fn enemy_win_rate(&self) -> f64 {
        if self.total_rounds == 0 {
            return 0.5;
        }
        f64::from(self.enemy_wins) / f64::from(self.total_rounds)
    }

    /// Check if the player win rate falls within an acceptable range.
    pub fn is_balanced(&self, min_rate: f64, max_rate: f64) -> bool {
        let rate = self.player_win_rate();
        rate >= min_rate && rate <= max_rate
    }
}

/// Start `battle` and advance it until the round finishes or `max_ticks`
/// pass.
///
/// A timed-out round is stopped so the battle is idle either way.
pub fn play_round(battle: &mut Battle, max_ticks: u64) -> RoundOutcome {
    battle.start_fight();

    let mut hits = 0;
    let mut deaths = 0;
    for ticks in 1..=max_ticks {
        let events = battle.advance(FRAME_MS);
        hits += events.hit_count();
        deaths += events.deaths().count();
        if let Some(winner) = events.round_result() {
            return RoundOutcome {
                winner,
                ticks,
                timed_out: false,
                hits,
                deaths,
            };
        }
    }

    battle.stop_fight();
    RoundOutcome {
        winner: None,
        ticks: max_ticks,
        timed_out: true,
        hits,
        deaths,
    }
}

/// Play one round of `setup(seed)` for every seed and collect stats.
pub fn run_matchup<F>(setup: F, seeds: std::ops::Range<u64>, max_ticks: u64) -> MatchupStats
where
    F: Fn(u64) -> Battle,
{
    let mut stats = MatchupStats::default();
    for seed in seeds {
        let mut battle = setup(seed);
        let outcome = play_round(&mut battle, max_ticks);
        debug!(seed, winner = ?outcome.winner, ticks = outcome.ticks, "Matchup round finished");
        stats.record(&outcome);
    }
    stats
}
