//! Deferred one-shot callbacks keyed on the battle clock.
//!
//! Timers fire once, in `(due time, scheduling order)` order. They carry
//! their owner's ID so that a death or an interrupted attack can cancel
//! everything the owner still has pending.

use serde::{Deserialize, Serialize};

use crate::blueprint::CharacterId;

/// What happens when a timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerKind {
    /// Damage point of an attack cycle.
    AttackImpact,
    /// End of an attack cycle; the attack lock is released.
    AttackRecover,
    /// Lifetime of a projectile ran out.
    ProjectileExpire(u64),
}

impl TimerKind {
    /// Check if this timer belongs to an attack cycle.
    #[must_use]
    pub const fn is_attack(self) -> bool {
        matches!(self, Self::AttackImpact | Self::AttackRecover)
    }
}

/// A scheduled callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    /// Battle clock time at which the timer fires, in milliseconds.
    pub due_ms: f64,
    /// Scheduling sequence number, used to order equal due times.
    pub seq: u64,
    /// Character that scheduled the timer.
    pub owner: CharacterId,
    /// Callback to run.
    pub kind: TimerKind,
}

/// Pending timers for one battle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimerQueue {
    pending: Vec<Timer>,
    next_seq: u64,
}

impl TimerQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a timer at absolute clock time `due_ms`.
    pub fn schedule(&mut self, due_ms: f64, owner: CharacterId, kind: TimerKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Timer {
            due_ms,
            seq,
            owner,
            kind,
        });
    }

    /// Cancel every timer owned by `owner`.
    pub fn cancel_owner(&mut self, owner: &CharacterId) {
        self.pending.retain(|t| &t.owner != owner);
    }

    /// Cancel the attack-cycle timers owned by `owner`.
    pub fn cancel_attack(&mut self, owner: &CharacterId) {
        self.pending
            .retain(|t| &t.owner != owner || !t.kind.is_attack());
    }

    /// Cancel a single projectile's lifetime timer.
    pub fn cancel_projectile(&mut self, projectile: u64) {
        self.pending
            .retain(|t| t.kind != TimerKind::ProjectileExpire(projectile));
    }

    /// Remove and return every timer due at or before `now_ms`, in firing order.
    pub fn drain_due(&mut self, now_ms: f64) -> Vec<Timer> {
        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|t| t.due_ms <= now_ms);
        self.pending = pending;

        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)));
        due
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Check if `owner` has an attack cycle pending.
    #[must_use]
    pub fn has_attack_pending(&self, owner: &CharacterId) -> bool {
        self.pending
            .iter()
            .any(|t| &t.owner == owner && t.kind.is_attack())
    }
}
