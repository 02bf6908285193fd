//! # Arena Test Utilities
//!
//! Helpers shared by the arena crates' tests and benches:
//! - Ready-made battles (duels, 2v2, scaled skirmishes) and an in-memory store
//! - Replay checks that compare battle state hashes
//! - Seed sweeps that tally which side wins a matchup
//! - Proptest strategies for stats, positions, and blueprints

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod balance;
pub mod determinism;
pub mod fixtures;

pub use proptest;
