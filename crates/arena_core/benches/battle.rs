//! Battle benchmarks for arena_core.
//!
//! Run with: `cargo bench -p arena_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use arena_core::prelude::*;
use arena_test_utils::fixtures::{skirmish, two_vs_two, FRAME_MS};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

/// Single advances of a fighting battle at a few roster sizes.
pub fn advance_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance");
    for size in [2usize, 8, 32] {
        group.bench_function(format!("{size}v{size}"), |b| {
            b.iter_batched(
                || {
                    let mut battle = skirmish(size, 1);
                    battle.start_fight();
                    battle
                },
                |mut battle| {
                    for _ in 0..60 {
                        black_box(battle.advance(FRAME_MS));
                    }
                    battle
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

/// A whole 2v2 round from start to wipe.
pub fn round_benchmark(c: &mut Criterion) {
    c.bench_function("round_2v2", |b| {
        b.iter_batched(
            || two_vs_two(7),
            |mut battle| {
                battle.start_fight();
                while battle.fight_state() == FightState::Fighting {
                    black_box(battle.advance(FRAME_MS));
                }
                battle.state_hash()
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, advance_benchmark, round_benchmark);
criterion_main!(benches);
