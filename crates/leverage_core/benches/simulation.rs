//! Simulation benchmarks for leverage_core.
//!
//! Run with: `cargo bench -p leverage_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use std::collections::BTreeSet;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use leverage_core::combo::{resolve_combos, Combo};
use leverage_core::facts::{Fact, Pod};
use leverage_core::intent::Intent;
use leverage_core::random::SeededRandom;
use leverage_core::world::World;
use leverage_test_utils::fixtures::{city_hall_level, fact};

fn wide_pod(size: usize) -> (Pod, Vec<Combo>, BTreeSet<String>) {
    let names: Vec<String> = (0..size).map(|i| format!("f{i}")).collect();
    let facts: Vec<Fact> = names.iter().map(|n| Fact::from_data(&fact(n, 1))).collect();
    let pod = Pod::new("bench", facts, vec![names[0].clone()]).expect("valid pod");
    let combos = names
        .windows(3)
        .map(|w| Combo::new(w.iter().cloned(), w[0].clone(), "combo", 10))
        .collect();
    let known = names.iter().skip(1).cloned().collect();
    (pod, combos, known)
}

/// Runs simulation benchmarks for the leverage_core crate.
pub fn simulation_benchmark(c: &mut Criterion) {
    c.bench_function("resolve_combos_64", |b| {
        let (pod, combos, known) = wide_pod(64);
        b.iter(|| {
            let mut pod = pod.clone();
            let mut combos = combos.clone();
            black_box(resolve_combos(&mut pod, &mut combos, &known, "f0"))
        });
    });

    c.bench_function("city_hall_30_days", |b| {
        let level = city_hall_level();
        let opening = [
            Intent::scan("mayor", "office"),
            Intent::hack("mayor", "emails"),
            Intent::scan("clerk", "desk"),
            Intent::hack("clerk", "diary"),
        ];
        b.iter(|| {
            let mut world = World::new(&level, SeededRandom::new(7)).expect("valid level");
            for intent in &opening {
                let _ = world.apply(intent);
            }
            for _ in 0..30 {
                let _ = world.apply(&Intent::Vtube);
                world.end_day();
            }
            black_box(world.state_hash())
        });
    });
}

criterion_group!(benches, simulation_benchmark);
criterion_main!(benches);
