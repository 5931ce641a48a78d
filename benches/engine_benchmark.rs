//! Benchmarks for the evolution engine.

#![allow(missing_docs)] // Benchmark macros generate undocumented functions
#![allow(clippy::unwrap_used)]

use std::hint::black_box;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use strgp::builtin;
use strgp::gp::{mutate, random_tree, MutationConfig, Population, TrainingCase, TrainingSet};

fn bench_mutate(c: &mut Criterion) {
    let library = builtin::library();
    let config = MutationConfig::default();
    let mut rng = SmallRng::seed_from_u64(1);
    let seed_tree = random_tree(&library, &MutationConfig { done: 0.02, ..config }, &mut rng);

    c.bench_function("mutate", |b| {
        b.iter_batched(
            || seed_tree.clone(),
            |mut tree| {
                mutate(&mut tree, &library, &config, &mut rng);
                black_box(tree)
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_run(c: &mut Criterion) {
    let library = builtin::library();
    let mut rng = SmallRng::seed_from_u64(2);
    let config = MutationConfig { done: 0.02, restart: 0.0, expand: 0.3 };
    let trees: Vec<_> = (0..64).map(|_| random_tree(&library, &config, &mut rng)).collect();

    c.bench_function("run_64_trees", |b| {
        b.iter(|| {
            for tree in &trees {
                let _ = black_box(tree.run(black_box("Hello, World"), &library));
            }
        });
    });
}

fn bench_train_generation(c: &mut Criterion) {
    let library = builtin::scenario_library();
    let config = MutationConfig::default();
    let mut rng = SmallRng::seed_from_u64(3);
    let population = Population::new(256, &library, &config, &mut rng).unwrap();
    let set = TrainingSet::new(vec![
        TrainingCase::new("ab", ["BA"]),
        TrainingCase::new("hello", ["OLLEH"]),
    ])
    .unwrap();

    let mut group = c.benchmark_group("train_generation");
    group.sample_size(20);
    group.bench_function("size_256_tries_50", |b| {
        b.iter_batched(
            || population.clone(),
            |mut population| {
                black_box(population.train_generation(&set, &library, 50, &config, &mut rng).unwrap())
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_mutate, bench_run, bench_train_generation);
criterion_main!(benches);
