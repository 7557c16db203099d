//! Criterion benchmarks for the generational EA.
//!
//! Three runs with a population of 10, genomes of 100 genes, and 100
//! generations, each built as tournament(2) → clone → mutate → evaluate →
//! pool(10), keeping one elite:
//!
//! - MaxOnes over bits, bit-flip with p = 0.5
//! - Weierstrass over reals, Gaussian σ = 0.5 on every gene
//! - MaxN(5) over integers in [0, 10], random reset with p = 0.5

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use u_evolve::ea::{EaConfig, GenerationalEa, Pipeline, Selection};
use u_evolve::problems::{MaxN, MaxOnes, Weierstrass};
use u_evolve::rep::binary::{BinarySequence, BitFlip};
use u_evolve::rep::int::{IntVector, RandomIntReset};
use u_evolve::rep::real::{Gaussian, RealVector};
use u_evolve::rep::MutationRate;

const POP_SIZE: usize = 10;
const GENOME_LENGTH: usize = 100;
const MAX_GEN: usize = 100;

fn config() -> EaConfig {
    EaConfig::default()
        .with_population_size(POP_SIZE)
        .with_max_generations(MAX_GEN)
        .with_elites(1)
        .with_seed(42)
}

fn bench_runtime(c: &mut Criterion) {
    let mut group = c.benchmark_group("generational_ea");
    group.sample_size(10);

    group.bench_function("max_ones", |b| {
        b.iter(|| {
            let pipeline = Pipeline::new(Selection::Tournament(2))
                .mutate(BitFlip::with_probability(0.5))
                .evaluate()
                .pool(POP_SIZE);
            let ea = GenerationalEa::new(
                config(),
                BinarySequence::new(GENOME_LENGTH),
                MaxOnes,
                pipeline,
            )
            .unwrap();
            black_box(ea.generations().count())
        })
    });

    group.bench_function("weierstrass", |b| {
        b.iter(|| {
            let pipeline = Pipeline::new(Selection::Tournament(2))
                .mutate(Gaussian::new(0.5).with_rate(MutationRate::Isotropic))
                .evaluate()
                .pool(POP_SIZE);
            let ea = GenerationalEa::new(
                config(),
                RealVector::uniform(Weierstrass::BOUNDS, GENOME_LENGTH),
                Weierstrass::default(),
                pipeline,
            )
            .unwrap();
            black_box(ea.generations().count())
        })
    });

    group.bench_function("max_n", |b| {
        b.iter(|| {
            let pipeline = Pipeline::new(Selection::Tournament(2))
                .mutate(
                    RandomIntReset::uniform((0, 10), GENOME_LENGTH)
                        .with_rate(MutationRate::Probability(0.5)),
                )
                .evaluate()
                .pool(POP_SIZE);
            let ea = GenerationalEa::new(
                config(),
                IntVector::uniform((0, 10), GENOME_LENGTH),
                MaxN::new(5),
                pipeline,
            )
            .unwrap();
            black_box(ea.generations().count())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_runtime);
criterion_main!(benches);
