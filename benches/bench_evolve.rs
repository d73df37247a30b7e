use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use generational_ga::{
    alteration::{Alterer, Mutation, SinglePointCrossover},
    concurrency::Concurrency,
    evolution::GeneticAlgorithm,
    genetics::{DoubleChromosome, Genotype},
    phenotype::{identity_scaler, Phenotype},
    population::Population,
    rng::RandomNumberGenerator,
};
use std::sync::Arc;

// Sphere function, minimal at the origin
fn sphere(genotype: &Genotype<DoubleChromosome>) -> f64 {
    genotype
        .chromosome(0)
        .values()
        .iter()
        .map(|x| x * x)
        .sum()
}

fn template() -> Genotype<DoubleChromosome> {
    let mut rng = RandomNumberGenerator::from_seed(0);
    Genotype::of(DoubleChromosome::random(-5.0, 5.0, 10, &mut rng).unwrap())
}

fn population(size: usize) -> Population<DoubleChromosome, f64> {
    let mut rng = RandomNumberGenerator::from_seed(1);
    (0..size)
        .map(|_| {
            Phenotype::new(
                Genotype::of(DoubleChromosome::random(-5.0, 5.0, 10, &mut rng).unwrap()),
                Arc::new(sphere),
                identity_scaler(),
                1,
            )
        })
        .collect()
}

fn bench_generations(c: &mut Criterion) {
    let mut group = c.benchmark_group("evolve");
    for size in [50, 500, 5000].iter() {
        for threads in [1, 4] {
            group.bench_with_input(
                BenchmarkId::new(format!("threads_{}", threads), size),
                size,
                |b, &size| {
                    let ga = GeneticAlgorithm::builder()
                        .with_factory(template())
                        .with_fitness_function(sphere)
                        .with_population_size(size)
                        .with_seed(42)
                        .with_concurrency(Concurrency::with_threads(threads).unwrap())
                        .build()
                        .unwrap();
                    ga.setup().unwrap();
                    b.iter(|| black_box(ga.evolve().unwrap()))
                },
            );
        }
    }
    group.finish();
}

fn bench_alterers(c: &mut Criterion) {
    let mut group = c.benchmark_group("alter");
    let mut rng = RandomNumberGenerator::from_seed(7);

    for size in [100, 1000].iter() {
        let source = population(*size);
        group.bench_function(format!("mutation_{}", size), |b| {
            let mutation = Mutation::new(0.05).unwrap();
            b.iter(|| {
                let mut population = source.clone();
                black_box(mutation.alter(&mut population, 2, &mut rng))
            })
        });
        group.bench_function(format!("single_point_crossover_{}", size), |b| {
            let crossover = SinglePointCrossover::new(0.2).unwrap();
            b.iter(|| {
                let mut population = source.clone();
                black_box(crossover.alter(&mut population, 2, &mut rng))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_generations, bench_alterers);
criterion_main!(benches);
