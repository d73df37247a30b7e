use std::sync::Arc;

use generational_ga::{
    alteration::{
        alter_with, recombine_with, Alterer, CompositeAlterer, Crossover, MeanAlterer, Mutation,
        NPointCrossover, PartiallyMatchedCrossover, Recombinator, SinglePointCrossover,
        SwapMutation,
    },
    evolution::GeneticAlgorithm,
    genetics::{Chromosome, DoubleChromosome, DoubleGene, Genotype, PermutationChromosome},
    optimize::Optimize,
    phenotype::{identity_scaler, Phenotype},
    population::Population,
    rng::{RandomNumberGenerator, RandomSource},
    selection::{TournamentSelector, TruncationSelector},
};

fn doubles(size: usize, length: usize, seed: u64) -> Population<DoubleChromosome, f64> {
    let mut rng = RandomNumberGenerator::from_seed(seed);
    (0..size)
        .map(|_| {
            Phenotype::new(
                Genotype::of(DoubleChromosome::random(0.0, 1.0, length, &mut rng).unwrap()),
                Arc::new(|g: &Genotype<DoubleChromosome>| g.chromosome(0).values().iter().sum()),
                identity_scaler(),
                1,
            )
        })
        .collect()
}

fn permutations(size: usize, length: usize, seed: u64) -> Population<PermutationChromosome, usize> {
    let mut rng = RandomNumberGenerator::from_seed(seed);
    (0..size)
        .map(|_| {
            Phenotype::new(
                Genotype::of(PermutationChromosome::random(length, &mut rng).unwrap()),
                Arc::new(displacement),
                identity_scaler(),
                1,
            )
        })
        .collect()
}

/// Total distance of every index from its sorted position.
fn displacement(genotype: &Genotype<PermutationChromosome>) -> usize {
    genotype
        .chromosome(0)
        .indices()
        .iter()
        .enumerate()
        .map(|(position, &index)| position.abs_diff(index))
        .sum()
}

fn altered_in(population: &Population<DoubleChromosome, f64>, generation: usize) -> usize {
    population
        .iter()
        .filter(|p| p.generation() == generation)
        .count()
}

#[test]
fn test_mutation_alters_exact_gene_count() {
    let mut rng = RandomNumberGenerator::from_seed(4);
    let mut population = doubles(20, 5, 1);
    let before = population.genotypes();

    // ceil(100 * 0.05) = 5 genes
    let altered = Mutation::new(0.05).unwrap().alter(&mut population, 2, &mut rng);
    assert_eq!(altered, 5);
    assert_eq!(population.len(), 20);

    let changed_genes: usize = population
        .genotypes()
        .iter()
        .zip(&before)
        .map(|(after, before)| {
            after
                .chromosome(0)
                .values()
                .iter()
                .zip(before.chromosome(0).values())
                .filter(|(a, b)| **a != *b)
                .count()
        })
        .sum();
    assert_eq!(changed_genes, 5);
    assert!(altered_in(&population, 2) <= 5);
    assert!(population.iter().all(|p| p.is_valid()));
}

#[test]
fn test_swap_mutation_keeps_permutations_valid() {
    let mut rng = RandomNumberGenerator::from_seed(6);
    let mut population = permutations(30, 10, 2);

    let altered = SwapMutation::new(0.2).unwrap().alter(&mut population, 2, &mut rng);
    assert_eq!(altered, 60);
    assert!(population.iter().all(|p| p.is_valid()));
}

#[test]
fn test_partially_matched_crossover_keeps_permutations_valid() {
    let mut rng = RandomNumberGenerator::from_seed(8);
    let mut population = permutations(40, 12, 3);
    let pmx = PartiallyMatchedCrossover::new(1.0).unwrap();

    for generation in 2..12 {
        let altered = pmx.alter(&mut population, generation, &mut rng);
        assert!(altered > 0);
        assert_eq!(population.len(), 40);
        for phenotype in population.iter() {
            let mut indices = phenotype.genotype().chromosome(0).indices();
            indices.sort_unstable();
            assert_eq!(indices, (0..12).collect::<Vec<_>>());
        }
    }
}

#[test]
fn test_crossover_preserves_gene_multiset() {
    let mut rng = RandomNumberGenerator::from_seed(10);
    let mut population = doubles(2, 8, 4);
    let mut before: Vec<f64> = population
        .iter()
        .flat_map(|p| p.genotype().chromosome(0).values())
        .collect();

    let altered = NPointCrossover::new(1.0, 3)
        .unwrap()
        .alter(&mut population, 2, &mut rng);
    assert_eq!(altered, 4);

    let mut after: Vec<f64> = population
        .iter()
        .flat_map(|p| p.genotype().chromosome(0).values())
        .collect();
    before.sort_by(f64::total_cmp);
    after.sort_by(f64::total_cmp);
    assert_eq!(before, after);
}

/// Exchanges every gene of the two chromosomes.
#[derive(Debug)]
struct ExchangeAll;

impl Crossover<DoubleGene> for ExchangeAll {
    fn probability(&self) -> f64 {
        1.0
    }

    fn crossover(&self, that: &mut [DoubleGene], other: &mut [DoubleGene], _: &mut dyn RandomSource) {
        that.swap_with_slice(other);
    }
}

impl Recombinator<DoubleChromosome, f64> for ExchangeAll {
    fn probability(&self) -> f64 {
        <Self as Crossover<DoubleGene>>::probability(self)
    }

    fn order(&self) -> usize {
        2
    }

    fn recombine(
        &self,
        population: &mut Population<DoubleChromosome, f64>,
        individuals: &[usize],
        generation: usize,
        rng: &mut dyn RandomSource,
    ) -> usize {
        recombine_with(self, population, individuals, generation, rng)
    }
}

impl Alterer<DoubleChromosome, f64> for ExchangeAll {
    fn alter(
        &self,
        population: &mut Population<DoubleChromosome, f64>,
        generation: usize,
        rng: &mut dyn RandomSource,
    ) -> usize {
        alter_with(self, population, generation, rng)
    }
}

#[test]
fn test_custom_crossover_plugs_into_alteration() {
    let mut rng = RandomNumberGenerator::from_seed(6);
    let mut population = doubles(2, 4, 8);
    let mut before: Vec<f64> = population
        .iter()
        .flat_map(|p| p.genotype().chromosome(0).values())
        .collect();

    let alterer = CompositeAlterer::new(vec![Arc::new(ExchangeAll) as Arc<dyn Alterer<_, _>>]);
    assert_eq!(alterer.alter(&mut population, 3, &mut rng), 4);
    assert!(population.iter().all(|p| p.generation() == 3));

    let mut after: Vec<f64> = population
        .iter()
        .flat_map(|p| p.genotype().chromosome(0).values())
        .collect();
    before.sort_by(f64::total_cmp);
    after.sort_by(f64::total_cmp);
    assert_eq!(before, after);
}

#[test]
fn test_mean_alterer_moves_towards_partner() {
    let mut rng = RandomNumberGenerator::from_seed(12);
    let mut population = doubles(10, 3, 5);
    let before = population.clone();

    let altered = MeanAlterer::new(1.0).unwrap().alter(&mut population, 2, &mut rng);
    assert_eq!(altered, 10);
    assert_eq!(population.len(), 10);
    assert!(population.iter().all(|p| p.is_valid()));
    assert!(altered_in(&population, 2) > 0);

    let min = |p: &Population<DoubleChromosome, f64>| {
        p.iter()
            .flat_map(|p| p.genotype().chromosome(0).values())
            .fold(f64::INFINITY, f64::min)
    };
    assert!(min(&population) >= min(&before));
}

#[test]
fn test_zero_probability_alters_nothing() {
    let mut rng = RandomNumberGenerator::from_seed(14);
    let mut population = doubles(10, 4, 6);
    let before = population.clone();

    let composite = CompositeAlterer::<DoubleChromosome, f64>::new(vec![
        Arc::new(Mutation::new(0.0).unwrap()),
        Arc::new(SinglePointCrossover::new(0.0).unwrap()),
        Arc::new(MeanAlterer::new(0.0).unwrap()),
    ]);

    assert_eq!(composite.alter(&mut population, 2, &mut rng), 0);
    assert_eq!(population, before);
}

#[test]
fn test_permutation_problem_is_solved() {
    let mut rng = RandomNumberGenerator::from_seed(21);
    let template = Genotype::of(PermutationChromosome::random(8, &mut rng).unwrap());

    let ga = GeneticAlgorithm::builder()
        .with_factory(template)
        .with_fitness_function(displacement)
        .with_optimize(Optimize::Minimum)
        .with_population_size(60)
        .with_survivor_selector(TruncationSelector::new())
        .with_offspring_selector(TournamentSelector::new(3).unwrap())
        .with_alterer(PartiallyMatchedCrossover::new(0.3).unwrap())
        .with_seed(42)
        .build()
        .unwrap();
    ga.add_alterer(SwapMutation::new(0.05).unwrap());

    ga.setup().unwrap();
    let initial = ga.best_phenotype().unwrap().fitness();
    ga.evolve_n(40).unwrap();

    let best = ga.best_phenotype().unwrap();
    assert!(best.fitness() <= initial);
    assert!(best.genotype().chromosome(0).is_valid());
    assert!(ga.population().iter().all(|p| p.is_valid()));
}
