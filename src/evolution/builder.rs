use std::sync::Arc;

use crate::{
    alteration::{Alterer, CompositeAlterer, Mutation, SinglePointCrossover},
    concurrency::Concurrency,
    error::{GeneticError, Result},
    genetics::{Chromosome, Factory, Genotype},
    optimize::Optimize,
    phenotype::{identity_scaler, Fitness, FitnessFunction, FitnessScaler},
    rng::RandomNumberGenerator,
    selection::{Selector, TournamentSelector},
    statistics::{Calculator, StatisticsCalculator},
};

use super::{
    algorithm::{Components, GeneticAlgorithm},
    options::{EvolutionOptions, EvolutionOptionsBuilder},
};

/// Tournament size of the default selectors.
pub const DEFAULT_TOURNAMENT_SIZE: usize = 3;
pub const DEFAULT_CROSSOVER_PROBABILITY: f64 = 0.1;
pub const DEFAULT_MUTATION_PROBABILITY: f64 = 0.05;

/// Assembles a [`GeneticAlgorithm`].
///
/// Only the genotype factory and the fitness function are required. Every
/// other part falls back to a default:
///
/// - `optimize`: `Optimize::Maximum`
/// - options: see [`EvolutionOptions`]
/// - selectors: `TournamentSelector` of size 3
/// - alterer: `SinglePointCrossover(0.1)` followed by `Mutation(0.05)`
/// - calculator: `StatisticsCalculator`
/// - concurrency: rayon's global pool
pub struct GeneticAlgorithmBuilder<C: Chromosome, T: Fitness> {
    factory: Option<Arc<dyn Factory<Genotype<C>>>>,
    fitness_function: Option<FitnessFunction<C, T>>,
    fitness_scaler: Option<FitnessScaler<T>>,
    optimize: Option<Optimize>,
    options: EvolutionOptionsBuilder,
    survivor_selector: Option<Arc<dyn Selector<C, T>>>,
    offspring_selector: Option<Arc<dyn Selector<C, T>>>,
    alterer: Option<Arc<dyn Alterer<C, T>>>,
    calculator: Option<Arc<dyn Calculator<C, T>>>,
    concurrency: Option<Concurrency>,
}

impl<C: Chromosome, T: Fitness> GeneticAlgorithmBuilder<C, T> {
    pub fn new() -> Self {
        Self {
            factory: None,
            fitness_function: None,
            fitness_scaler: None,
            optimize: None,
            options: EvolutionOptionsBuilder::default(),
            survivor_selector: None,
            offspring_selector: None,
            alterer: None,
            calculator: None,
            concurrency: None,
        }
    }

    /// Sets the factory for new genotypes. A `Genotype` is its own factory.
    pub fn with_factory<F>(mut self, factory: F) -> Self
    where
        F: Factory<Genotype<C>> + 'static,
    {
        self.factory = Some(Arc::new(factory));
        self
    }

    pub fn with_fitness_function<F>(mut self, function: F) -> Self
    where
        F: Fn(&Genotype<C>) -> T + Send + Sync + 'static,
    {
        self.fitness_function = Some(Arc::new(function));
        self
    }

    pub fn with_fitness_scaler<F>(mut self, scaler: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.fitness_scaler = Some(Arc::new(scaler));
        self
    }

    pub fn with_optimize(mut self, optimize: Optimize) -> Self {
        self.optimize = Some(optimize);
        self
    }

    /// Takes all numeric parameters from `options`.
    pub fn with_options(mut self, options: EvolutionOptions) -> Self {
        let mut builder = EvolutionOptions::builder()
            .population_size(options.get_population_size())
            .offspring_fraction(options.get_offspring_fraction())
            .maximal_phenotype_age(options.get_maximal_phenotype_age());
        if let Some(seed) = options.get_seed() {
            builder = builder.seed(seed);
        }
        self.options = builder;
        self
    }

    pub fn with_population_size(mut self, population_size: usize) -> Self {
        self.options = self.options.population_size(population_size);
        self
    }

    pub fn with_offspring_fraction(mut self, offspring_fraction: f64) -> Self {
        self.options = self.options.offspring_fraction(offspring_fraction);
        self
    }

    pub fn with_maximal_phenotype_age(mut self, age: usize) -> Self {
        self.options = self.options.maximal_phenotype_age(age);
        self
    }

    /// Seeds the driver's random generator, making runs reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.options = self.options.seed(seed);
        self
    }

    pub fn with_survivor_selector<S: Selector<C, T> + 'static>(mut self, selector: S) -> Self {
        self.survivor_selector = Some(Arc::new(selector));
        self
    }

    pub fn with_offspring_selector<S: Selector<C, T> + 'static>(mut self, selector: S) -> Self {
        self.offspring_selector = Some(Arc::new(selector));
        self
    }

    /// Uses `selector` for both survivors and offspring.
    pub fn with_selectors<S: Selector<C, T> + 'static>(mut self, selector: S) -> Self {
        let selector: Arc<dyn Selector<C, T>> = Arc::new(selector);
        self.survivor_selector = Some(Arc::clone(&selector));
        self.offspring_selector = Some(selector);
        self
    }

    pub fn with_alterer<A: Alterer<C, T> + 'static>(mut self, alterer: A) -> Self {
        self.alterer = Some(Arc::new(alterer));
        self
    }

    pub fn with_calculator<K: Calculator<C, T> + 'static>(mut self, calculator: K) -> Self {
        self.calculator = Some(Arc::new(calculator));
        self
    }

    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Builds the driver.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::InvalidArgument` if the factory or the fitness
    /// function is missing, or if a numeric parameter is out of range.
    pub fn build(self) -> Result<GeneticAlgorithm<C, T>> {
        let factory = self.factory.ok_or_else(|| {
            GeneticError::InvalidArgument("Genotype factory not specified".to_string())
        })?;

        let fitness_function = self.fitness_function.ok_or_else(|| {
            GeneticError::InvalidArgument("Fitness function not specified".to_string())
        })?;

        let options = self.options.build()?;

        let survivor_selector: Arc<dyn Selector<C, T>> = match self.survivor_selector {
            Some(selector) => selector,
            None => Arc::new(TournamentSelector::new(DEFAULT_TOURNAMENT_SIZE)?),
        };
        let offspring_selector: Arc<dyn Selector<C, T>> = match self.offspring_selector {
            Some(selector) => selector,
            None => Arc::new(TournamentSelector::new(DEFAULT_TOURNAMENT_SIZE)?),
        };
        let alterer: Arc<dyn Alterer<C, T>> = match self.alterer {
            Some(alterer) => alterer,
            None => Arc::new(CompositeAlterer::<C, T>::join(
                Arc::new(SinglePointCrossover::new(DEFAULT_CROSSOVER_PROBABILITY)?),
                Arc::new(Mutation::new(DEFAULT_MUTATION_PROBABILITY)?),
            )),
        };
        let calculator: Arc<dyn Calculator<C, T>> = match self.calculator {
            Some(calculator) => calculator,
            None => Arc::new(StatisticsCalculator),
        };
        let rng = match options.get_seed() {
            Some(seed) => RandomNumberGenerator::from_seed(seed),
            None => RandomNumberGenerator::new(),
        };

        Ok(GeneticAlgorithm::from_components(Components {
            factory,
            fitness_function,
            fitness_scaler: self.fitness_scaler.unwrap_or_else(identity_scaler),
            optimize: self.optimize.unwrap_or_default(),
            population_size: options.get_population_size(),
            offspring_fraction: options.get_offspring_fraction(),
            maximal_phenotype_age: options.get_maximal_phenotype_age(),
            survivor_selector,
            offspring_selector,
            alterer,
            calculator,
            concurrency: self.concurrency.unwrap_or_default(),
            rng,
        }))
    }
}

impl<C: Chromosome, T: Fitness> Default for GeneticAlgorithmBuilder<C, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::DoubleChromosome;

    fn template() -> Genotype<DoubleChromosome> {
        let mut rng = RandomNumberGenerator::from_seed(1);
        Genotype::of(DoubleChromosome::random(0.0, 1.0, 3, &mut rng).unwrap())
    }

    #[test]
    fn test_missing_parts_are_rejected() {
        let result = GeneticAlgorithmBuilder::<DoubleChromosome, f64>::new()
            .with_fitness_function(|g: &Genotype<DoubleChromosome>| g.chromosome(0).value())
            .build();
        match result {
            Err(GeneticError::InvalidArgument(msg)) => assert!(msg.contains("factory")),
            _ => panic!("Expected InvalidArgument error"),
        }

        let result = GeneticAlgorithmBuilder::<DoubleChromosome, f64>::new()
            .with_factory(template())
            .build();
        match result {
            Err(GeneticError::InvalidArgument(msg)) => assert!(msg.contains("Fitness function")),
            _ => panic!("Expected InvalidArgument error"),
        }
    }

    #[test]
    fn test_defaults() {
        let ga = GeneticAlgorithm::builder()
            .with_factory(template())
            .with_fitness_function(|g: &Genotype<DoubleChromosome>| g.chromosome(0).value())
            .build()
            .unwrap();

        assert_eq!(ga.optimize(), Optimize::Maximum);
        assert_eq!(ga.population_size(), 50);
        assert_eq!(ga.offspring_fraction(), 0.6);
        assert_eq!(ga.maximal_phenotype_age(), 70);
        assert_eq!(
            ga.lock().alterer().components().map(|parts| parts.len()),
            Some(2)
        );
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let result = GeneticAlgorithm::builder()
            .with_factory(template())
            .with_fitness_function(|g: &Genotype<DoubleChromosome>| g.chromosome(0).value())
            .with_offspring_fraction(1.5)
            .build();

        assert!(matches!(result, Err(GeneticError::InvalidArgument(_))));
    }

    #[test]
    fn test_options_and_closure_factory() {
        let options = EvolutionOptions::builder()
            .population_size(12)
            .maximal_phenotype_age(4)
            .seed(9)
            .build()
            .unwrap();
        let factory = |rng: &mut dyn crate::rng::RandomSource| {
            Genotype::of(DoubleChromosome::random(-1.0, 1.0, 2, rng).unwrap())
        };

        let ga = GeneticAlgorithm::builder()
            .with_factory(factory)
            .with_fitness_function(|g: &Genotype<DoubleChromosome>| g.chromosome(0).value())
            .with_optimize(Optimize::Minimum)
            .with_options(options)
            .build()
            .unwrap();
        ga.setup().unwrap();

        assert_eq!(ga.population_size(), 12);
        assert_eq!(ga.maximal_phenotype_age(), 4);
        assert_eq!(ga.population().len(), 12);
        assert_eq!(ga.population()[0].genotype().chromosome(0).len(), 2);
    }
}
