//! # GeneticAlgorithm
//!
//! The generational driver. It owns the current population and advances it
//! one generation per [`GeneticAlgorithm::evolve`] call:
//!
//! 1. select survivors and offspring in parallel,
//! 2. alter the offspring,
//! 3. replace survivors that are too old or invalid,
//! 4. evaluate the fitness of the new population in parallel,
//! 5. compute the statistics of the generation.
//!
//! All state lives behind one reentrant lock. Every operation, including
//! the parameter setters, holds the lock for its whole duration, so one
//! generation always sees a consistent set of parameters. Use
//! [`GeneticAlgorithm::lock`] to perform several changes atomically.
//!
//! A generation either completes or leaves the driver exactly as it was
//! before the call.
//!
//! ## Example
//!
//! ```rust
//! use generational_ga::evolution::GeneticAlgorithm;
//! use generational_ga::genetics::{DoubleChromosome, Genotype};
//! use generational_ga::optimize::Optimize;
//! use generational_ga::rng::RandomNumberGenerator;
//!
//! let mut rng = RandomNumberGenerator::from_seed(1);
//! let template = Genotype::of(DoubleChromosome::random(0.0, 1.0, 1, &mut rng).unwrap());
//!
//! let ga = GeneticAlgorithm::builder()
//!     .with_factory(template)
//!     .with_fitness_function(|g: &Genotype<DoubleChromosome>| g.chromosome(0).value())
//!     .with_optimize(Optimize::Maximum)
//!     .build()
//!     .unwrap();
//!
//! ga.setup().unwrap();
//! ga.evolve_n(10).unwrap();
//!
//! assert_eq!(ga.generation(), 11);
//! assert_eq!(ga.population().len(), 50);
//! ```

use std::cell::{Ref, RefCell, RefMut};
use std::fmt::{self, Debug, Display};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use rand::RngCore;
use tracing::{debug, debug_span, info, trace, warn};

use crate::alteration::{Alterer, CompositeAlterer};
use crate::concurrency::{Concurrency, Interrupt};
use crate::error::{check_probability, GeneticError, Result};
use crate::evolution::builder::GeneticAlgorithmBuilder;
use crate::evolution::options::{check_maximal_phenotype_age, check_population_size};
use crate::genetics::{Chromosome, Factory, Genotype};
use crate::optimize::Optimize;
use crate::phenotype::{Fitness, FitnessFunction, FitnessScaler, Phenotype};
use crate::population::Population;
use crate::rng::RandomNumberGenerator;
use crate::selection::Selector;
use crate::statistics::{Calculator, Statistics, Timings};

/// The parts a driver is assembled from, see [`GeneticAlgorithmBuilder`].
pub(crate) struct Components<C: Chromosome, T: Fitness> {
    pub factory: Arc<dyn Factory<Genotype<C>>>,
    pub fitness_function: FitnessFunction<C, T>,
    pub fitness_scaler: FitnessScaler<T>,
    pub optimize: Optimize,
    pub population_size: usize,
    pub offspring_fraction: f64,
    pub maximal_phenotype_age: usize,
    pub survivor_selector: Arc<dyn Selector<C, T>>,
    pub offspring_selector: Arc<dyn Selector<C, T>>,
    pub alterer: Arc<dyn Alterer<C, T>>,
    pub calculator: Arc<dyn Calculator<C, T>>,
    pub concurrency: Concurrency,
    pub rng: RandomNumberGenerator,
}

struct State<C: Chromosome, T: Fitness> {
    factory: Arc<dyn Factory<Genotype<C>>>,
    fitness_function: FitnessFunction<C, T>,
    fitness_scaler: FitnessScaler<T>,
    optimize: Optimize,
    population_size: usize,
    offspring_fraction: f64,
    maximal_phenotype_age: usize,
    survivor_selector: Arc<dyn Selector<C, T>>,
    offspring_selector: Arc<dyn Selector<C, T>>,
    alterer: Arc<dyn Alterer<C, T>>,
    calculator: Arc<dyn Calculator<C, T>>,
    concurrency: Concurrency,
    population: Population<C, T>,
    // 0 until `setup()` has run
    generation: usize,
    statistics: Option<Statistics<C, T>>,
    best_statistics: Option<Statistics<C, T>>,
    killed: usize,
    invalid: usize,
    timings: Timings,
    rng: RandomNumberGenerator,
    interrupt: Interrupt,
}

/// A generational genetic algorithm.
pub struct GeneticAlgorithm<C: Chromosome, T: Fitness> {
    state: ReentrantMutex<RefCell<State<C, T>>>,
    interrupt: Interrupt,
}

impl<C: Chromosome, T: Fitness> GeneticAlgorithm<C, T> {
    /// Returns a builder for assembling a `GeneticAlgorithm`.
    pub fn builder() -> GeneticAlgorithmBuilder<C, T> {
        GeneticAlgorithmBuilder::new()
    }

    pub(crate) fn from_components(components: Components<C, T>) -> Self {
        let interrupt = Interrupt::new();
        let state = State {
            factory: components.factory,
            fitness_function: components.fitness_function,
            fitness_scaler: components.fitness_scaler,
            optimize: components.optimize,
            population_size: components.population_size,
            offspring_fraction: components.offspring_fraction,
            maximal_phenotype_age: components.maximal_phenotype_age,
            survivor_selector: components.survivor_selector,
            offspring_selector: components.offspring_selector,
            alterer: components.alterer,
            calculator: components.calculator,
            concurrency: components.concurrency,
            population: Population::new(),
            generation: 0,
            statistics: None,
            best_statistics: None,
            killed: 0,
            invalid: 0,
            timings: Timings::default(),
            rng: components.rng,
            interrupt: interrupt.clone(),
        };
        Self {
            state: ReentrantMutex::new(RefCell::new(state)),
            interrupt,
        }
    }

    /// Acquires the driver's lock.
    ///
    /// The returned guard offers the full API of the driver. Other threads
    /// block until it is dropped, so a sequence of calls on the guard is
    /// never interleaved with a generation. The lock is reentrant: the
    /// thread holding it may call back into the driver, e.g. from the
    /// predicate of [`evolve_while`](Self::evolve_while).
    ///
    /// # Panics
    ///
    /// Re-entering the driver from a factory or fitness function that runs
    /// on the thread performing `setup` or `evolve` panics. Inside a
    /// generation that panic is reported as `GeneticError::TaskFailed`.
    pub fn lock(&self) -> AlgorithmGuard<'_, C, T> {
        AlgorithmGuard {
            cell: self.state.lock(),
        }
    }

    /// A handle for cancelling a running (or the next) operation from
    /// another thread. The cancelled call returns `GeneticError::Cancelled`.
    pub fn interrupt_handle(&self) -> Interrupt {
        self.interrupt.clone()
    }

    /// Creates and evaluates the initial population, see [`AlgorithmGuard::setup`].
    pub fn setup(&self) -> Result<()> {
        self.lock().setup()
    }

    /// Sets up the driver with the given initial genotypes, see
    /// [`AlgorithmGuard::setup_with`].
    pub fn setup_with(&self, genotypes: Vec<Genotype<C>>) -> Result<()> {
        self.lock().setup_with(genotypes)
    }

    /// Evolves one generation, see [`AlgorithmGuard::evolve`].
    pub fn evolve(&self) -> Result<()> {
        self.lock().evolve()
    }

    /// Evolves `generations` generations.
    pub fn evolve_n(&self, generations: usize) -> Result<()> {
        self.lock().evolve_n(generations)
    }

    /// Evolves as long as `predicate` returns `true` for the statistics of
    /// the current generation. The predicate may query the driver.
    pub fn evolve_while<P>(&self, predicate: P) -> Result<()>
    where
        P: FnMut(&Statistics<C, T>) -> bool,
    {
        self.lock().evolve_while(predicate)
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().is_initialized()
    }

    pub fn generation(&self) -> usize {
        self.lock().generation()
    }

    /// A copy of the current population.
    pub fn population(&self) -> Population<C, T> {
        self.lock().population()
    }

    /// The best phenotype found so far.
    pub fn best_phenotype(&self) -> Option<Phenotype<C, T>> {
        self.lock().best_phenotype()
    }

    /// The statistics of the current generation.
    pub fn statistics(&self) -> Option<Statistics<C, T>> {
        self.lock().statistics()
    }

    /// The statistics of the generation with the best phenotype so far.
    pub fn best_statistics(&self) -> Option<Statistics<C, T>> {
        self.lock().best_statistics()
    }

    pub fn killed_count(&self) -> usize {
        self.lock().killed_count()
    }

    pub fn invalid_count(&self) -> usize {
        self.lock().invalid_count()
    }

    /// The phase timings summed over all generations.
    pub fn time_statistics(&self) -> Timings {
        self.lock().time_statistics()
    }

    pub fn optimize(&self) -> Optimize {
        self.lock().optimize()
    }

    pub fn population_size(&self) -> usize {
        self.lock().population_size()
    }

    pub fn offspring_fraction(&self) -> f64 {
        self.lock().offspring_fraction()
    }

    pub fn maximal_phenotype_age(&self) -> usize {
        self.lock().maximal_phenotype_age()
    }

    pub fn set_population_size(&self, population_size: usize) -> Result<()> {
        self.lock().set_population_size(population_size)
    }

    pub fn set_offspring_fraction(&self, offspring_fraction: f64) -> Result<()> {
        self.lock().set_offspring_fraction(offspring_fraction)
    }

    pub fn set_maximal_phenotype_age(&self, age: usize) -> Result<()> {
        self.lock().set_maximal_phenotype_age(age)
    }

    pub fn set_survivor_selector<S: Selector<C, T> + 'static>(&self, selector: S) {
        self.lock().set_survivor_selector(selector)
    }

    pub fn set_offspring_selector<S: Selector<C, T> + 'static>(&self, selector: S) {
        self.lock().set_offspring_selector(selector)
    }

    pub fn set_selectors<S: Selector<C, T> + 'static>(&self, selector: S) {
        self.lock().set_selectors(selector)
    }

    pub fn set_alterer<A: Alterer<C, T> + 'static>(&self, alterer: A) {
        self.lock().set_alterer(alterer)
    }

    pub fn add_alterer<A: Alterer<C, T> + 'static>(&self, alterer: A) {
        self.lock().add_alterer(alterer)
    }

    pub fn set_fitness_scaler<F>(&self, scaler: F)
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.lock().set_fitness_scaler(scaler)
    }

    pub fn set_calculator<K: Calculator<C, T> + 'static>(&self, calculator: K) {
        self.lock().set_calculator(calculator)
    }

    pub fn set_concurrency(&self, concurrency: Concurrency) {
        self.lock().set_concurrency(concurrency)
    }

    pub fn set_population<I>(&self, population: I) -> Result<()>
    where
        I: IntoIterator<Item = Phenotype<C, T>>,
    {
        self.lock().set_population(population)
    }

    pub fn set_genotypes<I>(&self, genotypes: I) -> Result<()>
    where
        I: IntoIterator<Item = Genotype<C>>,
    {
        self.lock().set_genotypes(genotypes)
    }
}

impl<C: Chromosome, T: Fitness> Debug for GeneticAlgorithm<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.lock();
        let state = guard.state();
        f.debug_struct("GeneticAlgorithm")
            .field("generation", &state.generation)
            .field("optimize", &state.optimize)
            .field("population_size", &state.population_size)
            .field("offspring_fraction", &state.offspring_fraction)
            .field("maximal_phenotype_age", &state.maximal_phenotype_age)
            .field("survivor_selector", &state.survivor_selector)
            .field("offspring_selector", &state.offspring_selector)
            .field("alterer", &state.alterer)
            .finish()
    }
}

impl<C: Chromosome, T: Fitness> Display for GeneticAlgorithm<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.lock(), f)
    }
}

/// Exclusive access to a [`GeneticAlgorithm`], see [`GeneticAlgorithm::lock`].
///
/// Getters return copies, so no borrow of the driver state outlives a call.
pub struct AlgorithmGuard<'a, C: Chromosome, T: Fitness> {
    cell: ReentrantMutexGuard<'a, RefCell<State<C, T>>>,
}

impl<C: Chromosome, T: Fitness> AlgorithmGuard<'_, C, T> {
    fn state(&self) -> Ref<'_, State<C, T>> {
        self.cell.borrow()
    }

    fn state_mut(&self) -> RefMut<'_, State<C, T>> {
        self.cell.borrow_mut()
    }

    /// Creates the initial population and evaluates it.
    ///
    /// Phenotypes installed with [`set_population`](Self::set_population) or
    /// [`set_genotypes`](Self::set_genotypes) are kept; the population is
    /// filled up to the population size from the genotype factory. The
    /// generation counter starts at 1.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::IllegalState` if the driver is already set up.
    pub fn setup(&mut self) -> Result<()> {
        self.state_mut().setup(None)
    }

    /// Like [`setup`](Self::setup), but starts from the given genotypes. The
    /// population size is set to their number.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::IllegalState` if the driver is already set up
    /// and `GeneticError::InvalidArgument` if `genotypes` is empty.
    pub fn setup_with(&mut self, genotypes: Vec<Genotype<C>>) -> Result<()> {
        self.state_mut().setup(Some(genotypes))
    }

    /// Evolves one generation.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::IllegalState` before [`setup`](Self::setup),
    /// the first error of any task of the generation, `GeneticError::Cancelled`
    /// if the driver was interrupted and `GeneticError::Invariant` if a
    /// selector returned the wrong number of phenotypes. In every error case
    /// the driver keeps the state it had before the call.
    pub fn evolve(&mut self) -> Result<()> {
        self.state_mut().evolve()
    }

    pub fn evolve_n(&mut self, generations: usize) -> Result<()> {
        for _ in 0..generations {
            self.state_mut().evolve()?;
        }
        Ok(())
    }

    /// Evolves while `predicate` holds for the current statistics. The
    /// predicate runs without a borrow of the state, so it may call back
    /// into the driver.
    pub fn evolve_while<P>(&mut self, mut predicate: P) -> Result<()>
    where
        P: FnMut(&Statistics<C, T>) -> bool,
    {
        self.state().check_initialized()?;
        loop {
            let statistics = self.state().statistics.clone();
            match statistics {
                Some(statistics) if predicate(&statistics) => self.state_mut().evolve()?,
                _ => return Ok(()),
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.state().generation > 0
    }

    pub fn generation(&self) -> usize {
        self.state().generation
    }

    /// A copy of the current population.
    pub fn population(&self) -> Population<C, T> {
        self.state().population.clone()
    }

    pub fn best_phenotype(&self) -> Option<Phenotype<C, T>> {
        self.state()
            .best_statistics
            .as_ref()
            .and_then(Statistics::best_phenotype)
            .cloned()
    }

    pub fn statistics(&self) -> Option<Statistics<C, T>> {
        self.state().statistics.clone()
    }

    pub fn best_statistics(&self) -> Option<Statistics<C, T>> {
        self.state().best_statistics.clone()
    }

    /// Number of survivors replaced for exceeding the maximal age, summed
    /// over all generations.
    pub fn killed_count(&self) -> usize {
        self.state().killed
    }

    /// Number of invalid survivors replaced, summed over all generations.
    pub fn invalid_count(&self) -> usize {
        self.state().invalid
    }

    pub fn time_statistics(&self) -> Timings {
        self.state().timings
    }

    pub fn optimize(&self) -> Optimize {
        self.state().optimize
    }

    pub fn population_size(&self) -> usize {
        self.state().population_size
    }

    pub fn offspring_fraction(&self) -> f64 {
        self.state().offspring_fraction
    }

    pub fn maximal_phenotype_age(&self) -> usize {
        self.state().maximal_phenotype_age
    }

    pub fn survivor_selector(&self) -> Arc<dyn Selector<C, T>> {
        Arc::clone(&self.state().survivor_selector)
    }

    pub fn offspring_selector(&self) -> Arc<dyn Selector<C, T>> {
        Arc::clone(&self.state().offspring_selector)
    }

    pub fn alterer(&self) -> Arc<dyn Alterer<C, T>> {
        Arc::clone(&self.state().alterer)
    }

    pub fn fitness_function(&self) -> FitnessFunction<C, T> {
        Arc::clone(&self.state().fitness_function)
    }

    pub fn fitness_scaler(&self) -> FitnessScaler<T> {
        Arc::clone(&self.state().fitness_scaler)
    }

    pub fn concurrency(&self) -> Concurrency {
        self.state().concurrency.clone()
    }

    /// # Errors
    ///
    /// Returns `GeneticError::InvalidArgument` if `population_size` is zero.
    pub fn set_population_size(&mut self, population_size: usize) -> Result<()> {
        self.state_mut().population_size = check_population_size(population_size)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `GeneticError::InvalidArgument` if the fraction isn't in `[0, 1]`.
    pub fn set_offspring_fraction(&mut self, offspring_fraction: f64) -> Result<()> {
        self.state_mut().offspring_fraction =
            check_probability(offspring_fraction, "Offspring fraction")?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `GeneticError::InvalidArgument` if `age` is zero.
    pub fn set_maximal_phenotype_age(&mut self, age: usize) -> Result<()> {
        self.state_mut().maximal_phenotype_age = check_maximal_phenotype_age(age)?;
        Ok(())
    }

    pub fn set_survivor_selector<S: Selector<C, T> + 'static>(&mut self, selector: S) {
        self.state_mut().survivor_selector = Arc::new(selector);
    }

    pub fn set_offspring_selector<S: Selector<C, T> + 'static>(&mut self, selector: S) {
        self.state_mut().offspring_selector = Arc::new(selector);
    }

    /// Uses `selector` for both survivors and offspring.
    pub fn set_selectors<S: Selector<C, T> + 'static>(&mut self, selector: S) {
        let selector: Arc<dyn Selector<C, T>> = Arc::new(selector);
        let mut state = self.state_mut();
        state.survivor_selector = Arc::clone(&selector);
        state.offspring_selector = selector;
    }

    pub fn set_alterer<A: Alterer<C, T> + 'static>(&mut self, alterer: A) {
        self.state_mut().alterer = Arc::new(alterer);
    }

    /// Appends `alterer` to the current alterer chain.
    pub fn add_alterer<A: Alterer<C, T> + 'static>(&mut self, alterer: A) {
        let mut state = self.state_mut();
        let joined = CompositeAlterer::join(Arc::clone(&state.alterer), Arc::new(alterer));
        state.alterer = Arc::new(joined);
    }

    /// Sets the fitness scaler used for phenotypes created from now on.
    pub fn set_fitness_scaler<F>(&mut self, scaler: F)
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.state_mut().fitness_scaler = Arc::new(scaler);
    }

    pub fn set_calculator<K: Calculator<C, T> + 'static>(&mut self, calculator: K) {
        self.state_mut().calculator = Arc::new(calculator);
    }

    pub fn set_concurrency(&mut self, concurrency: Concurrency) {
        self.state_mut().concurrency = concurrency;
    }

    /// Replaces the population with copies of the given phenotypes, bound
    /// to this driver's fitness function and scaler. The population size is
    /// set to their number.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::InvalidArgument` if `population` is empty.
    pub fn set_population<I>(&mut self, population: I) -> Result<()>
    where
        I: IntoIterator<Item = Phenotype<C, T>>,
    {
        let mut guard = self.state_mut();
        let state = &mut *guard;
        let population: Population<C, T> = population
            .into_iter()
            .map(|phenotype| {
                phenotype.with_functions(
                    Arc::clone(&state.fitness_function),
                    Arc::clone(&state.fitness_scaler),
                    state.generation,
                )
            })
            .collect();
        state.population_size = check_population_size(population.len())?;
        state.population = population;
        Ok(())
    }

    /// Replaces the population with new phenotypes of the given genotypes.
    /// The population size is set to their number.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::InvalidArgument` if `genotypes` is empty.
    pub fn set_genotypes<I>(&mut self, genotypes: I) -> Result<()>
    where
        I: IntoIterator<Item = Genotype<C>>,
    {
        let mut state = self.state_mut();
        let population = state.phenotypes_of(genotypes, state.generation);
        state.population_size = check_population_size(population.len())?;
        state.population = population;
        Ok(())
    }
}

impl<C: Chromosome, T: Fitness> Display for AlgorithmGuard<'_, C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let generation = self.generation();
        match self.best_phenotype() {
            Some(best) => write!(f, "{:4}: (best) {}", generation, best),
            None => write!(f, "{:4}: (best) -", generation),
        }
    }
}

impl<C: Chromosome, T: Fitness> State<C, T> {
    fn check_initialized(&self) -> Result<()> {
        if self.generation == 0 {
            return Err(GeneticError::IllegalState(
                "Call setup() before evolving the genetic algorithm".to_string(),
            ));
        }
        Ok(())
    }

    fn new_phenotype(&self, genotype: Genotype<C>, generation: usize) -> Phenotype<C, T> {
        Phenotype::new(
            genotype,
            Arc::clone(&self.fitness_function),
            Arc::clone(&self.fitness_scaler),
            generation,
        )
    }

    fn phenotypes_of<I>(&self, genotypes: I, generation: usize) -> Population<C, T>
    where
        I: IntoIterator<Item = Genotype<C>>,
    {
        genotypes
            .into_iter()
            .map(|genotype| self.new_phenotype(genotype, generation))
            .collect()
    }

    fn setup(&mut self, genotypes: Option<Vec<Genotype<C>>>) -> Result<()> {
        if self.generation > 0 {
            return Err(GeneticError::IllegalState(
                "setup() must be called only once".to_string(),
            ));
        }

        let execution = Instant::now();
        let generation = 1;
        let mut timings = Timings::default();
        let mut rng = self.rng.clone();

        let (mut population, population_size) = match genotypes {
            Some(genotypes) => {
                let population = self.phenotypes_of(genotypes, generation);
                let size = check_population_size(population.len())?;
                (population, size)
            }
            None => (self.population.clone(), self.population_size),
        };
        while population.len() < population_size {
            let genotype = self.factory.new_instance(&mut rng);
            population.push(self.new_phenotype(genotype, generation));
        }

        let start = Instant::now();
        self.evaluate(&population, rng.next_u64())?;
        timings.evaluation = start.elapsed();

        let start = Instant::now();
        let statistics = self
            .calculator
            .evaluate(&population, generation, self.optimize)
            .build();
        timings.statistics = start.elapsed();
        timings.execution = execution.elapsed();
        statistics.set_time(timings)?;

        info!(
            population_size,
            best = ?statistics.best_fitness(),
            "Genetic algorithm set up"
        );

        self.population = population;
        self.population_size = population_size;
        self.generation = generation;
        self.best_statistics = Some(statistics.clone());
        self.statistics = Some(statistics);
        self.timings += timings;
        self.rng = rng;
        Ok(())
    }

    fn evolve(&mut self) -> Result<()> {
        self.check_initialized()?;

        let generation = self.generation + 1;
        let span = debug_span!("evolve", generation);
        let _enter = span.enter();

        let result = self.next_generation(generation);
        if let Err(error) = &result {
            warn!(%error, "Generation aborted, keeping the previous population");
        }
        result
    }

    fn next_generation(&mut self, generation: usize) -> Result<()> {
        let execution = Instant::now();
        let mut timings = Timings::default();
        let mut rng = self.rng.clone();

        let offspring_count =
            (self.offspring_fraction * self.population_size as f64).round() as usize;
        let survivor_count = self.population_size - offspring_count;

        let start = Instant::now();
        let (survivors, mut offspring) =
            self.select(survivor_count, offspring_count, rng.next_u64())?;
        timings.selection = start.elapsed();
        trace!(survivors = survivor_count, offspring = offspring_count, "Selected");

        let start = Instant::now();
        let altered = self.alter(&mut offspring, generation, rng.next_u64())?;
        timings.alteration = start.elapsed();
        trace!(altered, "Altered offspring");

        let start = Instant::now();
        let (population, killed, invalid) =
            self.combine(survivors, offspring, generation, rng.next_u64())?;
        timings.combination = start.elapsed();
        if population.len() != self.population_size {
            return Err(GeneticError::Invariant(format!(
                "Combined population has {} phenotypes, expected {}",
                population.len(),
                self.population_size
            )));
        }
        trace!(killed, invalid, "Combined population");

        let start = Instant::now();
        self.evaluate(&population, rng.next_u64())?;
        timings.evaluation = start.elapsed();
        trace!("Evaluated population");

        let start = Instant::now();
        let statistics = self
            .calculator
            .evaluate(&population, generation, self.optimize)
            .killed(killed)
            .invalid(invalid)
            .build();
        let improved = self.improves_best(&statistics);
        timings.statistics = start.elapsed();
        timings.execution = execution.elapsed();
        statistics.set_time(timings)?;

        debug!(
            best = ?statistics.best_fitness(),
            killed,
            invalid,
            elapsed = ?timings.execution,
            "Generation complete"
        );

        self.population = population;
        self.generation = generation;
        self.killed += killed;
        self.invalid += invalid;
        self.timings += timings;
        self.rng = rng;
        if improved {
            self.best_statistics = Some(statistics.clone());
        }
        self.statistics = Some(statistics);
        Ok(())
    }

    fn improves_best(&self, statistics: &Statistics<C, T>) -> bool {
        let best = self
            .best_statistics
            .as_ref()
            .and_then(Statistics::best_phenotype);
        match (best, statistics.best_phenotype()) {
            (Some(best), Some(current)) => self
                .optimize
                .compare(current.fitness_ref(), best.fitness_ref())
                .is_gt(),
            (None, Some(_)) => true,
            (_, None) => false,
        }
    }

    fn select(
        &self,
        survivor_count: usize,
        offspring_count: usize,
        seed: u64,
    ) -> Result<(Population<C, T>, Population<C, T>)> {
        let mut survivors = None;
        let mut offspring = None;
        {
            let population = &self.population;
            let optimize = self.optimize;
            let survivor_selector = &self.survivor_selector;
            let offspring_selector = &self.offspring_selector;
            let survivors = &mut survivors;
            let offspring = &mut offspring;

            self.concurrency.scope(seed, &self.interrupt, move |scope| {
                scope.execute(move |rng| {
                    *survivors =
                        Some(survivor_selector.select(population, survivor_count, optimize, rng)?);
                    Ok(())
                });
                scope.execute(move |rng| {
                    *offspring = Some(offspring_selector.select(
                        population,
                        offspring_count,
                        optimize,
                        rng,
                    )?);
                    Ok(())
                });
            })?;
        }

        Ok((
            checked_selection(survivors, survivor_count, "Survivor")?,
            checked_selection(offspring, offspring_count, "Offspring")?,
        ))
    }

    fn alter(
        &self,
        offspring: &mut Population<C, T>,
        generation: usize,
        seed: u64,
    ) -> Result<usize> {
        let expected = offspring.len();
        let mut altered = 0;
        {
            let alterer = &self.alterer;
            let altered = &mut altered;
            let offspring = &mut *offspring;

            self.concurrency.scope(seed, &self.interrupt, move |scope| {
                scope.execute(move |rng| {
                    *altered = alterer.alter(offspring, generation, rng);
                    Ok(())
                });
            })?;
        }
        if offspring.len() != expected {
            return Err(GeneticError::Invariant(format!(
                "Alterer changed the offspring count from {} to {}",
                expected,
                offspring.len()
            )));
        }
        Ok(altered)
    }

    /// Replaces survivors that are too old or invalid and appends the
    /// offspring. Returns the new population with the number of killed and
    /// invalid survivors.
    fn combine(
        &self,
        mut survivors: Population<C, T>,
        mut offspring: Population<C, T>,
        generation: usize,
        seed: u64,
    ) -> Result<(Population<C, T>, usize, usize)> {
        let killed = AtomicUsize::new(0);
        let invalid = AtomicUsize::new(0);
        let chunk_size = chunk_size(survivors.len(), self.concurrency.parallelism());
        {
            let factory = &self.factory;
            let function = &self.fitness_function;
            let scaler = &self.fitness_scaler;
            let maximal_age = self.maximal_phenotype_age;
            let killed = &killed;
            let invalid = &invalid;
            let chunks: Vec<&mut [Phenotype<C, T>]> =
                survivors.as_mut_slice().chunks_mut(chunk_size).collect();

            self.concurrency.scope(seed, &self.interrupt, move |scope| {
                for chunk in chunks {
                    scope.execute(move |rng| {
                        for survivor in chunk.iter_mut() {
                            let too_old = survivor.age(generation) > maximal_age;
                            if too_old || !survivor.is_valid() {
                                *survivor = Phenotype::new(
                                    factory.new_instance(rng),
                                    Arc::clone(function),
                                    Arc::clone(scaler),
                                    generation,
                                );
                                if too_old {
                                    killed.fetch_add(1, Ordering::Relaxed);
                                } else {
                                    invalid.fetch_add(1, Ordering::Relaxed);
                                }
                            }
                        }
                        Ok(())
                    });
                }
            })?;
        }

        survivors.append(&mut offspring);
        Ok((survivors, killed.into_inner(), invalid.into_inner()))
    }

    /// Evaluates the fitness of every phenotype of `population`.
    fn evaluate(&self, population: &Population<C, T>, seed: u64) -> Result<()> {
        let chunk_size = chunk_size(population.len(), self.concurrency.parallelism());
        let phenotypes = population.as_slice();

        self.concurrency.scope(seed, &self.interrupt, move |scope| {
            for chunk in phenotypes.chunks(chunk_size) {
                scope.execute(move |_| {
                    for phenotype in chunk {
                        phenotype.evaluate();
                    }
                    Ok(())
                });
            }
        })
    }
}

fn checked_selection<C: Chromosome, T: Fitness>(
    selection: Option<Population<C, T>>,
    expected: usize,
    role: &str,
) -> Result<Population<C, T>> {
    match selection {
        Some(population) if population.len() == expected => Ok(population),
        Some(population) => Err(GeneticError::Invariant(format!(
            "{} selector returned {} phenotypes, expected {}",
            role,
            population.len(),
            expected
        ))),
        None => Err(GeneticError::Invariant(format!(
            "{} selection produced no population",
            role
        ))),
    }
}

/// One chunk per worker thread, at least one phenotype per chunk.
fn chunk_size(len: usize, parallelism: usize) -> usize {
    len.div_ceil(parallelism.max(1)).max(1)
}
