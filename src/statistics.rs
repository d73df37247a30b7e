//! # Statistics
//!
//! A [`Statistics`] value is an immutable snapshot of one generation: the
//! best and worst phenotype, the age distribution, the number of killed and
//! invalid phenotypes and, once the generation is complete, the time spent
//! in each phase. It is produced by a [`Calculator`], which the driver calls
//! at the end of every generation.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use generational_ga::genetics::DoubleChromosome;
//! use generational_ga::statistics::{Statistics, StatisticsBuilder, Timings};
//!
//! let statistics: Statistics<DoubleChromosome, f64> = StatisticsBuilder::new()
//!     .generation(3)
//!     .samples(10)
//!     .killed(2)
//!     .build();
//!
//! statistics.set_time(Timings {
//!     execution: Duration::from_millis(5),
//!     ..Timings::default()
//! }).unwrap();
//!
//! assert_eq!(statistics.killed(), 2);
//! // Timings can only be set once
//! assert!(statistics.set_time(Timings::default()).is_err());
//! ```

use std::fmt::{self, Debug, Display};
use std::ops::AddAssign;
use std::sync::OnceLock;
use std::time::Duration;

use crate::error::{GeneticError, Result};
use crate::genetics::Chromosome;
use crate::optimize::Optimize;
use crate::phenotype::{Fitness, NumericFitness, Phenotype};
use crate::population::Population;

/// Time spent in the phases of a generation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Timings {
    /// The whole generation.
    pub execution: Duration,
    pub selection: Duration,
    pub alteration: Duration,
    pub combination: Duration,
    pub evaluation: Duration,
    pub statistics: Duration,
}

impl AddAssign for Timings {
    fn add_assign(&mut self, other: Self) {
        self.execution += other.execution;
        self.selection += other.selection;
        self.alteration += other.alteration;
        self.combination += other.combination;
        self.evaluation += other.evaluation;
        self.statistics += other.statistics;
    }
}

impl Display for Timings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = [
            ("Select time", self.selection),
            ("Alter time", self.alteration),
            ("Combine time", self.combination),
            ("Fitness calculation time", self.evaluation),
            ("Statistics calculation time", self.statistics),
            ("Overall execution time", self.execution),
        ];
        writeln!(f, "+---------------------------------------------------------+")?;
        writeln!(f, "|  Time Statistics                                        |")?;
        writeln!(f, "+---------------------------------------------------------+")?;
        for (name, duration) in rows {
            writeln!(f, "| {:>28}: {:<26.11}|", name, duration.as_secs_f64())?;
        }
        write!(f, "+---------------------------------------------------------+")
    }
}

/// Aggregated data of one generation.
#[derive(Debug, Clone)]
pub struct Statistics<C: Chromosome, T: Fitness> {
    generation: usize,
    best: Option<Phenotype<C, T>>,
    worst: Option<Phenotype<C, T>>,
    samples: usize,
    age_mean: f64,
    age_variance: f64,
    killed: usize,
    invalid: usize,
    fitness_mean: Option<f64>,
    fitness_variance: Option<f64>,
    time: OnceLock<Timings>,
}

impl<C: Chromosome, T: Fitness> Statistics<C, T> {
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn best_phenotype(&self) -> Option<&Phenotype<C, T>> {
        self.best.as_ref()
    }

    pub fn worst_phenotype(&self) -> Option<&Phenotype<C, T>> {
        self.worst.as_ref()
    }

    pub fn best_fitness(&self) -> Option<T> {
        self.best.as_ref().map(Phenotype::fitness)
    }

    pub fn worst_fitness(&self) -> Option<T> {
        self.worst.as_ref().map(Phenotype::fitness)
    }

    /// Number of phenotypes the statistics were computed from.
    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn age_mean(&self) -> f64 {
        self.age_mean
    }

    /// Sample variance of the phenotype ages.
    pub fn age_variance(&self) -> f64 {
        self.age_variance
    }

    /// Phenotypes replaced in this generation because they were too old.
    pub fn killed(&self) -> usize {
        self.killed
    }

    /// Phenotypes replaced in this generation because they were invalid.
    pub fn invalid(&self) -> usize {
        self.invalid
    }

    /// Mean fitness, only computed for numeric fitness values.
    pub fn fitness_mean(&self) -> Option<f64> {
        self.fitness_mean
    }

    /// Sample variance of the fitness, only computed for numeric fitness values.
    pub fn fitness_variance(&self) -> Option<f64> {
        self.fitness_variance
    }

    /// The phase timings, available once the generation is complete.
    pub fn time(&self) -> Option<&Timings> {
        self.time.get()
    }

    /// Records the phase timings.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::IllegalState` if the timings were already set.
    pub fn set_time(&self, time: Timings) -> Result<()> {
        self.time.set(time).map_err(|_| {
            GeneticError::IllegalState(format!(
                "Timings of generation {} are already set",
                self.generation
            ))
        })
    }
}

impl<C: Chromosome, T: Fitness> Display for Statistics<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fitness = |phenotype: &Option<Phenotype<C, T>>| match phenotype {
            Some(phenotype) => format!("{:?}", phenotype.fitness()),
            None => "-".to_string(),
        };

        writeln!(f, "+---------------------------------------------------------+")?;
        writeln!(f, "|  Population Statistics                                  |")?;
        writeln!(f, "+---------------------------------------------------------+")?;
        writeln!(f, "| {:>28}: {:<26}|", "Generation", self.generation)?;
        writeln!(f, "| {:>28}: {:<26.11}|", "Age mean", self.age_mean)?;
        writeln!(f, "| {:>28}: {:<26.11}|", "Age variance", self.age_variance)?;
        writeln!(f, "| {:>28}: {:<26}|", "Samples", self.samples)?;
        writeln!(f, "| {:>28}: {:<26}|", "Killed", self.killed)?;
        writeln!(f, "| {:>28}: {:<26}|", "Invalid", self.invalid)?;
        writeln!(f, "| {:>28}: {:<26}|", "Best fitness", fitness(&self.best))?;
        writeln!(f, "| {:>28}: {:<26}|", "Worst fitness", fitness(&self.worst))?;
        if let (Some(mean), Some(variance)) = (self.fitness_mean, self.fitness_variance) {
            writeln!(f, "| {:>28}: {:<26.11}|", "Fitness mean", mean)?;
            writeln!(f, "| {:>28}: {:<26.11}|", "Fitness variance", variance)?;
        }
        write!(f, "+---------------------------------------------------------+")
    }
}

/// Builder for [`Statistics`]. Unset values default to zero, no phenotypes
/// and NaN age moments.
#[derive(Debug, Clone)]
pub struct StatisticsBuilder<C: Chromosome, T: Fitness> {
    generation: usize,
    best: Option<Phenotype<C, T>>,
    worst: Option<Phenotype<C, T>>,
    samples: usize,
    age_mean: f64,
    age_variance: f64,
    killed: usize,
    invalid: usize,
    fitness_mean: Option<f64>,
    fitness_variance: Option<f64>,
}

impl<C: Chromosome, T: Fitness> StatisticsBuilder<C, T> {
    pub fn new() -> Self {
        Self {
            generation: 0,
            best: None,
            worst: None,
            samples: 0,
            age_mean: f64::NAN,
            age_variance: f64::NAN,
            killed: 0,
            invalid: 0,
            fitness_mean: None,
            fitness_variance: None,
        }
    }

    pub fn generation(mut self, generation: usize) -> Self {
        self.generation = generation;
        self
    }

    pub fn best(mut self, best: Option<Phenotype<C, T>>) -> Self {
        self.best = best;
        self
    }

    pub fn worst(mut self, worst: Option<Phenotype<C, T>>) -> Self {
        self.worst = worst;
        self
    }

    pub fn samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    pub fn age_mean(mut self, age_mean: f64) -> Self {
        self.age_mean = age_mean;
        self
    }

    pub fn age_variance(mut self, age_variance: f64) -> Self {
        self.age_variance = age_variance;
        self
    }

    pub fn killed(mut self, killed: usize) -> Self {
        self.killed = killed;
        self
    }

    pub fn invalid(mut self, invalid: usize) -> Self {
        self.invalid = invalid;
        self
    }

    pub fn fitness_mean(mut self, fitness_mean: f64) -> Self {
        self.fitness_mean = Some(fitness_mean);
        self
    }

    pub fn fitness_variance(mut self, fitness_variance: f64) -> Self {
        self.fitness_variance = Some(fitness_variance);
        self
    }

    pub fn build(self) -> Statistics<C, T> {
        Statistics {
            generation: self.generation,
            best: self.best,
            worst: self.worst,
            samples: self.samples,
            age_mean: self.age_mean,
            age_variance: self.age_variance,
            killed: self.killed,
            invalid: self.invalid,
            fitness_mean: self.fitness_mean,
            fitness_variance: self.fitness_variance,
            time: OnceLock::new(),
        }
    }
}

impl<C: Chromosome, T: Fitness> Default for StatisticsBuilder<C, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes the statistics of a population.
pub trait Calculator<C: Chromosome, T: Fitness>: Debug + Send + Sync {
    /// Aggregates `population` at `generation`. The driver adds the killed
    /// and invalid counts before building the statistics.
    fn evaluate(
        &self,
        population: &Population<C, T>,
        generation: usize,
        optimize: Optimize,
    ) -> StatisticsBuilder<C, T>;
}

/// Mean and sample variance. NaN for no values, a variance of 0 for a
/// single value.
pub(crate) fn mean_and_variance(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    // Welford's online algorithm
    let mut count = 0usize;
    let mut mean = 0.0;
    let mut m2 = 0.0;
    for value in values {
        count += 1;
        let delta = value - mean;
        mean += delta / count as f64;
        m2 += delta * (value - mean);
    }
    match count {
        0 => (f64::NAN, f64::NAN),
        1 => (mean, 0.0),
        n => (mean, m2 / (n - 1) as f64),
    }
}

/// Calculates best and worst phenotype and the age distribution.
#[derive(Debug, Clone, Default)]
pub struct StatisticsCalculator;

impl<C: Chromosome, T: Fitness> Calculator<C, T> for StatisticsCalculator {
    fn evaluate(
        &self,
        population: &Population<C, T>,
        generation: usize,
        optimize: Optimize,
    ) -> StatisticsBuilder<C, T> {
        let (age_mean, age_variance) =
            mean_and_variance(population.iter().map(|p| p.age(generation) as f64));

        StatisticsBuilder::new()
            .generation(generation)
            .best(population.best(optimize).cloned())
            .worst(population.worst(optimize).cloned())
            .samples(population.len())
            .age_mean(age_mean)
            .age_variance(age_variance)
    }
}

/// Additionally calculates the mean and variance of numeric fitness values.
#[derive(Debug, Clone, Default)]
pub struct NumberStatisticsCalculator;

impl<C: Chromosome, T: NumericFitness> Calculator<C, T> for NumberStatisticsCalculator {
    fn evaluate(
        &self,
        population: &Population<C, T>,
        generation: usize,
        optimize: Optimize,
    ) -> StatisticsBuilder<C, T> {
        let (fitness_mean, fitness_variance) =
            mean_and_variance(population.iter().map(|p| p.fitness_ref().as_f64()));

        StatisticsCalculator
            .evaluate(population, generation, optimize)
            .fitness_mean(fitness_mean)
            .fitness_variance(fitness_variance)
    }
}
