//! # EvolutionOptions
//!
//! The `EvolutionOptions` struct holds the numeric parameters of the
//! generational algorithm: the population size, the fraction of offspring
//! per generation, the maximal phenotype age and an optional seed for
//! reproducible runs.
//!
//! ## Example
//!
//! ```rust
//! use generational_ga::evolution::options::EvolutionOptions;
//!
//! // Create a new EvolutionOptions instance with custom parameters
//! let custom_options = EvolutionOptions::builder()
//!     .population_size(200)
//!     .offspring_fraction(0.3)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(custom_options.offspring_count(), 60);
//! assert_eq!(custom_options.survivor_count(), 140);
//!
//! // Create a new EvolutionOptions instance with default parameters
//! let default_options = EvolutionOptions::default();
//! assert_eq!(default_options.get_population_size(), 50);
//! ```
//!
//! ## Defaults
//!
//! - `population_size`: 50
//! - `offspring_fraction`: 0.6
//! - `maximal_phenotype_age`: 70
//! - `seed`: none, the driver seeds itself from system entropy

use crate::error::{check_probability, GeneticError, Result};

pub const DEFAULT_POPULATION_SIZE: usize = 50;
pub const DEFAULT_OFFSPRING_FRACTION: f64 = 0.6;
pub const DEFAULT_MAXIMAL_PHENOTYPE_AGE: usize = 70;

pub(crate) fn check_population_size(population_size: usize) -> Result<usize> {
    if population_size < 1 {
        return Err(GeneticError::InvalidArgument(
            "Population size must be at least 1".to_string(),
        ));
    }
    Ok(population_size)
}

pub(crate) fn check_maximal_phenotype_age(age: usize) -> Result<usize> {
    if age < 1 {
        return Err(GeneticError::InvalidArgument(
            "Maximal phenotype age must be at least 1".to_string(),
        ));
    }
    Ok(age)
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionOptions {
    population_size: usize,
    offspring_fraction: f64,
    maximal_phenotype_age: usize,
    seed: Option<u64>,
}

impl EvolutionOptions {
    /// Creates a new `EvolutionOptions` instance.
    ///
    /// # Arguments
    ///
    /// * `population_size` - The number of phenotypes in every generation, at least 1.
    /// * `offspring_fraction` - The share of every generation produced by alteration, in `[0, 1]`.
    /// * `maximal_phenotype_age` - Survivors older than this are replaced, at least 1.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::InvalidArgument` if a parameter is out of range.
    pub fn new(
        population_size: usize,
        offspring_fraction: f64,
        maximal_phenotype_age: usize,
    ) -> Result<Self> {
        Ok(Self {
            population_size: check_population_size(population_size)?,
            offspring_fraction: check_probability(offspring_fraction, "Offspring fraction")?,
            maximal_phenotype_age: check_maximal_phenotype_age(maximal_phenotype_age)?,
            seed: None,
        })
    }

    pub fn get_population_size(&self) -> usize {
        self.population_size
    }

    pub fn get_offspring_fraction(&self) -> f64 {
        self.offspring_fraction
    }

    pub fn get_maximal_phenotype_age(&self) -> usize {
        self.maximal_phenotype_age
    }

    pub fn get_seed(&self) -> Option<u64> {
        self.seed
    }

    /// Number of offspring per generation: `round(fraction * size)`.
    pub fn offspring_count(&self) -> usize {
        (self.offspring_fraction * self.population_size as f64).round() as usize
    }

    /// Number of survivors per generation: `size - offspring`.
    pub fn survivor_count(&self) -> usize {
        self.population_size - self.offspring_count()
    }

    /// Sets the population size.
    pub fn set_population_size(&mut self, population_size: usize) -> Result<()> {
        self.population_size = check_population_size(population_size)?;
        Ok(())
    }

    /// Sets the offspring fraction.
    pub fn set_offspring_fraction(&mut self, offspring_fraction: f64) -> Result<()> {
        self.offspring_fraction = check_probability(offspring_fraction, "Offspring fraction")?;
        Ok(())
    }

    /// Sets the maximal phenotype age.
    pub fn set_maximal_phenotype_age(&mut self, age: usize) -> Result<()> {
        self.maximal_phenotype_age = check_maximal_phenotype_age(age)?;
        Ok(())
    }

    /// Sets the seed of the driver's random generator.
    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    /// Returns a builder for creating an `EvolutionOptions` instance.
    ///
    /// # Example
    ///
    /// ```rust
    /// use generational_ga::evolution::options::EvolutionOptions;
    ///
    /// let options = EvolutionOptions::builder()
    ///     .population_size(100)
    ///     .maximal_phenotype_age(10)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(options.get_offspring_fraction(), 0.6);
    /// ```
    pub fn builder() -> EvolutionOptionsBuilder {
        EvolutionOptionsBuilder::default()
    }
}

impl Default for EvolutionOptions {
    fn default() -> Self {
        Self {
            population_size: DEFAULT_POPULATION_SIZE,
            offspring_fraction: DEFAULT_OFFSPRING_FRACTION,
            maximal_phenotype_age: DEFAULT_MAXIMAL_PHENOTYPE_AGE,
            seed: None,
        }
    }
}

/// Builder for `EvolutionOptions`.
///
/// Provides a fluent interface for constructing `EvolutionOptions` instances.
/// Values are validated by [`EvolutionOptionsBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct EvolutionOptionsBuilder {
    population_size: Option<usize>,
    offspring_fraction: Option<f64>,
    maximal_phenotype_age: Option<usize>,
    seed: Option<u64>,
}

impl EvolutionOptionsBuilder {
    /// Sets the population size.
    pub fn population_size(mut self, value: usize) -> Self {
        self.population_size = Some(value);
        self
    }

    /// Sets the offspring fraction.
    pub fn offspring_fraction(mut self, value: f64) -> Self {
        self.offspring_fraction = Some(value);
        self
    }

    /// Sets the maximal phenotype age.
    pub fn maximal_phenotype_age(mut self, value: usize) -> Self {
        self.maximal_phenotype_age = Some(value);
        self
    }

    /// Sets the seed for reproducible runs.
    pub fn seed(mut self, value: u64) -> Self {
        self.seed = Some(value);
        self
    }

    /// Builds the `EvolutionOptions` instance.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::InvalidArgument` if a parameter is out of range.
    pub fn build(self) -> Result<EvolutionOptions> {
        let mut options = EvolutionOptions::new(
            self.population_size.unwrap_or(DEFAULT_POPULATION_SIZE),
            self.offspring_fraction
                .unwrap_or(DEFAULT_OFFSPRING_FRACTION),
            self.maximal_phenotype_age
                .unwrap_or(DEFAULT_MAXIMAL_PHENOTYPE_AGE),
        )?;
        options.set_seed(self.seed);
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = EvolutionOptions::default();
        assert_eq!(options.get_population_size(), 50);
        assert_eq!(options.get_offspring_fraction(), 0.6);
        assert_eq!(options.get_maximal_phenotype_age(), 70);
        assert_eq!(options.get_seed(), None);
        assert_eq!(options.offspring_count(), 30);
        assert_eq!(options.survivor_count(), 20);
        assert_eq!(EvolutionOptions::builder().build().unwrap(), options);
    }

    #[test]
    fn test_builder_validation() {
        let result = EvolutionOptions::builder().population_size(0).build();
        match result {
            Err(GeneticError::InvalidArgument(msg)) => {
                assert!(msg.contains("Population size"));
            }
            _ => panic!("Expected InvalidArgument error"),
        }

        assert!(EvolutionOptions::builder()
            .offspring_fraction(1.2)
            .build()
            .is_err());
        assert!(EvolutionOptions::builder()
            .maximal_phenotype_age(0)
            .build()
            .is_err());
    }

    #[test]
    fn test_setters_keep_value_on_error() {
        let mut options = EvolutionOptions::default();

        assert!(options.set_offspring_fraction(-0.5).is_err());
        assert_eq!(options.get_offspring_fraction(), 0.6);

        options.set_population_size(7).unwrap();
        options.set_offspring_fraction(0.5).unwrap();
        // round(3.5) rounds away from zero
        assert_eq!(options.offspring_count(), 4);
        assert_eq!(options.survivor_count(), 3);
    }
}
