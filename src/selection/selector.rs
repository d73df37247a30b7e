use std::fmt::Debug;

use crate::error::Result;
use crate::genetics::Chromosome;
use crate::optimize::Optimize;
use crate::phenotype::Fitness;
use crate::population::Population;
use crate::rng::RandomSource;

/// Picks phenotypes from a population, either as survivors or as parents
/// of the next generation's offspring.
///
/// Implementations never modify the input population and always return a
/// population of exactly `count` phenotypes. Selected phenotypes are cheap
/// clones sharing their fitness with the originals.
pub trait Selector<C: Chromosome, T: Fitness>: Debug + Send + Sync {
    /// Selects `count` phenotypes from `population`.
    ///
    /// # Arguments
    ///
    /// * `population` - The population to select from.
    /// * `count` - The number of phenotypes to select.
    /// * `optimize` - Whether higher or lower fitness is better.
    /// * `rng` - The random source of the calling task.
    ///
    /// # Returns
    ///
    /// A new population with exactly `count` phenotypes.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::EmptyPopulation` if `count > 0` and the
    /// population is empty. Implementations may return further errors for
    /// counts they can't satisfy.
    fn select(
        &self,
        population: &Population<C, T>,
        count: usize,
        optimize: Optimize,
        rng: &mut dyn RandomSource,
    ) -> Result<Population<C, T>>;
}
