//! # Alterers
//!
//! Alterers change the genetic material of a population in place: mutation
//! changes single genes, recombination mixes the genes of several
//! phenotypes. The driver applies its alterer to the offspring of every
//! generation.
//!
//! Every altered phenotype is replaced by a new phenotype with the current
//! generation, so its age starts again at zero and its fitness is evaluated
//! anew. The size of the population never changes.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use generational_ga::alteration::{CompositeAlterer, Mutation, SinglePointCrossover};
//! use generational_ga::genetics::DoubleChromosome;
//!
//! let alterer = CompositeAlterer::<DoubleChromosome, f64>::join(
//!     Arc::new(SinglePointCrossover::new(0.1).unwrap()),
//!     Arc::new(Mutation::new(0.05).unwrap()),
//! );
//! assert_eq!(alterer.alterers().len(), 2);
//! ```

pub mod composite;
pub mod crossover;
pub mod mean;
pub mod mutation;
pub mod pmx;
pub mod recombination;

use std::fmt::Debug;
use std::sync::Arc;

use crate::genetics::Chromosome;
use crate::phenotype::Fitness;
use crate::population::Population;
use crate::rng::RandomSource;

pub use composite::CompositeAlterer;
pub use crossover::{recombine_with, Crossover, NPointCrossover, SinglePointCrossover};
pub use mean::MeanAlterer;
pub use mutation::{Mutation, SwapMutation};
pub use pmx::PartiallyMatchedCrossover;
pub use recombination::{alter_with, Recombinator};

/// Changes the genetic material of a population in place.
pub trait Alterer<C: Chromosome, T: Fitness>: Debug + Send + Sync {
    /// Alters `population` and returns the number of altered genes or
    /// phenotypes, depending on the alterer.
    ///
    /// # Arguments
    ///
    /// * `population` - The population to alter. Its size is left unchanged.
    /// * `generation` - The current generation, assigned to every altered phenotype.
    /// * `rng` - The random source of the calling task.
    fn alter(
        &self,
        population: &mut Population<C, T>,
        generation: usize,
        rng: &mut dyn RandomSource,
    ) -> usize;

    /// The parts of a composite alterer, `None` for simple ones.
    fn components(&self) -> Option<&[Arc<dyn Alterer<C, T>>]> {
        None
    }
}
