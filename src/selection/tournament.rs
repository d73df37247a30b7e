use crate::error::{GeneticError, Result};
use crate::genetics::Chromosome;
use crate::optimize::Optimize;
use crate::phenotype::Fitness;
use crate::population::Population;
use crate::rng::RandomSource;
use crate::selection::Selector;

/// A selector that picks phenotypes through tournaments.
///
/// For every pick, `tournament_size` distinct phenotypes are drawn at random
/// and the best of them wins. If several participants share the best
/// fitness, the one drawn first wins.
///
/// - Smaller tournament sizes lead to more exploration (more random selection)
/// - Larger tournament sizes lead to more exploitation (more focus on the best individuals)
///
/// If the population is smaller than the tournament size, every phenotype
/// takes part in every tournament.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use generational_ga::genetics::{DoubleChromosome, DoubleGene, Genotype};
/// use generational_ga::optimize::Optimize;
/// use generational_ga::phenotype::{identity_scaler, Phenotype};
/// use generational_ga::population::Population;
/// use generational_ga::rng::RandomNumberGenerator;
/// use generational_ga::selection::{Selector, TournamentSelector};
/// use generational_ga::error::Result;
///
/// fn main() -> Result<()> {
///     let population: Population<DoubleChromosome, f64> = [0.5, 0.8, 0.3, 0.9, 0.1]
///         .iter()
///         .map(|&v| {
///             let gene = DoubleGene::new(v, 0.0, 1.0).unwrap();
///             Phenotype::new(
///                 Genotype::of(DoubleChromosome::new(vec![gene]).unwrap()),
///                 Arc::new(|g: &Genotype<DoubleChromosome>| g.chromosome(0).value()),
///                 identity_scaler(),
///                 1,
///             )
///         })
///         .collect();
///
///     let mut rng = RandomNumberGenerator::from_seed(42);
///     let selector = TournamentSelector::new(5)?;
///     let selected = selector.select(&population, 3, Optimize::Maximum, &mut rng)?;
///
///     // With a tournament as large as the population, the best always wins
///     assert_eq!(selected.len(), 3);
///     assert!(selected.iter().all(|p| p.fitness() == 0.9));
///
///     Ok(())
/// }
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TournamentSelector {
    tournament_size: usize,
}

impl TournamentSelector {
    /// Creates a new `TournamentSelector` with the specified tournament size.
    ///
    /// # Arguments
    ///
    /// * `tournament_size` - The number of phenotypes that take part in each tournament.
    ///   Must be at least 1. A tournament size of 1 is equivalent to random selection.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::InvalidArgument` if `tournament_size` is 0.
    pub fn new(tournament_size: usize) -> Result<Self> {
        if tournament_size < 1 {
            return Err(GeneticError::InvalidArgument(
                "Tournament size must be at least 1".to_string(),
            ));
        }
        Ok(Self { tournament_size })
    }

    pub fn tournament_size(&self) -> usize {
        self.tournament_size
    }

    /// Runs a single tournament and returns the index of the winner.
    fn run_tournament<C: Chromosome, T: Fitness>(
        &self,
        population: &Population<C, T>,
        optimize: Optimize,
        rng: &mut dyn RandomSource,
    ) -> usize {
        let size = self.tournament_size.min(population.len());
        let participants = rand::seq::index::sample(rng, population.len(), size);

        let mut participants = participants.iter();
        let mut winner = participants.next().unwrap_or(0);
        for index in participants {
            let better = optimize.compare(
                population[index].fitness_ref(),
                population[winner].fitness_ref(),
            );
            if better.is_gt() {
                winner = index;
            }
        }
        winner
    }
}

impl Default for TournamentSelector {
    fn default() -> Self {
        Self { tournament_size: 2 }
    }
}

impl<C: Chromosome, T: Fitness> Selector<C, T> for TournamentSelector {
    fn select(
        &self,
        population: &Population<C, T>,
        count: usize,
        optimize: Optimize,
        rng: &mut dyn RandomSource,
    ) -> Result<Population<C, T>> {
        if count == 0 {
            return Ok(Population::new());
        }
        if population.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }

        Ok((0..count)
            .map(|_| population[self.run_tournament(population, optimize, rng)].clone())
            .collect())
    }
}
