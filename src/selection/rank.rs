use crate::error::{GeneticError, Result};
use crate::genetics::Chromosome;
use crate::optimize::Optimize;
use crate::phenotype::Fitness;
use crate::population::Population;
use crate::rng::RandomSource;
use crate::selection::probability::{normalize, ranks, select_with, ProbabilitySelector};
use crate::selection::Selector;

/// A selector that assigns probabilities linearly by rank.
///
/// Rank-based selection uses the position of a phenotype in the population
/// rather than its absolute fitness value. This helps prevent premature
/// convergence when a few phenotypes have a much higher fitness than the
/// rest, and works for any ordered fitness type.
///
/// With `N` phenotypes ranked from `0` (worst) to `N - 1` (best), the
/// probability of rank `r` is
///
/// ```text
/// p(r) = (2 - s) / N + 2 * r * (s - 1) / (N * (N - 1))
/// ```
///
/// where `s` is the selection pressure. `s = 1` selects uniformly, `s = 2`
/// gives the worst phenotype no chance at all. Phenotypes with equal fitness
/// share their average rank.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRankSelector {
    selection_pressure: f64,
}

impl LinearRankSelector {
    /// Creates a new `LinearRankSelector`.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::InvalidArgument` if `selection_pressure` is not
    /// within `[1, 2]`.
    pub fn new(selection_pressure: f64) -> Result<Self> {
        if !(1.0..=2.0).contains(&selection_pressure) {
            return Err(GeneticError::InvalidArgument(format!(
                "Selection pressure must be in the range [1, 2], but was {}",
                selection_pressure
            )));
        }
        Ok(Self { selection_pressure })
    }

    pub fn selection_pressure(&self) -> f64 {
        self.selection_pressure
    }
}

impl Default for LinearRankSelector {
    fn default() -> Self {
        Self {
            selection_pressure: 1.5,
        }
    }
}

impl<C: Chromosome, T: Fitness> ProbabilitySelector<C, T> for LinearRankSelector {
    fn probabilities(
        &self,
        population: &Population<C, T>,
        _count: usize,
        optimize: Optimize,
    ) -> Vec<f64> {
        let n = population.len() as f64;
        if population.len() == 1 {
            return vec![1.0];
        }

        let s = self.selection_pressure;
        ranks(population, optimize)
            .into_iter()
            .map(|r| (2.0 - s) / n + 2.0 * r * (s - 1.0) / (n * (n - 1.0)))
            .collect()
    }
}

impl<C: Chromosome, T: Fitness> Selector<C, T> for LinearRankSelector {
    fn select(
        &self,
        population: &Population<C, T>,
        count: usize,
        optimize: Optimize,
        rng: &mut dyn RandomSource,
    ) -> Result<Population<C, T>> {
        select_with(self, population, count, optimize, rng)
    }
}

/// A selector whose probabilities decay exponentially with the rank.
///
/// The probability of rank `r` (from `0` for the worst to `N - 1` for the
/// best) is proportional to `c^(N - 1 - r)`, so the best phenotype has the
/// largest weight and every step down multiplies it by `c`. Values of `c`
/// close to 1 select almost uniformly, `c = 0` always picks the best.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialRankSelector {
    c: f64,
}

impl ExponentialRankSelector {
    /// Creates a new `ExponentialRankSelector`.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::InvalidArgument` if `c` is not within `[0, 1]`.
    pub fn new(c: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&c) {
            return Err(GeneticError::InvalidArgument(format!(
                "Exponential base must be in the range [0, 1], but was {}",
                c
            )));
        }
        Ok(Self { c })
    }

    pub fn c(&self) -> f64 {
        self.c
    }
}

impl Default for ExponentialRankSelector {
    fn default() -> Self {
        Self { c: 0.975 }
    }
}

impl<C: Chromosome, T: Fitness> ProbabilitySelector<C, T> for ExponentialRankSelector {
    fn probabilities(
        &self,
        population: &Population<C, T>,
        _count: usize,
        optimize: Optimize,
    ) -> Vec<f64> {
        let top = population.len().saturating_sub(1) as f64;
        let weights = ranks(population, optimize)
            .into_iter()
            .map(|r| self.c.powf(top - r))
            .collect();
        normalize(weights)
    }
}

impl<C: Chromosome, T: Fitness> Selector<C, T> for ExponentialRankSelector {
    fn select(
        &self,
        population: &Population<C, T>,
        count: usize,
        optimize: Optimize,
        rng: &mut dyn RandomSource,
    ) -> Result<Population<C, T>> {
        select_with(self, population, count, optimize, rng)
    }
}
