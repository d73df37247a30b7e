use crate::error::{GeneticError, Result};
use crate::genetics::Chromosome;
use crate::optimize::Optimize;
use crate::phenotype::NumericFitness;
use crate::population::Population;
use crate::rng::RandomSource;
use crate::selection::probability::{normalize, select_with, ProbabilitySelector};
use crate::selection::Selector;

/// A selector with probabilities following the Boltzmann distribution.
///
/// `p[i] ∝ exp(b * f[i])` for maximization and `exp(-b * f[i])` for
/// minimization. The largest exponent is subtracted before
/// exponentiation, which leaves the distribution unchanged and keeps the
/// weights finite. Larger `b` means higher selection pressure.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BoltzmannSelector {
    b: f64,
}

impl BoltzmannSelector {
    /// Creates a new `BoltzmannSelector`.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::InvalidArgument` if `b` is not finite.
    pub fn new(b: f64) -> Result<Self> {
        if !b.is_finite() {
            return Err(GeneticError::InvalidArgument(format!(
                "Boltzmann selection strength must be finite, but was {}",
                b
            )));
        }
        Ok(Self { b })
    }

    pub fn b(&self) -> f64 {
        self.b
    }
}

impl Default for BoltzmannSelector {
    fn default() -> Self {
        Self { b: 4.0 }
    }
}

impl<C: Chromosome, T: NumericFitness> ProbabilitySelector<C, T> for BoltzmannSelector {
    fn probabilities(
        &self,
        population: &Population<C, T>,
        _count: usize,
        optimize: Optimize,
    ) -> Vec<f64> {
        let sign = match optimize {
            Optimize::Maximum => 1.0,
            Optimize::Minimum => -1.0,
        };
        let exponents: Vec<Option<f64>> = population
            .iter()
            .map(|p| Some(sign * self.b * p.fitness_ref().as_f64()).filter(|x| x.is_finite()))
            .collect();

        let max = exponents
            .iter()
            .flatten()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        let weights = exponents
            .into_iter()
            .map(|x| x.map_or(0.0, |x| (x - max).exp()))
            .collect();
        normalize(weights)
    }
}

impl<C: Chromosome, T: NumericFitness> Selector<C, T> for BoltzmannSelector {
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
