use crate::error::Result;
use crate::genetics::Chromosome;
use crate::optimize::Optimize;
use crate::phenotype::NumericFitness;
use crate::population::Population;
use crate::rng::RandomSource;
use crate::selection::probability::{normalize, select_with, ProbabilitySelector};
use crate::selection::Selector;

/// A fitness-proportional selector.
///
/// The selection probability of a phenotype is proportional to the distance
/// of its fitness from the worst fitness in the population:
/// `p[i] ∝ |f[i] - worst|`. This keeps probabilities non-negative for
/// negative fitness values and for minimization problems alike. If all
/// phenotypes have the same fitness, every phenotype is equally likely.
///
/// Phenotypes with a non-finite fitness are never selected, unless no
/// phenotype has a usable fitness at all.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouletteWheelSelector;

impl RouletteWheelSelector {
    pub fn new() -> Self {
        Self
    }
}

impl<C: Chromosome, T: NumericFitness> ProbabilitySelector<C, T> for RouletteWheelSelector {
    fn probabilities(
        &self,
        population: &Population<C, T>,
        _count: usize,
        optimize: Optimize,
    ) -> Vec<f64> {
        let fitness: Vec<f64> = population.iter().map(|p| p.fitness_ref().as_f64()).collect();

        let worst = fitness
            .iter()
            .filter(|f| f.is_finite())
            .copied()
            .reduce(|a, b| *optimize.worst(&a, &b));

        let weights = match worst {
            Some(worst) => fitness
                .iter()
                .map(|&f| if f.is_finite() { (f - worst).abs() } else { 0.0 })
                .collect(),
            None => vec![0.0; fitness.len()],
        };
        normalize(weights)
    }
}

impl<C: Chromosome, T: NumericFitness> Selector<C, T> for RouletteWheelSelector {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RandomNumberGenerator;
    use crate::selection::test_support::population;

    #[test]
    fn test_probabilities_maximum() {
        let pop = population(&[1.0, 2.0, 3.0]);
        let p = RouletteWheelSelector.probabilities(&pop, 3, Optimize::Maximum);

        // Distances from the worst: 0, 1, 2
        assert_eq!(p, vec![0.0, 1.0 / 3.0, 2.0 / 3.0]);
    }

    #[test]
    fn test_probabilities_minimum_with_negative_fitness() {
        let pop = population(&[-1.0, -2.0, -3.0]);
        let p = RouletteWheelSelector.probabilities(&pop, 3, Optimize::Minimum);

        // The worst for minimization is -1.0
        assert_eq!(p, vec![0.0, 1.0 / 3.0, 2.0 / 3.0]);
    }

    #[test]
    fn test_identical_fitness_is_uniform() {
        let pop = population(&[4.0, 4.0, 4.0, 4.0]);
        let p = RouletteWheelSelector.probabilities(&pop, 2, Optimize::Maximum);

        assert_eq!(p, vec![0.25; 4]);
    }

    #[test]
    fn test_nan_is_never_selected() {
        let pop = population(&[1.0, f64::NAN, 3.0]);
        let mut rng = RandomNumberGenerator::from_seed(42);

        let p = RouletteWheelSelector.probabilities(&pop, 3, Optimize::Maximum);
        assert_eq!(p[1], 0.0);

        let selected = RouletteWheelSelector
            .select(&pop, 50, Optimize::Maximum, &mut rng)
            .unwrap();
        assert!(selected.iter().all(|p| p.fitness() == 3.0));
    }
}
