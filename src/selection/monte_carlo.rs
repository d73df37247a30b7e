use crate::error::{GeneticError, Result};
use crate::genetics::Chromosome;
use crate::optimize::Optimize;
use crate::phenotype::Fitness;
use crate::population::Population;
use crate::rng::RandomSource;
use crate::selection::Selector;

/// Selects phenotypes uniformly at random, with replacement, ignoring their
/// fitness. Useful as a baseline for the other selectors.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonteCarloSelector;

impl MonteCarloSelector {
    pub fn new() -> Self {
        Self
    }
}

impl<C: Chromosome, T: Fitness> Selector<C, T> for MonteCarloSelector {
    fn select(
        &self,
        population: &Population<C, T>,
        count: usize,
        _optimize: Optimize,
        rng: &mut dyn RandomSource,
    ) -> Result<Population<C, T>> {
        if count == 0 {
            return Ok(Population::new());
        }
        if population.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }

        Ok((0..count)
            .map(|_| population[rng.next_int(population.len())].clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RandomNumberGenerator;
    use crate::selection::test_support::population;

    #[test]
    fn test_select_with_replacement() {
        let pop = population(&[1.0, 2.0, 3.0]);
        let mut rng = RandomNumberGenerator::from_seed(3);

        let selected = MonteCarloSelector
            .select(&pop, 300, Optimize::Maximum, &mut rng)
            .unwrap();
        assert_eq!(selected.len(), 300);
        for value in [1.0, 2.0, 3.0] {
            let hits = selected.iter().filter(|p| p.fitness() == value).count();
            assert!(hits > 50, "{} selected only {} times", value, hits);
        }
    }
}
