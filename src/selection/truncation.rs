use crate::error::{GeneticError, Result};
use crate::genetics::Chromosome;
use crate::optimize::Optimize;
use crate::phenotype::Fitness;
use crate::population::Population;
use crate::rng::RandomSource;
use crate::selection::Selector;

/// A deterministic selector that keeps the `count` best phenotypes.
///
/// Selection happens without replacement, so `count` may not exceed the
/// population size.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TruncationSelector;

impl TruncationSelector {
    pub fn new() -> Self {
        Self
    }
}

impl<C: Chromosome, T: Fitness> Selector<C, T> for TruncationSelector {
    fn select(
        &self,
        population: &Population<C, T>,
        count: usize,
        optimize: Optimize,
        _rng: &mut dyn RandomSource,
    ) -> Result<Population<C, T>> {
        if count == 0 {
            return Ok(Population::new());
        }
        if population.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }
        if count > population.len() {
            return Err(GeneticError::InvalidArgument(format!(
                "Cannot select {} phenotypes without replacement from a population of {}",
                count,
                population.len()
            )));
        }

        let mut sorted = population.clone();
        sorted.sort_by_fitness(optimize);
        Ok(sorted.into_iter().take(count).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RandomNumberGenerator;
    use crate::selection::test_support::population;

    #[test]
    fn test_selects_the_best() {
        let pop = population(&[0.5, 0.8, 0.3, 0.9, 0.1]);
        let mut rng = RandomNumberGenerator::from_seed(42);

        let selected = TruncationSelector
            .select(&pop, 3, Optimize::Maximum, &mut rng)
            .unwrap();
        let fitness: Vec<f64> = selected.iter().map(|p| p.fitness()).collect();
        assert_eq!(fitness, vec![0.9, 0.8, 0.5]);

        let selected = TruncationSelector
            .select(&pop, 2, Optimize::Minimum, &mut rng)
            .unwrap();
        let fitness: Vec<f64> = selected.iter().map(|p| p.fitness()).collect();
        assert_eq!(fitness, vec![0.1, 0.3]);
    }

    #[test]
    fn test_count_larger_than_population() {
        let pop = population(&[0.5, 0.8]);
        let mut rng = RandomNumberGenerator::from_seed(42);

        let result = TruncationSelector.select(&pop, 3, Optimize::Maximum, &mut rng);
        match result {
            Err(GeneticError::InvalidArgument(msg)) => {
                assert!(msg.contains("without replacement"));
            }
            _ => panic!("Expected InvalidArgument error"),
        }
    }

    #[test]
    fn test_input_is_not_modified() {
        let pop = population(&[0.5, 0.8, 0.3]);
        let before = pop.clone();
        let mut rng = RandomNumberGenerator::from_seed(42);

        TruncationSelector
            .select(&pop, 3, Optimize::Maximum, &mut rng)
            .unwrap();
        assert_eq!(pop, before);
    }
}
