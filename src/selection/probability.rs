//! Selectors that assign every phenotype a selection probability and then
//! sample with replacement.

use std::cmp::Ordering;
use std::fmt::Debug;

use crate::error::{GeneticError, Result};
use crate::genetics::Chromosome;
use crate::optimize::Optimize;
use crate::phenotype::Fitness;
use crate::population::Population;
use crate::rng::RandomSource;

/// Maximal deviation of the probability sum from one.
pub const PROBABILITY_TOLERANCE: f64 = 1e-4;

/// A selector defined by a probability distribution over the population.
///
/// Implementors are [`Selector`](crate::selection::Selector)s whose `select` delegates to
/// [`select_with`], which validates the returned distribution and samples
/// `count` indices from it.
pub trait ProbabilitySelector<C: Chromosome, T: Fitness>: Debug + Send + Sync {
    /// Returns one probability per phenotype, in population order.
    ///
    /// The values must be non-negative and sum to one.
    fn probabilities(&self, population: &Population<C, T>, count: usize, optimize: Optimize)
        -> Vec<f64>;
}

/// Selects `count` phenotypes from `population` with replacement, following
/// the distribution of `selector`.
///
/// This is the [`select`](crate::selection::Selector::select) of every probability selector. The
/// distribution is validated before sampling; a malformed one aborts the
/// selection with `GeneticError::Invariant`.
pub fn select_with<C, T, S>(
    selector: &S,
    population: &Population<C, T>,
    count: usize,
    optimize: Optimize,
    rng: &mut dyn RandomSource,
) -> Result<Population<C, T>>
where
    C: Chromosome,
    T: Fitness,
    S: ProbabilitySelector<C, T> + ?Sized,
{
    if count == 0 {
        return Ok(Population::new());
    }
    if population.is_empty() {
        return Err(GeneticError::EmptyPopulation);
    }

    let probabilities = selector.probabilities(population, count, optimize);
    check_probabilities(&probabilities, population.len())?;

    Ok((0..count)
        .map(|_| population[next_index(&probabilities, rng)].clone())
        .collect())
}

fn check_probabilities(probabilities: &[f64], size: usize) -> Result<()> {
    if probabilities.len() != size {
        return Err(GeneticError::Invariant(format!(
            "Expected {} probabilities, but got {}",
            size,
            probabilities.len()
        )));
    }
    if let Some(p) = probabilities.iter().find(|p| !(**p >= 0.0)) {
        return Err(GeneticError::Invariant(format!(
            "Selection probabilities must be non-negative, but found {}",
            p
        )));
    }
    let sum: f64 = probabilities.iter().sum();
    if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(GeneticError::Invariant(format!(
            "Selection probabilities must sum to 1, but sum to {}",
            sum
        )));
    }
    Ok(())
}

/// Samples an index from the distribution `probabilities`.
///
/// Draws `u` uniformly from `[0, 1)` and scans the cumulative sum. If
/// rounding makes the sum fall short of `u`, the last index is returned.
pub fn next_index(probabilities: &[f64], rng: &mut dyn RandomSource) -> usize {
    let u = rng.next_double();
    let mut cumulative = 0.0;
    for (index, p) in probabilities.iter().enumerate() {
        cumulative += p;
        if u < cumulative {
            return index;
        }
    }
    probabilities.len().saturating_sub(1)
}

pub(crate) fn uniform(size: usize) -> Vec<f64> {
    vec![1.0 / size as f64; size]
}

/// Normalizes `weights` to sum to one. Falls back to the uniform
/// distribution if the sum is zero or not finite.
pub(crate) fn normalize(weights: Vec<f64>) -> Vec<f64> {
    let sum: f64 = weights.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        return uniform(weights.len());
    }
    weights.into_iter().map(|w| w / sum).collect()
}

/// Ranks of all phenotypes in population order: 0 for the worst, `N - 1`
/// for the best. Phenotypes with equal fitness share their average rank.
pub(crate) fn ranks<C: Chromosome, T: Fitness>(
    population: &Population<C, T>,
    optimize: Optimize,
) -> Vec<f64> {
    let fitness: Vec<&T> = population.iter().map(|p| p.fitness_ref()).collect();
    let mut order: Vec<usize> = (0..fitness.len()).collect();
    order.sort_by(|&a, &b| optimize.compare(fitness[a], fitness[b]));

    let mut ranks = vec![0.0; fitness.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len()
            && optimize.compare(fitness[order[start]], fitness[order[end]]) == Ordering::Equal
        {
            end += 1;
        }
        let average = (start + end - 1) as f64 / 2.0;
        for &index in &order[start..end] {
            ranks[index] = average;
        }
        start = end;
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::DoubleChromosome;
    use crate::rng::RandomNumberGenerator;
    use crate::selection::test_support::population;

    /// Puts all weight on the first phenotype, or returns `broken` as is.
    #[derive(Debug)]
    struct FirstOnly {
        broken: Option<Vec<f64>>,
    }

    impl ProbabilitySelector<DoubleChromosome, f64> for FirstOnly {
        fn probabilities(
            &self,
            population: &Population<DoubleChromosome, f64>,
            _count: usize,
            _optimize: Optimize,
        ) -> Vec<f64> {
            self.broken.clone().unwrap_or_else(|| {
                let mut p = vec![0.0; population.len()];
                p[0] = 1.0;
                p
            })
        }
    }

    #[test]
    fn test_select_with_samples_distribution() {
        let mut rng = RandomNumberGenerator::from_seed(3);
        let source = population(&[4.0, 2.0, 9.0]);
        let selector = FirstOnly { broken: None };

        let selected = select_with(&selector, &source, 20, Optimize::Maximum, &mut rng).unwrap();
        assert_eq!(selected.len(), 20);
        assert!(selected.iter().all(|p| p.fitness() == 4.0));

        let none = select_with(&selector, &source, 0, Optimize::Maximum, &mut rng).unwrap();
        assert!(none.is_empty());
        assert!(matches!(
            select_with(&selector, &population(&[]), 2, Optimize::Maximum, &mut rng),
            Err(GeneticError::EmptyPopulation)
        ));
    }

    #[test]
    fn test_select_with_rejects_malformed_distribution() {
        let mut rng = RandomNumberGenerator::from_seed(3);
        let selector = FirstOnly {
            broken: Some(vec![0.9, 0.9, 0.9]),
        };

        let result = select_with(&selector, &population(&[1.0, 2.0, 3.0]), 2, Optimize::Maximum, &mut rng);
        assert!(matches!(result, Err(GeneticError::Invariant(_))));
    }

    #[test]
    fn test_next_index_follows_distribution() {
        let mut rng = RandomNumberGenerator::from_seed(42);
        let probabilities = [0.1, 0.0, 0.6, 0.3];
        let mut counts = [0usize; 4];

        for _ in 0..10_000 {
            counts[next_index(&probabilities, &mut rng)] += 1;
        }

        assert_eq!(counts[1], 0);
        assert!((counts[2] as f64 / 10_000.0 - 0.6).abs() < 0.03);
        assert!((counts[0] as f64 / 10_000.0 - 0.1).abs() < 0.03);
    }

    #[test]
    fn test_next_index_rounding_shortfall() {
        // The cumulative sum never reaches u, so the last index is returned
        let mut rng = RandomNumberGenerator::from_seed(1);
        for _ in 0..100 {
            assert_eq!(next_index(&[0.0, 0.0, 0.0], &mut rng), 2);
        }
    }

    #[test]
    fn test_check_probabilities() {
        assert!(check_probabilities(&[0.5, 0.5], 2).is_ok());
        assert!(check_probabilities(&[0.5, 0.50005], 2).is_ok());
        assert!(matches!(
            check_probabilities(&[0.5, 0.6], 2),
            Err(GeneticError::Invariant(_))
        ));
        assert!(matches!(
            check_probabilities(&[1.5, -0.5], 2),
            Err(GeneticError::Invariant(_))
        ));
        assert!(check_probabilities(&[f64::NAN, 1.0], 2).is_err());
        assert!(check_probabilities(&[1.0], 2).is_err());
    }

    #[test]
    fn test_normalize_degenerate_sums() {
        assert_eq!(normalize(vec![0.0, 0.0]), vec![0.5, 0.5]);
        assert_eq!(normalize(vec![f64::INFINITY, 1.0]), vec![0.5, 0.5]);
        assert_eq!(normalize(vec![1.0, 3.0]), vec![0.25, 0.75]);
    }
}
