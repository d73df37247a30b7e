use std::fmt::Debug;

use crate::genetics::Chromosome;
use crate::phenotype::Fitness;
use crate::population::Population;
use crate::rng::RandomSource;

/// An alterer that combines the genes of `order` phenotypes.
///
/// Recombinators are [`Alterer`](crate::alteration::Alterer)s through
/// [`alter_with`]: each phenotype of the population becomes, with the
/// recombination probability, the anchor of a recombination. The remaining
/// `order - 1` partners are drawn at random, distinct from each other and
/// from the anchor.
pub trait Recombinator<C: Chromosome, T: Fitness>: Debug + Send + Sync {
    /// The probability of every phenotype to be the anchor of a recombination.
    fn probability(&self) -> f64;

    /// The number of phenotypes taking part in one recombination, at least 2.
    fn order(&self) -> usize;

    /// Recombines the phenotypes at `individuals` in place.
    ///
    /// `individuals` holds `order` distinct indices; the first one is the
    /// anchor. Returns the number of altered phenotypes.
    fn recombine(
        &self,
        population: &mut Population<C, T>,
        individuals: &[usize],
        generation: usize,
        rng: &mut dyn RandomSource,
    ) -> usize;
}

/// Applies `recombinator` to `population`. This is the
/// [`alter`](crate::alteration::Alterer::alter) of every recombinator.
///
/// Populations with fewer than two phenotypes are left unchanged and the
/// order is clamped to the population size. Returns the sum of the
/// phenotypes altered by the individual recombinations.
pub fn alter_with<C, T, R>(
    recombinator: &R,
    population: &mut Population<C, T>,
    generation: usize,
    rng: &mut dyn RandomSource,
) -> usize
where
    C: Chromosome,
    T: Fitness,
    R: Recombinator<C, T> + ?Sized,
{
    let size = population.len();
    if size < 2 {
        return 0;
    }
    let order = recombinator.order().clamp(2, size);
    let probability = recombinator.probability();

    let mut altered = 0;
    let mut individuals = Vec::with_capacity(order);
    for anchor in 0..size {
        if rng.next_double() >= probability {
            continue;
        }
        individuals.clear();
        individuals.push(anchor);
        let partners = rand::seq::index::sample(&mut *rng, size - 1, order - 1);
        individuals.extend(
            partners
                .iter()
                .map(|index| if index >= anchor { index + 1 } else { index }),
        );
        altered += recombinator.recombine(population, &individuals, generation, rng);
    }
    altered
}
