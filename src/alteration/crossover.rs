use std::fmt::Debug;

use crate::error::{check_probability, GeneticError, Result};
use crate::genetics::{Chromosome, Gene};
use crate::phenotype::Fitness;
use crate::population::Population;
use crate::rng::{subset, RandomSource};

/// A recombination of two phenotypes that exchanges genes between one of
/// their chromosomes.
///
/// Crossovers are [`Recombinator`](crate::alteration::Recombinator)s of
/// order 2 through [`recombine_with`]: the chromosome index is chosen at
/// random, both gene sequences are handed to [`Crossover::crossover`] and both phenotypes are replaced by their
/// offspring. Chromosomes of different lengths are left unchanged.
pub trait Crossover<G: Gene>: Debug + Send + Sync {
    /// The probability of every phenotype to be the anchor of a crossover.
    fn probability(&self) -> f64;

    /// Exchanges genes between `that` and `other`, which have equal length.
    fn crossover(&self, that: &mut [G], other: &mut [G], rng: &mut dyn RandomSource);
}

/// Crosses one randomly chosen chromosome of the phenotypes at
/// `individuals[0]` and `individuals[1]` and replaces both. This is the
/// [`recombine`](crate::alteration::Recombinator::recombine) of every crossover.
///
/// Returns 2, or 0 if the chosen chromosomes differ in length.
pub fn recombine_with<C, T, X>(
    crossover: &X,
    population: &mut Population<C, T>,
    individuals: &[usize],
    generation: usize,
    rng: &mut dyn RandomSource,
) -> usize
where
    C: Chromosome,
    T: Fitness,
    X: Crossover<C::Gene> + ?Sized,
{
    let (i, j) = (individuals[0], individuals[1]);
    let that = population[i].clone();
    let other = population[j].clone();

    let chromosomes = that.genotype().len().min(other.genotype().len());
    let index = rng.next_int(chromosomes);
    let that_chromosome = that.genotype().chromosome(index);
    let other_chromosome = other.genotype().chromosome(index);
    if that_chromosome.len() != other_chromosome.len() {
        return 0;
    }

    let mut that_genes = that_chromosome.genes().to_vec();
    let mut other_genes = other_chromosome.genes().to_vec();
    crossover.crossover(&mut that_genes, &mut other_genes, rng);

    let that_genotype = that
        .genotype()
        .with_chromosome(index, that_chromosome.with_genes(that_genes));
    let other_genotype = other
        .genotype()
        .with_chromosome(index, other_chromosome.with_genes(other_genes));
    population.set(i, that.with_genotype(that_genotype, generation));
    population.set(j, other.with_genotype(other_genotype, generation));
    2
}

/// Implements `Recombinator` (order 2) and `Alterer` for a type that
/// implements [`Crossover`] for the genes of the chromosome.
macro_rules! crossover_alterer {
    ($crossover:ty) => {
        impl<C, T> $crate::alteration::Recombinator<C, T> for $crossover
        where
            C: $crate::genetics::Chromosome,
            T: $crate::phenotype::Fitness,
            $crossover: $crate::alteration::Crossover<C::Gene>,
        {
            fn probability(&self) -> f64 {
                <$crossover as $crate::alteration::Crossover<C::Gene>>::probability(self)
            }

            fn order(&self) -> usize {
                2
            }

            fn recombine(
                &self,
                population: &mut $crate::population::Population<C, T>,
                individuals: &[usize],
                generation: usize,
                rng: &mut dyn $crate::rng::RandomSource,
            ) -> usize {
                $crate::alteration::crossover::recombine_with(
                    self,
                    population,
                    individuals,
                    generation,
                    rng,
                )
            }
        }

        impl<C, T> $crate::alteration::Alterer<C, T> for $crossover
        where
            C: $crate::genetics::Chromosome,
            T: $crate::phenotype::Fitness,
            $crossover: $crate::alteration::Crossover<C::Gene>,
        {
            fn alter(
                &self,
                population: &mut $crate::population::Population<C, T>,
                generation: usize,
                rng: &mut dyn $crate::rng::RandomSource,
            ) -> usize {
                $crate::alteration::recombination::alter_with(self, population, generation, rng)
            }
        }
    };
}
pub(crate) use crossover_alterer;

/// Swaps the genes between alternating pairs of sorted cut points:
/// `[c0, c1)`, `[c2, c3)`, ... An odd number of cut points swaps the last
/// segment up to the end.
fn swap_segments<G>(that: &mut [G], other: &mut [G], cuts: &[usize]) {
    let length = that.len().min(other.len());
    for pair in cuts.chunks(2) {
        let start = pair[0];
        let end = pair.get(1).copied().unwrap_or(length);
        that[start..end].swap_with_slice(&mut other[start..end]);
    }
}

/// Crossover with `n` random cut points.
///
/// The cut points are distinct and sorted; the gene segments between every
/// second pair of them are swapped. For chromosomes shorter than `n`, every
/// position is a cut point.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct NPointCrossover {
    probability: f64,
    points: usize,
}

impl NPointCrossover {
    /// Creates a new `NPointCrossover`.
    ///
    /// # Arguments
    ///
    /// * `probability` - The crossover probability, in `[0, 1]`.
    /// * `points` - The number of cut points, at least 1.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::InvalidArgument` if one of the parameters is
    /// out of range.
    pub fn new(probability: f64, points: usize) -> Result<Self> {
        if points < 1 {
            return Err(GeneticError::InvalidArgument(
                "Number of crossover points must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            probability: check_probability(probability, "Crossover probability")?,
            points,
        })
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn points(&self) -> usize {
        self.points
    }
}

crossover_alterer!(NPointCrossover);

impl<G: Gene> Crossover<G> for NPointCrossover {
    fn probability(&self) -> f64 {
        self.probability
    }

    fn crossover(&self, that: &mut [G], other: &mut [G], rng: &mut dyn RandomSource) {
        let length = that.len().min(other.len());
        let cuts = subset(rng, length, self.points);
        swap_segments(that, other, &cuts);
    }
}

/// Crossover with a single random cut point; all genes from the cut point
/// to the end are swapped.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SinglePointCrossover {
    probability: f64,
}

impl SinglePointCrossover {
    /// Creates a new `SinglePointCrossover`.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::InvalidArgument` if `probability` is not in `[0, 1]`.
    pub fn new(probability: f64) -> Result<Self> {
        Ok(Self {
            probability: check_probability(probability, "Crossover probability")?,
        })
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl Default for SinglePointCrossover {
    fn default() -> Self {
        Self { probability: 0.05 }
    }
}

crossover_alterer!(SinglePointCrossover);

impl<G: Gene> Crossover<G> for SinglePointCrossover {
    fn probability(&self) -> f64 {
        self.probability
    }

    fn crossover(&self, that: &mut [G], other: &mut [G], rng: &mut dyn RandomSource) {
        let length = that.len().min(other.len());
        if length == 0 {
            return;
        }
        swap_segments(that, other, &[rng.next_int(length)]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alteration::test_support::double_population;
    use crate::alteration::Alterer;
    use crate::genetics::IndexGene;
    use crate::rng::RandomNumberGenerator;

    #[test]
    fn test_swap_segments() {
        let mut a = vec![0, 0, 0, 0, 0, 0];
        let mut b = vec![1, 1, 1, 1, 1, 1];

        swap_segments(&mut a, &mut b, &[1, 3, 4]);
        assert_eq!(a, vec![0, 1, 1, 0, 1, 1]);
        assert_eq!(b, vec![1, 0, 0, 1, 0, 0]);
    }

    #[test]
    fn test_parameter_validation() {
        assert!(NPointCrossover::new(0.5, 0).is_err());
        assert!(NPointCrossover::new(1.5, 2).is_err());
        assert!(SinglePointCrossover::new(-0.5).is_err());
        assert_eq!(NPointCrossover::new(0.5, 3).unwrap().points(), 3);
    }

    #[test]
    fn test_crossover_preserves_genes_per_position() {
        let mut rng = RandomNumberGenerator::from_seed(42);
        let crossover = NPointCrossover::new(1.0, 3).unwrap();
        let that = vec![IndexGene::new(0, 2); 10];
        let other = vec![IndexGene::new(1, 2); 10];

        let mut swapped = 0;
        for _ in 0..50 {
            let (mut a, mut b) = (that.clone(), other.clone());
            crossover.crossover(a.as_mut_slice(), b.as_mut_slice(), &mut rng);
            for k in 0..10 {
                assert_eq!(a[k].index() + b[k].index(), 1);
            }
            swapped += a.iter().filter(|g| g.index() == 1).count();
        }
        assert!(swapped > 0);
    }

    #[test]
    fn test_crossover_alterer_keeps_lengths() {
        let mut rng = RandomNumberGenerator::from_seed(42);
        let mut population = double_population(20, 8, &mut rng);
        let before = population.clone();

        let altered = SinglePointCrossover::new(1.0)
            .unwrap()
            .alter(&mut population, 5, &mut rng);

        assert_eq!(altered, 40);
        assert_eq!(population.len(), 20);
        assert!(population.iter().all(|p| p.genotype().gene_count() == 8));
        assert!(population.iter().all(|p| p.generation() == 5));

        // Crossover only moves alleles around
        let mut alleles_before: Vec<f64> = before
            .iter()
            .flat_map(|p| p.genotype().chromosome(0).values())
            .collect();
        let mut alleles_after: Vec<f64> = population
            .iter()
            .flat_map(|p| p.genotype().chromosome(0).values())
            .collect();
        alleles_before.sort_by(f64::total_cmp);
        alleles_after.sort_by(f64::total_cmp);
        assert_eq!(alleles_before, alleles_after);
    }

    #[test]
    fn test_n_point_crossover_on_short_chromosomes() {
        let mut rng = RandomNumberGenerator::from_seed(1);
        let mut population = double_population(4, 2, &mut rng);

        NPointCrossover::new(1.0, 5)
            .unwrap()
            .alter(&mut population, 2, &mut rng);

        assert!(population.iter().all(|p| p.genotype().gene_count() == 2));
    }
}
