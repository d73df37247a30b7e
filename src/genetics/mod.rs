//! # Genes, Chromosomes and Genotypes
//!
//! The engine never looks inside a gene. It only needs the small capability
//! set defined here: create a fresh random instance of the same domain,
//! check validity, and read or rebuild the gene sequence of a chromosome.
//! Alterers work on gene slices and rebuild chromosomes through
//! [`Chromosome::with_genes`], so every representation keeps its own
//! constraints (bounds, permutation uniqueness, ...).
//!
//! Two reference representations are provided: [`DoubleChromosome`] for
//! real-valued problems and [`PermutationChromosome`] for ordering problems.

pub mod double;
pub mod permutation;

use std::fmt::Debug;

use crate::error::{GeneticError, Result};
use crate::rng::RandomSource;

pub use double::{DoubleChromosome, DoubleGene};
pub use permutation::{IndexGene, PermutationChromosome};

/// The smallest unit of a genetic representation.
pub trait Gene: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Creates a new, randomly initialized gene from the same domain.
    fn new_instance(&self, rng: &mut dyn RandomSource) -> Self;

    /// Returns `true` if the gene's allele lies in its domain.
    fn is_valid(&self) -> bool;
}

/// Genes that can be averaged with each other, used by the `MeanAlterer`.
pub trait Mean {
    /// Returns the mean of `self` and `other`.
    fn mean(&self, other: &Self) -> Self;
}

/// An ordered sequence of genes of one kind.
pub trait Chromosome: Clone + Debug + PartialEq + Send + Sync + 'static {
    type Gene: Gene;

    /// The genes of this chromosome.
    fn genes(&self) -> &[Self::Gene];

    /// Creates a chromosome of the same kind carrying `genes`.
    fn with_genes(&self, genes: Vec<Self::Gene>) -> Self;

    /// Creates a randomly initialized chromosome of the same shape.
    fn new_instance(&self, rng: &mut dyn RandomSource) -> Self;

    /// Number of genes.
    fn len(&self) -> usize {
        self.genes().len()
    }

    fn is_empty(&self) -> bool {
        self.genes().is_empty()
    }

    /// Returns `true` if every gene is valid. Representations with
    /// chromosome-level constraints override this.
    fn is_valid(&self) -> bool {
        self.genes().iter().all(Gene::is_valid)
    }
}

/// An ordered, non-empty sequence of chromosomes: the encoded candidate.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "GenotypeData<C>")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Genotype<C: Chromosome> {
    chromosomes: Vec<C>,
}

/// Deserialized form of a [`Genotype`], validated by [`Genotype::new`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct GenotypeData<C> {
    chromosomes: Vec<C>,
}

#[cfg(feature = "serde")]
impl<C: Chromosome> TryFrom<GenotypeData<C>> for Genotype<C> {
    type Error = GeneticError;

    fn try_from(data: GenotypeData<C>) -> Result<Self> {
        Genotype::new(data.chromosomes)
    }
}

impl<C: Chromosome> Genotype<C> {
    /// Creates a genotype from the given chromosomes.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::InvalidArgument` if `chromosomes` is empty.
    pub fn new(chromosomes: Vec<C>) -> Result<Self> {
        if chromosomes.is_empty() {
            return Err(GeneticError::InvalidArgument(
                "Genotype must contain at least one chromosome".to_string(),
            ));
        }
        Ok(Self { chromosomes })
    }

    /// Creates a genotype with a single chromosome.
    pub fn of(chromosome: C) -> Self {
        Self {
            chromosomes: vec![chromosome],
        }
    }

    /// Rebuilds a genotype from the (non-empty) chromosomes of an existing one.
    pub(crate) fn from_altered(chromosomes: Vec<C>) -> Self {
        debug_assert!(!chromosomes.is_empty());
        Self { chromosomes }
    }

    /// Number of chromosomes.
    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    /// Always `false`: every constructor rejects an empty chromosome list.
    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    pub fn chromosome(&self, index: usize) -> &C {
        &self.chromosomes[index]
    }

    pub fn chromosomes(&self) -> &[C] {
        &self.chromosomes
    }

    /// Total number of genes over all chromosomes.
    pub fn gene_count(&self) -> usize {
        self.chromosomes.iter().map(Chromosome::len).sum()
    }

    pub fn is_valid(&self) -> bool {
        self.chromosomes.iter().all(Chromosome::is_valid)
    }

    /// Returns a copy of this genotype with chromosome `index` replaced.
    pub fn with_chromosome(&self, index: usize, chromosome: C) -> Self {
        let mut chromosomes = self.chromosomes.clone();
        chromosomes[index] = chromosome;
        Self { chromosomes }
    }

    /// Creates a random genotype with the same shape as this one.
    pub fn new_instance(&self, rng: &mut dyn RandomSource) -> Self {
        Self {
            chromosomes: self
                .chromosomes
                .iter()
                .map(|chromosome| chromosome.new_instance(rng))
                .collect(),
        }
    }
}

/// Creates new instances of `T`, e.g. random genotypes for filling and
/// repairing a population.
pub trait Factory<T>: Send + Sync {
    fn new_instance(&self, rng: &mut dyn RandomSource) -> T;
}

/// A genotype is the factory of genotypes with its own shape.
impl<C: Chromosome> Factory<Genotype<C>> for Genotype<C> {
    fn new_instance(&self, rng: &mut dyn RandomSource) -> Genotype<C> {
        Genotype::new_instance(self, rng)
    }
}

impl<T, F> Factory<T> for F
where
    F: Fn(&mut dyn RandomSource) -> T + Send + Sync,
{
    fn new_instance(&self, rng: &mut dyn RandomSource) -> T {
        self(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RandomNumberGenerator;

    #[test]
    fn test_empty_genotype_is_rejected() {
        let result = Genotype::<DoubleChromosome>::new(Vec::new());
        assert!(matches!(result, Err(GeneticError::InvalidArgument(_))));
    }

    #[test]
    fn test_genotype_shape() {
        let mut rng = RandomNumberGenerator::from_seed(1);
        let genotype = Genotype::new(vec![
            DoubleChromosome::random(0.0, 1.0, 3, &mut rng).unwrap(),
            DoubleChromosome::random(-5.0, 5.0, 4, &mut rng).unwrap(),
        ])
        .unwrap();

        assert_eq!(genotype.len(), 2);
        assert_eq!(genotype.gene_count(), 7);
        assert!(genotype.is_valid());

        let fresh = genotype.new_instance(&mut rng);
        assert_eq!(fresh.len(), 2);
        assert_eq!(fresh.chromosome(1).len(), 4);
        assert_ne!(fresh, genotype);
    }

    #[test]
    fn test_with_chromosome_replaces_only_one() {
        let mut rng = RandomNumberGenerator::from_seed(2);
        let genotype = Genotype::new(vec![
            DoubleChromosome::random(0.0, 1.0, 2, &mut rng).unwrap(),
            DoubleChromosome::random(0.0, 1.0, 2, &mut rng).unwrap(),
        ])
        .unwrap();

        let replacement = genotype.chromosome(0).new_instance(&mut rng);
        let changed = genotype.with_chromosome(0, replacement.clone());

        assert_eq!(changed.chromosome(0), &replacement);
        assert_eq!(changed.chromosome(1), genotype.chromosome(1));
    }

    #[test]
    fn test_closure_factory() {
        let factory = |rng: &mut dyn RandomSource| {
            Genotype::of(DoubleChromosome::random(0.0, 1.0, 1, rng).unwrap())
        };
        let mut rng = RandomNumberGenerator::from_seed(3);

        let genotype = Factory::new_instance(&factory, &mut rng);
        assert_eq!(genotype.gene_count(), 1);
    }
}
