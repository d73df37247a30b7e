//! # Permutations
//!
//! [`PermutationChromosome`] encodes an ordering of the indices `0..n`, e.g.
//! a tour for a travelling salesman problem. Each [`IndexGene`] on its own
//! only knows its bound; uniqueness is a chromosome-level constraint, so
//! resampling a single gene may produce an invalid chromosome while swapping
//! genes or partially matched crossover keep it valid.

use rand::seq::SliceRandom;

use crate::error::{GeneticError, Result};
use crate::genetics::{Chromosome, Gene};
use crate::rng::RandomSource;

/// An index in `[0, bound)`.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "IndexGeneData")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexGene {
    index: usize,
    bound: usize,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct IndexGeneData {
    index: usize,
    bound: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<IndexGeneData> for IndexGene {
    type Error = GeneticError;

    fn try_from(data: IndexGeneData) -> Result<Self> {
        if data.bound == 0 {
            return Err(GeneticError::InvalidArgument(
                "Index gene bound must be at least 1".to_string(),
            ));
        }
        Ok(IndexGene::new(data.index, data.bound))
    }
}

impl IndexGene {
    pub fn new(index: usize, bound: usize) -> Self {
        Self { index, bound }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn bound(&self) -> usize {
        self.bound
    }
}

impl Gene for IndexGene {
    fn new_instance(&self, rng: &mut dyn RandomSource) -> Self {
        Self {
            index: rng.next_int(self.bound),
            bound: self.bound,
        }
    }

    fn is_valid(&self) -> bool {
        self.index < self.bound
    }
}

/// A permutation of `0..len`.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "PermutationChromosomeData")
)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationChromosome {
    genes: Vec<IndexGene>,
}

/// Deserialized form of a [`PermutationChromosome`]. Duplicate indices are
/// accepted, as they are for altered chromosomes, but the shape must match.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct PermutationChromosomeData {
    genes: Vec<IndexGene>,
}

#[cfg(feature = "serde")]
impl TryFrom<PermutationChromosomeData> for PermutationChromosome {
    type Error = GeneticError;

    fn try_from(data: PermutationChromosomeData) -> Result<Self> {
        let length = data.genes.len();
        if length == 0 || data.genes.iter().any(|gene| gene.bound != length) {
            return Err(GeneticError::InvalidArgument(format!(
                "Permutation genes must all have the bound {} and there must be at least one",
                length
            )));
        }
        Ok(Self { genes: data.genes })
    }
}

impl PermutationChromosome {
    /// Creates a random permutation of `0..length`.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::InvalidArgument` if `length` is zero.
    pub fn random(length: usize, rng: &mut dyn RandomSource) -> Result<Self> {
        if length == 0 {
            return Err(GeneticError::InvalidArgument(
                "Permutation length must be at least 1".to_string(),
            ));
        }
        let mut indices: Vec<usize> = (0..length).collect();
        indices.shuffle(rng);
        Ok(Self::from_unchecked(indices))
    }

    /// Creates a chromosome from explicit indices.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::InvalidArgument` if `indices` is not a
    /// permutation of `0..indices.len()`.
    pub fn from_indices(indices: Vec<usize>) -> Result<Self> {
        let chromosome = Self::from_unchecked(indices);
        if chromosome.is_empty() || !chromosome.is_valid() {
            return Err(GeneticError::InvalidArgument(format!(
                "Not a permutation: {:?}",
                chromosome.indices()
            )));
        }
        Ok(chromosome)
    }

    fn from_unchecked(indices: Vec<usize>) -> Self {
        let bound = indices.len();
        Self {
            genes: indices
                .into_iter()
                .map(|index| IndexGene::new(index, bound))
                .collect(),
        }
    }

    pub fn indices(&self) -> Vec<usize> {
        self.genes.iter().map(IndexGene::index).collect()
    }
}

impl Chromosome for PermutationChromosome {
    type Gene = IndexGene;

    fn genes(&self) -> &[IndexGene] {
        &self.genes
    }

    fn with_genes(&self, genes: Vec<IndexGene>) -> Self {
        Self { genes }
    }

    fn new_instance(&self, rng: &mut dyn RandomSource) -> Self {
        let mut genes = self.genes.clone();
        genes.shuffle(rng);
        Self { genes }
    }

    fn is_valid(&self) -> bool {
        let n = self.genes.len();
        let mut seen = vec![false; n];
        for gene in &self.genes {
            if gene.bound != n || !gene.is_valid() || seen[gene.index] {
                return false;
            }
            seen[gene.index] = true;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RandomNumberGenerator;

    #[test]
    fn test_random_permutation_is_valid() {
        let mut rng = RandomNumberGenerator::from_seed(9);
        let chromosome = PermutationChromosome::random(10, &mut rng).unwrap();

        let mut indices = chromosome.indices();
        indices.sort_unstable();
        assert_eq!(indices, (0..10).collect::<Vec<_>>());
        assert!(chromosome.is_valid());
    }

    #[test]
    fn test_duplicates_are_invalid() {
        assert!(PermutationChromosome::from_indices(vec![0, 1, 1]).is_err());
        assert!(PermutationChromosome::from_indices(vec![0, 3, 1]).is_err());
        assert!(PermutationChromosome::from_indices(Vec::new()).is_err());

        let valid = PermutationChromosome::from_indices(vec![2, 0, 1]).unwrap();
        let broken = valid.with_genes(vec![
            IndexGene::new(2, 3),
            IndexGene::new(2, 3),
            IndexGene::new(1, 3),
        ]);
        assert!(!broken.is_valid());
    }

    #[test]
    fn test_new_instance_is_a_permutation() {
        let mut rng = RandomNumberGenerator::from_seed(4);
        let chromosome = PermutationChromosome::from_indices(vec![0, 1, 2, 3, 4]).unwrap();

        for _ in 0..20 {
            assert!(chromosome.new_instance(&mut rng).is_valid());
        }
    }
}
