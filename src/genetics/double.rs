//! # Real-valued Genes
//!
//! [`DoubleGene`] holds a floating point allele within the half-open range
//! `[min, max)`. [`DoubleChromosome`] is a sequence of such genes, typically
//! all sharing the same bounds.
//!
//! ## Example
//!
//! ```rust
//! use generational_ga::genetics::{Chromosome, DoubleChromosome};
//! use generational_ga::rng::RandomNumberGenerator;
//!
//! let mut rng = RandomNumberGenerator::from_seed(42);
//! let chromosome = DoubleChromosome::random(-1.0, 1.0, 5, &mut rng).unwrap();
//!
//! assert_eq!(chromosome.len(), 5);
//! assert!(chromosome.values().iter().all(|v| (-1.0..1.0).contains(v)));
//! ```

use rand::Rng;

use crate::error::{GeneticError, Result};
use crate::genetics::{Chromosome, Gene, Mean};
use crate::rng::RandomSource;

fn check_bounds(min: f64, max: f64) -> Result<()> {
    if !min.is_finite() || !max.is_finite() || min >= max {
        return Err(GeneticError::InvalidArgument(format!(
            "Gene bounds must be finite with min < max, but were [{}, {})",
            min, max
        )));
    }
    Ok(())
}

/// A floating point gene with the domain `[min, max)`.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "DoubleGeneData")
)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoubleGene {
    value: f64,
    min: f64,
    max: f64,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct DoubleGeneData {
    value: f64,
    min: f64,
    max: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<DoubleGeneData> for DoubleGene {
    type Error = GeneticError;

    fn try_from(data: DoubleGeneData) -> Result<Self> {
        DoubleGene::new(data.value, data.min, data.max)
    }
}

impl DoubleGene {
    /// Creates a gene with the given allele and domain.
    ///
    /// The allele itself isn't checked; a value outside of `[min, max)`
    /// produces an invalid gene.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::InvalidArgument` if the bounds are not finite
    /// or `min >= max`.
    pub fn new(value: f64, min: f64, max: f64) -> Result<Self> {
        check_bounds(min, max)?;
        Ok(Self { value, min, max })
    }

    /// Creates a gene with a uniformly distributed allele in `[min, max)`.
    pub fn random(min: f64, max: f64, rng: &mut dyn RandomSource) -> Result<Self> {
        check_bounds(min, max)?;
        Ok(Self {
            value: rng.gen_range(min..max),
            min,
            max,
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

impl Gene for DoubleGene {
    fn new_instance(&self, rng: &mut dyn RandomSource) -> Self {
        Self {
            value: rng.gen_range(self.min..self.max),
            min: self.min,
            max: self.max,
        }
    }

    fn is_valid(&self) -> bool {
        self.value.is_finite() && self.value >= self.min && self.value < self.max
    }
}

impl Mean for DoubleGene {
    fn mean(&self, other: &Self) -> Self {
        Self {
            value: self.value + (other.value - self.value) / 2.0,
            min: self.min,
            max: self.max,
        }
    }
}

/// A chromosome of [`DoubleGene`]s.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "DoubleChromosomeData")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct DoubleChromosome {
    genes: Vec<DoubleGene>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct DoubleChromosomeData {
    genes: Vec<DoubleGene>,
}

#[cfg(feature = "serde")]
impl TryFrom<DoubleChromosomeData> for DoubleChromosome {
    type Error = GeneticError;

    fn try_from(data: DoubleChromosomeData) -> Result<Self> {
        DoubleChromosome::new(data.genes)
    }
}

impl DoubleChromosome {
    /// Creates a chromosome from the given genes.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::InvalidArgument` if `genes` is empty.
    pub fn new(genes: Vec<DoubleGene>) -> Result<Self> {
        if genes.is_empty() {
            return Err(GeneticError::InvalidArgument(
                "Chromosome must contain at least one gene".to_string(),
            ));
        }
        Ok(Self { genes })
    }

    /// Creates a chromosome of `length` random genes, all in `[min, max)`.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::InvalidArgument` if `length` is zero or the
    /// bounds are invalid.
    pub fn random(min: f64, max: f64, length: usize, rng: &mut dyn RandomSource) -> Result<Self> {
        if length == 0 {
            return Err(GeneticError::InvalidArgument(
                "Chromosome length must be at least 1".to_string(),
            ));
        }
        let genes = (0..length)
            .map(|_| DoubleGene::random(min, max, rng))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { genes })
    }

    /// The alleles of all genes.
    pub fn values(&self) -> Vec<f64> {
        self.genes.iter().map(DoubleGene::value).collect()
    }

    /// The allele of the first gene, handy for one-dimensional problems.
    pub fn value(&self) -> f64 {
        self.genes[0].value
    }
}

impl Chromosome for DoubleChromosome {
    type Gene = DoubleGene;

    fn genes(&self) -> &[DoubleGene] {
        &self.genes
    }

    fn with_genes(&self, genes: Vec<DoubleGene>) -> Self {
        Self { genes }
    }

    fn new_instance(&self, rng: &mut dyn RandomSource) -> Self {
        Self {
            genes: self.genes.iter().map(|gene| gene.new_instance(rng)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RandomNumberGenerator;

    #[test]
    fn test_invalid_bounds_are_rejected() {
        assert!(DoubleGene::new(0.5, 1.0, 0.0).is_err());
        assert!(DoubleGene::new(0.5, 0.0, f64::INFINITY).is_err());
        assert!(DoubleGene::new(0.5, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_gene_validity() {
        assert!(DoubleGene::new(0.0, 0.0, 1.0).unwrap().is_valid());
        // The upper bound is exclusive
        assert!(!DoubleGene::new(1.0, 0.0, 1.0).unwrap().is_valid());
        assert!(!DoubleGene::new(-0.1, 0.0, 1.0).unwrap().is_valid());
        assert!(!DoubleGene::new(f64::NAN, 0.0, 1.0).unwrap().is_valid());
    }

    #[test]
    fn test_new_instance_keeps_bounds() {
        let mut rng = RandomNumberGenerator::from_seed(11);
        let gene = DoubleGene::new(2.5, 2.0, 3.0).unwrap();

        for _ in 0..100 {
            let fresh = gene.new_instance(&mut rng);
            assert_eq!(fresh.min(), 2.0);
            assert_eq!(fresh.max(), 3.0);
            assert!(fresh.is_valid());
        }
    }

    #[test]
    fn test_mean() {
        let a = DoubleGene::new(0.2, 0.0, 1.0).unwrap();
        let b = DoubleGene::new(0.6, 0.0, 1.0).unwrap();

        assert!((a.mean(&b).value() - 0.4).abs() < 1e-12);
        assert!(a.mean(&b).is_valid());
    }

    #[test]
    fn test_random_chromosome() {
        let mut rng = RandomNumberGenerator::from_seed(5);
        let chromosome = DoubleChromosome::random(0.0, 10.0, 8, &mut rng).unwrap();

        assert_eq!(chromosome.len(), 8);
        assert!(chromosome.is_valid());
        assert!(DoubleChromosome::random(0.0, 10.0, 0, &mut rng).is_err());
        assert!(DoubleChromosome::new(Vec::new()).is_err());
    }
}
