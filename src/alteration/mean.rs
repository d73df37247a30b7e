use crate::alteration::recombination::alter_with;
use crate::alteration::{Alterer, Recombinator};
use crate::error::{check_probability, Result};
use crate::genetics::{Chromosome, Mean};
use crate::phenotype::Fitness;
use crate::population::Population;
use crate::rng::RandomSource;

/// Replaces the genes of one chromosome of the anchor phenotype with the
/// mean of its genes and the partner's genes.
///
/// Only the anchor is altered; the partner stays unchanged. Works for every
/// chromosome whose genes implement [`Mean`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MeanAlterer {
    probability: f64,
}

impl MeanAlterer {
    /// Creates a new `MeanAlterer`.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::InvalidArgument` if `probability` is not in `[0, 1]`.
    pub fn new(probability: f64) -> Result<Self> {
        Ok(Self {
            probability: check_probability(probability, "Mean alterer probability")?,
        })
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl<C, T> Recombinator<C, T> for MeanAlterer
where
    C: Chromosome,
    C::Gene: Mean,
    T: Fitness,
{
    fn probability(&self) -> f64 {
        self.probability
    }

    fn order(&self) -> usize {
        2
    }

    fn recombine(
        &self,
        population: &mut Population<C, T>,
        individuals: &[usize],
        generation: usize,
        rng: &mut dyn RandomSource,
    ) -> usize {
        let that = population[individuals[0]].clone();
        let other = population[individuals[1]].clone();

        let chromosomes = that.genotype().len().min(other.genotype().len());
        let index = rng.next_int(chromosomes);
        let chromosome = that.genotype().chromosome(index);
        let partner = other.genotype().chromosome(index);
        if chromosome.len() != partner.len() {
            return 0;
        }

        let mut genes = chromosome.genes().to_vec();
        for (gene, other_gene) in genes.iter_mut().zip(partner.genes()) {
            *gene = gene.mean(other_gene);
        }

        let genotype = that
            .genotype()
            .with_chromosome(index, chromosome.with_genes(genes));
        population.set(individuals[0], that.with_genotype(genotype, generation));
        1
    }
}

impl<C, T> Alterer<C, T> for MeanAlterer
where
    C: Chromosome,
    C::Gene: Mean,
    T: Fitness,
{
    fn alter(
        &self,
        population: &mut Population<C, T>,
        generation: usize,
        rng: &mut dyn RandomSource,
    ) -> usize {
        alter_with(self, population, generation, rng)
    }
}
