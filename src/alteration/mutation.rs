use crate::alteration::Alterer;
use crate::error::{check_probability, Result};
use crate::genetics::{Chromosome, Gene, Genotype};
use crate::phenotype::Fitness;
use crate::population::Population;
use crate::rng::{subset, RandomSource};

/// Alters exactly `ceil(total * probability)` distinct genes of the
/// population, where `total` counts the genes of all phenotypes.
///
/// Positions are drawn without replacement from the flattened gene space.
/// `mutate` receives the genes of the affected chromosome and the index of
/// the gene to change. Returns the number of altered genes.
fn alter_genes<C, T, F>(
    population: &mut Population<C, T>,
    generation: usize,
    probability: f64,
    rng: &mut dyn RandomSource,
    mut mutate: F,
) -> usize
where
    C: Chromosome,
    T: Fitness,
    F: FnMut(&mut [C::Gene], usize, &mut dyn RandomSource),
{
    let total: usize = population.iter().map(|p| p.genotype().gene_count()).sum();
    let count = ((total as f64) * probability).ceil() as usize;
    let positions = subset(rng, total, count);
    if positions.is_empty() {
        return 0;
    }
    let altered = positions.len();

    let mut positions = positions.into_iter().peekable();
    let mut offset = 0;
    for index in 0..population.len() {
        if positions.peek().is_none() {
            break;
        }
        let phenotype = population[index].clone();
        let end = offset + phenotype.genotype().gene_count();
        if positions.peek().is_some_and(|&position| position < end) {
            let mut chromosomes = phenotype.genotype().chromosomes().to_vec();
            let mut chromosome_offset = offset;
            for chromosome in chromosomes.iter_mut() {
                let chromosome_end = chromosome_offset + chromosome.len();
                let mut genes: Option<Vec<C::Gene>> = None;
                while let Some(&position) = positions.peek() {
                    if position >= chromosome_end {
                        break;
                    }
                    let genes = genes.get_or_insert_with(|| chromosome.genes().to_vec());
                    mutate(genes.as_mut_slice(), position - chromosome_offset, &mut *rng);
                    positions.next();
                }
                if let Some(genes) = genes {
                    *chromosome = chromosome.with_genes(genes);
                }
                chromosome_offset = chromosome_end;
            }
            let genotype = Genotype::from_altered(chromosomes);
            population.set(index, phenotype.with_genotype(genotype, generation));
        }
        offset = end;
    }
    altered
}

/// The classic mutation operator: every selected gene is replaced by a new
/// random instance of its domain.
///
/// The gene space is the whole population. Exactly
/// `ceil(total_genes * probability)` distinct genes are mutated in every
/// call, which makes the mutation rate precise even for small populations.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    probability: f64,
}

impl Mutation {
    /// Creates a new `Mutation`.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::InvalidArgument` if `probability` is not in `[0, 1]`.
    pub fn new(probability: f64) -> Result<Self> {
        Ok(Self {
            probability: check_probability(probability, "Mutation probability")?,
        })
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl Default for Mutation {
    fn default() -> Self {
        Self { probability: 0.01 }
    }
}

impl<C: Chromosome, T: Fitness> Alterer<C, T> for Mutation {
    fn alter(
        &self,
        population: &mut Population<C, T>,
        generation: usize,
        rng: &mut dyn RandomSource,
    ) -> usize {
        alter_genes(
            population,
            generation,
            self.probability,
            rng,
            |genes, index, rng| {
                genes[index] = genes[index].new_instance(rng);
            },
        )
    }
}

/// Swaps every selected gene with a random gene of the same chromosome.
///
/// Gene selection works as for [`Mutation`]. Swapping keeps the multiset
/// of alleles of a chromosome, so permutations stay valid.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SwapMutation {
    probability: f64,
}

impl SwapMutation {
    /// Creates a new `SwapMutation`.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::InvalidArgument` if `probability` is not in `[0, 1]`.
    pub fn new(probability: f64) -> Result<Self> {
        Ok(Self {
            probability: check_probability(probability, "Swap probability")?,
        })
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl<C: Chromosome, T: Fitness> Alterer<C, T> for SwapMutation {
    fn alter(
        &self,
        population: &mut Population<C, T>,
        generation: usize,
        rng: &mut dyn RandomSource,
    ) -> usize {
        alter_genes(
            population,
            generation,
            self.probability,
            rng,
            |genes, index, rng| {
                let other = rng.next_int(genes.len());
                genes.swap(index, other);
            },
        )
    }
}
