//! # Population
//!
//! An ordered, index-addressable collection of phenotypes. Selectors
//! produce new populations, alterers modify them in place and the driver
//! owns exactly one of them between generations.

use std::ops::Index;

use crate::genetics::{Chromosome, Genotype};
use crate::optimize::Optimize;
use crate::phenotype::{Fitness, Phenotype};

/// A sequence of phenotypes.
#[derive(Debug, Clone, PartialEq)]
pub struct Population<C: Chromosome, T: Fitness> {
    phenotypes: Vec<Phenotype<C, T>>,
}

impl<C: Chromosome, T: Fitness> Population<C, T> {
    pub fn new() -> Self {
        Self {
            phenotypes: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            phenotypes: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.phenotypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phenotypes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Phenotype<C, T>> {
        self.phenotypes.get(index)
    }

    /// Replaces the phenotype at `index` and returns the previous one.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn set(&mut self, index: usize, phenotype: Phenotype<C, T>) -> Phenotype<C, T> {
        std::mem::replace(&mut self.phenotypes[index], phenotype)
    }

    pub fn push(&mut self, phenotype: Phenotype<C, T>) {
        self.phenotypes.push(phenotype);
    }

    /// Moves all phenotypes of `other` to the end of this population.
    pub fn append(&mut self, other: &mut Population<C, T>) {
        self.phenotypes.append(&mut other.phenotypes);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Phenotype<C, T>> {
        self.phenotypes.iter()
    }

    pub fn as_slice(&self) -> &[Phenotype<C, T>] {
        &self.phenotypes
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Phenotype<C, T>] {
        &mut self.phenotypes
    }

    pub fn into_vec(self) -> Vec<Phenotype<C, T>> {
        self.phenotypes
    }

    /// Sorts the phenotypes best first. The sort is stable.
    pub fn sort_by_fitness(&mut self, optimize: Optimize) {
        self.phenotypes
            .sort_by(|a, b| optimize.descending(a.fitness_ref(), b.fitness_ref()));
    }

    /// The best phenotype; the first one wins ties.
    pub fn best(&self, optimize: Optimize) -> Option<&Phenotype<C, T>> {
        self.phenotypes.iter().reduce(|best, current| {
            if optimize.compare(current.fitness_ref(), best.fitness_ref()).is_gt() {
                current
            } else {
                best
            }
        })
    }

    /// The worst phenotype; the first one wins ties.
    pub fn worst(&self, optimize: Optimize) -> Option<&Phenotype<C, T>> {
        self.phenotypes.iter().reduce(|worst, current| {
            if optimize.compare(current.fitness_ref(), worst.fitness_ref()).is_lt() {
                current
            } else {
                worst
            }
        })
    }

    /// The genotypes of all phenotypes, in order.
    pub fn genotypes(&self) -> Vec<Genotype<C>> {
        self.phenotypes
            .iter()
            .map(|phenotype| phenotype.genotype().clone())
            .collect()
    }

    /// Evaluates every phenotype on the calling thread.
    pub fn evaluate(&self) {
        for phenotype in &self.phenotypes {
            phenotype.evaluate();
        }
    }
}

impl<C: Chromosome, T: Fitness> Default for Population<C, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Chromosome, T: Fitness> From<Vec<Phenotype<C, T>>> for Population<C, T> {
    fn from(phenotypes: Vec<Phenotype<C, T>>) -> Self {
        Self { phenotypes }
    }
}

impl<C: Chromosome, T: Fitness> FromIterator<Phenotype<C, T>> for Population<C, T> {
    fn from_iter<I: IntoIterator<Item = Phenotype<C, T>>>(iter: I) -> Self {
        Self {
            phenotypes: iter.into_iter().collect(),
        }
    }
}

impl<C: Chromosome, T: Fitness> Extend<Phenotype<C, T>> for Population<C, T> {
    fn extend<I: IntoIterator<Item = Phenotype<C, T>>>(&mut self, iter: I) {
        self.phenotypes.extend(iter);
    }
}

impl<C: Chromosome, T: Fitness> IntoIterator for Population<C, T> {
    type Item = Phenotype<C, T>;
    type IntoIter = std::vec::IntoIter<Phenotype<C, T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.phenotypes.into_iter()
    }
}

impl<'a, C: Chromosome, T: Fitness> IntoIterator for &'a Population<C, T> {
    type Item = &'a Phenotype<C, T>;
    type IntoIter = std::slice::Iter<'a, Phenotype<C, T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.phenotypes.iter()
    }
}

impl<C: Chromosome, T: Fitness> Index<usize> for Population<C, T> {
    type Output = Phenotype<C, T>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.phenotypes[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::{DoubleChromosome, DoubleGene};
    use crate::phenotype::identity_scaler;
    use std::sync::Arc;

    fn population(values: &[f64]) -> Population<DoubleChromosome, f64> {
        values
            .iter()
            .map(|&v| {
                let chromosome =
                    DoubleChromosome::new(vec![DoubleGene::new(v, -100.0, 100.0).unwrap()])
                        .unwrap();
                Phenotype::new(
                    Genotype::of(chromosome),
                    Arc::new(|g: &Genotype<DoubleChromosome>| g.chromosome(0).value()),
                    identity_scaler(),
                    1,
                )
            })
            .collect()
    }

    #[test]
    fn test_sort_by_fitness() {
        let mut pop = population(&[3.0, 1.0, 2.0]);

        pop.sort_by_fitness(Optimize::Maximum);
        assert_eq!(pop[0].fitness(), 3.0);
        assert_eq!(pop[2].fitness(), 1.0);

        pop.sort_by_fitness(Optimize::Minimum);
        assert_eq!(pop[0].fitness(), 1.0);
        assert_eq!(pop[2].fitness(), 3.0);
    }

    #[test]
    fn test_best_and_worst() {
        let pop = population(&[0.5, 4.0, -2.0, 4.0]);

        assert_eq!(pop.best(Optimize::Maximum).unwrap().fitness(), 4.0);
        assert_eq!(pop.worst(Optimize::Maximum).unwrap().fitness(), -2.0);
        assert_eq!(pop.best(Optimize::Minimum).unwrap().fitness(), -2.0);
        assert!(population(&[]).best(Optimize::Maximum).is_none());
    }

    #[test]
    fn test_set_returns_previous() {
        let mut pop = population(&[1.0, 2.0]);
        let replacement = population(&[7.0]).into_vec().remove(0);

        let previous = pop.set(1, replacement);
        assert_eq!(previous.fitness(), 2.0);
        assert_eq!(pop[1].fitness(), 7.0);
        assert_eq!(pop.len(), 2);
    }

    #[test]
    fn test_append() {
        let mut a = population(&[1.0]);
        let mut b = population(&[2.0, 3.0]);

        a.append(&mut b);
        assert_eq!(a.len(), 3);
        assert!(b.is_empty());
        assert_eq!(a.genotypes().len(), 3);
    }
}
