use std::sync::Arc;

use crate::alteration::Alterer;
use crate::genetics::Chromosome;
use crate::phenotype::Fitness;
use crate::population::Population;
use crate::rng::RandomSource;

/// An ordered chain of alterers, applied one after the other.
///
/// The result of `alter` is the sum of the results of all parts.
#[derive(Debug, Clone)]
pub struct CompositeAlterer<C: Chromosome, T: Fitness> {
    alterers: Vec<Arc<dyn Alterer<C, T>>>,
}

impl<C: Chromosome, T: Fitness> CompositeAlterer<C, T> {
    /// Creates a composite from the given alterers. Nested composites are
    /// flattened.
    pub fn new(alterers: Vec<Arc<dyn Alterer<C, T>>>) -> Self {
        let mut flat = Vec::with_capacity(alterers.len());
        for alterer in alterers {
            Self::flatten_into(alterer, &mut flat);
        }
        Self { alterers: flat }
    }

    /// Joins two alterers into one composite that applies `first`, then
    /// `second`. If either of them is itself a composite, its parts are
    /// inserted instead.
    pub fn join(first: Arc<dyn Alterer<C, T>>, second: Arc<dyn Alterer<C, T>>) -> Self {
        Self::new(vec![first, second])
    }

    pub fn alterers(&self) -> &[Arc<dyn Alterer<C, T>>] {
        &self.alterers
    }

    fn flatten_into(alterer: Arc<dyn Alterer<C, T>>, flat: &mut Vec<Arc<dyn Alterer<C, T>>>) {
        match alterer.components() {
            Some(components) => {
                for component in components {
                    Self::flatten_into(Arc::clone(component), flat);
                }
            }
            None => flat.push(alterer),
        }
    }
}

impl<C: Chromosome, T: Fitness> Alterer<C, T> for CompositeAlterer<C, T> {
    fn alter(
        &self,
        population: &mut Population<C, T>,
        generation: usize,
        rng: &mut dyn RandomSource,
    ) -> usize {
        self.alterers
            .iter()
            .map(|alterer| alterer.alter(population, generation, rng))
            .sum()
    }

    fn components(&self) -> Option<&[Arc<dyn Alterer<C, T>>]> {
        Some(&self.alterers)
    }
}
