use crate::alteration::crossover::crossover_alterer;
use crate::alteration::Crossover;
use crate::error::{check_probability, Result};
use crate::genetics::Gene;
use crate::rng::{subset, RandomSource};

/// Partially matched crossover (PMX) for permutation encodings.
///
/// Two cut points delimit a segment which is swapped between both parents.
/// Alleles outside the segment that now occur twice are replaced through
/// the value correspondence defined by the swapped segment, so both
/// offspring remain valid permutations.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PartiallyMatchedCrossover {
    probability: f64,
}

impl PartiallyMatchedCrossover {
    /// Creates a new `PartiallyMatchedCrossover`.
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

fn position<G: PartialEq>(genes: &[G], begin: usize, end: usize, gene: &G) -> Option<usize> {
    genes[begin..end]
        .iter()
        .position(|g| g == gene)
        .map(|offset| begin + offset)
}

/// Replaces `genes[index]` until it no longer occurs within `[begin, end)`.
fn repair<G: Clone + PartialEq>(genes: &mut [G], mapping: &[G], begin: usize, end: usize, index: usize) {
    while let Some(found) = position(genes, begin, end, &genes[index]) {
        genes[index] = mapping[found].clone();
    }
}

crossover_alterer!(PartiallyMatchedCrossover);

impl<G: Gene> Crossover<G> for PartiallyMatchedCrossover {
    fn probability(&self) -> f64 {
        self.probability
    }

    fn crossover(&self, that: &mut [G], other: &mut [G], rng: &mut dyn RandomSource) {
        let length = that.len().min(other.len());
        if length < 2 {
            return;
        }
        let cuts = subset(rng, length, 2);
        let (begin, end) = (cuts[0], cuts[1]);

        that[begin..end].swap_with_slice(&mut other[begin..end]);

        for index in (0..begin).chain(end..length) {
            repair(that, other, begin, end, index);
            repair(other, that, begin, end, index);
        }
    }
}
