//! # Phenotype
//!
//! A [`Phenotype`] is a genotype together with the functions that judge it:
//! the fitness function and the fitness scaler. It also remembers the
//! generation it was created in, which determines its age.
//!
//! Fitness is evaluated lazily and at most once. Phenotypes are cheap to
//! clone; clones share the memoized fitness, so evaluating one of them
//! evaluates all of them.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use generational_ga::genetics::{DoubleChromosome, Genotype};
//! use generational_ga::phenotype::{identity_scaler, Phenotype};
//! use generational_ga::rng::RandomNumberGenerator;
//!
//! let mut rng = RandomNumberGenerator::from_seed(42);
//! let genotype = Genotype::of(DoubleChromosome::random(0.0, 1.0, 1, &mut rng).unwrap());
//!
//! let phenotype = Phenotype::new(
//!     genotype,
//!     Arc::new(|g: &Genotype<DoubleChromosome>| g.chromosome(0).value()),
//!     identity_scaler(),
//!     1,
//! );
//!
//! assert!(!phenotype.is_evaluated());
//! assert!((0.0..1.0).contains(&phenotype.fitness()));
//! assert_eq!(phenotype.age(5), 4);
//! ```

use std::fmt::{self, Debug, Display};
use std::sync::{Arc, OnceLock};

use crate::genetics::{Chromosome, Genotype};

/// A value that can rank phenotypes.
///
/// Any partially ordered value qualifies. Values that don't compare with
/// themselves (NaN) are treated as the worst possible fitness.
pub trait Fitness: PartialOrd + Clone + Debug + Send + Sync + 'static {}

impl<T> Fitness for T where T: PartialOrd + Clone + Debug + Send + Sync + 'static {}

/// A fitness value with a numeric interpretation, needed by selectors that
/// compute probabilities directly from fitness values.
pub trait NumericFitness: Fitness {
    fn as_f64(&self) -> f64;
}

macro_rules! impl_numeric_fitness {
    ($($t:ty),*) => {
        $(
            impl NumericFitness for $t {
                fn as_f64(&self) -> f64 {
                    *self as f64
                }
            }
        )*
    };
}

impl_numeric_fitness!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

/// Maps a genotype to its raw fitness.
pub type FitnessFunction<C, T> = Arc<dyn Fn(&Genotype<C>) -> T + Send + Sync>;

/// Maps a raw fitness to the fitness used for selection.
pub type FitnessScaler<T> = Arc<dyn Fn(T) -> T + Send + Sync>;

/// The scaler that leaves the raw fitness unchanged.
pub fn identity_scaler<T: 'static>() -> FitnessScaler<T> {
    Arc::new(|fitness| fitness)
}

struct Inner<C: Chromosome, T> {
    genotype: Genotype<C>,
    function: FitnessFunction<C, T>,
    scaler: FitnessScaler<T>,
    generation: usize,
    raw_fitness: OnceLock<T>,
    fitness: OnceLock<T>,
}

/// A genotype bound to its fitness function, scaler and birth generation.
pub struct Phenotype<C: Chromosome, T: Fitness> {
    inner: Arc<Inner<C, T>>,
}

impl<C: Chromosome, T: Fitness> Phenotype<C, T> {
    /// Creates a new, not yet evaluated phenotype.
    ///
    /// # Arguments
    ///
    /// * `genotype` - The encoded candidate.
    /// * `function` - Computes the raw fitness of the genotype.
    /// * `scaler` - Transforms the raw fitness into the fitness used for ranking.
    /// * `generation` - The generation this phenotype is created in.
    pub fn new(
        genotype: Genotype<C>,
        function: FitnessFunction<C, T>,
        scaler: FitnessScaler<T>,
        generation: usize,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                genotype,
                function,
                scaler,
                generation,
                raw_fitness: OnceLock::new(),
                fitness: OnceLock::new(),
            }),
        }
    }

    /// Creates a new phenotype with the same functions but a different
    /// genotype. Used by alterers to build offspring.
    pub fn with_genotype(&self, genotype: Genotype<C>, generation: usize) -> Self {
        Self::new(
            genotype,
            Arc::clone(&self.inner.function),
            Arc::clone(&self.inner.scaler),
            generation,
        )
    }

    /// Creates a new phenotype with the same genotype bound to other functions.
    pub fn with_functions(
        &self,
        function: FitnessFunction<C, T>,
        scaler: FitnessScaler<T>,
        generation: usize,
    ) -> Self {
        Self::new(self.inner.genotype.clone(), function, scaler, generation)
    }

    pub fn genotype(&self) -> &Genotype<C> {
        &self.inner.genotype
    }

    /// The generation this phenotype was created in.
    pub fn generation(&self) -> usize {
        self.inner.generation
    }

    /// Returns the age of this phenotype relative to `current_generation`.
    pub fn age(&self, current_generation: usize) -> usize {
        current_generation.saturating_sub(self.inner.generation)
    }

    /// The fitness function's result, computed on first access.
    pub fn raw_fitness(&self) -> T {
        self.raw_fitness_ref().clone()
    }

    /// The scaled fitness, computed on first access.
    pub fn fitness(&self) -> T {
        self.fitness_ref().clone()
    }

    /// Forces the evaluation of the fitness.
    pub fn evaluate(&self) -> &Self {
        self.fitness_ref();
        self
    }

    pub fn is_evaluated(&self) -> bool {
        self.inner.fitness.get().is_some()
    }

    /// A phenotype is valid iff its genotype is valid.
    pub fn is_valid(&self) -> bool {
        self.inner.genotype.is_valid()
    }

    pub(crate) fn fitness_ref(&self) -> &T {
        self.inner
            .fitness
            .get_or_init(|| (self.inner.scaler)(self.raw_fitness_ref().clone()))
    }

    fn raw_fitness_ref(&self) -> &T {
        self.inner
            .raw_fitness
            .get_or_init(|| (self.inner.function)(&self.inner.genotype))
    }
}

impl<C: Chromosome, T: Fitness> Clone for Phenotype<C, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Chromosome, T: Fitness> PartialEq for Phenotype<C, T> {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return true;
        }
        self.generation() == other.generation()
            && self.genotype() == other.genotype()
            && self.fitness_ref() == other.fitness_ref()
    }
}

impl<C: Chromosome, T: Fitness> Debug for Phenotype<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Phenotype")
            .field("genotype", &self.inner.genotype)
            .field("generation", &self.inner.generation)
            .field("fitness", &self.inner.fitness.get())
            .finish()
    }
}

impl<C: Chromosome, T: Fitness> Display for Phenotype<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} --> {:?}",
            self.inner.genotype.chromosomes(),
            self.fitness_ref()
        )
    }
}
