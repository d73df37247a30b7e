pub mod alteration;
pub mod concurrency;
pub mod error;
pub mod evolution;
pub mod genetics;
pub mod optimize;
pub mod phenotype;
pub mod population;
pub mod rng;
pub mod selection;
pub mod statistics;

// Re-export commonly used types for convenience
pub use error::{GeneticError, OptionExt, Result};
pub use evolution::{EvolutionOptions, GeneticAlgorithm, GeneticAlgorithmBuilder};
pub use genetics::{Chromosome, Gene, Genotype};
pub use optimize::Optimize;
pub use phenotype::Phenotype;
pub use population::Population;
pub use statistics::Statistics;
