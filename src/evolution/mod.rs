pub mod algorithm;
pub mod builder;
pub mod options;

pub use algorithm::{AlgorithmGuard, GeneticAlgorithm};
pub use builder::GeneticAlgorithmBuilder;
pub use options::{EvolutionOptions, EvolutionOptionsBuilder};
