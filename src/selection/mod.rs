pub mod boltzmann;
pub mod monte_carlo;
pub mod probability;
pub mod rank;
pub mod roulette;
pub mod selector;
pub mod tournament;
pub mod truncation;

pub use boltzmann::BoltzmannSelector;
pub use monte_carlo::MonteCarloSelector;
pub use probability::{next_index, select_with, ProbabilitySelector};
pub use rank::{ExponentialRankSelector, LinearRankSelector};
pub use roulette::RouletteWheelSelector;
pub use selector::Selector;
pub use tournament::TournamentSelector;
pub use truncation::TruncationSelector;
