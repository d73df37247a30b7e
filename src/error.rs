//! # Error Types
//!
//! This module defines the error type shared by every part of the engine.
//! Configuration mistakes, lifecycle misuse, failures of concurrently
//! executed tasks and broken internal invariants each get their own variant,
//! so callers can react to them separately.
//!
//! ## Examples
//!
//! Using the `Result` type:
//!
//! ```rust
//! use generational_ga::error::{GeneticError, Result};
//!
//! fn check_fraction(fraction: f64) -> Result<f64> {
//!     if !(0.0..=1.0).contains(&fraction) {
//!         return Err(GeneticError::InvalidArgument(format!(
//!             "Fraction must be in [0, 1], but was {}",
//!             fraction
//!         )));
//!     }
//!     Ok(fraction)
//! }
//!
//! assert!(check_fraction(0.5).is_ok());
//! assert!(check_fraction(1.5).is_err());
//! ```
//!
//! Using the `OptionExt` trait to convert `Option` to `Result`:
//!
//! ```rust
//! use generational_ga::error::{GeneticError, OptionExt};
//!
//! fn find_best_candidate(candidates: &[i32]) -> generational_ga::error::Result<i32> {
//!     candidates.iter().max().cloned().ok_or_else_genetic(||
//!         GeneticError::EmptyPopulation
//!     )
//! }
//!
//! assert_eq!(find_best_candidate(&[1, 3, 2]).unwrap(), 3);
//! assert!(find_best_candidate(&[]).is_err());
//! ```

use thiserror::Error;

/// Represents errors that can occur in the genetic algorithm engine.
#[derive(Error, Debug)]
pub enum GeneticError {
    /// A parameter value is outside of its legal range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation was called in a lifecycle state that doesn't allow it,
    /// e.g. `evolve()` before `setup()`.
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// Error that occurs when an empty population is encountered.
    #[error("Empty population error: Cannot operate on an empty population")]
    EmptyPopulation,

    /// A task submitted to a concurrency scope failed or panicked.
    #[error("Task failed: {0}")]
    TaskFailed(String),

    /// The running operation was interrupted by the caller.
    #[error("Operation cancelled by interrupt")]
    Cancelled,

    /// An internal contract was violated; the current generation is aborted.
    #[error("Invariant violated: {0}")]
    Invariant(String),

    /// The dedicated worker pool could not be created.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

/// A specialized Result type for genetic algorithm operations.
///
/// This type is a convenience wrapper around `std::result::Result` with the error type
/// fixed to `GeneticError`.
pub type Result<T> = std::result::Result<T, GeneticError>;

/// Extension trait for Option to convert to Result with a custom error.
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T, GeneticError>` using
    /// a closure to generate the error.
    fn ok_or_else_genetic<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> GeneticError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_else_genetic<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> GeneticError,
    {
        self.ok_or_else(err_fn)
    }
}

/// Checks that `probability` lies in `[0, 1]`.
///
/// `name` is used in the error message, e.g. `"Mutation probability"`.
pub fn check_probability(probability: f64, name: &str) -> Result<f64> {
    if !(0.0..=1.0).contains(&probability) {
        return Err(GeneticError::InvalidArgument(format!(
            "{} must be in the range [0, 1], but was {}",
            name, probability
        )));
    }
    Ok(probability)
}
