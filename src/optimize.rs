//! # Optimize
//!
//! The direction of improvement. Every selector, the statistics calculator
//! and the best-so-far bookkeeping of the driver compare fitness values
//! through [`Optimize::compare`], so a single enum flips the whole engine
//! between maximization and minimization.

use std::cmp::Ordering;

/// Direction of the optimization.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Optimize {
    /// Higher fitness values are better.
    #[default]
    Maximum,
    /// Lower fitness values are better.
    Minimum,
}

impl Optimize {
    /// Compares two fitness values by quality.
    ///
    /// Returns `Ordering::Greater` if `a` is better than `b`. Values that are
    /// not comparable with themselves (NaN) are always worse than any
    /// comparable value, regardless of the direction.
    pub fn compare<T: PartialOrd>(self, a: &T, b: &T) -> Ordering {
        match a.partial_cmp(b) {
            Some(ordering) => match self {
                Optimize::Maximum => ordering,
                Optimize::Minimum => ordering.reverse(),
            },
            None => {
                let a_incomparable = a.partial_cmp(a).is_none();
                let b_incomparable = b.partial_cmp(b).is_none();
                match (a_incomparable, b_incomparable) {
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    _ => Ordering::Equal,
                }
            }
        }
    }

    /// Ordering that sorts the best value first.
    pub fn descending<T: PartialOrd>(self, a: &T, b: &T) -> Ordering {
        self.compare(b, a)
    }

    /// Returns the better of the two values; `a` wins ties.
    pub fn best<'a, T: PartialOrd>(self, a: &'a T, b: &'a T) -> &'a T {
        if self.compare(b, a) == Ordering::Greater {
            b
        } else {
            a
        }
    }

    /// Returns the worse of the two values; `a` wins ties.
    pub fn worst<'a, T: PartialOrd>(self, a: &'a T, b: &'a T) -> &'a T {
        if self.compare(b, a) == Ordering::Less {
            b
        } else {
            a
        }
    }
}
