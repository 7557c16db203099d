//! Core trait definitions for the generational EA.
//!
//! [`Representation`] and [`Problem`] are the two plug-in points between the
//! generic engine and a concrete optimization task. [`Direction`] fixes how
//! fitness values are ordered.

use crate::error::{ConfigError, EvaluationError};
use rand::RngCore;
use std::cmp::Ordering;

/// Marker trait for genome types.
///
/// Blanket-implemented for every type that is cheap enough to clone and can
/// cross thread boundaries, so `Vec<bool>`, `Vec<f64>` and `Vec<i64>` all
/// qualify.
pub trait Genome: Clone + Send + Sync + std::fmt::Debug + 'static {}

impl<T: Clone + Send + Sync + std::fmt::Debug + 'static> Genome for T {}

/// Optimization direction of a [`Problem`].
///
/// NaN fitness is ordered below every other value in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Larger fitness is better.
    #[default]
    Maximize,
    /// Smaller fitness is better.
    Minimize,
}

impl Direction {
    /// Orders two fitness values so that `Ordering::Greater` means `a` is
    /// better than `b`.
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        self.key(a)
            .partial_cmp(&self.key(b))
            .unwrap_or(Ordering::Equal)
    }

    /// Returns `true` if `a` is strictly better than `b`.
    pub fn is_better(self, a: f64, b: f64) -> bool {
        self.compare(a, b) == Ordering::Greater
    }

    /// The worst representable fitness in this direction.
    pub fn worst(self) -> f64 {
        match self {
            Direction::Maximize => f64::NEG_INFINITY,
            Direction::Minimize => f64::INFINITY,
        }
    }

    fn key(self, fitness: f64) -> f64 {
        if fitness.is_nan() {
            return f64::NEG_INFINITY;
        }
        match self {
            Direction::Maximize => fitness,
            Direction::Minimize => -fitness,
        }
    }
}

/// Produces genomes for generation 0.
///
/// Each call to [`initialize`](Representation::initialize) samples one
/// genome independently, consuming randomness only.
pub trait Representation<G>: Send + Sync {
    /// Number of genes in every genome this representation produces.
    fn genome_length(&self) -> usize;

    /// Checks the representation's own parameters.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.genome_length() == 0 {
            return Err(ConfigError::ZeroGenomeLength);
        }
        Ok(())
    }

    /// Samples one genome.
    fn initialize(&self, rng: &mut dyn RngCore) -> G;
}

/// A fitness function with a fixed optimization direction.
///
/// Problems hold no mutable state and are shared by every evaluation in a
/// run, so they must be `Send + Sync`.
///
/// # Implementing
///
/// ```
/// use u_evolve::ea::{Direction, Problem};
/// use u_evolve::EvaluationError;
///
/// struct SumGenes;
///
/// impl Problem<Vec<i64>> for SumGenes {
///     fn direction(&self) -> Direction {
///         Direction::Maximize
///     }
///
///     fn evaluate(&self, genome: &Vec<i64>) -> Result<f64, EvaluationError> {
///         Ok(genome.iter().sum::<i64>() as f64)
///     }
/// }
/// ```
pub trait Problem<G>: Send + Sync {
    /// Whether larger or smaller fitness is better.
    fn direction(&self) -> Direction;

    /// Computes the fitness of a genome.
    ///
    /// Errors are propagated to the caller of the generation being built;
    /// the engine never retries or discards them.
    fn evaluate(&self, genome: &G) -> Result<f64, EvaluationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maximize_ordering() {
        let d = Direction::Maximize;
        assert!(d.is_better(3.0, 1.0));
        assert!(!d.is_better(1.0, 3.0));
        assert!(!d.is_better(2.0, 2.0));
        assert_eq!(d.worst(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_minimize_ordering() {
        let d = Direction::Minimize;
        assert!(d.is_better(1.0, 3.0));
        assert!(!d.is_better(3.0, 1.0));
        assert_eq!(d.worst(), f64::INFINITY);
    }

    #[test]
    fn test_nan_is_worst() {
        for d in [Direction::Maximize, Direction::Minimize] {
            assert!(d.is_better(0.0, f64::NAN));
            assert!(!d.is_better(f64::NAN, 0.0));
        }
    }

    #[test]
    fn test_default_is_maximize() {
        assert_eq!(Direction::default(), Direction::Maximize);
    }
}
