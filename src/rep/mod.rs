//! Genome representations and their mutation operators.
//!
//! # Submodules
//!
//! - [`binary`]: bit sequences and bit-flip mutation
//! - [`real`]: bounded real vectors and Gaussian mutation
//! - [`int`]: bounded integer vectors, random-reset and binomial mutation
//!
//! All mutation operators choose genes independently with a per-gene
//! probability derived from a [`MutationRate`].

pub mod binary;
pub mod int;
pub mod real;

use crate::error::ConfigError;
use std::fmt::Display;

/// How many genes a mutation touches.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MutationRate {
    /// Each gene mutates independently with this probability.
    Probability(f64),

    /// Each gene mutates with probability `m / genome_length`, so `m` genes
    /// mutate on average.
    Expected(f64),

    /// Every gene mutates.
    Isotropic,
}

impl MutationRate {
    /// Per-gene probability for a genome of `genome_length` genes.
    pub fn per_gene(&self, genome_length: usize) -> f64 {
        let p = match *self {
            MutationRate::Probability(p) => p,
            MutationRate::Expected(m) if genome_length > 0 => m / genome_length as f64,
            MutationRate::Expected(_) => 0.0,
            MutationRate::Isotropic => 1.0,
        };
        if p.is_nan() {
            0.0
        } else {
            p.clamp(0.0, 1.0)
        }
    }

    /// Checks the rate against the genome length.
    pub fn validate(&self, genome_length: usize) -> Result<(), ConfigError> {
        match *self {
            MutationRate::Probability(p) if !(0.0..=1.0).contains(&p) => {
                Err(ConfigError::InvalidProbability(p))
            }
            MutationRate::Expected(m) if !(0.0..=genome_length as f64).contains(&m) => {
                Err(ConfigError::InvalidExpectedMutations {
                    expected: m,
                    genome_length,
                })
            }
            _ => Ok(()),
        }
    }
}

/// Rejects empty bounds lists and bounds with `low > high`.
pub(crate) fn check_bounds<T>(bounds: &[(T, T)]) -> Result<(), ConfigError>
where
    T: PartialOrd + Display + Copy,
{
    if bounds.is_empty() {
        return Err(ConfigError::EmptyBounds);
    }
    for (i, &(low, high)) in bounds.iter().enumerate() {
        // written negated so NaN fails
        if !(low <= high) {
            return Err(ConfigError::invalid_bounds(i, low, high));
        }
    }
    Ok(())
}

/// Rejects a per-gene vector whose length differs from the genome's.
pub(crate) fn check_length(
    what: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), ConfigError> {
    if expected != actual {
        return Err(ConfigError::LengthMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}
