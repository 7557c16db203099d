//! Binary representation.
//!
//! Genomes are `Vec<bool>` of fixed length.

use super::MutationRate;
use crate::ea::{Mutation, Representation};
use crate::error::ConfigError;
use rand::{Rng, RngCore};

/// Initializer for fixed-length bit sequences with uniform random bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinarySequence {
    length: usize,
}

impl BinarySequence {
    /// Sequences of `length` bits.
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Representation<Vec<bool>> for BinarySequence {
    fn genome_length(&self) -> usize {
        self.length
    }

    fn initialize(&self, rng: &mut dyn RngCore) -> Vec<bool> {
        (0..self.length).map(|_| rng.random_bool(0.5)).collect()
    }
}

/// Bit-flip mutation: each bit flips independently.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BitFlip {
    rate: MutationRate,
}

impl BitFlip {
    /// Bit-flip with the given rate.
    pub fn new(rate: MutationRate) -> Self {
        Self { rate }
    }

    /// Bit-flip where each bit flips with probability `p`.
    pub fn with_probability(p: f64) -> Self {
        Self::new(MutationRate::Probability(p))
    }

    /// The configured rate.
    pub fn rate(&self) -> MutationRate {
        self.rate
    }
}

impl Default for BitFlip {
    /// One flipped bit per genome on average.
    fn default() -> Self {
        Self::new(MutationRate::Expected(1.0))
    }
}

impl Mutation<Vec<bool>> for BitFlip {
    fn validate(&self, genome_length: usize) -> Result<(), ConfigError> {
        self.rate.validate(genome_length)
    }

    fn mutate_genome(&self, genome: &mut Vec<bool>, rng: &mut dyn RngCore) {
        let p = self.rate.per_gene(genome.len());
        for bit in genome.iter_mut() {
            if rng.random_bool(p) {
                *bit = !*bit;
            }
        }
    }
}
