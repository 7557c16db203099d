//! Integer representation.
//!
//! Genomes are `Vec<i64>` with one inclusive `(low, high)` bound per gene.

use super::{check_bounds, check_length, MutationRate};
use crate::ea::{Mutation, Representation};
use crate::error::ConfigError;
use rand::{Rng, RngCore};
use rand_distr::{Binomial, Distribution};

/// Initializer for integer vectors, uniform within inclusive bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntVector {
    bounds: Vec<(i64, i64)>,
}

impl IntVector {
    /// Vectors with one gene per bound.
    pub fn new(bounds: Vec<(i64, i64)>) -> Self {
        Self { bounds }
    }

    /// Vectors of `length` genes sharing one bound.
    pub fn uniform(bound: (i64, i64), length: usize) -> Self {
        Self::new(vec![bound; length])
    }

    /// Per-gene bounds.
    pub fn bounds(&self) -> &[(i64, i64)] {
        &self.bounds
    }
}

impl Representation<Vec<i64>> for IntVector {
    fn genome_length(&self) -> usize {
        self.bounds.len()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_bounds(&self.bounds)
    }

    fn initialize(&self, rng: &mut dyn RngCore) -> Vec<i64> {
        self.bounds
            .iter()
            .map(|&(low, high)| rng.random_range(low..=high))
            .collect()
    }
}

/// Random-reset mutation: each selected gene is resampled uniformly within
/// its bounds.
///
/// The resampled value may equal the old one. Defaults to one expected
/// mutation per genome.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RandomIntReset {
    bounds: Vec<(i64, i64)>,
    rate: MutationRate,
}

impl RandomIntReset {
    /// Random reset with per-gene bounds.
    pub fn new(bounds: Vec<(i64, i64)>) -> Self {
        Self {
            bounds,
            rate: MutationRate::Expected(1.0),
        }
    }

    /// Random reset over `length` genes sharing one bound.
    pub fn uniform(bound: (i64, i64), length: usize) -> Self {
        Self::new(vec![bound; length])
    }

    /// Sets the per-gene mutation rate.
    pub fn with_rate(mut self, rate: MutationRate) -> Self {
        self.rate = rate;
        self
    }
}

impl Mutation<Vec<i64>> for RandomIntReset {
    fn validate(&self, genome_length: usize) -> Result<(), ConfigError> {
        check_length("bounds", genome_length, self.bounds.len())?;
        check_bounds(&self.bounds)?;
        self.rate.validate(genome_length)
    }

    fn mutate_genome(&self, genome: &mut Vec<i64>, rng: &mut dyn RngCore) {
        let p = self.rate.per_gene(genome.len());
        for (gene, &(low, high)) in genome.iter_mut().zip(&self.bounds) {
            if rng.random_bool(p) {
                *gene = rng.random_range(low..=high);
            }
        }
    }
}

/// Binomial creep mutation.
///
/// Each selected gene moves by `X - round(n p)` where `X ~ Binomial(n, p)`
/// and `p` is chosen so the shift has standard deviation σ. The result is
/// clamped into the gene's bounds.
#[derive(Debug, Clone)]
pub struct BinomialShift {
    std: f64,
    bounds: Vec<(i64, i64)>,
    rate: MutationRate,
    trials: u64,
    shift: Option<(Binomial, i64)>,
}

impl BinomialShift {
    /// Default number of Bernoulli trials behind each shift.
    pub const DEFAULT_TRIALS: u64 = 10_000;

    /// Binomial creep with standard deviation `std` and per-gene clamp
    /// bounds.
    pub fn new(std: f64, bounds: Vec<(i64, i64)>) -> Self {
        Self {
            std,
            bounds,
            rate: MutationRate::Expected(1.0),
            trials: Self::DEFAULT_TRIALS,
            shift: centred_binomial(std, Self::DEFAULT_TRIALS),
        }
    }

    /// Binomial creep over `length` genes sharing one bound.
    pub fn uniform(std: f64, bound: (i64, i64), length: usize) -> Self {
        Self::new(std, vec![bound; length])
    }

    /// Sets the per-gene mutation rate.
    pub fn with_rate(mut self, rate: MutationRate) -> Self {
        self.rate = rate;
        self
    }

    /// Sets the number of trials. σ must satisfy `4σ² <= trials`.
    pub fn with_trials(mut self, trials: u64) -> Self {
        self.trials = trials;
        self.shift = centred_binomial(self.std, trials);
        self
    }
}

/// Binomial(n, p) with variance σ², paired with its rounded mean.
///
/// Solves `n p (1 - p) = σ²` for the smaller root `p`.
fn centred_binomial(std: f64, trials: u64) -> Option<(Binomial, i64)> {
    if !std.is_finite() || std < 0.0 || trials == 0 {
        return None;
    }
    let n = trials as f64;
    let disc = 1.0 - 4.0 * std * std / n;
    if disc < 0.0 {
        return None;
    }
    let p = (1.0 - disc.sqrt()) / 2.0;
    let dist = Binomial::new(trials, p).ok()?;
    Some((dist, (n * p).round() as i64))
}

impl Mutation<Vec<i64>> for BinomialShift {
    fn validate(&self, genome_length: usize) -> Result<(), ConfigError> {
        if self.shift.is_none() {
            return Err(ConfigError::InvalidStd(self.std));
        }
        check_length("bounds", genome_length, self.bounds.len())?;
        check_bounds(&self.bounds)?;
        self.rate.validate(genome_length)
    }

    fn mutate_genome(&self, genome: &mut Vec<i64>, rng: &mut dyn RngCore) {
        let Some((dist, mean)) = &self.shift else {
            return;
        };
        let p = self.rate.per_gene(genome.len());
        for (gene, &(low, high)) in genome.iter_mut().zip(&self.bounds) {
            if rng.random_bool(p) {
                let shift = dist.sample(rng) as i64 - mean;
                *gene = gene.saturating_add(shift).clamp(low, high);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    #[test]
    fn test_initialize_inclusive_bounds() {
        let rep = IntVector::uniform((0, 3), 400);
        let mut rng = create_rng(42);
        let genome = rep.initialize(&mut rng);
        assert_eq!(genome.len(), 400);
        assert!(genome.iter().all(|g| (0..=3).contains(g)));
        // both endpoints are reachable
        assert!(genome.contains(&0));
        assert!(genome.contains(&3));
    }

    #[test]
    fn test_validate_bounds() {
        assert!(IntVector::uniform((0, 10), 100).validate().is_ok());
        assert!(IntVector::uniform((5, 5), 1).validate().is_ok());
        assert_eq!(IntVector::new(vec![]).validate(), Err(ConfigError::EmptyBounds));
        assert!(matches!(
            IntVector::new(vec![(0, 1), (3, 2)]).validate(),
            Err(ConfigError::InvalidBounds { index: 1, .. })
        ));
    }

    #[test]
    fn test_reset_probability_zero_is_identity() {
        let mut rng = create_rng(1);
        let original = IntVector::uniform((0, 10), 50).initialize(&mut rng);
        let mut genome = original.clone();
        RandomIntReset::uniform((0, 10), 50)
            .with_rate(MutationRate::Probability(0.0))
            .mutate_genome(&mut genome, &mut rng);
        assert_eq!(genome, original);
    }

    #[test]
    fn test_reset_stays_in_bounds() {
        let mut rng = create_rng(2);
        let op = RandomIntReset::new(vec![(0, 1), (-5, 5), (100, 100)])
            .with_rate(MutationRate::Isotropic);
        let mut genome = vec![0, 0, 100];
        for _ in 0..100 {
            op.mutate_genome(&mut genome, &mut rng);
            assert!((0..=1).contains(&genome[0]));
            assert!((-5..=5).contains(&genome[1]));
            assert_eq!(genome[2], 100);
        }
    }

    #[test]
    fn test_reset_validate_length() {
        let op = RandomIntReset::uniform((0, 10), 5);
        assert!(op.validate(5).is_ok());
        assert_eq!(
            op.validate(100),
            Err(ConfigError::LengthMismatch {
                what: "bounds",
                expected: 100,
                actual: 5,
            })
        );
    }

    #[test]
    fn test_binomial_shift_statistics() {
        let mut rng = create_rng(3);
        let op = BinomialShift::uniform(2.0, (-1000, 1000), 10_000)
            .with_rate(MutationRate::Isotropic);
        let mut genome = vec![0i64; 10_000];
        op.mutate_genome(&mut genome, &mut rng);
        let n = genome.len() as f64;
        let mean = genome.iter().sum::<i64>() as f64 / n;
        let var = genome.iter().map(|&g| (g as f64 - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 0.2, "mean {mean}");
        assert!((var.sqrt() - 2.0).abs() < 0.2, "std {}", var.sqrt());
    }

    #[test]
    fn test_binomial_shift_clamps() {
        let mut rng = create_rng(4);
        let op = BinomialShift::uniform(10.0, (0, 3), 20).with_rate(MutationRate::Isotropic);
        let mut genome = vec![0i64; 20];
        for _ in 0..20 {
            op.mutate_genome(&mut genome, &mut rng);
            assert!(genome.iter().all(|g| (0..=3).contains(g)));
        }
    }

    #[test]
    fn test_binomial_shift_zero_std_is_identity() {
        let mut rng = create_rng(5);
        let op = BinomialShift::uniform(0.0, (0, 10), 10).with_rate(MutationRate::Isotropic);
        let mut genome = vec![5i64; 10];
        op.mutate_genome(&mut genome, &mut rng);
        assert_eq!(genome, vec![5i64; 10]);
    }

    #[test]
    fn test_binomial_shift_validate() {
        assert!(BinomialShift::uniform(1.0, (0, 10), 10).validate(10).is_ok());
        assert_eq!(
            BinomialShift::uniform(-1.0, (0, 10), 10).validate(10),
            Err(ConfigError::InvalidStd(-1.0))
        );
        // 4σ² exceeds the trial count
        assert!(BinomialShift::uniform(3.0, (0, 10), 10)
            .with_trials(10)
            .validate(10)
            .is_err());
        assert!(BinomialShift::uniform(1.0, (0, 10), 4).validate(10).is_err());
    }
}
