//! Real-valued representation.
//!
//! Genomes are `Vec<f64>` with one `(low, high)` bound per gene. Bounds
//! only constrain initialization; after mutation, a gene stays inside them
//! only if the [`Gaussian`] operator is given a clipping or wrapping
//! [`BoundsPolicy`].

use super::{check_bounds, check_length, MutationRate};
use crate::ea::{Mutation, Representation};
use crate::error::ConfigError;
use rand::{Rng, RngCore};
use rand_distr::StandardNormal;

/// Initializer for real vectors, uniform within per-gene bounds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RealVector {
    bounds: Vec<(f64, f64)>,
}

impl RealVector {
    /// Vectors with one gene per bound.
    pub fn new(bounds: Vec<(f64, f64)>) -> Self {
        Self { bounds }
    }

    /// Vectors of `length` genes sharing one bound.
    pub fn uniform(bound: (f64, f64), length: usize) -> Self {
        Self::new(vec![bound; length])
    }

    /// Per-gene bounds.
    pub fn bounds(&self) -> &[(f64, f64)] {
        &self.bounds
    }
}

impl Representation<Vec<f64>> for RealVector {
    fn genome_length(&self) -> usize {
        self.bounds.len()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_real_bounds(&self.bounds)
    }

    fn initialize(&self, rng: &mut dyn RngCore) -> Vec<f64> {
        self.bounds
            .iter()
            .map(|&(low, high)| rng.random_range(low..=high))
            .collect()
    }
}

fn check_real_bounds(bounds: &[(f64, f64)]) -> Result<(), ConfigError> {
    check_bounds(bounds)?;
    for (i, &(low, high)) in bounds.iter().enumerate() {
        if !low.is_finite() || !high.is_finite() {
            return Err(ConfigError::invalid_bounds(i, low, high));
        }
    }
    Ok(())
}

/// Standard deviation of Gaussian noise.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Std {
    /// One σ for every gene.
    Scalar(f64),
    /// One σ per gene.
    PerGene(Vec<f64>),
}

impl Std {
    fn at(&self, index: usize) -> f64 {
        match self {
            Std::Scalar(s) => *s,
            Std::PerGene(v) => v.get(index).copied().unwrap_or(0.0),
        }
    }
}

impl From<f64> for Std {
    fn from(std: f64) -> Self {
        Std::Scalar(std)
    }
}

impl From<Vec<f64>> for Std {
    fn from(std: Vec<f64>) -> Self {
        Std::PerGene(std)
    }
}

/// What happens to a mutated gene that leaves its bounds.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundsPolicy {
    /// Genes may take any value.
    #[default]
    Unbounded,
    /// Genes are clamped into `[low, high]`.
    Clip(Vec<(f64, f64)>),
    /// Genes wrap around into `[low, high)`.
    Wrap(Vec<(f64, f64)>),
}

impl BoundsPolicy {
    fn apply(&self, index: usize, x: f64) -> f64 {
        match self {
            BoundsPolicy::Unbounded => x,
            BoundsPolicy::Clip(bounds) => match bounds.get(index) {
                Some(&(low, high)) => x.clamp(low, high),
                None => x,
            },
            BoundsPolicy::Wrap(bounds) => match bounds.get(index) {
                Some(&(low, high)) => low + (x - low).rem_euclid(high - low),
                None => x,
            },
        }
    }

    fn validate(&self, genome_length: usize) -> Result<(), ConfigError> {
        match self {
            BoundsPolicy::Unbounded => Ok(()),
            BoundsPolicy::Clip(bounds) => {
                check_length("clip bounds", genome_length, bounds.len())?;
                check_real_bounds(bounds)
            }
            BoundsPolicy::Wrap(bounds) => {
                check_length("wrap bounds", genome_length, bounds.len())?;
                check_real_bounds(bounds)?;
                // wrapping needs a non-empty interval
                match bounds.iter().position(|&(low, high)| low >= high) {
                    Some(i) => Err(ConfigError::invalid_bounds(i, bounds[i].0, bounds[i].1)),
                    None => Ok(()),
                }
            }
        }
    }
}

/// Gaussian mutation: each selected gene gets additive N(0, σ) noise.
///
/// The default rate is [`MutationRate::Isotropic`], which perturbs every
/// gene.
///
/// ```
/// use u_evolve::ea::Mutation;
/// use u_evolve::random::create_rng;
/// use u_evolve::rep::real::{BoundsPolicy, Gaussian};
///
/// let op = Gaussian::new(0.5).with_bounds(BoundsPolicy::Clip(vec![(-1.0, 1.0); 3]));
/// let mut genome = vec![0.0, 0.9, -0.9];
/// op.mutate_genome(&mut genome, &mut create_rng(7));
/// assert!(genome.iter().all(|x| (-1.0..=1.0).contains(x)));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gaussian {
    std: Std,
    rate: MutationRate,
    bounds: BoundsPolicy,
}

impl Gaussian {
    /// Gaussian mutation with scalar or per-gene σ.
    pub fn new(std: impl Into<Std>) -> Self {
        Self {
            std: std.into(),
            rate: MutationRate::Isotropic,
            bounds: BoundsPolicy::Unbounded,
        }
    }

    /// Sets the per-gene mutation rate.
    pub fn with_rate(mut self, rate: MutationRate) -> Self {
        self.rate = rate;
        self
    }

    /// Sets the bounds policy applied after noise is added.
    pub fn with_bounds(mut self, bounds: BoundsPolicy) -> Self {
        self.bounds = bounds;
        self
    }

    /// The configured rate.
    pub fn rate(&self) -> MutationRate {
        self.rate
    }
}

impl Mutation<Vec<f64>> for Gaussian {
    fn validate(&self, genome_length: usize) -> Result<(), ConfigError> {
        match &self.std {
            Std::Scalar(s) => check_std(*s)?,
            Std::PerGene(v) => {
                check_length("std", genome_length, v.len())?;
                v.iter().try_for_each(|&s| check_std(s))?;
            }
        }
        self.rate.validate(genome_length)?;
        self.bounds.validate(genome_length)
    }

    fn mutate_genome(&self, genome: &mut Vec<f64>, rng: &mut dyn RngCore) {
        let p = self.rate.per_gene(genome.len());
        for (i, x) in genome.iter_mut().enumerate() {
            if rng.random_bool(p) {
                let z: f64 = rng.sample(StandardNormal);
                *x = self.bounds.apply(i, *x + self.std.at(i) * z);
            }
        }
    }
}

fn check_std(std: f64) -> Result<(), ConfigError> {
    if std.is_finite() && std >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidStd(std))
    }
}
