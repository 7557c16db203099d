//! Benchmark problems.
//!
//! Each problem fixes its [`Direction`] at construction; evaluation is pure.
//!
//! | Problem | Genome | Direction | Optimum |
//! |---------|--------|-----------|---------|
//! | [`MaxOnes`] | `Vec<bool>` | maximize | all bits set |
//! | [`MaxN`] | `Vec<i64>` | maximize | all genes equal the target |
//! | [`Spheroid`] | `Vec<f64>` | minimize | 0 at the origin |
//! | [`Weierstrass`] | `Vec<f64>` | minimize | 0 at the origin |

use crate::ea::{Direction, Problem};
use crate::error::EvaluationError;
use std::f64::consts::PI;

/// Number of set bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaxOnes;

impl Problem<Vec<bool>> for MaxOnes {
    fn direction(&self) -> Direction {
        Direction::Maximize
    }

    fn evaluate(&self, genome: &Vec<bool>) -> Result<f64, EvaluationError> {
        Ok(genome.iter().filter(|&&bit| bit).count() as f64)
    }
}

/// Number of genes equal to a target value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxN {
    target: i64,
}

impl MaxN {
    /// Counts genes equal to `target`.
    pub fn new(target: i64) -> Self {
        Self { target }
    }

    /// The target value.
    pub fn target(&self) -> i64 {
        self.target
    }
}

impl Problem<Vec<i64>> for MaxN {
    fn direction(&self) -> Direction {
        Direction::Maximize
    }

    fn evaluate(&self, genome: &Vec<i64>) -> Result<f64, EvaluationError> {
        Ok(genome.iter().filter(|&&g| g == self.target).count() as f64)
    }
}

/// Sum of squares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Spheroid;

impl Spheroid {
    /// Canonical per-gene bounds.
    pub const BOUNDS: (f64, f64) = (-5.12, 5.12);
}

impl Problem<Vec<f64>> for Spheroid {
    fn direction(&self) -> Direction {
        Direction::Minimize
    }

    fn evaluate(&self, genome: &Vec<f64>) -> Result<f64, EvaluationError> {
        Ok(genome.iter().map(|x| x * x).sum())
    }
}

/// Weierstrass function, shifted so the global minimum is 0 at the origin.
///
/// ```text
/// f(x) = Σᵢ Σₖ aᵏ cos(2π bᵏ (xᵢ + 0.5)) − n Σₖ aᵏ cos(π bᵏ),  k = 0..=kmax
/// ```
///
/// Continuous everywhere and differentiable nowhere for the default
/// parameters. Odd `b` keeps every value non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct Weierstrass {
    a: f64,
    b: f64,
    kmax: u32,
    // (aᵏ, 2π bᵏ) for k = 0..=kmax
    terms: Vec<(f64, f64)>,
    offset: f64,
}

impl Weierstrass {
    /// Canonical per-gene bounds.
    pub const BOUNDS: (f64, f64) = (-0.5, 0.5);

    /// Weierstrass function with amplitude ratio `a`, frequency ratio `b`
    /// and `kmax + 1` series terms.
    pub fn new(a: f64, b: f64, kmax: u32) -> Self {
        let terms: Vec<(f64, f64)> = (0..=kmax)
            .map(|k| (a.powi(k as i32), 2.0 * PI * b.powi(k as i32)))
            .collect();
        // same products as evaluate at x = 0, so f(0) cancels exactly
        let offset = terms.iter().map(|&(ak, w)| ak * (w * 0.5).cos()).sum();
        Self {
            a,
            b,
            kmax,
            terms,
            offset,
        }
    }

    /// Amplitude ratio.
    pub fn a(&self) -> f64 {
        self.a
    }

    /// Frequency ratio.
    pub fn b(&self) -> f64 {
        self.b
    }

    /// Highest series index.
    pub fn kmax(&self) -> u32 {
        self.kmax
    }
}

impl Default for Weierstrass {
    fn default() -> Self {
        Self::new(0.5, 3.0, 20)
    }
}

impl Problem<Vec<f64>> for Weierstrass {
    fn direction(&self) -> Direction {
        Direction::Minimize
    }

    fn evaluate(&self, genome: &Vec<f64>) -> Result<f64, EvaluationError> {
        let series: f64 = genome
            .iter()
            .map(|&x| {
                self.terms
                    .iter()
                    .map(|&(ak, w)| ak * (w * (x + 0.5)).cos())
                    .sum::<f64>()
            })
            .sum();
        Ok(series - genome.len() as f64 * self.offset)
    }
}

/// Problem backed by a closure.
///
/// ```
/// use u_evolve::ea::{Direction, Problem};
/// use u_evolve::problems::FnProblem;
///
/// let sum = FnProblem::new(Direction::Minimize, |g: &Vec<f64>| Ok(g.iter().sum()));
/// assert_eq!(sum.evaluate(&vec![1.0, 2.0]).unwrap(), 3.0);
/// ```
pub struct FnProblem<F> {
    direction: Direction,
    f: F,
}

impl<F> FnProblem<F> {
    /// Wraps `f` with the given direction.
    pub fn new<G>(direction: Direction, f: F) -> Self
    where
        F: Fn(&G) -> Result<f64, EvaluationError>,
    {
        Self { direction, f }
    }
}

impl<F> std::fmt::Debug for FnProblem<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnProblem")
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}

impl<G, F> Problem<G> for FnProblem<F>
where
    F: Fn(&G) -> Result<f64, EvaluationError> + Send + Sync,
{
    fn direction(&self) -> Direction {
        self.direction
    }

    fn evaluate(&self, genome: &G) -> Result<f64, EvaluationError> {
        (self.f)(genome)
    }
}
