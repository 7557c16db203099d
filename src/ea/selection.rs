//! Parent selection.
//!
//! A [`Selection`] strategy turns the current population into a stream of
//! parent indices. Every strategy honours the problem's [`Direction`].
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Baker (1985), "Adaptive Selection Methods for Genetic Algorithms"

use super::individual::Population;
use super::types::Direction;
use crate::error::ConfigError;
use rand::seq::index;
use rand::{Rng, RngCore};

/// Selection strategy for choosing parents.
///
/// # Examples
///
/// ```
/// use u_evolve::ea::Selection;
///
/// // Binary tournament, the usual choice for small populations
/// let sel = Selection::Tournament(2);
/// assert!(sel.validate(10).is_ok());
/// assert!(Selection::Tournament(11).validate(10).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Draw `k` individuals uniformly with replacement and keep the best.
    /// Ties go to the first individual drawn.
    ///
    /// - k=1: uniform random selection
    /// - k=2: light pressure
    /// - k=N: almost always the population's best
    Tournament(usize),

    /// Draw `k` distinct individuals and keep the best. With `k` equal to the
    /// population size this always returns the population's best.
    DistinctTournament(usize),

    /// Uniform random selection with replacement.
    Random,

    /// Linear ranking: the best of n individuals has weight n, the worst 1.
    Rank,

    /// Population order, wrapping around indefinitely.
    Cyclic,

    /// Population order, each parent exactly once. The only finite strategy.
    Sequential,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament(2)
    }
}

impl Selection {
    /// Checks the strategy against the population size it will sample.
    pub fn validate(&self, population_size: usize) -> Result<(), ConfigError> {
        if let Selection::Tournament(k) | Selection::DistinctTournament(k) = *self {
            if k == 0 {
                return Err(ConfigError::ZeroTournament);
            }
            if k > population_size {
                return Err(ConfigError::TournamentTooLarge { k, population_size });
            }
        }
        Ok(())
    }

    /// Select one parent index.
    ///
    /// `Sequential` and `Cyclic` keep position in a [`ParentStream`]; called
    /// here they return the first individual.
    ///
    /// # Panics
    /// Panics if `population` is empty.
    pub fn select<G>(
        &self,
        population: &Population<G>,
        direction: Direction,
        rng: &mut dyn RngCore,
    ) -> usize {
        self.stream(population, direction)
            .next_parent(population, rng)
            .expect("non-empty population always yields a parent")
    }

    /// Creates a stream of parent indices over `population`.
    ///
    /// # Panics
    /// Panics if `population` is empty.
    pub fn stream<G>(&self, population: &Population<G>, direction: Direction) -> ParentStream {
        assert!(
            !population.is_empty(),
            "cannot select from empty population"
        );

        let ranking = match self {
            Selection::Rank => rank_order(population, direction),
            _ => Vec::new(),
        };

        ParentStream {
            selection: *self,
            direction,
            cursor: 0,
            ranking,
        }
    }
}

/// Stateful source of parent indices for one generation.
///
/// Infinite for every strategy except [`Selection::Sequential`], which
/// returns `None` once each parent has been produced.
#[derive(Debug, Clone)]
pub struct ParentStream {
    selection: Selection,
    direction: Direction,
    cursor: usize,
    // Indices sorted best-first; only filled for `Rank`.
    ranking: Vec<usize>,
}

impl ParentStream {
    /// Produces the next parent index, or `None` when exhausted.
    pub fn next_parent<G>(
        &mut self,
        population: &Population<G>,
        rng: &mut dyn RngCore,
    ) -> Option<usize> {
        let n = population.len();
        match self.selection {
            Selection::Tournament(k) => Some(tournament(population, k, self.direction, rng)),
            Selection::DistinctTournament(k) => {
                Some(distinct_tournament(population, k, self.direction, rng))
            }
            Selection::Random => Some(rng.random_range(0..n)),
            Selection::Rank => Some(rank(&self.ranking, rng)),
            Selection::Cyclic => {
                let idx = self.cursor % n;
                self.cursor += 1;
                Some(idx)
            }
            Selection::Sequential => {
                if self.cursor >= n {
                    return None;
                }
                let idx = self.cursor;
                self.cursor += 1;
                Some(idx)
            }
        }
    }
}

/// Tournament selection: pick k random individuals, return the best.
fn tournament<G>(
    population: &Population<G>,
    k: usize,
    direction: Direction,
    rng: &mut dyn RngCore,
) -> usize {
    let k = k.max(1);
    let n = population.len();
    let fitness_of = |i: usize| {
        population
            .get(i)
            .and_then(|ind| ind.fitness())
            .unwrap_or(direction.worst())
    };

    let mut best_idx = rng.random_range(0..n);
    let mut best_fit = fitness_of(best_idx);
    for _ in 1..k {
        let idx = rng.random_range(0..n);
        let fit = fitness_of(idx);
        if direction.is_better(fit, best_fit) {
            best_idx = idx;
            best_fit = fit;
        }
    }
    best_idx
}

/// Tournament over `k` distinct individuals, in sampled order.
fn distinct_tournament<G>(
    population: &Population<G>,
    k: usize,
    direction: Direction,
    rng: &mut dyn RngCore,
) -> usize {
    let n = population.len();
    let k = k.clamp(1, n);
    let fitness_of = |i: usize| {
        population
            .get(i)
            .and_then(|ind| ind.fitness())
            .unwrap_or(direction.worst())
    };

    let mut contenders = index::sample(rng, n, k).into_iter();
    // k >= 1, so the sample has a first element
    let mut best_idx = contenders.next().unwrap_or(0);
    let mut best_fit = fitness_of(best_idx);
    for idx in contenders {
        let fit = fitness_of(idx);
        if direction.is_better(fit, best_fit) {
            best_idx = idx;
            best_fit = fit;
        }
    }
    best_idx
}

/// Indices sorted best-first. Stable, so equal fitness keeps population order.
fn rank_order<G>(population: &Population<G>, direction: Direction) -> Vec<usize> {
    let mut indexed: Vec<(usize, f64)> = population
        .iter()
        .enumerate()
        .map(|(i, ind)| (i, ind.fitness().unwrap_or(direction.worst())))
        .collect();
    indexed.sort_by(|a, b| direction.compare(b.1, a.1));
    indexed.into_iter().map(|(i, _)| i).collect()
}

/// Rank-based selection over a best-first ordering.
fn rank(ranking: &[usize], rng: &mut dyn RngCore) -> usize {
    let n = ranking.len();
    if n == 1 {
        return ranking[0];
    }

    // weight of rank r (0 = best) is n - r
    let total = (n * (n + 1)) as f64 / 2.0;
    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (r, &original_idx) in ranking.iter().enumerate() {
        cumulative += (n - r) as f64;
        if cumulative > threshold {
            return original_idx;
        }
    }

    ranking[n - 1] // floating-point fallback
}
