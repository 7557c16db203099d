//! Error types.
//!
//! Configuration problems are detected when an engine is constructed and
//! reported as [`ConfigError`]. Failures during a run are reported as
//! [`EvolutionError`] and end the run.

use thiserror::Error;

/// Invalid construction-time configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Population size of zero.
    #[error("population_size must be at least 1")]
    ZeroPopulation,

    /// Generation limit of zero.
    #[error("max_generations must be at least 1")]
    ZeroGenerations,

    /// Genome length of zero.
    #[error("genome length must be at least 1")]
    ZeroGenomeLength,

    /// A bounds list with no entries.
    #[error("bounds list must not be empty")]
    EmptyBounds,

    /// A per-gene vector whose length differs from the genome length.
    #[error("{what} has {actual} entries but the genome has {expected} genes")]
    LengthMismatch {
        /// Which vector was mismatched.
        what: &'static str,
        /// Genome length.
        expected: usize,
        /// Length supplied.
        actual: usize,
    },

    /// A bound whose low end exceeds its high end, or is not finite.
    #[error("invalid bounds at gene {index}: [{low}, {high}]")]
    InvalidBounds {
        /// Gene index.
        index: usize,
        /// Lower bound, formatted.
        low: String,
        /// Upper bound, formatted.
        high: String,
    },

    /// Tournament of size zero.
    #[error("tournament size must be at least 1")]
    ZeroTournament,

    /// Tournament larger than the population it samples.
    #[error("tournament size {k} exceeds population size {population_size}")]
    TournamentTooLarge {
        /// Tournament size.
        k: usize,
        /// Population size.
        population_size: usize,
    },

    /// Probability outside `[0, 1]`.
    #[error("probability {0} is outside [0, 1]")]
    InvalidProbability(f64),

    /// Expected mutation count outside `[0, genome_length]`.
    #[error("expected {expected} mutations is outside [0, {genome_length}]")]
    InvalidExpectedMutations {
        /// Requested expected count.
        expected: f64,
        /// Genome length.
        genome_length: usize,
    },

    /// Negative or non-finite standard deviation.
    #[error("standard deviation {0} must be finite and non-negative")]
    InvalidStd(f64),

    /// Pipeline without a pool stage.
    #[error("pipeline has no pool stage")]
    MissingPool,

    /// Pool size that would change the population size.
    #[error("pool size {pool} differs from population size {population_size}")]
    PoolSizeMismatch {
        /// Pool size.
        pool: usize,
        /// Population size.
        population_size: usize,
    },

    /// Elite count that leaves no room for offspring.
    #[error("elites ({elites}) must be smaller than population size ({population_size})")]
    TooManyElites {
        /// Elite count.
        elites: usize,
        /// Population size.
        population_size: usize,
    },

    /// Time limit of zero milliseconds.
    #[error("time_limit_ms must be positive or None")]
    ZeroTimeLimit,
}

impl ConfigError {
    pub(crate) fn invalid_bounds<T: std::fmt::Display>(index: usize, low: T, high: T) -> Self {
        Self::InvalidBounds {
            index,
            low: low.to_string(),
            high: high.to_string(),
        }
    }
}

/// Failure raised by [`Problem::evaluate`](crate::ea::Problem::evaluate).
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// Failure described by a message.
    #[error("{0}")]
    Message(String),

    /// Failure carrying an underlying error.
    #[error(transparent)]
    Source(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl EvaluationError {
    /// Creates an error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// Failure during an evolutionary run.
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Fitness evaluation failed.
    #[error("fitness evaluation failed: {0}")]
    Evaluation(#[from] EvaluationError),

    /// A population with no evaluated individuals.
    #[error("population has no evaluated individuals")]
    EmptyPopulation,

    /// The offspring source ran dry before the pool was filled.
    #[error("pool expected {expected} individuals but received {actual}")]
    PoolShortfall {
        /// Pool size.
        expected: usize,
        /// Individuals received.
        actual: usize,
    },
}

/// Result alias for run-time operations.
pub type EvoResult<T> = Result<T, EvolutionError>;
