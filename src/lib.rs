//! Generic generational evolutionary algorithm.
//!
//! Evolves a fixed-size population of genomes through repeated
//! select → clone → mutate → evaluate → pool cycles:
//!
//! - **Engine** ([`ea`]): configuration, operator pipeline, parent
//!   selection, and a generation-by-generation iterator with stop
//!   conditions.
//! - **Representations** ([`rep`]): binary, real-valued, and integer
//!   genomes with their initializers and mutation operators.
//! - **Problems** ([`problems`]): MaxOnes, MaxN, Spheroid, Weierstrass, and
//!   a closure adapter.
//!
//! # Quick start
//!
//! ```
//! use u_evolve::ea::{EaConfig, GenerationalEa, Pipeline, Selection};
//! use u_evolve::problems::MaxOnes;
//! use u_evolve::rep::binary::{BinarySequence, BitFlip};
//!
//! let pipeline = Pipeline::new(Selection::Tournament(2))
//!     .mutate(BitFlip::with_probability(0.02))
//!     .evaluate()
//!     .pool(10);
//! let config = EaConfig::default().with_seed(42);
//! let ea = GenerationalEa::new(config, BinarySequence::new(50), MaxOnes, pipeline)?;
//!
//! for generation in ea.generations().take(3) {
//!     let generation = generation?;
//!     assert_eq!(generation.population.len(), 10);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Logging
//!
//! Progress is reported through `tracing`; install a subscriber to see it.

pub mod ea;
pub mod error;
pub mod problems;
pub mod random;
pub mod rep;

pub use error::{ConfigError, EvaluationError, EvoResult, EvolutionError};
