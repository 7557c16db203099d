//! Generational evolutionary algorithm.
//!
//! A generic engine parameterized by a genome type `G`. Users plug in a
//! [`Representation`] that creates genomes, a [`Problem`] that scores them,
//! and a [`Pipeline`] of variation stages that turns one generation into
//! the next.
//!
//! # Core Traits
//!
//! - [`Representation`]: Genome length, validation, and random initialization
//! - [`Problem`]: Optimization direction and fitness evaluation
//! - [`Mutation`]: Genome-level variation, wrapped into a pipeline stage
//! - [`Operator`]: General individual-to-individual pipeline stage
//!
//! # Key Types
//!
//! - [`EaConfig`]: Loop parameters (population size, generations, elitism, seed)
//! - [`Pipeline`]: Selection, then cloning, then ordered stages, then a pool
//! - [`GenerationalEa`]: Validated engine; yields [`Generations`] or a [`RunSummary`]
//!
//! # One generation
//!
//! ```text
//! parents ──select──▶ clone ──▶ stage₁ ──▶ … ──▶ stageₙ ──▶ pool(N) ──▶ offspring
//! ```
//!
//! Parents are only borrowed, so every stage works on an owned copy.
//!
//! # References
//!
//! - De Jong (2006), *Evolutionary Computation: A Unified Approach*
//! - Coletti et al. (2020), *Library for Evolutionary Algorithms in Python (LEAP)*

mod config;
mod individual;
mod pipeline;
mod runner;
mod selection;
mod types;

pub use config::EaConfig;
pub use individual::{Individual, Population};
pub use pipeline::{pool, Context, Evaluate, Mutation, Offspring, Operator, Pipeline};
pub use runner::{Generation, GenerationalEa, Generations, RunSummary, StopReason};
pub use selection::{ParentStream, Selection};
pub use types::{Direction, Genome, Problem, Representation};
