//! Generational loop execution.
//!
//! [`GenerationalEa`] validates a run's parts once, then
//! [`generations`](GenerationalEa::generations) hands out a lazy
//! [`Generations`] iterator:
//! initialize → evaluate → (select → clone → operators → pool → evaluate) → repeat.
//!
//! Each generation depends only on the one before it. The iterator yields
//! generation 0 first and then one item per generation, so a full run yields
//! `max_generations + 1` items.

use super::config::EaConfig;
use super::individual::{Individual, Population};
use super::pipeline::{Context, Pipeline};
use super::types::{Direction, Genome, Problem, Representation};
use crate::error::{ConfigError, EvaluationError, EvoResult, EvolutionError};
use crate::random::{rng_from_seed, EvoRng};
use std::iter::FusedIterator;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Why a run stopped producing generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    /// `max_generations` generations were produced.
    MaxGenerations,
    /// The user stop predicate returned `true`.
    StopCondition,
    /// The cancellation flag was set.
    Cancelled,
    /// The wall-clock time limit elapsed.
    TimeLimit,
}

/// One generation yielded by [`Generations`].
#[derive(Debug, Clone)]
pub struct Generation<G> {
    /// Generation index; 0 is the initial population.
    pub index: usize,

    /// The fully evaluated population.
    pub population: Arc<Population<G>>,

    /// Best fitness in this population.
    pub best_fitness: f64,

    /// Wall-clock time since the run started.
    pub elapsed: Duration,
}

/// Result of driving a run to completion.
#[derive(Debug, Clone)]
pub struct RunSummary<G> {
    /// Best individual seen in any generation.
    pub best: Individual<G>,

    /// Fitness of `best`.
    pub best_fitness: f64,

    /// Number of generations produced after generation 0.
    pub generations: usize,

    /// Best fitness of each generation, starting with generation 0.
    ///
    /// Without elites this need not be monotone.
    pub best_fitness_history: Vec<f64>,

    /// Why the run ended.
    pub stop_reason: StopReason,

    /// Total wall-clock time.
    pub elapsed: Duration,
}

type StopFn<G> = Box<dyn Fn(&Population<G>) -> bool + Send + Sync>;

/// A validated generational evolutionary algorithm.
///
/// # Usage
///
/// ```
/// use u_evolve::ea::{EaConfig, GenerationalEa, Pipeline, Selection};
/// use u_evolve::problems::MaxOnes;
/// use u_evolve::rep::binary::{BinarySequence, BitFlip};
///
/// let config = EaConfig::default()
///     .with_population_size(10)
///     .with_max_generations(20)
///     .with_seed(42);
/// let pipeline = Pipeline::new(Selection::Tournament(2))
///     .mutate(BitFlip::with_probability(0.05))
///     .evaluate()
///     .pool(10);
///
/// let ea = GenerationalEa::new(config, BinarySequence::new(32), MaxOnes, pipeline).unwrap();
/// let summary = ea.run().unwrap();
/// assert_eq!(summary.best_fitness_history.len(), 21);
/// assert!(summary.best_fitness <= 32.0);
/// ```
pub struct GenerationalEa<G, R, P> {
    config: EaConfig,
    representation: R,
    problem: P,
    pipeline: Pipeline<G>,
    stop: Option<StopFn<G>>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<G, R, P> GenerationalEa<G, R, P>
where
    G: Genome,
    R: Representation<G>,
    P: Problem<G>,
{
    /// Validates all parts of a run.
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] found in the config, the
    /// representation, the selection strategy, the pool size, or any
    /// operator stage.
    pub fn new(
        config: EaConfig,
        representation: R,
        problem: P,
        pipeline: Pipeline<G>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        representation.validate()?;
        pipeline.validate(config.population_size, representation.genome_length())?;
        Ok(Self {
            config,
            representation,
            problem,
            pipeline,
            stop: None,
            cancel: None,
        })
    }

    /// Adds a stop predicate, checked on each population before the next
    /// generation is built.
    pub fn with_stop<F>(mut self, stop: F) -> Self
    where
        F: Fn(&Population<G>) -> bool + Send + Sync + 'static,
    {
        self.stop = Some(Box::new(stop));
        self
    }

    /// Adds a cancellation flag. Setting it to `true` ends the run before
    /// the next generation is built.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// The run configuration.
    pub fn config(&self) -> &EaConfig {
        &self.config
    }

    /// The problem being optimized.
    pub fn problem(&self) -> &P {
        &self.problem
    }

    /// Starts the run, returning the lazy generation sequence.
    pub fn generations(self) -> Generations<G, R, P> {
        let rng = rng_from_seed(self.config.seed);
        Generations {
            ea: self,
            rng,
            state: State::Initializing,
            generation: 0,
            started: None,
            stop_reason: None,
        }
    }

    /// Runs to completion and summarizes the result.
    pub fn run(self) -> EvoResult<RunSummary<G>> {
        self.generations().finish()
    }
}

enum State<G> {
    Initializing,
    Running(Arc<Population<G>>),
    Terminated,
}

/// Lazy, finite, single-pass sequence of generations.
///
/// After an error has been yielded or a stop condition has been met the
/// iterator returns `None` forever.
pub struct Generations<G, R, P> {
    ea: GenerationalEa<G, R, P>,
    rng: EvoRng,
    state: State<G>,
    generation: usize,
    started: Option<Instant>,
    stop_reason: Option<StopReason>,
}

impl<G, R, P> Generations<G, R, P>
where
    G: Genome,
    R: Representation<G>,
    P: Problem<G>,
{
    /// Index of the most recently yielded generation.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Why the sequence ended, once it has.
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    /// Drains the remaining generations and summarizes the run.
    ///
    /// `best` tracks the best individual over every generation drained here.
    ///
    /// # Errors
    /// The first error yielded by the sequence.
    pub fn finish(mut self) -> EvoResult<RunSummary<G>> {
        let direction = self.ea.problem.direction();
        let mut best: Option<Individual<G>> = None;
        let mut history = Vec::with_capacity(self.ea.config.max_generations + 1);

        while let Some(generation) = self.next() {
            let generation = generation?;
            history.push(generation.best_fitness);
            if let Some(candidate) = generation.population.best(direction) {
                if improves(best.as_ref(), candidate, direction) {
                    best = Some(candidate.clone());
                }
            }
        }

        let best = best.ok_or(EvolutionError::EmptyPopulation)?;
        Ok(RunSummary {
            best_fitness: best.fitness().unwrap_or(direction.worst()),
            best,
            generations: self.generation,
            best_fitness_history: history,
            stop_reason: self.stop_reason.unwrap_or(StopReason::MaxGenerations),
            elapsed: self.started.map(|t| t.elapsed()).unwrap_or_default(),
        })
    }

    fn initialize(&mut self) -> EvoResult<Population<G>> {
        let config = &self.ea.config;
        info!(
            population_size = config.population_size,
            max_generations = config.max_generations,
            genome_length = self.ea.representation.genome_length(),
            elites = config.elites,
            "starting generational EA"
        );
        self.started = Some(Instant::now());

        let individuals = (0..config.population_size)
            .map(|_| Individual::new(self.ea.representation.initialize(&mut self.rng)))
            .collect();
        let mut population = Population::new(individuals);
        evaluate_population(&self.ea.problem, &mut population, config.parallel)?;
        self.generation = 0;
        Ok(population)
    }

    fn step(&mut self, parents: &Population<G>) -> EvoResult<Population<G>> {
        let direction = self.ea.problem.direction();
        let next = self.generation + 1;

        let offspring = {
            let mut ctx = Context {
                problem: &self.ea.problem,
                rng: &mut self.rng,
                generation: next,
            };
            if self.ea.config.parallel {
                self.ea.pipeline.produce_unevaluated(parents, direction, &mut ctx)?
            } else {
                self.ea.pipeline.produce(parents, direction, &mut ctx)?
            }
        };

        let mut population = Population::new(offspring);
        evaluate_population(&self.ea.problem, &mut population, self.ea.config.parallel)?;
        if self.ea.config.elites > 0 {
            population = elitist_survival(parents, population, self.ea.config.elites, direction);
        }

        self.generation = next;
        Ok(population)
    }

    fn check_stop(&self, population: &Population<G>) -> Option<StopReason> {
        if self.generation >= self.ea.config.max_generations {
            return Some(StopReason::MaxGenerations);
        }
        if let Some(flag) = &self.ea.cancel {
            if flag.load(Ordering::Relaxed) {
                return Some(StopReason::Cancelled);
            }
        }
        if let (Some(limit), Some(started)) = (self.ea.config.time_limit_ms, self.started) {
            if started.elapsed() >= Duration::from_millis(limit) {
                return Some(StopReason::TimeLimit);
            }
        }
        if let Some(stop) = &self.ea.stop {
            if stop(population) {
                return Some(StopReason::StopCondition);
            }
        }
        None
    }
}

impl<G, R, P> Iterator for Generations<G, R, P>
where
    G: Genome,
    R: Representation<G>,
    P: Problem<G>,
{
    type Item = EvoResult<Generation<G>>;

    fn next(&mut self) -> Option<Self::Item> {
        let produced = match std::mem::replace(&mut self.state, State::Terminated) {
            State::Terminated => return None,
            State::Initializing => self.initialize(),
            State::Running(parents) => {
                if let Some(reason) = self.check_stop(&parents) {
                    info!(
                        generations = self.generation,
                        reason = ?reason,
                        "generational EA stopped"
                    );
                    self.stop_reason = Some(reason);
                    return None;
                }
                self.step(&parents)
            }
        };

        match produced {
            Ok(population) => {
                let direction = self.ea.problem.direction();
                let best_fitness = population
                    .best_fitness(direction)
                    .unwrap_or(direction.worst());
                let elapsed = self.started.map(|t| t.elapsed()).unwrap_or_default();
                debug!(
                    generation = self.generation,
                    best_fitness,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "generation complete"
                );

                let population = Arc::new(population);
                self.state = State::Running(Arc::clone(&population));
                Some(Ok(Generation {
                    index: self.generation,
                    population,
                    best_fitness,
                    elapsed,
                }))
            }
            Err(e) => {
                warn!(generation = self.generation, error = %e, "generational EA failed");
                Some(Err(e))
            }
        }
    }
}

impl<G, R, P> FusedIterator for Generations<G, R, P>
where
    G: Genome,
    R: Representation<G>,
    P: Problem<G>,
{
}

/// Evaluates every individual lacking a fitness, in place.
fn evaluate_population<G, P>(
    problem: &P,
    population: &mut Population<G>,
    parallel: bool,
) -> Result<(), EvaluationError>
where
    G: Genome,
    P: Problem<G>,
{
    if parallel {
        return evaluate_parallel(problem, population);
    }
    for ind in population.individuals_mut() {
        ind.evaluate(problem)?;
    }
    Ok(())
}

/// Evaluates slots with rayon. Slot order is untouched, so results match a
/// sequential pass.
#[cfg(feature = "parallel")]
fn evaluate_parallel<G, P>(problem: &P, population: &mut Population<G>) -> Result<(), EvaluationError>
where
    G: Genome,
    P: Problem<G>,
{
    use rayon::prelude::*;
    population
        .individuals_mut()
        .par_iter_mut()
        .try_for_each(|ind| ind.evaluate(problem).map(|_| ()))
}

#[cfg(not(feature = "parallel"))]
fn evaluate_parallel<G, P>(problem: &P, population: &mut Population<G>) -> Result<(), EvaluationError>
where
    G: Genome,
    P: Problem<G>,
{
    warn!("parallel evaluation requested without the `parallel` feature");
    population.evaluate_all(problem)
}

/// The `elites` best parents compete with the offspring; the best
/// `offspring.len()` survive. Stable, so offspring win ties.
fn elitist_survival<G: Clone>(
    parents: &Population<G>,
    offspring: Population<G>,
    elites: usize,
    direction: Direction,
) -> Population<G> {
    let size = offspring.len();
    let fitness_of = |ind: &Individual<G>| ind.fitness().unwrap_or(direction.worst());

    let mut ranked: Vec<&Individual<G>> = parents.iter().collect();
    ranked.sort_by(|a, b| direction.compare(fitness_of(b), fitness_of(a)));

    let mut survivors = offspring.into_individuals();
    survivors.extend(ranked.into_iter().take(elites).cloned());
    survivors.sort_by(|a, b| direction.compare(fitness_of(b), fitness_of(a)));
    survivors.truncate(size);
    Population::new(survivors)
}

fn improves<G>(best: Option<&Individual<G>>, candidate: &Individual<G>, direction: Direction) -> bool {
    match (best.and_then(Individual::fitness), candidate.fitness()) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(b), Some(c)) => direction.is_better(c, b),
    }
}

// ============================================================================
// Tests
// ============================================================================
