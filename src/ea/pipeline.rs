//! Offspring pipelines.
//!
//! A [`Pipeline`] describes how one generation produces the next:
//!
//! 1. a [`Selection`] strategy picks parents from the current population,
//! 2. each parent is cloned into an owned offspring,
//! 3. the offspring passes through an ordered list of [`Operator`] stages
//!    (mutation, evaluation, user stages),
//! 4. [`pool`] collects exactly `size` finished offspring.
//!
//! Parents are only ever borrowed, so no stage can reach the previous
//! generation mutably.
//!
//! ```
//! use u_evolve::ea::{Pipeline, Selection};
//! use u_evolve::rep::binary::BitFlip;
//!
//! let pipeline: Pipeline<Vec<bool>> = Pipeline::new(Selection::Tournament(2))
//!     .mutate(BitFlip::with_probability(0.5))
//!     .evaluate()
//!     .pool(10);
//! assert_eq!(pipeline.pool_size(), Some(10));
//! assert_eq!(pipeline.stage_names(), vec!["mutate", "evaluate"]);
//! ```

use super::individual::{Individual, Population};
use super::selection::{ParentStream, Selection};
use super::types::{Direction, Problem};
use crate::error::{ConfigError, EvoResult, EvolutionError};
use rand::RngCore;

/// Shared state handed to every operator while a generation is built.
pub struct Context<'a, G> {
    /// The run's problem.
    pub problem: &'a dyn Problem<G>,
    /// The run's random number generator.
    pub rng: &'a mut dyn RngCore,
    /// Index of the generation being produced (1 for the first offspring).
    pub generation: usize,
}

/// One stage applied to each offspring after cloning.
pub trait Operator<G>: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Checks the stage's parameters against the genome length.
    fn validate(&self, _genome_length: usize) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Transforms one offspring.
    fn apply(&self, individual: Individual<G>, ctx: &mut Context<'_, G>)
        -> EvoResult<Individual<G>>;

    /// Whether the stage only computes fitness.
    ///
    /// Such stages may be skipped while offspring are built and replaced by
    /// one batched evaluation of the pooled population.
    fn evaluates_only(&self) -> bool {
        false
    }
}

/// A perturbation of a genome in place.
///
/// Wrapped into an [`Operator`] by [`Pipeline::mutate`], which also clears
/// the offspring's cached fitness.
pub trait Mutation<G>: Send + Sync {
    /// Checks the mutation's parameters against the genome length.
    fn validate(&self, _genome_length: usize) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Mutates `genome` in place.
    fn mutate_genome(&self, genome: &mut G, rng: &mut dyn RngCore);

    /// Mutates an individual, invalidating its fitness.
    fn mutate_individual(&self, individual: &mut Individual<G>, rng: &mut dyn RngCore) {
        self.mutate_genome(individual.genome_mut(), rng);
    }
}

struct Mutate<M>(M);

impl<G, M: Mutation<G>> Operator<G> for Mutate<M> {
    fn name(&self) -> &'static str {
        "mutate"
    }

    fn validate(&self, genome_length: usize) -> Result<(), ConfigError> {
        self.0.validate(genome_length)
    }

    fn apply(
        &self,
        mut individual: Individual<G>,
        ctx: &mut Context<'_, G>,
    ) -> EvoResult<Individual<G>> {
        self.0.mutate_individual(&mut individual, ctx.rng);
        Ok(individual)
    }
}

/// Evaluates offspring lacking a cached fitness.
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluate;

impl<G> Operator<G> for Evaluate {
    fn name(&self) -> &'static str {
        "evaluate"
    }

    fn apply(
        &self,
        mut individual: Individual<G>,
        ctx: &mut Context<'_, G>,
    ) -> EvoResult<Individual<G>> {
        individual.evaluate(ctx.problem)?;
        Ok(individual)
    }

    fn evaluates_only(&self) -> bool {
        true
    }
}

/// Selection, operator stages, and pool size for building a generation.
pub struct Pipeline<G> {
    selection: Selection,
    stages: Vec<Box<dyn Operator<G>>>,
    pool_size: Option<usize>,
}

impl<G: Clone + 'static> Pipeline<G> {
    /// Starts a pipeline with the given parent selection.
    pub fn new(selection: Selection) -> Self {
        Self {
            selection,
            stages: Vec::new(),
            pool_size: None,
        }
    }

    /// Appends a mutation stage.
    pub fn mutate<M: Mutation<G> + 'static>(self, mutation: M) -> Self {
        self.then(Mutate(mutation))
    }

    /// Appends an evaluation stage.
    pub fn evaluate(self) -> Self {
        self.then(Evaluate)
    }

    /// Appends an arbitrary stage.
    pub fn then<O: Operator<G> + 'static>(mut self, operator: O) -> Self {
        self.stages.push(Box::new(operator));
        self
    }

    /// Sets the number of offspring collected per generation.
    pub fn pool(mut self, size: usize) -> Self {
        self.pool_size = Some(size);
        self
    }

    /// The parent selection strategy.
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// The configured pool size.
    pub fn pool_size(&self) -> Option<usize> {
        self.pool_size
    }

    /// Names of the operator stages in order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Checks the pipeline against population size and genome length.
    pub fn validate(&self, population_size: usize, genome_length: usize) -> Result<(), ConfigError> {
        self.selection.validate(population_size)?;
        let pool = self.pool_size.ok_or(ConfigError::MissingPool)?;
        if pool != population_size {
            return Err(ConfigError::PoolSizeMismatch {
                pool,
                population_size,
            });
        }
        for stage in &self.stages {
            stage.validate(genome_length)?;
        }
        Ok(())
    }

    /// Lazily produces offspring from `parents`.
    ///
    /// # Panics
    /// Panics if `parents` is empty.
    pub fn offspring<'p, 'c>(
        &'p self,
        parents: &'p Population<G>,
        direction: Direction,
        ctx: &'p mut Context<'c, G>,
    ) -> Offspring<'p, 'c, G> {
        Offspring {
            stages: &self.stages,
            parents,
            source: self.selection.stream(parents, direction),
            ctx,
            skip_evaluation: false,
        }
    }

    /// Builds one generation's offspring and pools them.
    ///
    /// # Errors
    /// [`ConfigError::MissingPool`] if no pool size was set, the first stage
    /// error, or [`EvolutionError::PoolShortfall`] if the parent source ran
    /// dry.
    pub fn produce(
        &self,
        parents: &Population<G>,
        direction: Direction,
        ctx: &mut Context<'_, G>,
    ) -> EvoResult<Vec<Individual<G>>> {
        let size = self.pool_size.ok_or(ConfigError::MissingPool)?;
        pool(self.offspring(parents, direction, ctx), size)
    }

    /// Like [`produce`](Pipeline::produce), but skips evaluation-only stages.
    ///
    /// The pooled offspring are left for the caller to evaluate in one
    /// batch. Stages after a skipped evaluation see unevaluated offspring.
    ///
    /// # Errors
    /// As for [`produce`](Pipeline::produce).
    pub fn produce_unevaluated(
        &self,
        parents: &Population<G>,
        direction: Direction,
        ctx: &mut Context<'_, G>,
    ) -> EvoResult<Vec<Individual<G>>> {
        let size = self.pool_size.ok_or(ConfigError::MissingPool)?;
        let mut offspring = self.offspring(parents, direction, ctx);
        offspring.skip_evaluation = true;
        pool(offspring, size)
    }
}

/// Iterator over finished offspring for one generation.
///
/// Ends when the parent source is exhausted; only [`Selection::Sequential`]
/// ever is.
pub struct Offspring<'p, 'c, G> {
    stages: &'p [Box<dyn Operator<G>>],
    parents: &'p Population<G>,
    source: ParentStream,
    ctx: &'p mut Context<'c, G>,
    skip_evaluation: bool,
}

impl<G: Clone> Iterator for Offspring<'_, '_, G> {
    type Item = EvoResult<Individual<G>>;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.source.next_parent(self.parents, self.ctx.rng)?;
        let mut child = self.parents.get(idx)?.clone();
        for stage in self.stages {
            if self.skip_evaluation && stage.evaluates_only() {
                continue;
            }
            child = match stage.apply(child, self.ctx) {
                Ok(c) => c,
                Err(e) => {
                    tracing::trace!(stage = stage.name(), error = %e, "operator failed");
                    return Some(Err(e));
                }
            };
        }
        Some(Ok(child))
    }
}

/// Collects exactly `size` individuals from `offspring`.
///
/// Stops at the first error. A source that ends early is a wiring fault and
/// fails with [`EvolutionError::PoolShortfall`].
pub fn pool<G, I>(offspring: I, size: usize) -> EvoResult<Vec<Individual<G>>>
where
    I: IntoIterator<Item = EvoResult<Individual<G>>>,
{
    let mut pooled = Vec::with_capacity(size);
    for item in offspring.into_iter().take(size) {
        pooled.push(item?);
    }
    if pooled.len() < size {
        return Err(EvolutionError::PoolShortfall {
            expected: size,
            actual: pooled.len(),
        });
    }
    Ok(pooled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvaluationError;
    use crate::random::create_rng;

    struct SumProblem;

    impl Problem<Vec<i64>> for SumProblem {
        fn direction(&self) -> Direction {
            Direction::Maximize
        }

        fn evaluate(&self, genome: &Vec<i64>) -> Result<f64, EvaluationError> {
            Ok(genome.iter().sum::<i64>() as f64)
        }
    }

    struct AddOne;

    impl Mutation<Vec<i64>> for AddOne {
        fn mutate_genome(&self, genome: &mut Vec<i64>, _rng: &mut dyn RngCore) {
            for g in genome.iter_mut() {
                *g += 1;
            }
        }
    }

    struct Reject;

    impl Operator<Vec<i64>> for Reject {
        fn name(&self) -> &'static str {
            "reject"
        }

        fn apply(
            &self,
            _individual: Individual<Vec<i64>>,
            _ctx: &mut Context<'_, Vec<i64>>,
        ) -> EvoResult<Individual<Vec<i64>>> {
            Err(EvaluationError::new("rejected").into())
        }
    }

    fn parents() -> Population<Vec<i64>> {
        Population::new(vec![
            Individual::with_fitness(vec![1, 1], 2.0),
            Individual::with_fitness(vec![2, 2], 4.0),
            Individual::with_fitness(vec![3, 3], 6.0),
        ])
    }

    #[test]
    fn test_produce_pools_exact_size() {
        let parents = parents();
        let pipeline = Pipeline::new(Selection::Tournament(2))
            .mutate(AddOne)
            .evaluate()
            .pool(3);
        let mut rng = create_rng(1);
        let mut ctx = Context {
            problem: &SumProblem,
            rng: &mut rng,
            generation: 1,
        };
        let kids = pipeline
            .produce(&parents, Direction::Maximize, &mut ctx)
            .unwrap();
        assert_eq!(kids.len(), 3);
        for kid in &kids {
            assert_eq!(kid.fitness(), Some(kid.genome().iter().sum::<i64>() as f64));
        }
    }

    #[test]
    fn test_mutation_never_touches_parents() {
        let parents = parents();
        let snapshot = parents.clone();
        let pipeline = Pipeline::new(Selection::Cyclic).mutate(AddOne).pool(3);
        let mut rng = create_rng(1);
        let mut ctx = Context {
            problem: &SumProblem,
            rng: &mut rng,
            generation: 1,
        };
        let kids = pipeline
            .produce(&parents, Direction::Maximize, &mut ctx)
            .unwrap();

        assert_eq!(parents, snapshot);
        assert_eq!(kids[0].genome(), &vec![2, 2]);
        assert!(kids.iter().all(|k| !k.is_evaluated()));
    }

    #[test]
    fn test_clone_keeps_cached_fitness() {
        let parents = parents();
        let pipeline = Pipeline::new(Selection::Sequential).pool(3);
        let mut rng = create_rng(1);
        let mut ctx = Context {
            problem: &SumProblem,
            rng: &mut rng,
            generation: 1,
        };
        let kids = pipeline
            .produce(&parents, Direction::Maximize, &mut ctx)
            .unwrap();
        assert_eq!(kids, parents.into_individuals());
    }

    #[test]
    fn test_pool_shortfall() {
        let offspring = vec![
            Ok(Individual::new(vec![0i64])),
            Ok(Individual::new(vec![1i64])),
        ];
        let err = pool(offspring, 5).unwrap_err();
        assert!(matches!(
            err,
            EvolutionError::PoolShortfall {
                expected: 5,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_pool_takes_only_size() {
        let offspring = (0..100i64).map(|i| Ok(Individual::new(vec![i])));
        let pooled = pool(offspring, 4).unwrap();
        assert_eq!(pooled.len(), 4);
    }

    #[test]
    fn test_finite_source_underfills_pool() {
        let parents = parents();
        let pipeline: Pipeline<Vec<i64>> = Pipeline::new(Selection::Sequential).pool(3);
        let mut rng = create_rng(1);
        let mut ctx = Context {
            problem: &SumProblem,
            rng: &mut rng,
            generation: 1,
        };
        let err = pool(pipeline.offspring(&parents, Direction::Maximize, &mut ctx), 5).unwrap_err();
        assert!(matches!(
            err,
            EvolutionError::PoolShortfall {
                expected: 5,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_stage_error_propagates() {
        let parents = parents();
        let pipeline = Pipeline::new(Selection::Random).then(Reject).pool(3);
        let mut rng = create_rng(1);
        let mut ctx = Context {
            problem: &SumProblem,
            rng: &mut rng,
            generation: 1,
        };
        let err = pipeline
            .produce(&parents, Direction::Maximize, &mut ctx)
            .unwrap_err();
        assert!(matches!(err, EvolutionError::Evaluation(_)));
    }

    #[test]
    fn test_produce_unevaluated_skips_evaluate_stages() {
        let parents = parents();
        let pipeline = Pipeline::new(Selection::Tournament(2))
            .mutate(AddOne)
            .evaluate()
            .pool(3);
        let mut rng = create_rng(1);
        let mut ctx = Context {
            problem: &SumProblem,
            rng: &mut rng,
            generation: 1,
        };
        let kids = pipeline
            .produce_unevaluated(&parents, Direction::Maximize, &mut ctx)
            .unwrap();
        assert_eq!(kids.len(), 3);
        assert!(kids.iter().all(|k| !k.is_evaluated()));
        assert!(Operator::<Vec<i64>>::evaluates_only(&Evaluate));
        assert!(!Operator::<Vec<i64>>::evaluates_only(&Mutate(AddOne)));
    }

    #[test]
    fn test_produce_unevaluated_matches_produce() {
        let parents = parents();
        let pipeline = Pipeline::new(Selection::Tournament(2))
            .mutate(AddOne)
            .evaluate()
            .pool(3);
        let build = |deferred: bool| {
            let mut rng = create_rng(5);
            let mut ctx = Context {
                problem: &SumProblem,
                rng: &mut rng,
                generation: 1,
            };
            let kids = if deferred {
                pipeline.produce_unevaluated(&parents, Direction::Maximize, &mut ctx)
            } else {
                pipeline.produce(&parents, Direction::Maximize, &mut ctx)
            };
            kids.unwrap()
        };
        let mut deferred = build(true);
        for kid in &mut deferred {
            kid.evaluate(&SumProblem).unwrap();
        }
        assert_eq!(deferred, build(false));
    }

    #[test]
    fn test_validate() {
        let p: Pipeline<Vec<i64>> = Pipeline::new(Selection::Tournament(2)).evaluate();
        assert_eq!(p.validate(10, 5), Err(ConfigError::MissingPool));

        let p = p.pool(8);
        assert_eq!(
            p.validate(10, 5),
            Err(ConfigError::PoolSizeMismatch {
                pool: 8,
                population_size: 10
            })
        );

        let p: Pipeline<Vec<i64>> = Pipeline::new(Selection::Tournament(2)).pool(10);
        assert!(p.validate(10, 5).is_ok());

        let p: Pipeline<Vec<i64>> = Pipeline::new(Selection::Tournament(20)).pool(10);
        assert!(matches!(
            p.validate(10, 5),
            Err(ConfigError::TournamentTooLarge { .. })
        ));
    }
}
