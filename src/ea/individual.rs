//! Individuals and populations.

use super::types::{Direction, Problem};
use crate::error::EvaluationError;

/// A genome paired with its cached fitness.
///
/// The fitness is `None` until the individual is evaluated. Any mutable
/// access to the genome through [`genome_mut`](Individual::genome_mut)
/// clears it, so a stale fitness can never outlive a mutation.
///
/// `Clone` produces a structurally independent copy: mutating the clone
/// never affects the original.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Individual<G> {
    genome: G,
    fitness: Option<f64>,
}

impl<G> Individual<G> {
    /// Creates an unevaluated individual.
    pub fn new(genome: G) -> Self {
        Self {
            genome,
            fitness: None,
        }
    }

    /// Creates an individual with a known fitness.
    pub fn with_fitness(genome: G, fitness: f64) -> Self {
        Self {
            genome,
            fitness: Some(fitness),
        }
    }

    /// The genome.
    pub fn genome(&self) -> &G {
        &self.genome
    }

    /// Mutable access to the genome. Clears the cached fitness.
    pub fn genome_mut(&mut self) -> &mut G {
        self.fitness = None;
        &mut self.genome
    }

    /// Consumes the individual, returning its genome.
    pub fn into_genome(self) -> G {
        self.genome
    }

    /// The cached fitness, if evaluated.
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Whether a fitness is cached.
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Stores a fitness computed elsewhere.
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    /// Evaluates the genome unless a fitness is already cached.
    pub fn evaluate<P>(&mut self, problem: &P) -> Result<f64, EvaluationError>
    where
        P: Problem<G> + ?Sized,
    {
        if let Some(f) = self.fitness {
            return Ok(f);
        }
        let f = problem.evaluate(&self.genome)?;
        self.fitness = Some(f);
        Ok(f)
    }
}

/// An ordered, fixed-size collection of individuals forming one generation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Population<G> {
    individuals: Vec<Individual<G>>,
}

impl<G> Population<G> {
    /// Wraps a vector of individuals.
    pub fn new(individuals: Vec<Individual<G>>) -> Self {
        Self { individuals }
    }

    /// Number of individuals.
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Whether the population is empty.
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Individual at `index`.
    pub fn get(&self, index: usize) -> Option<&Individual<G>> {
        self.individuals.get(index)
    }

    /// Iterates in population order.
    pub fn iter(&self) -> std::slice::Iter<'_, Individual<G>> {
        self.individuals.iter()
    }

    /// The individuals as a slice.
    pub fn individuals(&self) -> &[Individual<G>] {
        &self.individuals
    }

    pub(crate) fn individuals_mut(&mut self) -> &mut [Individual<G>] {
        &mut self.individuals
    }

    /// Consumes the population, returning its individuals.
    pub fn into_individuals(self) -> Vec<Individual<G>> {
        self.individuals
    }

    /// Index of the best evaluated individual; ties go to the first.
    pub fn best_index(&self, direction: Direction) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, ind) in self.individuals.iter().enumerate() {
            let Some(f) = ind.fitness else { continue };
            match best {
                Some((_, bf)) if !direction.is_better(f, bf) => {}
                _ => best = Some((i, f)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// The best evaluated individual; ties go to the first.
    pub fn best(&self, direction: Direction) -> Option<&Individual<G>> {
        self.best_index(direction).map(|i| &self.individuals[i])
    }

    /// Fitness of the best evaluated individual.
    pub fn best_fitness(&self, direction: Direction) -> Option<f64> {
        self.best(direction).and_then(Individual::fitness)
    }

    /// Evaluates every individual lacking a cached fitness, in order.
    pub fn evaluate_all<P>(&mut self, problem: &P) -> Result<(), EvaluationError>
    where
        P: Problem<G> + ?Sized,
    {
        for ind in &mut self.individuals {
            ind.evaluate(problem)?;
        }
        Ok(())
    }
}

impl<G> From<Vec<Individual<G>>> for Population<G> {
    fn from(individuals: Vec<Individual<G>>) -> Self {
        Self::new(individuals)
    }
}

impl<'a, G> IntoIterator for &'a Population<G> {
    type Item = &'a Individual<G>;
    type IntoIter = std::slice::Iter<'a, Individual<G>>;

    fn into_iter(self) -> Self::IntoIter {
        self.individuals.iter()
    }
}
