//! Selection and reproduction between generations.
//!
//! A finished generation is ranked by fitness. The top `elite_percent`
//! percent pass their brains on unchanged; every other slot is filled with a
//! mutated clone of a parent drawn uniformly from the top ranks.

use rand::Rng;

use super::agent::Agent;
use super::brain::NeuralNet;
use super::params::Params;

/// Anything that can be ranked and bred from.
pub trait Individual {
    /// Selection score; higher is better.
    fn fitness(&self) -> f64;

    /// The network passed on to offspring.
    fn brain(&self) -> &NeuralNet;
}

impl Individual for Agent {
    fn fitness(&self) -> f64 {
        Agent::fitness(self)
    }

    fn brain(&self) -> &NeuralNet {
        Agent::brain(self)
    }
}

/// Builds the next generation's brains from a ranked population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvolutionEngine {
    elite_percent: usize,
    parent_pool: usize,
}

impl EvolutionEngine {
    /// Creates an engine.
    ///
    /// # Arguments
    ///
    /// * `elite_percent` - Percentage of the population carried over unmutated
    /// * `parent_pool` - Parents are drawn from at most this many top-ranked individuals
    pub fn new(elite_percent: usize, parent_pool: usize) -> Self {
        Self {
            elite_percent,
            parent_pool,
        }
    }

    /// Creates an engine from the evolution settings in `params`.
    pub fn from_params(params: &Params) -> Self {
        Self::new(params.elite_percent, params.parent_pool)
    }

    /// Number of elites for a population of `population` individuals, rounded down.
    pub fn elite_count(&self, population: usize) -> usize {
        self.elite_percent * population / 100
    }

    /// Orders individuals by descending fitness; equal fitness keeps input order.
    pub fn rank<'a, T: Individual>(&self, population: &'a [T]) -> Vec<&'a T> {
        let mut ranked: Vec<&T> = population.iter().collect();
        ranked.sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
        ranked
    }

    /// Produces one brain per member of `population` for the next generation.
    ///
    /// Elites come first, in rank order, as exact clones. The rest are clones
    /// of uniformly chosen parents from the top `min(parent_pool, n)` ranks,
    /// each mutated once.
    pub fn next_generation<T: Individual, R: Rng + ?Sized>(&self, population: &[T], rng: &mut R) -> Vec<NeuralNet> {
        let n = population.len();
        if n == 0 {
            return Vec::new();
        }

        let ranked = self.rank(population);
        let elites = self.elite_count(n).min(n);
        let pool = self.parent_pool.clamp(1, n);

        let mut next: Vec<NeuralNet> = Vec::with_capacity(n);
        next.extend(ranked.iter().take(elites).map(|ind| ind.brain().clone()));

        while next.len() < n {
            let parent = ranked[rng.gen_range(0..pool)];
            let mut child = parent.brain().clone();
            child.mutate(rng);
            next.push(child);
        }

        tracing::info!(
            population = n,
            elites,
            best_fitness = ranked[0].fitness(),
            "bred next generation"
        );

        next
    }
}
