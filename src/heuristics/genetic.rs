//! Genetic Algorithm for the knapsack problem.
//!
//! This module implements a generational GA with:
//! - Random initial population
//! - Binary tournament selection
//! - One-point crossover with fallback to the first parent
//! - Single-flip mutation
//!
//! Replacement is fully generational (no elitism). The answer is the best
//! individual of the last complete generation.

use crate::deadline::{termination_of, Checked, Deadline};
use crate::error::{KnapsackError, KnapsackResult};
use crate::heuristics::construction::random_construction;
use crate::heuristics::vns::perturb;
use crate::instance::KnapsackInstance;
use crate::solution::{RunOutcome, Solution};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Individual in the genetic algorithm population
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Individual {
    pub solution: Solution,
    /// Fitness (the objective value)
    pub fitness: i64,
}

impl Individual {
    pub fn new(solution: Solution) -> Self {
        let fitness = solution.value;
        Individual { solution, fitness }
    }
}

/// Genetic Algorithm configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Population size
    pub population_size: usize,
    /// Number of generations
    pub generations: usize,
    /// Probability of mutating an offspring; values >= 1 always mutate
    pub mutation_rate: f64,
}

impl Default for GaConfig {
    fn default() -> Self {
        GaConfig {
            population_size: 100,
            generations: 100,
            mutation_rate: 0.05,
        }
    }
}

impl GaConfig {
    pub fn validate(&self) -> KnapsackResult<()> {
        if self.population_size == 0 {
            return Err(KnapsackError::InvalidConfig(
                "population size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Index of the winner between two sampled individuals: the strictly fitter
/// one, or the second on a tie.
fn tournament_winner(population: &[Individual], i1: usize, i2: usize) -> usize {
    if population[i1].fitness > population[i2].fitness {
        i1
    } else {
        i2
    }
}

/// Binary tournament with replacement
pub fn tournament_select<'a, R: Rng + ?Sized>(
    population: &'a [Individual],
    rng: &mut R,
) -> &'a Individual {
    let i1 = rng.gen_range(0..population.len());
    let i2 = rng.gen_range(0..population.len());
    &population[tournament_winner(population, i1, i2)]
}

/// Child taking `parent1` genes below `cut` and `parent2` genes from `cut` on.
///
/// An infeasible cross is discarded in favour of a copy of `parent1`.
pub fn crossover_at(
    instance: &KnapsackInstance,
    parent1: &Solution,
    parent2: &Solution,
    cut: usize,
) -> Solution {
    let selected: Vec<bool> = parent1.selected[..cut]
        .iter()
        .chain(&parent2.selected[cut..])
        .copied()
        .collect();
    let child = Solution::from_selection(instance, selected);

    if child.is_feasible(instance) {
        child
    } else {
        parent1.clone()
    }
}

/// One-point crossover at a uniformly drawn cut in `[0, n)`
pub fn crossover<R: Rng + ?Sized>(
    instance: &KnapsackInstance,
    parent1: &Solution,
    parent2: &Solution,
    rng: &mut R,
) -> Solution {
    let cut = rng.gen_range(0..instance.n);
    crossover_at(instance, parent1, parent2, cut)
}

/// With probability `rate`, toggle one random item if the result stays feasible.
pub fn mutate<R: Rng + ?Sized>(
    solution: &mut Solution,
    instance: &KnapsackInstance,
    rate: f64,
    rng: &mut R,
) {
    if rng.gen::<f64>() < rate {
        // A single-flip perturbation already reverts an infeasible toggle.
        perturb(solution, instance, 1, rng);
    }
}

fn reserve_population(capacity: usize) -> KnapsackResult<Vec<Individual>> {
    let mut population = Vec::new();
    population.try_reserve_exact(capacity)?;
    Ok(population)
}

fn best_of(population: &[Individual]) -> Option<&Individual> {
    // First maximum wins, as in a left-to-right scan.
    population
        .iter()
        .reduce(|best, ind| if ind.fitness > best.fitness { ind } else { best })
}

/// Genetic Algorithm implementation
pub struct GeneticAlgorithm {
    pub config: GaConfig,
}

impl GeneticAlgorithm {
    pub fn new(config: GaConfig) -> Self {
        GeneticAlgorithm { config }
    }

    pub fn with_params(population_size: usize, generations: usize, mutation_rate: f64) -> Self {
        Self::new(GaConfig {
            population_size,
            generations,
            mutation_rate,
        })
    }

    /// Run the genetic algorithm
    pub fn run<R: Rng + ?Sized>(
        &self,
        instance: &KnapsackInstance,
        rng: &mut R,
        deadline: &Deadline,
    ) -> KnapsackResult<RunOutcome> {
        self.run_with_polish(instance, rng, deadline, "GeneticAlgorithm", |_, _| Ok(()))
    }

    /// Run the generational loop, passing every offspring through `polish`
    /// before it joins the new population.
    pub(crate) fn run_with_polish<R, F>(
        &self,
        instance: &KnapsackInstance,
        rng: &mut R,
        deadline: &Deadline,
        algorithm: &str,
        mut polish: F,
    ) -> KnapsackResult<RunOutcome>
    where
        R: Rng + ?Sized,
        F: FnMut(&mut Solution, &mut R) -> Checked<()>,
    {
        self.config.validate()?;
        log::info!(
            "{} on {}: population {}, {} generations, mutation rate {}",
            algorithm,
            instance.name,
            self.config.population_size,
            self.config.generations,
            self.config.mutation_rate
        );

        let mut population = reserve_population(self.config.population_size)?;
        for _ in 0..self.config.population_size {
            population.push(Individual::new(random_construction(instance, rng)));
        }
        let mut next = reserve_population(self.config.population_size)?;

        let mut generation = 0;
        let result = self.evolve(
            instance,
            &mut population,
            &mut next,
            &mut generation,
            rng,
            deadline,
            &mut polish,
        );
        let termination = termination_of(&result);
        if result.is_err() {
            log::info!(
                "{} stopped by deadline during generation {}",
                algorithm,
                generation + 1
            );
        }

        let best = best_of(&population)
            .map(|ind| ind.solution.clone())
            .ok_or_else(|| KnapsackError::InvalidConfig("empty population".to_string()))?;
        log::info!("{} finished: best value {}", algorithm, best.value);

        Ok(RunOutcome {
            solution: best,
            algorithm: algorithm.to_string(),
            termination,
            iterations: generation,
            computation_time: deadline.elapsed().as_secs_f64(),
        })
    }

    /// Create new generations until the budget is spent.
    ///
    /// `population` always holds the last complete generation; an interrupted
    /// generation is left behind in `next` and discarded.
    #[allow(clippy::too_many_arguments)]
    fn evolve<R, F>(
        &self,
        instance: &KnapsackInstance,
        population: &mut Vec<Individual>,
        next: &mut Vec<Individual>,
        generation: &mut usize,
        rng: &mut R,
        deadline: &Deadline,
        polish: &mut F,
    ) -> Checked<()>
    where
        R: Rng + ?Sized,
        F: FnMut(&mut Solution, &mut R) -> Checked<()>,
    {
        while *generation < self.config.generations {
            next.clear();

            for _ in 0..self.config.population_size {
                deadline.check()?;

                let parent1 = tournament_select(population, rng);
                let parent2 = tournament_select(population, rng);
                let mut child = crossover(instance, &parent1.solution, &parent2.solution, rng);
                mutate(&mut child, instance, self.config.mutation_rate, rng);
                child.evaluate(instance);

                polish(&mut child, &mut *rng)?;
                next.push(Individual::new(child));
            }

            // Full replacement; the old buffer is reused for the next generation.
            std::mem::swap(population, next);
            *generation += 1;

            if let Some(best) = best_of(population) {
                log::debug!("Gen {}  best {}", generation, best.fitness);
            }
        }

        Ok(())
    }
}

impl Default for GeneticAlgorithm {
    fn default() -> Self {
        Self::new(GaConfig::default())
    }
}
