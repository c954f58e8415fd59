//! Variable Neighborhood Search for the knapsack problem.
//!
//! Each iteration kicks the current solution with a random k-flip
//! perturbation, descends again with VND, and either adopts the result as the
//! new incumbent or reverts to the incumbent.

use crate::deadline::{termination_of, Checked, Deadline, Termination};
use crate::instance::KnapsackInstance;
use crate::solution::{RunOutcome, Solution};
use crate::heuristics::local_search::VND;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Toggle `k` items drawn uniformly with replacement.
///
/// Each toggle is validated on its own and undone at once if it breaks a
/// capacity, so the solution stays feasible throughout. Drawing the same item
/// twice cancels out, which makes the effective strength at most `k`.
pub fn perturb<R: Rng + ?Sized>(
    solution: &mut Solution,
    instance: &KnapsackInstance,
    k: usize,
    rng: &mut R,
) {
    for _ in 0..k {
        let item = rng.gen_range(0..instance.n);
        solution.flip(instance, item);
        if !solution.is_feasible(instance) {
            solution.flip(instance, item);
        }
    }
}

/// VNS parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VnsConfig {
    /// Number of perturbation cycles
    pub max_iterations: usize,
    /// Number of random flips per perturbation
    pub perturbation_strength: usize,
}

impl Default for VnsConfig {
    fn default() -> Self {
        VnsConfig {
            max_iterations: 100,
            perturbation_strength: 2,
        }
    }
}

impl VnsConfig {
    pub fn with_params(max_iterations: usize, perturbation_strength: usize) -> Self {
        VnsConfig {
            max_iterations,
            perturbation_strength,
        }
    }
}

/// Summary of a VNS pass
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    /// Perturbation cycles completed
    pub iterations: usize,
    /// `(cycles completed, incumbent value)` after the initial descent and
    /// after every cycle that raised the incumbent
    pub improvements: Vec<(usize, i64)>,
    pub termination: Termination,
}

/// Variable Neighborhood Search
pub struct VariableNeighborhoodSearch {
    pub config: VnsConfig,
    vnd: VND,
}

impl VariableNeighborhoodSearch {
    pub fn new(config: VnsConfig) -> Self {
        VariableNeighborhoodSearch {
            config,
            vnd: VND::with_standard_operators(),
        }
    }

    pub fn with_params(max_iterations: usize, perturbation_strength: usize) -> Self {
        Self::new(VnsConfig::with_params(max_iterations, perturbation_strength))
    }

    /// Improve `solution` in place.
    ///
    /// Whether the search completes or stops at the deadline, `solution`
    /// ends up holding the better of the working solution and the incumbent.
    pub fn search<R: Rng + ?Sized>(
        &self,
        instance: &KnapsackInstance,
        solution: &mut Solution,
        rng: &mut R,
        deadline: &Deadline,
    ) -> SearchReport {
        let mut incumbent = solution.clone();
        let mut report = SearchReport {
            iterations: 0,
            improvements: Vec::new(),
            termination: Termination::Completed,
        };

        let result =
            self.iterate(instance, solution, &mut incumbent, &mut report, rng, deadline);
        report.termination = termination_of(&result);
        if result.is_err() {
            log::info!(
                "VNS stopped by deadline after {} iterations (incumbent {})",
                report.iterations,
                incumbent.value.max(solution.value)
            );
        }

        if solution.value > incumbent.value {
            incumbent.copy_from(solution);
        }
        solution.copy_from(&incumbent);
        report
    }

    fn iterate<R: Rng + ?Sized>(
        &self,
        instance: &KnapsackInstance,
        current: &mut Solution,
        incumbent: &mut Solution,
        report: &mut SearchReport,
        rng: &mut R,
        deadline: &Deadline,
    ) -> Checked<()> {
        self.vnd.descend(instance, current, deadline)?;
        if current.value > incumbent.value {
            incumbent.copy_from(current);
        }
        report.improvements.push((0, incumbent.value));

        // `current` is a VND local optimum at the top of every cycle, either
        // the accepted descent or the restored incumbent.
        while report.iterations < self.config.max_iterations {
            deadline.check()?;

            perturb(current, instance, self.config.perturbation_strength, rng);
            self.vnd.descend(instance, current, deadline)?;

            if current.value > incumbent.value {
                log::debug!(
                    "VNS iteration {}: incumbent {} -> {}",
                    report.iterations,
                    incumbent.value,
                    current.value
                );
                incumbent.copy_from(current);
                report.improvements.push((report.iterations + 1, incumbent.value));
            } else {
                current.copy_from(incumbent);
            }

            report.iterations += 1;
        }

        Ok(())
    }

    /// Run VNS from `initial` and return the best solution found
    pub fn run<R: Rng + ?Sized>(
        &self,
        instance: &KnapsackInstance,
        initial: Solution,
        rng: &mut R,
        deadline: &Deadline,
    ) -> RunOutcome {
        let mut solution = initial;
        let report = self.search(instance, &mut solution, rng, deadline);

        RunOutcome {
            solution,
            algorithm: "VNS".to_string(),
            termination: report.termination,
            iterations: report.iterations,
            computation_time: deadline.elapsed().as_secs_f64(),
        }
    }
}

impl Default for VariableNeighborhoodSearch {
    fn default() -> Self {
        Self::new(VnsConfig::default())
    }
}
