//! Solver configuration and algorithm dispatch.
//!
//! A [`SolverConfig`] names the algorithm to run together with every
//! parameter it needs. It can be loaded from a JSON file; missing fields take
//! their defaults.

use crate::deadline::{termination_of, Deadline, Termination};
use crate::error::{KnapsackError, KnapsackResult};
use crate::heuristics::construction::{Construction, ConstructionHeuristic};
use crate::heuristics::genetic::{GaConfig, GeneticAlgorithm};
use crate::heuristics::hybrid::{HybridConfig, HybridGaVns};
use crate::heuristics::local_search::VND;
use crate::heuristics::vns::{VariableNeighborhoodSearch, VnsConfig};
use crate::instance::KnapsackInstance;
use crate::solution::{RunOutcome, Solution};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Search method run after (or instead of) the construction step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Construction only
    Construct,
    /// Construction followed by Variable Neighborhood Descent
    Vnd,
    /// Construction followed by Variable Neighborhood Search
    #[default]
    Vns,
    /// Genetic Algorithm
    Genetic,
    /// Hybrid GA + VNS
    Hybrid,
}

impl Algorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Construct => "Construct",
            Algorithm::Vnd => "VND",
            Algorithm::Vns => "VNS",
            Algorithm::Genetic => "GeneticAlgorithm",
            Algorithm::Hybrid => "HybridGaVns",
        }
    }
}

/// Complete description of one solver run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub algorithm: Algorithm,
    /// Starting solution for `construct`, `vnd` and `vns`
    pub construction: Construction,
    /// Wall-clock budget in seconds, 0 means unbounded
    pub time_limit: f64,
    /// Seed of the run's random source
    pub seed: u64,
    pub vns: VnsConfig,
    pub ga: GaConfig,
    pub hybrid: HybridConfig,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            algorithm: Algorithm::default(),
            construction: Construction::default(),
            time_limit: 0.0,
            seed: 42,
            vns: VnsConfig::default(),
            ga: GaConfig::default(),
            hybrid: HybridConfig::default(),
        }
    }
}

impl SolverConfig {
    /// Load a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> KnapsackResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: SolverConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> KnapsackResult<()> {
        if self.time_limit.is_nan() || self.time_limit < 0.0 {
            return Err(KnapsackError::InvalidConfig(format!(
                "time limit must be a non-negative number of seconds, got {}",
                self.time_limit
            )));
        }
        match self.algorithm {
            Algorithm::Genetic => self.ga.validate(),
            Algorithm::Hybrid => self.hybrid.ga.validate(),
            _ => Ok(()),
        }
    }

    /// Run the configured algorithm with a generator seeded from `seed`
    pub fn solve(&self, instance: &KnapsackInstance) -> KnapsackResult<RunOutcome> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.solve_with_rng(instance, &mut rng)
    }

    /// Run the configured algorithm with a caller-provided random source.
    ///
    /// The deadline starts when this is called.
    pub fn solve_with_rng<R: Rng>(
        &self,
        instance: &KnapsackInstance,
        rng: &mut R,
    ) -> KnapsackResult<RunOutcome> {
        self.validate()?;
        let deadline = Deadline::from_secs(self.time_limit);

        match self.algorithm {
            Algorithm::Construct => {
                let solution = self.construction.build(instance, rng);
                Ok(self.outcome(solution, &deadline, Termination::Completed))
            }
            Algorithm::Vnd => {
                let mut solution = self.construction.build(instance, rng);
                let result =
                    VND::with_standard_operators().descend(instance, &mut solution, &deadline);
                Ok(self.outcome(solution, &deadline, termination_of(&result)))
            }
            Algorithm::Vns => {
                let initial = self.construction.build(instance, rng);
                let vns = VariableNeighborhoodSearch::new(self.vns);
                let mut outcome = vns.run(instance, initial, rng, &deadline);
                outcome.algorithm = format!("{}+VNS", self.construction.name());
                Ok(outcome)
            }
            Algorithm::Genetic => GeneticAlgorithm::new(self.ga).run(instance, rng, &deadline),
            Algorithm::Hybrid => HybridGaVns::new(self.hybrid).run(instance, rng, &deadline),
        }
    }

    fn outcome(
        &self,
        solution: Solution,
        deadline: &Deadline,
        termination: Termination,
    ) -> RunOutcome {
        let algorithm = match self.algorithm {
            Algorithm::Construct => self.construction.name().to_string(),
            other => format!("{}+{}", self.construction.name(), other.name()),
        };
        RunOutcome {
            solution,
            algorithm,
            termination,
            iterations: 0,
            computation_time: deadline.elapsed().as_secs_f64(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::construction::greedy_construction;

    fn create_test_instance() -> KnapsackInstance {
        KnapsackInstance::new(
            "test",
            vec![7, 3, 9, 4, 4, 8],
            vec![12, 9],
            vec![vec![3, 1, 5, 2, 2, 4], vec![2, 2, 4, 1, 3, 3]],
        )
        .unwrap()
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SolverConfig =
            serde_json::from_str(r#"{"algorithm": "hybrid", "ga": {"generations": 7}}"#).unwrap();

        assert_eq!(config.algorithm, Algorithm::Hybrid);
        assert_eq!(config.ga.generations, 7);
        assert_eq!(config.ga.population_size, 100);
        assert_eq!(config.vns, VnsConfig::default());
        assert_eq!(config.construction, Construction::Greedy);
    }

    #[test]
    fn test_construction_names_in_json() {
        let config: SolverConfig =
            serde_json::from_str(r#"{"construction": "random-repair"}"#).unwrap();
        assert_eq!(config.construction, Construction::RandomRepair);
    }

    #[test]
    fn test_negative_time_limit_rejected() {
        let config = SolverConfig {
            time_limit: -1.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(KnapsackError::InvalidConfig(_))));
    }

    #[test]
    fn test_huge_time_limit_runs_unbounded() {
        let instance = create_test_instance();
        let config = SolverConfig {
            algorithm: Algorithm::Construct,
            time_limit: 1e30,
            ..Default::default()
        };

        assert!(config.validate().is_ok());
        let outcome = config.solve(&instance).unwrap();
        assert_eq!(outcome.solution, greedy_construction(&instance));
        assert_eq!(outcome.termination, Termination::Completed);
    }

    #[test]
    fn test_construct_only_returns_greedy() {
        let instance = create_test_instance();
        let config = SolverConfig {
            algorithm: Algorithm::Construct,
            ..Default::default()
        };

        let outcome = config.solve(&instance).unwrap();
        assert_eq!(outcome.solution, greedy_construction(&instance));
        assert_eq!(outcome.algorithm, "Greedy");
        assert_eq!(outcome.termination, Termination::Completed);
    }

    #[test]
    fn test_every_algorithm_returns_feasible() {
        let instance = create_test_instance();
        for algorithm in [
            Algorithm::Construct,
            Algorithm::Vnd,
            Algorithm::Vns,
            Algorithm::Genetic,
            Algorithm::Hybrid,
        ] {
            let config = SolverConfig {
                algorithm,
                construction: Construction::Random,
                vns: VnsConfig::with_params(20, 2),
                ga: GaConfig {
                    population_size: 10,
                    generations: 5,
                    mutation_rate: 0.1,
                },
                hybrid: HybridConfig {
                    ga: GaConfig {
                        population_size: 4,
                        generations: 2,
                        mutation_rate: 0.1,
                    },
                    vns: VnsConfig::with_params(5, 2),
                },
                ..Default::default()
            };

            let outcome = config.solve(&instance).unwrap();
            assert!(outcome.solution.is_feasible(&instance), "{:?}", algorithm);
            assert_eq!(
                outcome.solution.value,
                instance.evaluate(&outcome.solution.selected)
            );
        }
    }
}
