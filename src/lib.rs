//! Multidimensional Knapsack Solver Library
//!
//! Metaheuristics for the 0/1 multidimensional knapsack problem: choose a
//! subset of `n` items maximising total profit subject to `m` capacity
//! constraints.
//!
//! # Features
//!
//! - Construction heuristics (greedy efficiency ratio, random insertion, random repair)
//! - Local search methods (1-flip, swap, VND)
//! - Variable Neighborhood Search with random k-flip perturbation
//! - Population-based methods (Genetic Algorithm, hybrid GA + VNS)
//! - A cooperative [`Deadline`] shared by every nested search of a run
//! - Benchmarking tools
//!
//! # Example
//!
//! ```no_run
//! use mkp_solver::deadline::Deadline;
//! use mkp_solver::heuristics::construction::greedy_construction;
//! use mkp_solver::heuristics::vns::VariableNeighborhoodSearch;
//! use mkp_solver::instance::KnapsackInstance;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! // Load instance
//! let instance = KnapsackInstance::from_file("instance.txt").unwrap();
//!
//! // Construct initial solution
//! let initial = greedy_construction(&instance);
//!
//! // Improve with VNS for at most ten seconds
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let vns = VariableNeighborhoodSearch::default();
//! let outcome = vns.run(&instance, initial, &mut rng, &Deadline::from_secs(10.0));
//!
//! println!("Solution value: {}", outcome.solution.value);
//! ```

pub mod error;
pub mod instance;
pub mod solution;
pub mod deadline;
pub mod heuristics;
pub mod config;
pub mod benchmark;

pub use config::{Algorithm, SolverConfig};
pub use deadline::{Deadline, Termination};
pub use error::{KnapsackError, KnapsackResult};
pub use instance::KnapsackInstance;
pub use solution::{RunOutcome, Solution};
