//! Heuristics module for the multidimensional knapsack problem.
//!
//! This module exports all construction, improvement and population-based
//! heuristics.

pub mod construction;
pub mod local_search;
pub mod vns;
pub mod genetic;
pub mod hybrid;

pub use construction::*;
pub use local_search::*;
pub use vns::*;
pub use genetic::*;
pub use hybrid::*;
