//! Local search improvement heuristics for the knapsack problem.
//!
//! This module implements:
//! - 1-flip search (add or drop one item)
//! - Swap search (exchange a selected and an unselected item)
//! - Variable Neighborhood Descent over both

use crate::deadline::{Checked, Deadline, Expired};
use crate::instance::KnapsackInstance;
use crate::solution::{Move, Solution};

/// Trait for local search improvement methods
pub trait LocalSearch {
    /// Improve `solution` in place, returning whether its value increased.
    fn improve(&self, instance: &KnapsackInstance, solution: &mut Solution) -> bool;
    fn name(&self) -> &str;
}

/// 1-Flip Local Search
///
/// Scans items in index order and keeps every flip that is feasible and
/// strictly improves the objective, carrying on with the remaining items of
/// the same pass. Passes repeat until one accepts nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlipSearch;

impl FlipSearch {
    pub fn new() -> Self {
        FlipSearch
    }

    /// One full pass over the items; returns the number of accepted flips
    pub fn pass(&self, instance: &KnapsackInstance, solution: &mut Solution) -> usize {
        (0..instance.n)
            .filter(|&i| Move::Flip(i).try_improve(solution, instance))
            .count()
    }
}

impl LocalSearch for FlipSearch {
    fn improve(&self, instance: &KnapsackInstance, solution: &mut Solution) -> bool {
        let initial = solution.value;
        while self.pass(instance, solution) > 0 {}
        solution.value > initial
    }

    fn name(&self) -> &str {
        "1-Flip"
    }
}

/// Swap Local Search
///
/// Tries pairs `(i, j)`, `i < j`, whose status differ. The first feasible
/// improving exchange is applied and the scan restarts from the first pair;
/// the search ends after a full scan without an accepted exchange.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwapSearch;

impl SwapSearch {
    pub fn new() -> Self {
        SwapSearch
    }

    /// Scan from the first pair, applying the first improving exchange found
    pub fn first_improvement(
        &self,
        instance: &KnapsackInstance,
        solution: &mut Solution,
    ) -> Option<Move> {
        let n = instance.n;
        for i in 0..n {
            for j in i + 1..n {
                if solution.selected[i] == solution.selected[j] {
                    continue;
                }
                let mv = Move::Swap(i, j);
                if mv.try_improve(solution, instance) {
                    return Some(mv);
                }
            }
        }
        None
    }
}

impl LocalSearch for SwapSearch {
    fn improve(&self, instance: &KnapsackInstance, solution: &mut Solution) -> bool {
        let initial = solution.value;
        while self.first_improvement(instance, solution).is_some() {}
        solution.value > initial
    }

    fn name(&self) -> &str {
        "Swap"
    }
}

/// Variable Neighborhood Descent (VND)
///
/// Applies the operators in order: any improvement sends the descent back to
/// the first operator, a failure moves on to the next one, and the descent
/// ends when the last operator fails.
pub struct VND {
    /// List of local search operators
    operators: Vec<Box<dyn LocalSearch + Send + Sync>>,
}

impl VND {
    /// 1-flip first, then swap
    pub fn with_standard_operators() -> Self {
        let operators: Vec<Box<dyn LocalSearch + Send + Sync>> =
            vec![Box::new(FlipSearch::new()), Box::new(SwapSearch::new())];

        VND { operators }
    }

    /// Descend to a local optimum of every operator.
    ///
    /// The deadline is checked once per operator application, so a single
    /// sweep may run past it before the descent notices. On expiry the
    /// solution holds the (feasible) state reached at that checkpoint.
    pub fn descend(
        &self,
        instance: &KnapsackInstance,
        solution: &mut Solution,
        deadline: &Deadline,
    ) -> Checked<bool> {
        let initial = solution.value;
        let mut k = 0;

        while k < self.operators.len() {
            if self.operators[k].improve(instance, solution) {
                k = 0; // Restart from first operator
            } else {
                k += 1; // Move to next operator
            }
            deadline.check()?;
        }

        Ok(solution.value > initial)
    }
}

impl Default for VND {
    fn default() -> Self {
        Self::with_standard_operators()
    }
}

impl LocalSearch for VND {
    fn improve(&self, instance: &KnapsackInstance, solution: &mut Solution) -> bool {
        let initial = solution.value;
        match self.descend(instance, solution, &Deadline::unbounded()) {
            Ok(improved) => improved,
            Err(Expired) => solution.value > initial,
        }
    }

    fn name(&self) -> &str {
        "VND"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn create_test_instance() -> KnapsackInstance {
        KnapsackInstance::new(
            "test",
            vec![10, 7, 6, 3],
            vec![10],
            vec![vec![6, 5, 5, 1]],
        )
        .unwrap()
    }

    #[test]
    fn test_flip_continues_scanning_after_success() {
        // A single pass accepts item 0 and keeps going to accept item 3.
        let instance = create_test_instance();
        let mut solution = Solution::empty(4);

        assert_eq!(FlipSearch.pass(&instance, &mut solution), 2);
        assert_eq!(solution.selected, vec![true, false, false, true]);
        assert_eq!(solution.value, 13);
    }

    #[test]
    fn test_flip_never_drops_items() {
        let instance = create_test_instance();
        let mut solution = Solution::from_selection(&instance, vec![false, true, false, true]);

        assert!(!FlipSearch.improve(&instance, &mut solution));
        assert_eq!(solution.selected, vec![false, true, false, true]);
    }

    #[test]
    fn test_swap_restarts_after_success() {
        // From {1}: the first improving pair is (0, 1), after which the scan
        // restarts from (0, 1) and finds nothing better.
        let instance = create_test_instance();
        let mut solution = Solution::from_selection(&instance, vec![false, true, false, false]);

        assert_eq!(SwapSearch.first_improvement(&instance, &mut solution), Some(Move::Swap(0, 1)));
        assert_eq!(solution.selected, vec![true, false, false, false]);
        assert_eq!(SwapSearch.first_improvement(&instance, &mut solution), None);
    }

    #[test]
    fn test_swap_restart_changes_trajectory() {
        // From {2}: (0, 2) gives {0}. Restarting at (0, 1) then reaches {1};
        // a scan that carried on to (0, 3) would have ended in {3} instead.
        let instance =
            KnapsackInstance::new("t", vec![4, 9, 1, 9], vec![10], vec![vec![3, 4, 4, 5]])
                .unwrap();
        let mut solution = Solution::from_selection(&instance, vec![false, false, true, false]);

        assert!(SwapSearch.improve(&instance, &mut solution));
        assert_eq!(solution.selected, vec![false, true, false, false]);
        assert_eq!(solution.value, 9);
    }

    #[test]
    fn test_vnd_reaches_swap_optimum() {
        // Item 0 is worth more than item 1, but flip alone can only add items.
        let instance =
            KnapsackInstance::new("t", vec![8, 5, 1], vec![6], vec![vec![6, 4, 5]]).unwrap();
        let mut solution = Solution::from_selection(&instance, vec![false, true, false]);
        let vnd = VND::with_standard_operators();

        assert_eq!(vnd.descend(&instance, &mut solution, &Deadline::unbounded()), Ok(true));
        assert_eq!(solution.value, 8);
        assert!(solution.is_feasible(&instance));
    }

    #[test]
    fn test_vnd_is_monotone_and_idempotent() {
        let instance = create_test_instance();
        let vnd = VND::with_standard_operators();
        let mut solution = Solution::from_selection(&instance, vec![false, false, true, false]);
        let before = solution.value;

        vnd.improve(&instance, &mut solution);
        assert!(solution.value >= before);

        let optimum = solution.clone();
        assert!(!vnd.improve(&instance, &mut solution));
        assert_eq!(solution, optimum);
    }

    #[test]
    fn test_vnd_reports_expired_deadline() {
        let instance = create_test_instance();
        let vnd = VND::with_standard_operators();
        let mut solution = Solution::empty(4);
        let deadline = Deadline::after(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));

        assert_eq!(vnd.descend(&instance, &mut solution, &deadline), Err(Expired));
        assert!(solution.is_feasible(&instance));
        assert_eq!(solution.value, instance.evaluate(&solution.selected));
    }
}
