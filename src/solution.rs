//! Solution representation and manipulation for the knapsack problem.
//!
//! A [`Solution`] owns its selection buffer; cloning always duplicates it.
//! Every mutation goes through [`Solution::flip`] (or a [`Move`]) so the
//! cached objective value never drifts from the selection.

use crate::deadline::Termination;
use crate::error::KnapsackResult;
use crate::instance::KnapsackInstance;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Represents a candidate solution: a selection vector and its objective value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    /// `selected[i]` is true when item `i` is in the knapsack
    pub selected: Vec<bool>,
    /// Objective value Z = sum of selected profits
    pub value: i64,
}

impl Solution {
    /// Create the empty selection for `n` items
    pub fn empty(n: usize) -> Self {
        Solution {
            selected: vec![false; n],
            value: 0,
        }
    }

    /// Create a solution from a selection vector, evaluating it
    pub fn from_selection(instance: &KnapsackInstance, selected: Vec<bool>) -> Self {
        let value = instance.evaluate(&selected);
        Solution { selected, value }
    }

    /// Recompute the objective value from the selection
    pub fn evaluate(&mut self, instance: &KnapsackInstance) -> i64 {
        self.value = instance.evaluate(&self.selected);
        self.value
    }

    /// Check feasibility against every capacity constraint
    pub fn is_feasible(&self, instance: &KnapsackInstance) -> bool {
        instance.is_feasible(&self.selected)
    }

    /// Toggle one item, keeping the objective value in sync
    #[inline]
    pub fn flip(&mut self, instance: &KnapsackInstance, item: usize) {
        self.value += self.flip_delta(instance, item);
        self.selected[item] = !self.selected[item];
    }

    /// Change of objective value if `item` were toggled
    #[inline]
    pub fn flip_delta(&self, instance: &KnapsackInstance, item: usize) -> i64 {
        if self.selected[item] {
            -instance.profits[item]
        } else {
            instance.profits[item]
        }
    }

    /// Overwrite this solution with `other`, reusing the existing buffer
    pub fn copy_from(&mut self, other: &Solution) {
        self.selected.clone_from(&other.selected);
        self.value = other.value;
    }

    /// Number of selected items
    pub fn num_selected(&self) -> usize {
        self.selected.iter().filter(|&&taken| taken).count()
    }

    /// Indices of the selected items, ascending
    pub fn selected_items(&self) -> Vec<usize> {
        self.selected
            .iter()
            .enumerate()
            .filter(|(_, &taken)| taken)
            .map(|(i, _)| i)
            .collect()
    }

    /// Write the solution in text form: `"<value> <count>"` then the selected indices
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writeln!(writer, "{} {}", self.value, self.num_selected())?;
        let items: Vec<String> = self.selected_items().iter().map(|i| i.to_string()).collect();
        writeln!(writer, "{}", items.join(" "))
    }

    /// Save the solution to a text file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> KnapsackResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution")?;
        writeln!(f, "  Value: {}", self.value)?;
        writeln!(f, "  Selected: {}", self.num_selected())?;
        writeln!(f, "  Items: {:?}", self.selected_items())
    }
}

/// Result of a complete algorithm run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Best feasible solution found
    pub solution: Solution,
    /// Algorithm name (for reporting)
    pub algorithm: String,
    pub termination: Termination,
    /// Iterations (VNS) or generations (GA) completed
    pub iterations: usize,
    /// Wall-clock seconds since the deadline was started
    pub computation_time: f64,
}

/// Represents a move in local search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Toggle one item
    Flip(usize),
    /// Toggle two items of differing status
    Swap(usize, usize),
}

impl Move {
    pub fn delta(&self, solution: &Solution, instance: &KnapsackInstance) -> i64 {
        match *self {
            Move::Flip(i) => solution.flip_delta(instance, i),
            Move::Swap(i, j) => {
                solution.flip_delta(instance, i) + solution.flip_delta(instance, j)
            }
        }
    }

    pub fn apply(&self, solution: &mut Solution, instance: &KnapsackInstance) {
        match *self {
            Move::Flip(i) => solution.flip(instance, i),
            Move::Swap(i, j) => {
                solution.flip(instance, i);
                solution.flip(instance, j);
            }
        }
    }

    /// Apply the move if it is feasible and strictly improves the objective.
    ///
    /// The solution is left untouched when the move is rejected.
    pub fn try_improve(&self, solution: &mut Solution, instance: &KnapsackInstance) -> bool {
        if self.delta(solution, instance) <= 0 {
            return false;
        }
        self.apply(solution, instance);
        if solution.is_feasible(instance) {
            true
        } else {
            // Flips are involutions, applying again restores the previous state.
            self.apply(solution, instance);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_instance() -> KnapsackInstance {
        KnapsackInstance::new("test", vec![6, 5, 4], vec![10], vec![vec![5, 5, 5]]).unwrap()
    }

    #[test]
    fn test_solution_creation() {
        let sol = Solution::empty(4);
        assert_eq!(sol.selected, vec![false; 4]);
        assert_eq!(sol.value, 0);
        assert_eq!(sol.num_selected(), 0);
    }

    #[test]
    fn test_flip_keeps_value_in_sync() {
        let instance = create_test_instance();
        let mut sol = Solution::empty(3);

        sol.flip(&instance, 0);
        sol.flip(&instance, 2);
        assert_eq!(sol.value, 10);
        sol.flip(&instance, 0);
        assert_eq!(sol.value, 4);
        assert_eq!(sol.value, instance.evaluate(&sol.selected));
    }

    #[test]
    fn test_copy_is_independent() {
        let instance = create_test_instance();
        let src = Solution::from_selection(&instance, vec![true, false, true]);
        let mut dst = Solution::empty(3);

        dst.copy_from(&src);
        assert_eq!(dst, src);

        dst.flip(&instance, 1);
        assert_eq!(src.selected, vec![true, false, true]);
        assert_eq!(src.value, 10);
    }

    #[test]
    fn test_swap_move_rejected_when_infeasible() {
        let instance =
            KnapsackInstance::new("t", vec![1, 9], vec![5], vec![vec![1, 6]]).unwrap();
        let mut sol = Solution::from_selection(&instance, vec![true, false]);

        assert!(!Move::Swap(0, 1).try_improve(&mut sol, &instance));
        assert_eq!(sol.selected, vec![true, false]);
        assert_eq!(sol.value, 1);
    }

    #[test]
    fn test_write_text_format() {
        let instance = create_test_instance();
        let sol = Solution::from_selection(&instance, vec![true, true, false]);
        let mut out = Vec::new();
        sol.write_to(&mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "11 2\n0 1\n");
    }
}
