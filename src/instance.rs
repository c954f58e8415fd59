//! Module for parsing and representing multidimensional knapsack instances.
//!
//! An instance file is a stream of whitespace-separated integers:
//! `n m`, then `n` profits, then `m` capacities, then `m` rows of `n` weights.

use crate::error::{KnapsackError, KnapsackResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Represents a complete 0/1 multidimensional knapsack instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnapsackInstance {
    /// Name of the instance (file stem when loaded from disk)
    pub name: String,
    /// Number of items
    pub n: usize,
    /// Number of resource constraints
    pub m: usize,
    /// Profit of each item
    pub profits: Vec<i64>,
    /// Capacity of each constraint
    pub capacities: Vec<i64>,
    /// Weight matrix, `weights[j][i]` is the consumption of item `i` on constraint `j`
    pub weights: Vec<Vec<i64>>,
}

impl KnapsackInstance {
    /// Build an instance, checking dimensions and non-negativity.
    ///
    /// The search engine assumes the empty selection is always feasible, which
    /// only holds when no capacity is negative.
    pub fn new(
        name: impl Into<String>,
        profits: Vec<i64>,
        capacities: Vec<i64>,
        weights: Vec<Vec<i64>>,
    ) -> KnapsackResult<Self> {
        let n = profits.len();
        let m = capacities.len();

        if n == 0 {
            return Err(KnapsackError::Precondition("instance has no items".into()));
        }
        if m == 0 {
            return Err(KnapsackError::Precondition("instance has no constraints".into()));
        }
        if weights.len() != m {
            return Err(KnapsackError::Precondition(format!(
                "expected {} weight rows, found {}",
                m,
                weights.len()
            )));
        }
        if let Some((j, row)) = weights.iter().enumerate().find(|(_, row)| row.len() != n) {
            return Err(KnapsackError::Precondition(format!(
                "weight row {} has {} entries, expected {}",
                j,
                row.len(),
                n
            )));
        }
        if let Some(i) = profits.iter().position(|&p| p < 0) {
            return Err(KnapsackError::Precondition(format!("profit of item {} is negative", i)));
        }
        if let Some(j) = capacities.iter().position(|&c| c < 0) {
            return Err(KnapsackError::Precondition(format!("capacity {} is negative", j)));
        }
        for (j, row) in weights.iter().enumerate() {
            if let Some(i) = row.iter().position(|&w| w < 0) {
                return Err(KnapsackError::Precondition(format!(
                    "weight of item {} on constraint {} is negative",
                    i, j
                )));
            }
        }

        Ok(KnapsackInstance {
            name: name.into(),
            n,
            m,
            profits,
            capacities,
            weights,
        })
    }

    /// Parse an instance from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> KnapsackResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::parse(&name, &content)
    }

    /// Parse an instance from its textual representation
    pub fn parse(name: &str, content: &str) -> KnapsackResult<Self> {
        let mut tokens = content.split_whitespace();

        let n = next_value(&mut tokens, "item count")?;
        let m = next_value(&mut tokens, "constraint count")?;
        if n < 0 || m < 0 {
            return Err(KnapsackError::Precondition(format!(
                "negative dimensions ({} items, {} constraints)",
                n, m
            )));
        }
        let (n, m) = (n as usize, m as usize);

        let profits = (0..n)
            .map(|_| next_value(&mut tokens, "profits"))
            .collect::<KnapsackResult<Vec<_>>>()?;
        let capacities = (0..m)
            .map(|_| next_value(&mut tokens, "capacities"))
            .collect::<KnapsackResult<Vec<_>>>()?;
        let weights = (0..m)
            .map(|_| {
                (0..n)
                    .map(|_| next_value(&mut tokens, "weights"))
                    .collect::<KnapsackResult<Vec<_>>>()
            })
            .collect::<KnapsackResult<Vec<_>>>()?;

        Self::new(name, profits, capacities, weights)
    }

    /// Total weight of a selection on constraint `j`
    #[inline]
    pub fn load(&self, selection: &[bool], j: usize) -> i64 {
        self.weights[j]
            .iter()
            .zip(selection)
            .filter(|(_, &taken)| taken)
            .map(|(&w, _)| w)
            .sum()
    }

    /// Verify that a selection respects every capacity constraint
    pub fn is_feasible(&self, selection: &[bool]) -> bool {
        (0..self.m).all(|j| self.load(selection, j) <= self.capacities[j])
    }

    /// Objective value of a selection (sum of selected profits)
    pub fn evaluate(&self, selection: &[bool]) -> i64 {
        self.profits
            .iter()
            .zip(selection)
            .filter(|(_, &taken)| taken)
            .map(|(&p, _)| p)
            .sum()
    }

    /// Aggregate profit/weight ratio of an item.
    ///
    /// Weights are normalised by each capacity; constraints with zero capacity
    /// are left out of the sum. An item with no normalised weight scores 0.
    pub fn efficiency(&self, item: usize) -> f64 {
        let normalized_weight: f64 = (0..self.m)
            .filter(|&j| self.capacities[j] > 0)
            .map(|j| self.weights[j][item] as f64 / self.capacities[j] as f64)
            .sum();

        if normalized_weight > 0.0 {
            self.profits[item] as f64 / normalized_weight
        } else {
            0.0
        }
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let total_profit: i64 = self.profits.iter().sum();
        let tightness: Vec<f64> = (0..self.m)
            .map(|j| {
                let total: i64 = self.weights[j].iter().sum();
                if total > 0 {
                    self.capacities[j] as f64 / total as f64
                } else {
                    1.0
                }
            })
            .collect();
        let avg_tightness = tightness.iter().sum::<f64>() / tightness.len() as f64;
        let min_tightness = tightness.iter().cloned().fold(f64::INFINITY, f64::min);

        InstanceStatistics {
            name: self.name.clone(),
            items: self.n,
            constraints: self.m,
            total_profit,
            max_profit: self.profits.iter().copied().max().unwrap_or(0),
            avg_tightness,
            min_tightness,
        }
    }
}

fn next_value<'a, I>(tokens: &mut I, what: &'static str) -> KnapsackResult<i64>
where
    I: Iterator<Item = &'a str>,
{
    let token = tokens.next().ok_or_else(|| KnapsackError::Parse {
        what,
        token: "unexpected end of file".to_string(),
    })?;
    token.parse().map_err(|_| KnapsackError::Parse {
        what,
        token: token.to_string(),
    })
}

/// Statistics about a knapsack instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub items: usize,
    pub constraints: usize,
    pub total_profit: i64,
    pub max_profit: i64,
    /// Mean of capacity / total weight over the constraints
    pub avg_tightness: f64,
    pub min_tightness: f64,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Items: {}", self.items)?;
        writeln!(f, "  Constraints: {}", self.constraints)?;
        writeln!(f, "  Total profit: {}", self.total_profit)?;
        writeln!(f, "  Max item profit: {}", self.max_profit)?;
        writeln!(f, "  Avg tightness: {:.3}", self.avg_tightness)?;
        writeln!(f, "  Min tightness: {:.3}", self.min_tightness)
    }
}
