//! Construction heuristics producing an initial feasible solution.
//!
//! Every heuristic here only ever keeps an item when the selection stays
//! feasible, so the result is feasible whenever the empty selection is.

use crate::instance::KnapsackInstance;
use crate::solution::Solution;
use ordered_float::OrderedFloat;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

pub trait ConstructionHeuristic {
    fn construct(&self, instance: &KnapsackInstance, rng: &mut dyn RngCore) -> Solution;
    fn name(&self) -> &str;
}

/// Tentatively add `item`; drop it again if a capacity is exceeded.
fn try_insert(instance: &KnapsackInstance, solution: &mut Solution, item: usize) {
    if solution.selected[item] {
        return;
    }
    solution.flip(instance, item);
    if !solution.is_feasible(instance) {
        solution.flip(instance, item);
    }
}

/// Item indices sorted by aggregate efficiency, best first.
///
/// Items with equal efficiency keep ascending index order.
pub fn greedy_order(instance: &KnapsackInstance) -> Vec<usize> {
    let efficiency: Vec<f64> = (0..instance.n).map(|i| instance.efficiency(i)).collect();
    let mut order: Vec<usize> = (0..instance.n).collect();
    order.sort_by_key(|&i| (Reverse(OrderedFloat(efficiency[i])), i));
    order
}

/// Greedy construction by decreasing profit / normalised-weight ratio.
pub fn greedy_construction(instance: &KnapsackInstance) -> Solution {
    let mut solution = Solution::empty(instance.n);
    for item in greedy_order(instance) {
        try_insert(instance, &mut solution, item);
    }
    solution
}

/// Random construction: `n` draws with replacement, each kept only if feasible.
pub fn random_construction<R: Rng + ?Sized>(instance: &KnapsackInstance, rng: &mut R) -> Solution {
    let mut solution = Solution::empty(instance.n);
    for _ in 0..instance.n {
        let item = rng.gen_range(0..instance.n);
        try_insert(instance, &mut solution, item);
    }
    solution
}

/// Random-repair construction: pick each item with probability 1/2, then
/// deselect random items until the selection fits.
pub fn random_repair_construction<R: Rng + ?Sized>(
    instance: &KnapsackInstance,
    rng: &mut R,
) -> Solution {
    let selected: Vec<bool> = (0..instance.n).map(|_| rng.gen_bool(0.5)).collect();
    let mut solution = Solution::from_selection(instance, selected);

    while !solution.is_feasible(instance) {
        let item = rng.gen_range(0..instance.n);
        if solution.selected[item] {
            solution.flip(instance, item);
        }
    }
    solution
}

/// Ratio-based greedy heuristic
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyRatioHeuristic;

impl ConstructionHeuristic for GreedyRatioHeuristic {
    fn construct(&self, instance: &KnapsackInstance, _rng: &mut dyn RngCore) -> Solution {
        greedy_construction(instance)
    }

    fn name(&self) -> &str {
        "Greedy"
    }
}

/// Random insertion heuristic (draws with replacement)
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomInsertionHeuristic;

impl ConstructionHeuristic for RandomInsertionHeuristic {
    fn construct(&self, instance: &KnapsackInstance, rng: &mut dyn RngCore) -> Solution {
        random_construction(instance, rng)
    }

    fn name(&self) -> &str {
        "Random"
    }
}

/// Random selection followed by random repair
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomRepairHeuristic;

impl ConstructionHeuristic for RandomRepairHeuristic {
    fn construct(&self, instance: &KnapsackInstance, rng: &mut dyn RngCore) -> Solution {
        random_repair_construction(instance, rng)
    }

    fn name(&self) -> &str {
        "RandomRepair"
    }
}

/// Construction strategy chosen by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Construction {
    #[default]
    Greedy,
    Random,
    RandomRepair,
}

impl Construction {
    pub const ALL: [Construction; 3] = [
        Construction::Greedy,
        Construction::Random,
        Construction::RandomRepair,
    ];

    pub fn build<R: Rng>(&self, instance: &KnapsackInstance, rng: &mut R) -> Solution {
        match self {
            Construction::Greedy => greedy_construction(instance),
            Construction::Random => random_construction(instance, rng),
            Construction::RandomRepair => random_repair_construction(instance, rng),
        }
    }
}

impl ConstructionHeuristic for Construction {
    fn construct(&self, instance: &KnapsackInstance, rng: &mut dyn RngCore) -> Solution {
        match self {
            Construction::Greedy => GreedyRatioHeuristic.construct(instance, rng),
            Construction::Random => RandomInsertionHeuristic.construct(instance, rng),
            Construction::RandomRepair => RandomRepairHeuristic.construct(instance, rng),
        }
    }

    fn name(&self) -> &str {
        match self {
            Construction::Greedy => GreedyRatioHeuristic.name(),
            Construction::Random => RandomInsertionHeuristic.name(),
            Construction::RandomRepair => RandomRepairHeuristic.name(),
        }
    }
}
