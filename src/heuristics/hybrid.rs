//! Hybrid GA + VNS: the generational GA where every offspring is polished by
//! a VNS pass before it joins the new population.

use crate::deadline::{Deadline, Expired, Termination};
use crate::error::KnapsackResult;
use crate::heuristics::genetic::{GaConfig, GeneticAlgorithm};
use crate::heuristics::vns::{VariableNeighborhoodSearch, VnsConfig};
use crate::instance::KnapsackInstance;
use crate::solution::RunOutcome;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridConfig {
    pub ga: GaConfig,
    /// Budget of the VNS pass applied to each offspring
    pub vns: VnsConfig,
}

/// Hybrid GA + VNS (memetic scheme)
///
/// The run deadline is shared with every inner VNS pass, so an offspring
/// polish stops at the same moment as the outer loop.
pub struct HybridGaVns {
    ga: GeneticAlgorithm,
    vns: VariableNeighborhoodSearch,
}

impl HybridGaVns {
    pub fn new(config: HybridConfig) -> Self {
        HybridGaVns {
            ga: GeneticAlgorithm::new(config.ga),
            vns: VariableNeighborhoodSearch::new(config.vns),
        }
    }

    pub fn config(&self) -> HybridConfig {
        HybridConfig {
            ga: self.ga.config,
            vns: self.vns.config,
        }
    }

    pub fn run<R: Rng + ?Sized>(
        &self,
        instance: &KnapsackInstance,
        rng: &mut R,
        deadline: &Deadline,
    ) -> KnapsackResult<RunOutcome> {
        self.ga
            .run_with_polish(instance, rng, deadline, "HybridGaVns", |child, rng| {
                let report = self.vns.search(instance, child, rng, deadline);
                match report.termination {
                    Termination::Completed => Ok(()),
                    Termination::DeadlineReached => Err(Expired),
                }
            })
    }
}

impl Default for HybridGaVns {
    fn default() -> Self {
        Self::new(HybridConfig::default())
    }
}
