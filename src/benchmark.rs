//! Benchmarking and experimentation module for the knapsack solver.
//!
//! Provides tools for running experiments, collecting statistics,
//! and comparing algorithm performance.

use crate::deadline::{Deadline, Termination};
use crate::error::KnapsackResult;
use crate::heuristics::construction::{Construction, ConstructionHeuristic};
use crate::heuristics::genetic::{GaConfig, GeneticAlgorithm};
use crate::heuristics::hybrid::{HybridConfig, HybridGaVns};
use crate::heuristics::vns::{VariableNeighborhoodSearch, VnsConfig};
use crate::instance::KnapsackInstance;
use crate::solution::RunOutcome;

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// Result of running a single algorithm on an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmResult {
    /// Algorithm name
    pub algorithm: String,
    /// Instance name
    pub instance: String,
    /// Number of items
    pub items: usize,
    /// Number of constraints
    pub constraints: usize,
    /// Seed of the run's random source
    pub seed: u64,
    /// Objective value of the returned solution
    pub value: i64,
    /// Number of selected items
    pub length: usize,
    /// Independently re-checked feasibility
    pub feasible: bool,
    /// Computation time in seconds
    pub time: f64,
    /// VNS iterations or GA generations completed
    pub iterations: usize,
    pub termination: Termination,
}

impl AlgorithmResult {
    /// Build a result row, re-verifying the outcome against the instance
    pub fn from_outcome(instance: &KnapsackInstance, seed: u64, outcome: &RunOutcome) -> Self {
        AlgorithmResult {
            algorithm: outcome.algorithm.clone(),
            instance: instance.name.clone(),
            items: instance.n,
            constraints: instance.m,
            seed,
            value: instance.evaluate(&outcome.solution.selected),
            length: outcome.solution.num_selected(),
            feasible: outcome.solution.is_feasible(instance),
            time: outcome.computation_time,
            iterations: outcome.iterations,
            termination: outcome.termination,
        }
    }
}

/// Aggregated statistics for an algorithm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmStatistics {
    /// Algorithm name
    pub algorithm: String,
    /// Number of runs recorded
    pub num_runs: usize,
    /// Number of feasible solutions
    pub num_feasible: usize,
    /// Runs stopped by the deadline
    pub deadline_hits: usize,
    /// Average value
    pub avg_value: f64,
    /// Best value
    pub best_value: i64,
    /// Worst value
    pub worst_value: i64,
    /// Standard deviation of value (0 for a single run)
    pub std_value: f64,
    /// Average time
    pub avg_time: f64,
    /// Total time
    pub total_time: f64,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Number of runs per algorithm
    pub num_runs: usize,
    /// Time limit per run in seconds, 0 means unbounded
    pub time_limit: f64,
    /// Seed of the first run; run `r` uses `base_seed + r`, wrapping at `u64::MAX`
    pub base_seed: u64,
    /// Constructions paired with VNS
    pub constructions: Vec<Construction>,
    pub vns: VnsConfig,
    /// Also run the GA and the hybrid
    pub run_population: bool,
    pub ga: GaConfig,
    pub hybrid: HybridConfig,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            num_runs: 1,
            time_limit: 60.0,
            base_seed: 0,
            constructions: vec![Construction::Greedy, Construction::Random],
            vns: VnsConfig::default(),
            run_population: false,
            ga: GaConfig::default(),
            hybrid: HybridConfig::default(),
            show_progress: true,
        }
    }
}

impl BenchmarkConfig {
    /// Number of algorithm runs per instance
    pub fn runs_per_instance(&self) -> usize {
        let algorithms = self.constructions.len() + if self.run_population { 2 } else { 0 };
        algorithms * self.num_runs
    }
}

/// Sample mean and standard deviation; the deviation of a single value is 0.
fn mean_and_std(values: &[f64]) -> (f64, f64) {
    use statrs::statistics::Statistics;

    let mean = values.mean();
    let std = if values.len() > 1 { values.std_dev() } else { 0.0 };
    (mean, std)
}

/// Construct a starting solution with `construction`, then improve it with VNS
/// under a fresh deadline of `time_limit` seconds.
pub fn run_experiment<R: Rng>(
    instance: &KnapsackInstance,
    construction: Construction,
    vns: &VariableNeighborhoodSearch,
    time_limit: f64,
    rng: &mut R,
) -> RunOutcome {
    let deadline = Deadline::from_secs(time_limit);
    let initial = construction.build(instance, rng);
    let mut outcome = vns.run(instance, initial, rng, &deadline);
    outcome.algorithm = format!("{}+VNS", construction.name());
    outcome
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<AlgorithmResult>,
    started_at: DateTime<Utc>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
            started_at: Utc::now(),
        }
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let style =
            ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar());
        ProgressBar::new(len as u64).with_style(style)
    }

    /// Run every configured algorithm on an instance
    pub fn run_full_benchmark(&mut self, instance: &KnapsackInstance) -> KnapsackResult<()> {
        log::info!(
            "Running benchmark on instance: {} (n={}, m={})",
            instance.name,
            instance.n,
            instance.m
        );

        let progress = self.progress_bar(self.config.runs_per_instance());
        progress.set_message(instance.name.clone());
        let vns = VariableNeighborhoodSearch::new(self.config.vns);
        let constructions = self.config.constructions.clone();

        for run in 0..self.config.num_runs {
            let seed = self.config.base_seed.wrapping_add(run as u64);

            for &construction in &constructions {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let outcome =
                    run_experiment(instance, construction, &vns, self.config.time_limit, &mut rng);
                self.record_result(instance, seed, &outcome);
                progress.inc(1);
            }

            if self.config.run_population {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let deadline = Deadline::from_secs(self.config.time_limit);
                let outcome =
                    GeneticAlgorithm::new(self.config.ga).run(instance, &mut rng, &deadline)?;
                self.record_result(instance, seed, &outcome);
                progress.inc(1);

                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let deadline = Deadline::from_secs(self.config.time_limit);
                let outcome =
                    HybridGaVns::new(self.config.hybrid).run(instance, &mut rng, &deadline)?;
                self.record_result(instance, seed, &outcome);
                progress.inc(1);
            }
        }

        progress.finish_and_clear();
        Ok(())
    }

    /// Record a result
    fn record_result(&mut self, instance: &KnapsackInstance, seed: u64, outcome: &RunOutcome) {
        let result = AlgorithmResult::from_outcome(instance, seed, outcome);
        if !result.feasible {
            log::error!(
                "{} returned an infeasible solution on {}",
                result.algorithm,
                result.instance
            );
        }
        self.results.push(result);
    }

    /// Compute statistics for each algorithm
    pub fn compute_statistics(&self) -> Vec<AlgorithmStatistics> {
        let mut stats_map: BTreeMap<&str, Vec<&AlgorithmResult>> = BTreeMap::new();

        for result in &self.results {
            stats_map.entry(result.algorithm.as_str()).or_default().push(result);
        }

        let mut statistics = Vec::new();

        for (algo, results) in stats_map {
            let feasible_results: Vec<_> = results.iter().filter(|r| r.feasible).collect();

            if feasible_results.is_empty() {
                continue;
            }

            let values: Vec<f64> = feasible_results.iter().map(|r| r.value as f64).collect();
            let times: Vec<f64> = feasible_results.iter().map(|r| r.time).collect();

            let (avg_value, std_value) = mean_and_std(&values);

            statistics.push(AlgorithmStatistics {
                algorithm: algo.to_string(),
                num_runs: results.len(),
                num_feasible: feasible_results.len(),
                deadline_hits: results
                    .iter()
                    .filter(|r| r.termination == Termination::DeadlineReached)
                    .count(),
                avg_value,
                best_value: feasible_results.iter().map(|r| r.value).max().unwrap_or(0),
                worst_value: feasible_results.iter().map(|r| r.value).min().unwrap_or(0),
                std_value,
                avg_time: mean_and_std(&times).0,
                total_time: times.iter().sum(),
            });
        }

        // Best average value first
        statistics.sort_by(|a, b| b.avg_value.total_cmp(&a.avg_value));

        statistics
    }

    /// Export results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> KnapsackResult<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> KnapsackResult<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for stat in self.compute_statistics() {
            writer.serialize(stat)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Per-instance table of value, time and solution length
    pub fn instance_table(&self, instance: &str) -> String {
        let separator = format!(
            "+{}+{}+{}+{}+\n",
            "-".repeat(30),
            "-".repeat(14),
            "-".repeat(14),
            "-".repeat(10)
        );
        let mut table = separator.clone();
        table.push_str(&format!(
            "| {:<28} | {:>12} | {:>12} | {:>8} |\n",
            "Algorithm", "Value", "Time (s)", "Length"
        ));
        table.push_str(&separator);

        for result in self.results.iter().filter(|r| r.instance == instance) {
            table.push_str(&format!(
                "| {:<28} | {:>12} | {:>12.6} | {:>8} |\n",
                result.algorithm, result.value, result.time, result.length
            ));
        }

        table.push_str(&separator);
        table
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("       Knapsack Benchmark Report\n");
        report.push_str("========================================\n");
        report.push_str(&format!("Started: {}\n\n", self.started_at.to_rfc3339()));

        let stats = self.compute_statistics();

        report.push_str("Algorithm Performance Summary:\n");
        report.push_str("-".repeat(90).as_str());
        report.push('\n');
        report.push_str(&format!(
            "{:<25} {:>10} {:>12} {:>10} {:>10} {:>8} {:>10}\n",
            "Algorithm", "Feasible", "Avg Value", "Best", "Std", "Timeout", "Avg Time"
        ));
        report.push_str("-".repeat(90).as_str());
        report.push('\n');

        for stat in &stats {
            report.push_str(&format!(
                "{:<25} {:>10} {:>12.2} {:>10} {:>10.2} {:>8} {:>10.4}\n",
                stat.algorithm,
                format!("{}/{}", stat.num_feasible, stat.num_runs),
                stat.avg_value,
                stat.best_value,
                stat.std_value,
                stat.deadline_hits,
                stat.avg_time
            ));
        }

        report.push_str("-".repeat(90).as_str());
        report.push('\n');

        report.push_str("\nBest Solutions per Instance:\n");

        let mut instance_best: BTreeMap<&str, &AlgorithmResult> = BTreeMap::new();

        for result in self.results.iter().filter(|r| r.feasible) {
            let entry = instance_best.entry(result.instance.as_str()).or_insert(result);
            if result.value > entry.value {
                *entry = result;
            }
        }

        for (instance, best) in &instance_best {
            report.push_str(&format!("  {}: {} ({})\n", instance, best.value, best.algorithm));
        }

        report
    }

    /// Get all results
    pub fn results(&self) -> &[AlgorithmResult] {
        &self.results
    }
}

/// Load every regular file of a directory as an instance.
///
/// Files that fail to parse are skipped with a warning. Instances are sorted
/// by size, then name.
pub fn load_instances_from_dir<P: AsRef<Path>>(dir: P) -> KnapsackResult<Vec<KnapsackInstance>> {
    let mut instances = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        match KnapsackInstance::from_file(&path) {
            Ok(instance) => instances.push(instance),
            Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
        }
    }

    instances.sort_by(|a, b| (a.n, a.m, &a.name).cmp(&(b.n, b.m, &b.name)));

    Ok(instances)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_instance(name: &str) -> KnapsackInstance {
        KnapsackInstance::new(
            name,
            vec![7, 3, 9, 4, 4, 8],
            vec![12, 9],
            vec![vec![3, 1, 5, 2, 2, 4], vec![2, 2, 4, 1, 3, 3]],
        )
        .unwrap()
    }

    fn quick_config() -> BenchmarkConfig {
        BenchmarkConfig {
            num_runs: 2,
            time_limit: 0.0,
            vns: VnsConfig::with_params(10, 2),
            show_progress: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_benchmark_config() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.num_runs, 1);
        assert_eq!(config.vns, VnsConfig::with_params(100, 2));
        assert_eq!(config.runs_per_instance(), 2);
    }

    #[test]
    fn test_records_greedy_and_random_vns() {
        let instance = create_test_instance("bench");
        let mut benchmark = Benchmark::new(quick_config());
        benchmark.run_full_benchmark(&instance).unwrap();

        let results = benchmark.results();
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.feasible));
        assert!(results.iter().any(|r| r.algorithm == "Greedy+VNS"));
        assert!(results.iter().any(|r| r.algorithm == "Random+VNS"));

        let stats = benchmark.compute_statistics();
        assert_eq!(stats.len(), 2);
        assert!(stats.iter().all(|s| s.num_runs == 2 && s.best_value >= s.worst_value));
        assert!(stats.windows(2).all(|w| w[0].avg_value >= w[1].avg_value));
    }

    #[test]
    fn test_run_seeds_wrap_at_max() {
        let instance = create_test_instance("wrap");
        let config = BenchmarkConfig {
            base_seed: u64::MAX,
            constructions: vec![Construction::Random],
            ..quick_config()
        };
        let mut benchmark = Benchmark::new(config);
        benchmark.run_full_benchmark(&instance).unwrap();

        let seeds: Vec<u64> = benchmark.results().iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![u64::MAX, 0]);
    }

    #[test]
    fn test_population_algorithms_included() {
        let instance = create_test_instance("bench");
        let config = BenchmarkConfig {
            num_runs: 1,
            run_population: true,
            ga: GaConfig {
                population_size: 6,
                generations: 3,
                mutation_rate: 0.05,
            },
            hybrid: HybridConfig {
                ga: GaConfig {
                    population_size: 4,
                    generations: 2,
                    mutation_rate: 0.05,
                },
                vns: VnsConfig::with_params(5, 2),
            },
            ..quick_config()
        };
        let mut benchmark = Benchmark::new(config);
        benchmark.run_full_benchmark(&instance).unwrap();

        let names: Vec<&str> = benchmark.results().iter().map(|r| r.algorithm.as_str()).collect();
        assert_eq!(names, vec!["Greedy+VNS", "Random+VNS", "GeneticAlgorithm", "HybridGaVns"]);
    }

    #[test]
    fn test_report_and_table() {
        let instance = create_test_instance("table");
        let mut benchmark = Benchmark::new(quick_config());
        benchmark.run_full_benchmark(&instance).unwrap();

        let report = benchmark.generate_report();
        assert!(report.contains("Greedy+VNS"));
        assert!(report.contains("table:"));

        let table = benchmark.instance_table("table");
        assert_eq!(table.lines().count(), 4 + 4);
    }

    #[test]
    fn test_csv_export() {
        let instance = create_test_instance("csv");
        let mut benchmark = Benchmark::new(quick_config());
        benchmark.run_full_benchmark(&instance).unwrap();

        let path = std::env::temp_dir().join(format!("mkp-bench-{}.csv", std::process::id()));
        benchmark.export_to_csv(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let mut lines = content.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("algorithm,instance,items,constraints,seed,value"));
        assert_eq!(lines.count(), 4);
    }

    #[test]
    fn test_load_instances_skips_bad_files() {
        let dir = std::env::temp_dir().join(format!("mkp-dir-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("big.txt"), "3 1\n1 2 3\n5\n1 1 1\n").unwrap();
        std::fs::write(dir.join("small.txt"), "2 1\n4 5\n3\n2 2\n").unwrap();
        std::fs::write(dir.join("broken.txt"), "2 1\n4 x\n").unwrap();

        let instances = load_instances_from_dir(&dir).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        let names: Vec<&str> = instances.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["small", "big"]);
    }
}
