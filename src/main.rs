//! Multidimensional Knapsack Solver - Command Line Interface

use clap::{Parser, Subcommand, ValueEnum};
use mkp_solver::benchmark::{load_instances_from_dir, Benchmark, BenchmarkConfig};
use mkp_solver::config::{Algorithm, SolverConfig};
use mkp_solver::error::KnapsackResult;
use mkp_solver::heuristics::construction::{greedy_construction, Construction};
use mkp_solver::heuristics::local_search::{LocalSearch, VND};
use mkp_solver::instance::KnapsackInstance;
use mkp_solver::heuristics::vns::VnsConfig;

use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mkp-solver")]
#[command(version = "1.0")]
#[command(about = "Metaheuristic solver for the 0/1 multidimensional knapsack problem")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a single instance
    Solve {
        #[arg(short, long)]
        instance: PathBuf,

        /// Algorithm to use
        #[arg(short, long, value_enum)]
        algorithm: Option<AlgorithmArg>,

        /// Construction heuristic for the starting solution
        #[arg(short, long, value_enum)]
        construction: Option<ConstructionArg>,

        /// JSON file with solver parameters (command-line flags take precedence)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Time limit in seconds (0 = unbounded)
        #[arg(short, long)]
        time_limit: Option<f64>,

        /// Random seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Write the solution in text form
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the full run outcome as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run the construction + VNS experiments on an instance file or a directory
    Benchmark {
        /// Instance file, or directory of instance files
        #[arg(short, long)]
        path: PathBuf,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Number of runs per algorithm
        #[arg(short, long, default_value = "1")]
        runs: usize,

        /// Time limit per run in seconds (0 = unbounded)
        #[arg(short, long, default_value = "60")]
        time_limit: f64,

        /// Seed of the first run
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// VNS iterations
        #[arg(long, default_value = "100")]
        vns_iterations: usize,

        /// VNS perturbation strength
        #[arg(long, default_value = "2")]
        strength: usize,

        /// Also run the genetic algorithm and the hybrid
        #[arg(long)]
        population: bool,
    },

    /// Analyze an instance
    Analyze {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum AlgorithmArg {
    /// Construction only
    Construct,
    /// Variable Neighborhood Descent
    Vnd,
    /// Variable Neighborhood Search
    Vns,
    /// Genetic Algorithm
    Ga,
    /// Hybrid GA + VNS
    Hybrid,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum ConstructionArg {
    /// Greedy by profit / normalised weight
    Greedy,
    /// Random insertion
    Random,
    /// Random selection then random repair
    RandomRepair,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Solve {
            instance,
            algorithm,
            construction,
            config,
            time_limit,
            seed,
            output,
            json,
            verbose,
        } => solve_instance(
            &instance,
            algorithm,
            construction,
            config,
            time_limit,
            seed,
            output,
            json,
            verbose,
        ),

        Commands::Benchmark {
            path,
            output,
            runs,
            time_limit,
            seed,
            vns_iterations,
            strength,
            population,
        } => {
            let vns = VnsConfig::with_params(vns_iterations, strength);
            run_benchmark(&path, &output, runs, time_limit, seed, vns, population)
        }

        Commands::Analyze { instance } => analyze_instance(&instance),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
fn solve_instance(
    path: &Path,
    algorithm: Option<AlgorithmArg>,
    construction: Option<ConstructionArg>,
    config_path: Option<PathBuf>,
    time_limit: Option<f64>,
    seed: Option<u64>,
    output: Option<PathBuf>,
    json: Option<PathBuf>,
    verbose: bool,
) -> KnapsackResult<()> {
    println!("Loading instance from {:?}...", path);
    let instance = KnapsackInstance::from_file(path)?;

    let mut config = match config_path {
        Some(p) => SolverConfig::from_file(p)?,
        None => SolverConfig::default(),
    };
    if let Some(algorithm) = algorithm {
        config.algorithm = match algorithm {
            AlgorithmArg::Construct => Algorithm::Construct,
            AlgorithmArg::Vnd => Algorithm::Vnd,
            AlgorithmArg::Vns => Algorithm::Vns,
            AlgorithmArg::Ga => Algorithm::Genetic,
            AlgorithmArg::Hybrid => Algorithm::Hybrid,
        };
    }
    if let Some(construction) = construction {
        config.construction = match construction {
            ConstructionArg::Greedy => Construction::Greedy,
            ConstructionArg::Random => Construction::Random,
            ConstructionArg::RandomRepair => Construction::RandomRepair,
        };
    }
    if let Some(time_limit) = time_limit {
        config.time_limit = time_limit;
    }
    if let Some(seed) = seed {
        config.seed = seed;
    }

    if verbose {
        println!("{}", instance.statistics());
        println!("Configuration: {}", serde_json::to_string(&config)?);
    }

    println!("Solving with {}...", config.algorithm.name());
    let outcome = config.solve(&instance)?;

    println!("\n========== Results ==========");
    println!("Algorithm: {}", outcome.algorithm);
    println!("Value: {}", outcome.solution.value);
    println!("Selected items: {}", outcome.solution.num_selected());
    println!("Feasible: {}", outcome.solution.is_feasible(&instance));
    println!("Termination: {}", outcome.termination);
    println!("Iterations: {}", outcome.iterations);
    println!("Time: {:.4}s", outcome.computation_time);

    if verbose {
        println!("\nItems: {:?}", outcome.solution.selected_items());
        for j in 0..instance.m {
            println!(
                "  Constraint {}: {} / {}",
                j,
                instance.load(&outcome.solution.selected, j),
                instance.capacities[j]
            );
        }
    }

    if let Some(out_path) = output {
        outcome.solution.save(&out_path)?;
        println!("\nSolution saved to {:?}", out_path);
    }

    if let Some(json_path) = json {
        let content = serde_json::to_string_pretty(&outcome)?;
        std::fs::write(&json_path, content)?;
        println!("Run outcome saved to {:?}", json_path);
    }

    Ok(())
}

fn run_benchmark(
    path: &Path,
    output: &Path,
    runs: usize,
    time_limit: f64,
    seed: u64,
    vns: VnsConfig,
    population: bool,
) -> KnapsackResult<()> {
    let instances = if path.is_dir() {
        println!("Loading instances from {:?}...", path);
        load_instances_from_dir(path)?
    } else {
        vec![KnapsackInstance::from_file(path)?]
    };
    println!("Found {} instances", instances.len());

    if instances.is_empty() {
        eprintln!("No instances found!");
        return Ok(());
    }

    std::fs::create_dir_all(output)?;

    let config = BenchmarkConfig {
        num_runs: runs,
        time_limit,
        base_seed: seed,
        vns,
        run_population: population,
        ..Default::default()
    };

    let mut benchmark = Benchmark::new(config);

    for (i, instance) in instances.iter().enumerate() {
        println!(
            "\n[{}/{}] === Instance: {} (n={}, m={}) ===",
            i + 1,
            instances.len(),
            instance.name,
            instance.n,
            instance.m
        );
        benchmark.run_full_benchmark(instance)?;
        print!("{}", benchmark.instance_table(&instance.name));
    }

    let results_path = output.join("results.csv");
    benchmark.export_to_csv(&results_path)?;
    println!("\nResults exported to {:?}", results_path);

    let stats_path = output.join("statistics.csv");
    benchmark.export_statistics_csv(&stats_path)?;
    println!("Statistics exported to {:?}", stats_path);

    let report = benchmark.generate_report();
    println!("\n{}", report);

    let report_path = output.join("report.txt");
    std::fs::write(&report_path, &report)?;
    println!("Report saved to {:?}", report_path);

    Ok(())
}

fn analyze_instance(path: &Path) -> KnapsackResult<()> {
    let instance = KnapsackInstance::from_file(path)?;

    println!("========== Instance Analysis ==========\n");
    println!("{}", instance.statistics());

    println!("Constraint Tightness:");
    for j in 0..instance.m {
        let total: i64 = instance.weights[j].iter().sum();
        println!(
            "  Constraint {}: capacity {} / total weight {}",
            j, instance.capacities[j], total
        );
    }

    let blocked = (0..instance.n)
        .filter(|&i| (0..instance.m).any(|j| instance.weights[j][i] > instance.capacities[j]))
        .count();
    println!("\nItems that never fit: {}", blocked);

    let greedy = greedy_construction(&instance);
    let mut improved = greedy.clone();
    VND::with_standard_operators().improve(&instance, &mut improved);

    println!("\nQuick Solution Estimates:");
    println!("  Greedy: {} ({} items)", greedy.value, greedy.num_selected());
    println!("  Greedy + VND: {} ({} items)", improved.value, improved.num_selected());

    Ok(())
}
