//! Property tests over randomly generated instances.

use mkp_solver::deadline::Deadline;
use mkp_solver::heuristics::construction::{greedy_construction, Construction};
use mkp_solver::heuristics::genetic::{GaConfig, GeneticAlgorithm};
use mkp_solver::heuristics::hybrid::{HybridConfig, HybridGaVns};
use mkp_solver::heuristics::local_search::{LocalSearch, VND};
use mkp_solver::heuristics::vns::{perturb, VariableNeighborhoodSearch, VnsConfig};
use mkp_solver::{KnapsackInstance, Solution};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn instance_strategy() -> impl Strategy<Value = KnapsackInstance> {
    (1usize..12, 1usize..4).prop_flat_map(|(n, m)| {
        (
            prop::collection::vec(0i64..50, n),
            prop::collection::vec(0i64..60, m),
            prop::collection::vec(prop::collection::vec(0i64..30, n), m),
        )
            .prop_map(|(profits, capacities, weights)| {
                KnapsackInstance::new("prop", profits, capacities, weights)
                    .expect("generated instance is valid")
            })
    })
}

fn assert_consistent(
    instance: &KnapsackInstance,
    solution: &Solution,
) -> Result<(), TestCaseError> {
    prop_assert!(instance.is_feasible(&solution.selected));
    prop_assert_eq!(solution.value, instance.evaluate(&solution.selected));
    Ok(())
}

proptest! {
    #[test]
    fn prop_constructions_feasible(instance in instance_strategy(), seed in any::<u64>()) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for strategy in Construction::ALL {
            let solution = strategy.build(&instance, &mut rng);
            assert_consistent(&instance, &solution)?;
        }
    }

    #[test]
    fn prop_greedy_deterministic(instance in instance_strategy()) {
        prop_assert_eq!(greedy_construction(&instance), greedy_construction(&instance));
    }

    #[test]
    fn prop_vnd_monotone(instance in instance_strategy(), seed in any::<u64>()) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut solution = Construction::Random.build(&instance, &mut rng);
        let before = solution.value;

        VND::with_standard_operators().improve(&instance, &mut solution);

        prop_assert!(solution.value >= before);
        assert_consistent(&instance, &solution)?;
    }

    #[test]
    fn prop_perturb_keeps_value_in_sync(
        instance in instance_strategy(),
        seed in any::<u64>(),
        k in 0usize..6,
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut solution = greedy_construction(&instance);
        perturb(&mut solution, &instance, k, &mut rng);
        assert_consistent(&instance, &solution)?;
    }

    #[test]
    fn prop_vns_incumbent_monotone(instance in instance_strategy(), seed in any::<u64>()) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut solution = Construction::Random.build(&instance, &mut rng);
        let start = solution.value;

        let report = VariableNeighborhoodSearch::new(VnsConfig::with_params(15, 2))
            .search(&instance, &mut solution, &mut rng, &Deadline::unbounded());

        prop_assert!(report
            .improvements
            .windows(2)
            .all(|w| w[0].0 < w[1].0 && w[0].1 < w[1].1));
        prop_assert_eq!(report.improvements.last().map(|&(_, value)| value), Some(solution.value));
        prop_assert!(solution.value >= start);
        assert_consistent(&instance, &solution)?;
    }

    #[test]
    fn prop_population_methods_feasible(instance in instance_strategy(), seed in any::<u64>()) {
        let ga = GeneticAlgorithm::with_params(6, 4, 0.3)
            .run(&instance, &mut ChaCha8Rng::seed_from_u64(seed), &Deadline::unbounded())
            .unwrap();
        assert_consistent(&instance, &ga.solution)?;

        let hybrid = HybridGaVns::new(HybridConfig {
            ga: GaConfig { population_size: 3, generations: 2, mutation_rate: 0.3 },
            vns: VnsConfig::with_params(3, 2),
        })
        .run(&instance, &mut ChaCha8Rng::seed_from_u64(seed), &Deadline::unbounded())
        .unwrap();
        assert_consistent(&instance, &hybrid.solution)?;
    }

    #[test]
    fn prop_copy_independent(
        instance in instance_strategy(),
        item in any::<prop::sample::Index>(),
    ) {
        let src = greedy_construction(&instance);
        let mut dst = Solution::empty(instance.n);
        dst.copy_from(&src);
        prop_assert_eq!(&dst, &src);

        let snapshot = src.clone();
        dst.flip(&instance, item.index(instance.n));
        prop_assert_eq!(src, snapshot);
    }
}
